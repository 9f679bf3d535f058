use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{NotificationSender, SenderError};
use crate::notifications::models::ChannelConfig;

/// A sender for pushing notifications through the HTTP e-mail API.
pub struct EmailSender {
    client: Client,
    api_url: String,
    api_token: String,
    from_address: String,
    from_name: String,
}

impl EmailSender {
    pub fn new(api_url: String, api_token: String, from_address: String, from_name: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_token,
            from_address,
            from_name,
        }
    }
}

#[derive(Serialize)]
struct Recipient<'a> {
    email: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailMessage<'a> {
    to: Vec<Recipient<'a>>,
    from: &'a str,
    from_name: &'a str,
    reply_to: &'a str,
    subject: &'a str,
    content: &'a str,
}

#[async_trait]
impl NotificationSender for EmailSender {
    async fn send(
        &self,
        config: &ChannelConfig,
        subject: &str,
        message: &str,
    ) -> Result<(), SenderError> {
        let to = match config {
            ChannelConfig::Email { to } => to,
            _ => {
                return Err(SenderError::InvalidConfiguration(
                    "Expected Email config, but found a different type.".to_string(),
                ));
            }
        };

        let payload = EmailMessage {
            to: vec![Recipient {
                email: to,
                name: to,
            }],
            from: &self.from_address,
            from_name: &self.from_name,
            reply_to: &self.from_address,
            subject,
            content: message,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(SenderError::SendFailed(format!(
                "Email API returned non-success status: {status}. Body: {error_body}"
            )));
        }

        Ok(())
    }
}
