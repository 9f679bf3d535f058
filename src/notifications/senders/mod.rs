use async_trait::async_trait;
use thiserror::Error;

use super::models::ChannelConfig;

pub mod email;
pub mod telegram;

#[derive(Error, Debug)]
pub enum SenderError {
    #[error("Failed to send notification: {0}")]
    SendFailed(String),
    #[error("Invalid configuration for sender: {0}")]
    InvalidConfiguration(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// A trait for sending notifications to a specific channel type.
/// Both concrete senders (e-mail, Telegram) implement this trait.
#[async_trait]
pub trait NotificationSender {
    /// Sends a notification to the destination in `config`. `subject` is
    /// used by channels that have one (e-mail) and ignored elsewhere.
    async fn send(
        &self,
        config: &ChannelConfig,
        subject: &str,
        message: &str,
    ) -> Result<(), SenderError>;
}
