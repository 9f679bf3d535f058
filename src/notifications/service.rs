//! Notification dispatcher: fans a backup outcome out to the active rules of
//! a configuration. Delivery is best-effort per rule; a failed delivery is
//! logged and never escalates into a backup-run failure.

use sea_orm::DatabaseConnection;
use tracing::{error, info};

use super::models::ChannelConfig;
use super::senders::{NotificationSender, SenderError, email::EmailSender, telegram::TelegramSender};
use crate::config::ServerConfig;
use crate::db::entities::prelude::NotificationRuleModel;
use crate::db::enums::{ExecutionStatus, NotificationChannelKind};
use crate::db::services::configuration_service;

pub struct NotificationService {
    db: DatabaseConnection,
    email: EmailSender,
    telegram: TelegramSender,
}

/// Whether a rule wants to hear about this outcome.
pub fn should_notify(rule: &NotificationRuleModel, status: ExecutionStatus) -> bool {
    if !rule.active {
        return false;
    }
    match status {
        ExecutionStatus::Success => rule.notify_on_success,
        ExecutionStatus::Failed => rule.notify_on_failure,
        ExecutionStatus::Running => false,
    }
}

impl NotificationService {
    pub fn new(db: DatabaseConnection, config: &ServerConfig) -> Self {
        Self {
            db,
            email: EmailSender::new(
                config.email_api_url.clone(),
                config.email_api_token.clone(),
                config.email_from_address.clone(),
                config.email_from_name.clone(),
            ),
            telegram: TelegramSender::new(config.telegram_bot_token.clone()),
        }
    }

    async fn dispatch(
        &self,
        rule: &NotificationRuleModel,
        subject: &str,
        message: &str,
    ) -> Result<(), SenderError> {
        let channel = ChannelConfig::from_rule(rule);
        match rule.channel {
            NotificationChannelKind::Email => self.email.send(&channel, subject, message).await,
            NotificationChannelKind::Telegram => {
                self.telegram.send(&channel, subject, message).await
            }
        }
    }

    /// Fans the outcome out to every matching active rule of the
    /// configuration. Never returns an error: per-rule failures are logged
    /// and dispatch continues with the remaining rules.
    pub async fn notify_outcome(
        &self,
        configuration_id: i32,
        project_name: &str,
        status: ExecutionStatus,
        message: &str,
    ) {
        let rules = match configuration_service::list_active_notification_rules(
            &self.db,
            configuration_id,
        )
        .await
        {
            Ok(rules) => rules,
            Err(e) => {
                error!(configuration_id, "could not load notification rules: {e}");
                return;
            }
        };

        let subject = format!("[Backup] Result: {}", status.to_string().to_uppercase());
        let body = format!("{project_name}: {message}");

        for rule in rules.iter().filter(|r| should_notify(r, status)) {
            match self.dispatch(rule, &subject, &body).await {
                Ok(()) => {
                    info!(
                        configuration_id,
                        rule_id = rule.id,
                        channel = %rule.channel,
                        "notification sent"
                    );
                }
                Err(e) => {
                    error!(
                        configuration_id,
                        rule_id = rule.id,
                        channel = %rule.channel,
                        "notification delivery failed: {e}"
                    );
                }
            }
        }
    }

    /// Sends a test message through every active rule of the configuration,
    /// returning one result string per rule for the operator.
    pub async fn send_test_notifications(&self, configuration_id: i32) -> Vec<String> {
        let found = match configuration_service::get_configuration_with_project(
            &self.db,
            configuration_id,
        )
        .await
        {
            Ok(found) => found,
            Err(e) => return vec![format!("Could not load configuration: {e}")],
        };
        let Some((_, project)) = found else {
            return vec![format!("Configuration {configuration_id} not found")];
        };

        let rules = match configuration_service::list_active_notification_rules(
            &self.db,
            configuration_id,
        )
        .await
        {
            Ok(rules) => rules,
            Err(e) => return vec![format!("Could not load notification rules: {e}")],
        };

        if rules.is_empty() {
            return vec!["No active notification rules configured.".to_string()];
        }

        let subject = "[TEST] Backup notification";
        let message = format!("Notification test - project: {}", project.name);

        let mut results = Vec::with_capacity(rules.len());
        for rule in &rules {
            let delivered = self.dispatch(rule, subject, &message).await;
            results.push(match delivered {
                Ok(()) => format!("{} sent to {}: ok", rule.channel, rule.target),
                Err(e) => format!("{} sent to {}: failed ({e})", rule.channel, rule.target),
            });
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(
        channel: NotificationChannelKind,
        active: bool,
        on_success: bool,
        on_failure: bool,
    ) -> NotificationRuleModel {
        NotificationRuleModel {
            id: 1,
            configuration_id: 1,
            channel,
            target: "dest".into(),
            active,
            notify_on_success: on_success,
            notify_on_failure: on_failure,
        }
    }

    #[test]
    fn success_only_goes_to_success_subscribers() {
        let email = rule(NotificationChannelKind::Email, true, true, false);
        let bot = rule(NotificationChannelKind::Telegram, true, false, true);

        assert!(should_notify(&email, ExecutionStatus::Success));
        assert!(!should_notify(&bot, ExecutionStatus::Success));
        assert!(!should_notify(&email, ExecutionStatus::Failed));
        assert!(should_notify(&bot, ExecutionStatus::Failed));
    }

    #[test]
    fn inactive_rules_never_fire() {
        let inactive = rule(NotificationChannelKind::Email, false, true, true);

        assert!(!should_notify(&inactive, ExecutionStatus::Success));
        assert!(!should_notify(&inactive, ExecutionStatus::Failed));
    }

    #[test]
    fn running_is_not_a_notifiable_outcome() {
        let all_on = rule(NotificationChannelKind::Email, true, true, true);

        assert!(!should_notify(&all_on, ExecutionStatus::Running));
    }
}
