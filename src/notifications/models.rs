use serde::{Deserialize, Serialize};

use crate::db::entities::prelude::NotificationRuleModel;
use crate::db::enums::NotificationChannelKind;

/// Channel-specific destination for one notification rule. The channel set
/// is fixed and known at design time, so dispatch is a closed enum rather
/// than runtime string lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChannelConfig {
    Email { to: String },
    Telegram { chat_id: String },
}

impl ChannelConfig {
    pub fn from_rule(rule: &NotificationRuleModel) -> Self {
        match rule.channel {
            NotificationChannelKind::Email => ChannelConfig::Email {
                to: rule.target.clone(),
            },
            NotificationChannelKind::Telegram => ChannelConfig::Telegram {
                chat_id: rule.target.clone(),
            },
        }
    }
}
