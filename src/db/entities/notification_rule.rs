use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::db::enums::NotificationChannelKind;

/// Where and when to notify about a configuration's backup outcomes.
/// A configuration may carry several rules per channel.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification_rules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub configuration_id: i32,
    pub channel: NotificationChannelKind,
    /// E-mail address for `email`, chat id for `telegram`.
    pub target: String,
    pub active: bool,
    pub notify_on_success: bool,
    pub notify_on_failure: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::backup_configuration::Entity",
        from = "Column::ConfigurationId",
        to = "super::backup_configuration::Column::Id",
        on_delete = "Cascade",
        on_update = "Cascade"
    )]
    BackupConfiguration,
}

impl Related<super::backup_configuration::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BackupConfiguration.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
