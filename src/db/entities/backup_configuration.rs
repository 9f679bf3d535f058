use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::db::enums::{BackupKind, IgnoreMatchMode};

/// One backup recipe for a project. Deleting a configuration cascades to its
/// ignore rules, notification rules, schedule entries and executions.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "backup_configurations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub backup_kind: BackupKind,
    pub source_path: String,
    pub destination_root: String,
    // Database connection fields, required only for dump+sync configurations.
    pub db_host: Option<String>,
    pub db_port: Option<i32>,
    pub db_name: Option<String>,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    /// Days a backup output directory is kept before eligible for deletion.
    pub retention_days: i32,
    pub keep_permissions: bool,
    pub delete_remote_extraneous: bool,
    pub ignore_match_mode: IgnoreMatchMode,
    /// Legacy free-text schedule. Superseded by schedule entries; the
    /// synchronizer ignores it.
    pub legacy_schedule: Option<String>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_delete = "Cascade",
        on_update = "Cascade"
    )]
    Project,
    #[sea_orm(has_many = "super::ignore_rule::Entity")]
    IgnoreRules,
    #[sea_orm(has_many = "super::notification_rule::Entity")]
    NotificationRules,
    #[sea_orm(has_many = "super::schedule_entry::Entity")]
    ScheduleEntries,
    #[sea_orm(has_many = "super::execution::Entity")]
    Executions,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::ignore_rule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IgnoreRules.def()
    }
}

impl Related<super::notification_rule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NotificationRules.def()
    }
}

impl Related<super::schedule_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScheduleEntries.def()
    }
}

impl Related<super::execution::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Executions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
