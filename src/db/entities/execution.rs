use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::db::enums::ExecutionStatus;

/// One recorded run of a configuration's backup. Created `running` at run
/// start, finalized exactly once, never deleted by the core (audit trail).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "executions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub configuration_id: i32,
    pub started_at: ChronoDateTimeUtc,
    /// Null while the run is in progress; once set it is never cleared.
    pub finished_at: Option<ChronoDateTimeUtc>,
    pub status: ExecutionStatus,
    pub message: Option<String>,
    pub duration_secs: Option<i64>,
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
    #[sea_orm(has_many = "super::execution_log::Entity")]
    ExecutionLogs,
}

impl Related<super::backup_configuration::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BackupConfiguration.def()
    }
}

impl Related<super::execution_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExecutionLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
