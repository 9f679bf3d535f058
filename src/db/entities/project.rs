use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::db::enums::{BackupMode, DatabaseEngine};

/// A system whose data is protected by backups.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub backup_mode: BackupMode,
    /// Directory holding the project's media/files to back up.
    pub media_path: String,
    /// Optional docker-compose file; used as a credential fallback for dumps.
    pub compose_path: Option<String>,
    pub database_engine: DatabaseEngine,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::backup_configuration::Entity")]
    BackupConfigurations,
}

impl Related<super::backup_configuration::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BackupConfigurations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
