use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A time specification for automatic runs of a configuration: either a
/// five-field cron expression (`0 3 * * *`) or a fixed daily time (`03:00`).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "schedule_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub configuration_id: i32,
    pub spec: String,
    pub active: bool,
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
