use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A path prefix, relative to the source root, excluded from sync.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ignore_rules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub configuration_id: i32,
    pub path: String,
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
