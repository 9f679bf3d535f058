use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A named trigger in the periodic-trigger store. The schedule synchronizer
/// only ever upserts or deletes rows by `name`; the beat loop polls the
/// enabled ones and fires the referenced task.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "periodic_triggers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub cron_minute: String,
    pub cron_hour: String,
    pub cron_day_of_month: String,
    pub cron_month: String,
    pub cron_day_of_week: String,
    /// Task entry point, e.g. `run_backup`.
    pub task: String,
    /// JSON argument list; for `run_backup` a single configuration id.
    #[sea_orm(column_type = "JsonBinary")]
    pub args: Json,
    pub enabled: bool,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
