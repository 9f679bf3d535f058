//! Upsert-by-name / delete-by-name access to the periodic-trigger store.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};

use crate::db::entities::{periodic_trigger, prelude::*};
use crate::scheduler::time_spec::CronFields;

/// Creates or updates the named trigger. Re-running with the same inputs
/// leaves a single row behind, which is what makes reconciliation idempotent.
pub async fn upsert_trigger(
    db: &DatabaseConnection,
    name: &str,
    cron: &CronFields,
    task: &str,
    args: serde_json::Value,
    enabled: bool,
) -> Result<PeriodicTriggerModel, DbErr> {
    let existing = PeriodicTrigger::find()
        .filter(periodic_trigger::Column::Name.eq(name))
        .one(db)
        .await?;

    match existing {
        Some(model) => {
            let mut active: periodic_trigger::ActiveModel = model.into();
            active.cron_minute = Set(cron.minute.clone());
            active.cron_hour = Set(cron.hour.clone());
            active.cron_day_of_month = Set(cron.day_of_month.clone());
            active.cron_month = Set(cron.month.clone());
            active.cron_day_of_week = Set(cron.day_of_week.clone());
            active.task = Set(task.to_string());
            active.args = Set(args);
            active.enabled = Set(enabled);
            active.updated_at = Set(Utc::now());
            active.update(db).await
        }
        None => {
            periodic_trigger::ActiveModel {
                name: Set(name.to_string()),
                cron_minute: Set(cron.minute.clone()),
                cron_hour: Set(cron.hour.clone()),
                cron_day_of_month: Set(cron.day_of_month.clone()),
                cron_month: Set(cron.month.clone()),
                cron_day_of_week: Set(cron.day_of_week.clone()),
                task: Set(task.to_string()),
                args: Set(args),
                enabled: Set(enabled),
                updated_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(db)
            .await
        }
    }
}

/// Removes the named trigger if present.
pub async fn delete_trigger_by_name(db: &DatabaseConnection, name: &str) -> Result<(), DbErr> {
    PeriodicTrigger::delete_many()
        .filter(periodic_trigger::Column::Name.eq(name))
        .exec(db)
        .await?;

    Ok(())
}

/// Returns the enabled triggers, for the beat loop.
pub async fn list_enabled_triggers(
    db: &DatabaseConnection,
) -> Result<Vec<PeriodicTriggerModel>, DbErr> {
    PeriodicTrigger::find()
        .filter(periodic_trigger::Column::Enabled.eq(true))
        .all(db)
        .await
}
