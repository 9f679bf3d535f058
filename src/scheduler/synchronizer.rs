//! Schedule synchronizer: keeps a 1:1 mapping from active schedule entries
//! to named rows in the periodic-trigger store.

use sea_orm::{DatabaseConnection, DbErr};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use super::time_spec::{ScheduleParseError, ScheduleSpec};
use crate::db::entities::prelude::ScheduleEntryModel;
use crate::db::services::{configuration_service, trigger_service};

/// Task name bound to backup triggers in the store.
pub const BACKUP_TASK: &str = "run_backup";

#[derive(Debug, Error)]
pub enum ScheduleSyncError {
    #[error("schedule parse error: {0}")]
    Parse(#[from] ScheduleParseError),
    #[error("configuration {0} not found")]
    MissingConfiguration(i32),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Deterministic trigger name for one schedule entry. Re-deriving the name
/// from the same inputs always yields the same row, so upserts never
/// duplicate.
pub fn trigger_name(project_name: &str, configuration_id: i32, spec: &ScheduleSpec) -> String {
    format!(
        "backup | {project_name} | {configuration_id} | {}",
        spec.canonical()
    )
}

/// Upserts the external trigger for a created or updated schedule entry,
/// enabled iff the entry is active.
pub async fn apply_entry(
    db: &DatabaseConnection,
    entry: &ScheduleEntryModel,
) -> Result<(), ScheduleSyncError> {
    let spec = ScheduleSpec::parse(&entry.spec)?;

    let found =
        configuration_service::get_configuration_with_project(db, entry.configuration_id).await?;
    let Some((config, project)) = found else {
        return Err(ScheduleSyncError::MissingConfiguration(
            entry.configuration_id,
        ));
    };

    let name = trigger_name(&project.name, config.id, &spec);
    trigger_service::upsert_trigger(
        db,
        &name,
        &spec.to_cron_fields(),
        BACKUP_TASK,
        json!([config.id]),
        entry.active,
    )
    .await?;

    info!(entry_id = entry.id, trigger = %name, "schedule trigger upserted");
    Ok(())
}

/// Removes the external trigger for a deleted schedule entry.
pub async fn remove_entry(
    db: &DatabaseConnection,
    entry: &ScheduleEntryModel,
) -> Result<(), ScheduleSyncError> {
    let spec = ScheduleSpec::parse(&entry.spec)?;

    let found =
        configuration_service::get_configuration_with_project(db, entry.configuration_id).await?;
    let Some((config, project)) = found else {
        return Err(ScheduleSyncError::MissingConfiguration(
            entry.configuration_id,
        ));
    };

    let name = trigger_name(&project.name, config.id, &spec);
    trigger_service::delete_trigger_by_name(db, &name).await?;

    info!(entry_id = entry.id, trigger = %name, "schedule trigger removed");
    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub synced: usize,
    pub skipped: usize,
}

/// Rebuilds the trigger store from the current set of active schedule
/// entries. Idempotent: re-running with no entry changes upserts the same
/// names and creates no duplicates. Malformed specs are reported and
/// skipped, never fatal.
pub async fn reconcile_all(db: &DatabaseConnection) -> Result<ReconcileReport, DbErr> {
    let entries = configuration_service::list_active_schedule_entries(db).await?;

    let mut report = ReconcileReport::default();
    for entry in entries {
        match apply_entry(db, &entry).await {
            Ok(()) => report.synced += 1,
            Err(ScheduleSyncError::Database(e)) => return Err(e),
            Err(e) => {
                warn!(entry_id = entry.id, spec = %entry.spec, "skipping schedule entry: {e}");
                report.skipped += 1;
            }
        }
    }

    info!(
        synced = report.synced,
        skipped = report.skipped,
        "schedule reconciliation finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_names_are_deterministic() {
        let spec = ScheduleSpec::parse("03:00").unwrap();
        let a = trigger_name("app", 7, &spec);
        let b = trigger_name("app", 7, &ScheduleSpec::parse("03:00").unwrap());

        assert_eq!(a, "backup | app | 7 | 03:00");
        assert_eq!(a, b);
    }

    #[test]
    fn trigger_names_distinguish_spec_forms() {
        let fixed = trigger_name("app", 7, &ScheduleSpec::parse("03:00").unwrap());
        let cron = trigger_name("app", 7, &ScheduleSpec::parse("0 3 * * *").unwrap());

        assert_ne!(fixed, cron);
    }
}
