use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};

use crate::db::entities::{
    backup_configuration, ignore_rule, notification_rule, prelude::*, schedule_entry,
};

/// Fetches a configuration together with its owning project.
pub async fn get_configuration_with_project(
    db: &DatabaseConnection,
    configuration_id: i32,
) -> Result<Option<(BackupConfigurationModel, ProjectModel)>, DbErr> {
    let found = BackupConfiguration::find_by_id(configuration_id)
        .find_also_related(Project)
        .one(db)
        .await?;

    // The project FK is NOT NULL, so a missing project means a torn row;
    // treat it the same as a missing configuration.
    Ok(found.and_then(|(config, project)| project.map(|p| (config, p))))
}

/// Returns the ignore-rule paths of a configuration, in insertion order.
pub async fn list_ignore_paths(
    db: &DatabaseConnection,
    configuration_id: i32,
) -> Result<Vec<String>, DbErr> {
    let rules = IgnoreRule::find()
        .filter(ignore_rule::Column::ConfigurationId.eq(configuration_id))
        .order_by_asc(ignore_rule::Column::Id)
        .all(db)
        .await?;

    Ok(rules.into_iter().map(|r| r.path).collect())
}

/// Returns the active notification rules of a configuration.
pub async fn list_active_notification_rules(
    db: &DatabaseConnection,
    configuration_id: i32,
) -> Result<Vec<NotificationRuleModel>, DbErr> {
    NotificationRule::find()
        .filter(notification_rule::Column::ConfigurationId.eq(configuration_id))
        .filter(notification_rule::Column::Active.eq(true))
        .all(db)
        .await
}

/// Returns every configuration with a non-empty destination root, for the
/// retention sweep.
pub async fn list_configurations_with_destination(
    db: &DatabaseConnection,
) -> Result<Vec<BackupConfigurationModel>, DbErr> {
    let configs = BackupConfiguration::find()
        .filter(backup_configuration::Column::DestinationRoot.ne(""))
        .all(db)
        .await?;

    Ok(configs)
}

/// Returns all active schedule entries, for reconciliation against the
/// periodic-trigger store.
pub async fn list_active_schedule_entries(
    db: &DatabaseConnection,
) -> Result<Vec<ScheduleEntryModel>, DbErr> {
    ScheduleEntry::find()
        .filter(schedule_entry::Column::Active.eq(true))
        .order_by_asc(schedule_entry::Column::Id)
        .all(db)
        .await
}

/// Fetches a single schedule entry.
pub async fn get_schedule_entry(
    db: &DatabaseConnection,
    entry_id: i32,
) -> Result<Option<ScheduleEntryModel>, DbErr> {
    ScheduleEntry::find_by_id(entry_id).one(db).await
}
