//! SeaORM entities mapping to the backup service's tables.
//!
//! Each entity is defined in its own module; the `prelude` re-exports the
//! common aliases for convenient importing.

pub mod backup_configuration;
pub mod execution;
pub mod execution_log;
pub mod ignore_rule;
pub mod notification_rule;
pub mod periodic_trigger;
pub mod project;
pub mod schedule_entry;

pub mod prelude {
    pub use super::project::Entity as Project;
    pub use super::project::Model as ProjectModel;

    pub use super::backup_configuration::Entity as BackupConfiguration;
    pub use super::backup_configuration::Model as BackupConfigurationModel;

    pub use super::ignore_rule::Entity as IgnoreRule;
    pub use super::ignore_rule::Model as IgnoreRuleModel;

    pub use super::notification_rule::Entity as NotificationRule;
    pub use super::notification_rule::Model as NotificationRuleModel;

    pub use super::schedule_entry::Entity as ScheduleEntry;
    pub use super::schedule_entry::Model as ScheduleEntryModel;

    pub use super::execution::Entity as Execution;
    pub use super::execution::Model as ExecutionModel;

    pub use super::execution_log::Entity as ExecutionLog;
    pub use super::execution_log::Model as ExecutionLogModel;

    pub use super::periodic_trigger::Entity as PeriodicTrigger;
    pub use super::periodic_trigger::Model as PeriodicTriggerModel;
}
