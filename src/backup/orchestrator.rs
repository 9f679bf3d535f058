//! Backup orchestrator: the state machine that sequences sync + dump for one
//! configuration, keeps the execution record durable at every step, and
//! drives the bounded retry loop.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, DbErr};
use thiserror::Error;
use tokio::time::Duration as TokioDuration;
use tracing::{error, info, warn};

use super::dump::{self, DumpError};
use super::ignore::IgnoreSet;
use super::sync::{self, SyncError};
use super::{ExecutionLogger, RunLogger};
use crate::db::entities::prelude::{BackupConfigurationModel, ProjectModel};
use crate::db::enums::{BackupKind, DatabaseEngine, ExecutionStatus, LogKind};
use crate::db::services::{configuration_service, execution_service};
use crate::notifications::service::NotificationService;

pub const SUCCESS_MESSAGE: &str = "Backup completed successfully";

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_BACKOFF: TokioDuration = TokioDuration::from_secs(60);

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("configuration {0} not found")]
    NotFound(i32),
    #[error("precondition failed: {0}")]
    Precondition(String),
    #[error("sync failed: {0}")]
    Sync(#[from] SyncError),
    #[error("database dump failed: {0}")]
    Dump(#[from] DumpError),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Timestamped output directory name for one run: `<project>_YYYYMMDD_HHMMSS`.
pub fn output_dir_name(project_name: &str, now: DateTime<Utc>) -> String {
    format!("{}_{}", project_name, now.format("%Y%m%d_%H%M%S"))
}

pub struct Orchestrator {
    db: DatabaseConnection,
    notifier: Arc<NotificationService>,
    max_attempts: u32,
    retry_backoff: TokioDuration,
}

impl Orchestrator {
    pub fn new(db: DatabaseConnection, notifier: Arc<NotificationService>) -> Self {
        Self {
            db,
            notifier,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    /// Overrides the retry ceiling and backoff, mainly for tests.
    pub fn with_retry_policy(mut self, max_attempts: u32, retry_backoff: TokioDuration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_backoff = retry_backoff;
        self
    }

    /// Runs a backup for the configuration, retrying failed attempts up to
    /// the ceiling with a sleep between them. Never panics or propagates an
    /// error past this boundary; the outcome is the returned message plus
    /// the persisted execution record.
    pub async fn run_backup(&self, configuration_id: i32) -> String {
        match execution_service::has_running_execution(&self.db, configuration_id).await {
            Ok(false) => {}
            Ok(true) => {
                warn!(configuration_id, "refusing to start a second concurrent run");
                return format!(
                    "Backup skipped: configuration {configuration_id} already has a running execution"
                );
            }
            Err(e) => {
                error!(configuration_id, "could not check running executions: {e}");
                return format!("Backup aborted: {e}");
            }
        }

        let mut attempt = 1;
        loop {
            match self.run_attempt(configuration_id).await {
                Ok(message) => return message,
                // A missing configuration is terminal, never retried.
                Err(BackupError::NotFound(id)) => {
                    warn!(configuration_id = id, "configuration not found");
                    return format!("Configuration {id} not found");
                }
                Err(e) if attempt < self.max_attempts => {
                    warn!(
                        configuration_id,
                        attempt, "backup attempt failed: {e}; retrying"
                    );
                    tokio::time::sleep(self.retry_backoff).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(configuration_id, attempt, "backup failed: {e}");
                    return format!("Backup failed after {attempt} attempts: {e}");
                }
            }
        }
    }

    /// One attempt: create the execution record, run the pipeline, finalize
    /// the record and fan out notifications.
    async fn run_attempt(&self, configuration_id: i32) -> Result<String, BackupError> {
        let found =
            configuration_service::get_configuration_with_project(&self.db, configuration_id)
                .await?;
        let Some((config, project)) = found else {
            return Err(BackupError::NotFound(configuration_id));
        };

        let execution =
            execution_service::create_running_execution(&self.db, config.id, "Backup started")
                .await?;
        let log = ExecutionLogger::new(&self.db, execution.id);
        log.append(
            LogKind::Info,
            &format!("Starting backup of project '{}'", project.name),
        )
        .await?;

        match self.perform(&config, &project, &log).await {
            Ok(()) => {
                execution_service::finalize_execution(
                    &self.db,
                    execution.id,
                    ExecutionStatus::Success,
                    SUCCESS_MESSAGE,
                )
                .await?;
                log.append(LogKind::Info, SUCCESS_MESSAGE).await?;
                self.notifier
                    .notify_outcome(
                        config.id,
                        &project.name,
                        ExecutionStatus::Success,
                        SUCCESS_MESSAGE,
                    )
                    .await;
                info!(configuration_id, execution_id = execution.id, "backup succeeded");
                Ok(format!("{SUCCESS_MESSAGE}: {}", project.name))
            }
            Err(e) => {
                let reason = e.to_string();
                if let Err(db_err) = execution_service::finalize_execution(
                    &self.db,
                    execution.id,
                    ExecutionStatus::Failed,
                    &reason,
                )
                .await
                {
                    error!(execution_id = execution.id, "could not finalize execution: {db_err}");
                }
                if let Err(db_err) = log.append(LogKind::Error, &reason).await {
                    error!(execution_id = execution.id, "could not append error log: {db_err}");
                }
                self.notifier
                    .notify_outcome(
                        config.id,
                        &project.name,
                        ExecutionStatus::Failed,
                        &format!("Backup failed: {reason}"),
                    )
                    .await;
                Err(e)
            }
        }
    }

    async fn perform(
        &self,
        config: &BackupConfigurationModel,
        project: &ProjectModel,
        log: &dyn RunLogger,
    ) -> Result<(), BackupError> {
        validate_preconditions(config, project)?;

        let source = Path::new(config.source_path.trim());
        let output_dir =
            Path::new(config.destination_root.trim()).join(output_dir_name(&project.name, Utc::now()));
        fs::create_dir_all(&output_dir).map_err(|e| {
            BackupError::Precondition(format!(
                "destination not creatable: {}: {e}",
                output_dir.display()
            ))
        })?;
        log.append(
            LogKind::Info,
            &format!("Output directory: {}", output_dir.display()),
        )
        .await?;

        let ignore_paths = configuration_service::list_ignore_paths(&self.db, config.id).await?;
        let ignore = IgnoreSet::new(ignore_paths.clone(), config.ignore_match_mode);

        if config.delete_remote_extraneous {
            sync::mirror_with_rsync(
                source,
                &output_dir,
                &ignore_paths,
                config.keep_permissions,
                log,
            )
            .await?;
        } else {
            let stats = sync::mirror_tree(source, &output_dir, &ignore, log).await?;
            log.append(
                LogKind::Info,
                &format!(
                    "Sync finished: {} files copied, {} files ignored, {} directories ignored",
                    stats.files_copied, stats.files_ignored, stats.dirs_ignored
                ),
            )
            .await?;
        }

        if config.backup_kind == BackupKind::DumpAndSync {
            let artifact = dump::run_dump(config, project, &output_dir, log).await?;
            log.append(
                LogKind::Info,
                &format!("Database dump written to {}", artifact.display()),
            )
            .await?;
        }

        Ok(())
    }

    /// Logs what a real run would do, without creating an execution record
    /// or touching the destination. Used for connectivity testing.
    pub async fn run_backup_dry(&self, configuration_id: i32) -> String {
        match self.dry_run_report(configuration_id).await {
            Ok(report) => {
                for line in report.lines() {
                    info!(configuration_id, "dry run: {line}");
                }
                report
            }
            Err(e) => format!("Dry run failed: {e}"),
        }
    }

    async fn dry_run_report(&self, configuration_id: i32) -> Result<String, BackupError> {
        let found =
            configuration_service::get_configuration_with_project(&self.db, configuration_id)
                .await?;
        let Some((config, project)) = found else {
            return Ok(format!("Configuration {configuration_id} not found"));
        };

        validate_preconditions(&config, &project)?;

        let ignore_paths = configuration_service::list_ignore_paths(&self.db, config.id).await?;
        let ignore = IgnoreSet::new(ignore_paths, config.ignore_match_mode);
        let stats = sync::preview_tree(Path::new(config.source_path.trim()), &ignore)?;

        let mut lines = vec![
            format!("Project: {}", project.name),
            format!(
                "Would sync {} -> {}",
                config.source_path, config.destination_root
            ),
            format!(
                "Would copy {} files, ignore {} files and {} directories",
                stats.files_copied, stats.files_ignored, stats.dirs_ignored
            ),
        ];
        if config.backup_kind == BackupKind::DumpAndSync {
            match project.database_engine {
                DatabaseEngine::PostgreSql => {
                    let credentials = dump::resolve_credentials(&config, &project)?;
                    lines.push(format!(
                        "Would dump database '{}' at {}:{} as user '{}'",
                        credentials.name, credentials.host, credentials.port, credentials.user
                    ));
                }
                DatabaseEngine::Sqlite => {
                    lines.push(format!(
                        "Would dump sqlite database '{}'",
                        config.db_name.as_deref().unwrap_or("")
                    ));
                }
            }
        }

        Ok(lines.join("\n"))
    }
}

fn validate_preconditions(
    config: &BackupConfigurationModel,
    project: &ProjectModel,
) -> Result<(), BackupError> {
    if config.source_path.trim().is_empty() {
        return Err(BackupError::Precondition(
            "source path is not configured".to_string(),
        ));
    }
    if config.destination_root.trim().is_empty() {
        return Err(BackupError::Precondition(
            "destination root is not configured".to_string(),
        ));
    }

    let source = Path::new(config.source_path.trim());
    if !source.exists() {
        return Err(BackupError::Precondition(format!(
            "source directory not found: {}",
            config.source_path
        )));
    }

    if config.backup_kind == BackupKind::DumpAndSync {
        match project.database_engine {
            DatabaseEngine::PostgreSql => {
                dump::resolve_credentials(config, project)
                    .map(|_| ())
                    .map_err(|e| BackupError::Precondition(e.to_string()))?;
            }
            DatabaseEngine::Sqlite => {
                if config.db_name.as_deref().unwrap_or("").trim().is_empty() {
                    return Err(BackupError::Precondition(
                        "sqlite database path is not configured".to_string(),
                    ));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::retention::extract_backup_timestamp;
    use chrono::TimeZone;

    #[test]
    fn output_dir_name_round_trips_through_retention_parsing() {
        let now = Utc.with_ymd_and_hms(2026, 8, 26, 3, 15, 42).unwrap();
        let name = output_dir_name("app", now);

        assert_eq!(name, "app_20260826_031542");
        assert_eq!(extract_backup_timestamp(&name), Some(now.naive_utc()));
    }

    #[test]
    fn output_dir_name_keeps_underscored_project_names_parseable() {
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        let name = output_dir_name("my_shop", now);

        assert_eq!(extract_backup_timestamp(&name), Some(now.naive_utc()));
    }
}
