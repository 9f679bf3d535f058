use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text", enum_name = "backup_mode_enum")]
pub enum BackupMode {
    #[sea_orm(string_value = "with_dump")]
    WithDump,
    #[sea_orm(string_value = "without_dump")]
    WithoutDump,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text", enum_name = "database_engine_enum")]
pub enum DatabaseEngine {
    #[sea_orm(string_value = "postgresql")]
    PostgreSql,
    #[sea_orm(string_value = "sqlite")]
    Sqlite,
}

/// What a single backup run consists of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text", enum_name = "backup_kind_enum")]
pub enum BackupKind {
    /// Database dump followed by a file-tree sync.
    #[sea_orm(string_value = "dump_sync")]
    DumpAndSync,
    /// File-tree sync only.
    #[sea_orm(string_value = "sync_only")]
    SyncOnly,
}

/// How ignore-rule prefixes are matched against relative paths.
///
/// `Prefix` is the historical behavior: a rule `logs` also matches `logs2`.
/// `Segment` additionally requires the prefix to end on a path-segment
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text", enum_name = "ignore_match_mode_enum")]
pub enum IgnoreMatchMode {
    #[sea_orm(string_value = "prefix")]
    Prefix,
    #[sea_orm(string_value = "segment")]
    Segment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text", enum_name = "execution_status_enum")]
pub enum ExecutionStatus {
    #[sea_orm(string_value = "running")]
    Running,
    #[sea_orm(string_value = "success")]
    Success,
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionStatus::Running => "running",
            ExecutionStatus::Success => "success",
            ExecutionStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Severity/category of one detail-log line attached to an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text", enum_name = "log_kind_enum")]
pub enum LogKind {
    #[sea_orm(string_value = "info")]
    Info,
    #[sea_orm(string_value = "warning")]
    Warning,
    #[sea_orm(string_value = "error")]
    Error,
    #[sea_orm(string_value = "copy")]
    Copy,
    #[sea_orm(string_value = "ignored")]
    Ignored,
    #[sea_orm(string_value = "stdout")]
    Stdout,
    #[sea_orm(string_value = "stderr")]
    Stderr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text", enum_name = "notification_channel_enum")]
pub enum NotificationChannelKind {
    #[sea_orm(string_value = "email")]
    Email,
    #[sea_orm(string_value = "telegram")]
    Telegram,
}

impl fmt::Display for NotificationChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationChannelKind::Email => "email",
            NotificationChannelKind::Telegram => "telegram",
        };
        write!(f, "{s}")
    }
}
