//! Bookkeeping for execution records and their detail logs.
//!
//! Every state transition and log append is a single immediate write, so a
//! crash mid-run leaves a visibly `running` execution with partial logs.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};

use crate::db::entities::{execution, execution_log, prelude::*};
use crate::db::enums::{ExecutionStatus, LogKind};

/// True iff an execution for this configuration is currently `running`.
/// Used as the mutual-exclusion guard before starting a run.
pub async fn has_running_execution(
    db: &DatabaseConnection,
    configuration_id: i32,
) -> Result<bool, DbErr> {
    let count = Execution::find()
        .filter(execution::Column::ConfigurationId.eq(configuration_id))
        .filter(execution::Column::Status.eq(ExecutionStatus::Running))
        .count(db)
        .await?;

    Ok(count > 0)
}

/// Inserts a new `running` execution for the configuration.
pub async fn create_running_execution(
    db: &DatabaseConnection,
    configuration_id: i32,
    message: &str,
) -> Result<ExecutionModel, DbErr> {
    execution::ActiveModel {
        configuration_id: Set(configuration_id),
        started_at: Set(Utc::now()),
        finished_at: Set(None),
        status: Set(ExecutionStatus::Running),
        message: Set(Some(message.to_string())),
        duration_secs: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Finalizes an execution to `success` or `failed`, setting the end time and
/// computed duration. The end time, once set, is never overwritten.
pub async fn finalize_execution(
    db: &DatabaseConnection,
    execution_id: i32,
    status: ExecutionStatus,
    message: &str,
) -> Result<ExecutionModel, DbErr> {
    let found = Execution::find_by_id(execution_id).one(db).await?;
    let Some(model) = found else {
        return Err(DbErr::RecordNotFound(format!(
            "execution {execution_id} not found"
        )));
    };

    let finished_at = model.finished_at.unwrap_or_else(Utc::now);
    let duration_secs = (finished_at - model.started_at).num_seconds();

    let mut active: execution::ActiveModel = model.into();
    active.status = Set(status);
    active.finished_at = Set(Some(finished_at));
    active.message = Set(Some(message.to_string()));
    active.duration_secs = Set(Some(duration_secs));
    active.update(db).await
}

/// Appends one detail-log line to an execution.
pub async fn append_log(
    db: &DatabaseConnection,
    execution_id: i32,
    kind: LogKind,
    message: &str,
) -> Result<(), DbErr> {
    execution_log::ActiveModel {
        execution_id: Set(execution_id),
        timestamp: Set(Utc::now()),
        kind: Set(kind),
        message: Set(message.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(())
}
