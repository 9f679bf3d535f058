//! The backup-execution pipeline: ignore matching, file sync, database dump,
//! orchestration, and retention cleanup.

pub mod dump;
pub mod ignore;
pub mod orchestrator;
pub mod retention;
pub mod sync;

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr};

use crate::db::enums::LogKind;
use crate::db::services::execution_service;

/// Destination for the per-run detail log. The sync engine and dump adapter
/// write through this seam so they stay testable without a database.
#[async_trait]
pub trait RunLogger: Send + Sync {
    async fn append(&self, kind: LogKind, message: &str) -> Result<(), DbErr>;
}

/// Writes detail-log lines straight to the `execution_logs` table, one row
/// per call, so partial progress survives a crash.
pub struct ExecutionLogger<'a> {
    db: &'a DatabaseConnection,
    execution_id: i32,
}

impl<'a> ExecutionLogger<'a> {
    pub fn new(db: &'a DatabaseConnection, execution_id: i32) -> Self {
        Self { db, execution_id }
    }
}

#[async_trait]
impl RunLogger for ExecutionLogger<'_> {
    async fn append(&self, kind: LogKind, message: &str) -> Result<(), DbErr> {
        execution_service::append_log(self.db, self.execution_id, kind, message).await
    }
}

#[cfg(test)]
pub(crate) mod test_log {
    use super::*;
    use std::sync::Mutex;

    /// In-memory logger for exercising the sync engine and dump adapter.
    #[derive(Default)]
    pub struct MemoryLogger {
        pub entries: Mutex<Vec<(LogKind, String)>>,
    }

    impl MemoryLogger {
        pub fn entries_of(&self, kind: LogKind) -> Vec<String> {
            self.entries
                .lock()
                .unwrap()
                .iter()
                .filter(|(k, _)| *k == kind)
                .map(|(_, m)| m.clone())
                .collect()
        }
    }

    #[async_trait]
    impl RunLogger for MemoryLogger {
        async fn append(&self, kind: LogKind, message: &str) -> Result<(), DbErr> {
            self.entries.lock().unwrap().push((kind, message.to_string()));
            Ok(())
        }
    }
}
