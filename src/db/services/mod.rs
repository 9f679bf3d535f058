//! High-level data access for the backup core. Encapsulates the query logic
//! so the orchestrator, sweeper and synchronizer work with domain models
//! instead of raw queries. One sub-module per domain area; public functions
//! are re-exported under `crate::db::services::`.

pub mod configuration_service;
pub mod execution_service;
pub mod trigger_service;

pub use configuration_service::*;
pub use execution_service::*;
pub use trigger_service::*;
