pub mod backup;
pub mod config;
pub mod db;
pub mod notifications;
pub mod scheduler;
