pub mod entities;
pub mod enums;
pub mod services;

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Opens a connection pool against the configured PostgreSQL instance.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
