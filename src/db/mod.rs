use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::error::{AppError, AppResult};

pub async fn connect(database_url: &str) -> AppResult<DatabaseConnection> {
    Database::connect(database_url)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to connect to database: {}", e)))
}

/// Connect and bring the schema (and seeded facilities) up to date.
pub async fn connect_and_migrate(database_url: &str) -> AppResult<DatabaseConnection> {
    let db = connect(database_url).await?;
    tracing::info!("Connected to database");

    migration::Migrator::up(&db, None)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to run migrations: {}", e)))?;
    tracing::info!("Migrations complete");

    Ok(db)
}
