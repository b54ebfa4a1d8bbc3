//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Roster, configuration and run ledger repositories
//! - Backup and restore
//! - Database migrations

pub mod backup;
pub mod entities;
pub mod error;
pub mod migration;
pub mod repositories;

pub use backup::{BackupManifest, BackupService, RestoreMode, RestoreSummary};
pub use error::{LedgerError, StorageError};
pub use repositories::{
    CommittedSettlement, ConfigRepository, RunLedgerRepository, SettlementRun, StoredRecord,
    StudentCounts, StudentFilter, StudentRepository,
};

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use stipend_shared::config::DatabaseConfig;

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection using the application settings.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    tracing::debug!(url = %config.url, "connecting to database");
    Database::connect(options).await
}

/// Connects and applies pending migrations.
///
/// # Errors
///
/// Returns an error if connecting or migrating fails.
pub async fn connect_and_migrate(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    use sea_orm_migration::MigratorTrait;

    let db = connect_with(config).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
