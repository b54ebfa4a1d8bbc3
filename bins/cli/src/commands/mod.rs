//! Command implementations.

pub mod backup;
pub mod config;
pub mod report;
pub mod roster;
pub mod settle;

use sea_orm::DatabaseConnection;
use stipend_db::{BackupService, ConfigRepository, RunLedgerRepository, StudentRepository};
use stipend_shared::AppConfig;

/// Database handle and settings shared by every command.
pub struct Context {
    db: DatabaseConnection,
    /// Application settings.
    pub config: AppConfig,
}

impl Context {
    /// Connects to the configured database, applying pending migrations.
    pub async fn connect(config: AppConfig) -> anyhow::Result<Self> {
        let db = stipend_db::connect_and_migrate(&config.database).await?;
        tracing::debug!(database = %config.database.url, "database ready");
        Ok(Self { db, config })
    }

    pub fn students(&self) -> StudentRepository {
        StudentRepository::new(self.db.clone())
    }

    pub fn configs(&self) -> ConfigRepository {
        ConfigRepository::new(self.db.clone())
    }

    pub fn ledger(&self) -> RunLedgerRepository {
        RunLedgerRepository::new(self.db.clone())
    }

    pub fn backups(&self) -> BackupService {
        BackupService::new(self.db.clone())
    }
}
