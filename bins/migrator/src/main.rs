//! Database migration runner for the stipend engine.
//!
//! Usage:
//!   migrator up      - Run all pending migrations
//!   migrator down    - Rollback last migration
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop all tables and re-run migrations
//!
//! The database is taken from `STIPEND__DATABASE__URL` or the config files.

use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use stipend_db::migration::Migrator;
use stipend_shared::AppConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "migrator", about = "Apply or roll back stipend database migrations")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// Run all pending migrations.
    Up,
    /// Roll back the last applied migration.
    Down,
    /// Show which migrations are applied.
    Status,
    /// Drop all tables and re-run every migration.
    Fresh,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},sea_orm_migration=info", config.logging.filter).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let db = stipend_db::connect_with(&config.database).await?;

    match cli.command.unwrap_or(Command::Up) {
        Command::Up => Migrator::up(&db, None).await?,
        Command::Down => Migrator::down(&db, Some(1)).await?,
        Command::Status => Migrator::status(&db).await?,
        Command::Fresh => Migrator::fresh(&db).await?,
    }

    tracing::info!(database = %config.database.url, "migrations finished");
    Ok(())
}
