//! `stipend` command line.
//!
//! Main entry point for the monthly settlement workflow: import the roster,
//! review toggle candidates, settle the month, then export or back up.

mod commands;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use stipend_core::config::ConfigError;
use stipend_db::StorageError;
use stipend_shared::config::LoggingConfig;
use stipend_shared::{AppConfig, AppError};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use commands::Context;

#[derive(Debug, Parser)]
#[command(
    name = "stipend",
    version,
    about = "Student stipend allowance calculation and settlement"
)]
struct Cli {
    /// Emit log lines as JSON.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import students from a CSV roster.
    Import(commands::roster::ImportArgs),
    /// List and maintain students.
    #[command(subcommand)]
    Students(commands::roster::StudentsCommand),
    /// Show or change the allowance configuration.
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),
    /// List students who may receive one-time payments in a month.
    Candidates(commands::settle::CandidatesArgs),
    /// Settle a month and record the run.
    Settle(commands::settle::SettleArgs),
    /// Project lifetime allowances without recording anything.
    Project(commands::settle::ProjectArgs),
    /// Inspect recorded settlement runs.
    #[command(subcommand)]
    Runs(commands::report::RunsCommand),
    /// Export recorded allowances to CSV or XLSX.
    Export(commands::report::ExportArgs),
    /// Write a backup archive.
    Backup(commands::backup::BackupArgs),
    /// Restore a backup archive.
    Restore(commands::backup::RestoreArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error [CONFIGURATION_ERROR]: {err}");
            return ExitCode::from(5);
        }
    };
    init_tracing(&config.logging, cli.json_logs);

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let (code, exit) = classify(&err);
            tracing::debug!(code, exit, "command failed");
            eprintln!("error [{code}]: {err:#}");
            ExitCode::from(u8::try_from(exit).unwrap_or(1))
        }
    }
}

/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing(logging: &LoggingConfig, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| logging.filter.clone().into());
    let registry = tracing_subscriber::registry().with(filter);
    if json || logging.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(command: Command, config: AppConfig) -> anyhow::Result<()> {
    let ctx = Context::connect(config).await?;
    match command {
        Command::Import(args) => commands::roster::import(&ctx, args).await,
        Command::Students(cmd) => commands::roster::students(&ctx, cmd).await,
        Command::Config(cmd) => commands::config::run(&ctx, cmd).await,
        Command::Candidates(args) => commands::settle::candidates(&ctx, &args).await,
        Command::Settle(args) => commands::settle::settle(&ctx, args).await,
        Command::Project(args) => commands::settle::project(&ctx, args).await,
        Command::Runs(cmd) => commands::report::runs(&ctx, cmd).await,
        Command::Export(args) => commands::report::export(&ctx, args).await,
        Command::Backup(args) => commands::backup::backup(&ctx, args).await,
        Command::Restore(args) => commands::backup::restore(&ctx, args).await,
    }
}

/// Maps a failure to its error code and process exit code.
fn classify(err: &anyhow::Error) -> (&'static str, i32) {
    if let Some(err) = err.downcast_ref::<AppError>() {
        return (err.error_code(), err.exit_code());
    }
    if let Some(err) = err.downcast_ref::<StorageError>() {
        return (err.error_code(), err.exit_code());
    }
    if let Some(err) = err.downcast_ref::<ConfigError>() {
        return (err.error_code(), 5);
    }
    ("INTERNAL_ERROR", 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_settle_with_toggles() {
        let cli = Cli::try_parse_from([
            "stipend",
            "settle",
            "2025-07",
            "--baggage",
            "S1,S2",
            "--withdrawal-living",
            "S3",
            "--dry-run",
        ])
        .unwrap();
        let Command::Settle(args) = cli.command else {
            panic!("expected settle");
        };
        assert_eq!(args.period.to_string(), "2025-07");
        assert_eq!(args.baggage.len(), 2);
        assert_eq!(args.withdrawal_living[0].as_str(), "S3");
        assert!(args.dry_run);
    }

    #[test]
    fn test_parse_rejects_bad_period() {
        assert!(Cli::try_parse_from(["stipend", "settle", "2025-13"]).is_err());
        assert!(Cli::try_parse_from(["stipend", "candidates", "July"]).is_err());
    }

    #[test]
    fn test_parse_restore_mode() {
        let cli = Cli::try_parse_from(["stipend", "restore", "b.zip", "--mode", "merge"]).unwrap();
        let Command::Restore(args) = cli.command else {
            panic!("expected restore");
        };
        assert_eq!(args.mode, stipend_db::RestoreMode::Merge);
    }

    #[test]
    fn test_classify_errors() {
        let missing = anyhow::Error::from(StorageError::from(ConfigError::Missing));
        assert_eq!(classify(&missing), ("CONFIG_MISSING", 5));

        let conflict = anyhow::Error::from(AppError::Conflict("again".into()));
        assert_eq!(classify(&conflict), ("CONFLICT", 6));

        assert_eq!(classify(&anyhow::anyhow!("boom")), ("INTERNAL_ERROR", 1));
    }
}
