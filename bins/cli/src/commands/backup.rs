//! Backup and restore of the whole database.

use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use stipend_db::RestoreMode;

use super::Context;

/// Arguments of `stipend backup`.
#[derive(Debug, Args)]
pub struct BackupArgs {
    /// Archive to write; defaults to a timestamped file in the export directory.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Arguments of `stipend restore`.
#[derive(Debug, Args)]
pub struct RestoreArgs {
    /// Archive to restore.
    pub path: PathBuf,

    /// `replace` wipes existing data first; `merge` only adds new students.
    #[arg(long, default_value = "replace")]
    pub mode: RestoreMode,
}

/// Writes a backup archive.
pub async fn backup(ctx: &Context, args: BackupArgs) -> anyhow::Result<()> {
    let path = args.out.unwrap_or_else(|| {
        ctx.config.export.output_dir.join(format!(
            "stipend_backup_{}.zip",
            Utc::now().format("%Y%m%d_%H%M%S")
        ))
    });
    let manifest = ctx.backups().backup(&path).await?;
    println!(
        "wrote {} ({} students, {} configurations, {} runs, {} records)",
        path.display(),
        manifest.students,
        manifest.configs,
        manifest.runs,
        manifest.records
    );
    Ok(())
}

/// Restores a backup archive.
pub async fn restore(ctx: &Context, args: RestoreArgs) -> anyhow::Result<()> {
    let summary = ctx.backups().restore(&args.path, args.mode).await?;
    match args.mode {
        RestoreMode::Replace => println!("restored {} students", summary.added),
        RestoreMode::Merge => println!(
            "merged {} new students, skipped {} existing",
            summary.added, summary.skipped
        ),
    }
    Ok(())
}
