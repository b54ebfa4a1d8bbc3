//! Run history and exports of recorded allowances.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Subcommand};
use stipend_core::export::Table;
use stipend_core::reports::ReportService;
use stipend_core::rules::{AllowanceRecord, AllowanceTotals};
use stipend_core::student::StudentId;
use stipend_db::StoredRecord;
use stipend_shared::AppError;
use stipend_shared::types::RunId;

use super::Context;
use crate::output::{self, ExportFormat};

/// `stipend runs ...`
#[derive(Debug, Subcommand)]
pub enum RunsCommand {
    /// List runs, newest first.
    List,
    /// Show one run with its records and totals.
    Show {
        /// Run id.
        run_id: RunId,
    },
}

/// Arguments of `stipend export`. Exactly one selection is required.
#[derive(Debug, Args)]
#[command(group(ArgGroup::new("selection").required(true).args(["run", "student", "year"])))]
pub struct ExportArgs {
    /// Records of one run.
    #[arg(long)]
    pub run: Option<RunId>,

    /// Every record of one student.
    #[arg(long)]
    pub student: Option<StudentId>,

    /// Records whose period starts in this year.
    #[arg(long)]
    pub year: Option<i32>,

    /// Output format; inferred from `--out` when omitted.
    #[arg(long, value_enum)]
    pub format: Option<ExportFormat>,

    /// Output file; defaults to a file named after the selection in the
    /// configured export directory.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Runs a `stipend runs` subcommand.
pub async fn runs(ctx: &Context, command: RunsCommand) -> anyhow::Result<()> {
    let ledger = ctx.ledger();
    match command {
        RunsCommand::List => {
            let mut table = Table::new(
                "Runs",
                ["run_id", "created_at", "period", "config", "fx_rate", "currency"],
            );
            for run in ledger.list_runs().await? {
                table.push_row([
                    run.id.to_string(),
                    run.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    run.period.to_string(),
                    run.config_version.to_string(),
                    run.fx_rate.to_string(),
                    run.currency.to_string(),
                ]);
            }
            output::print_table(&table);
        }
        RunsCommand::Show { run_id } => {
            let run = ledger
                .get_run(run_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("run {run_id}")))?;
            let records = into_records(ledger.fetch_records_for_run(run_id).await?);
            let report = ReportService::build(&ctx.students().all().await?, &records);

            println!(
                "run {} | period {} | config v{} | fx {} {}",
                run.id, run.period, run.config_version, run.fx_rate, run.currency
            );
            if let Some(table) = ReportService::to_tables(&report).into_iter().next() {
                output::print_table(&table);
            }
            output::print_totals(
                &AllowanceTotals::from_records(&records),
                run.currency.code(),
            );
        }
    }
    Ok(())
}

/// Exports recorded allowances for a run, a student or a year.
pub async fn export(ctx: &Context, args: ExportArgs) -> anyhow::Result<()> {
    let ledger = ctx.ledger();
    let (label, stored) = if let Some(run_id) = args.run {
        if ledger.get_run(run_id).await?.is_none() {
            return Err(AppError::NotFound(format!("run {run_id}")).into());
        }
        (format!("run_{run_id}"), ledger.fetch_records_for_run(run_id).await?)
    } else if let Some(student_id) = &args.student {
        (
            format!("student_{student_id}"),
            ledger.fetch_records_for_student(student_id).await?,
        )
    } else if let Some(year) = args.year {
        (format!("year_{year}"), ledger.fetch_records_for_year(year).await?)
    } else {
        return Err(AppError::Validation("choose --run, --student or --year".into()).into());
    };

    let format = args
        .format
        .or_else(|| args.out.as_deref().and_then(ExportFormat::from_path))
        .unwrap_or_default();
    let path = args.out.unwrap_or_else(|| {
        ctx.config
            .export
            .output_dir
            .join(format!("allowances_{label}.{}", format.extension()))
    });
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let records = into_records(stored);
    let report = ReportService::build(&ctx.students().all().await?, &records);
    let written = output::export_report(&path, format, &report)?;
    tracing::info!(selection = %label, records = records.len(), "export written");
    for file in written {
        println!("wrote {}", file.display());
    }
    Ok(())
}

fn into_records(stored: Vec<StoredRecord>) -> Vec<AllowanceRecord> {
    stored.into_iter().map(|s| s.record).collect()
}
