//! Monthly settlement, toggle candidates and lifetime projection.

use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::Args;
use stipend_core::calculation::{calculate_roster, calculate_student_allowances};
use stipend_core::export::Table;
use stipend_core::period::SettlementPeriod;
use stipend_core::reports::ReportService;
use stipend_core::rules::{AllowanceRecord, AllowanceTotals, AllowanceType};
use stipend_core::settlement::{SettlementEngine, SettlementToggles};
use stipend_core::student::{Student, StudentId};
use stipend_shared::AppError;

use super::Context;
use super::roster::find;
use crate::output::{self, ExportFormat};

/// Arguments of `stipend candidates`.
#[derive(Debug, Args)]
pub struct CandidatesArgs {
    /// Month to settle (YYYY-MM).
    pub period: SettlementPeriod,
}

/// Arguments of `stipend settle`.
#[derive(Debug, Args)]
pub struct SettleArgs {
    /// Month to settle (YYYY-MM).
    pub period: SettlementPeriod,

    /// Pay the excess baggage allowance to these students.
    #[arg(long, value_delimiter = ',')]
    pub baggage: Vec<StudentId>,

    /// Pay withdrawal-month living allowance to these students.
    #[arg(long, value_delimiter = ',')]
    pub withdrawal_living: Vec<StudentId>,

    /// Start from the pre-selected toggles of the candidate list.
    #[arg(long)]
    pub default_toggles: bool,

    /// Compute and print only; record nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Settle even if the month already has a recorded run.
    #[arg(long)]
    pub force: bool,

    /// Also export the run's records (.csv or .xlsx).
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Arguments of `stipend project`.
#[derive(Debug, Args)]
pub struct ProjectArgs {
    /// Student to project; every student when omitted.
    pub student: Option<StudentId>,

    /// Evaluation date for students still enrolled (default: today).
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Also export the projected records (.csv or .xlsx).
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Lists baggage and withdrawal candidates for a month.
pub async fn candidates(ctx: &Context, args: &CandidatesArgs) -> anyhow::Result<()> {
    let config = ctx.configs().latest().await?.config;
    let roster = ctx.students().all().await?;
    let paid = ctx.ledger().baggage_paid_students().await?;

    let candidates =
        SettlementEngine::candidates(&roster, args.period, &config, |id| paid.contains(id));

    let mut baggage = Table::new(
        "Baggage candidates",
        ["id", "name", "graduation_date", "payable"],
    );
    for c in &candidates.baggage {
        baggage.push_row([
            c.student_id.to_string(),
            c.name.clone(),
            c.graduation_date.to_string(),
            yes_no(c.payable_this_period).to_string(),
        ]);
    }
    println!("Excess baggage (unpaid graduates):");
    output::print_table(&baggage);

    let mut withdrawal = Table::new(
        "Withdrawal candidates",
        ["id", "name", "withdrawal_date", "selected"],
    );
    for c in &candidates.withdrawal {
        withdrawal.push_row([
            c.student_id.to_string(),
            c.name.clone(),
            c.withdrawal_date.to_string(),
            yes_no(c.selected).to_string(),
        ]);
    }
    println!();
    println!("Withdrawal-month living ({}):", args.period);
    output::print_table(&withdrawal);
    Ok(())
}

/// Settles a month and commits the run.
pub async fn settle(ctx: &Context, args: SettleArgs) -> anyhow::Result<()> {
    let versioned = ctx.configs().latest().await?;
    let roster = ctx.students().all().await?;
    let ledger = ctx.ledger();
    let period = args.period;

    if !args.force
        && !args.dry_run
        && let Some(run) = ledger.latest_run_for_period(period).await?
    {
        return Err(AppError::Conflict(format!(
            "{period} was already settled by run {}; pass --force to settle it again",
            run.id
        ))
        .into());
    }

    let paid = ledger.baggage_paid_students().await?;
    let mut toggles = if args.default_toggles {
        SettlementEngine::candidates(&roster, period, &versioned.config, |id| {
            paid.contains(id)
        })
        .default_toggles()
    } else {
        SettlementToggles::default()
    };
    toggles.baggage.extend(args.baggage);
    toggles.withdrawal_living.extend(args.withdrawal_living);

    let result = SettlementEngine::run(&roster, period, &versioned.config, &toggles, |id| {
        paid.contains(id)
    })?;
    let currency = versioned.config.local_currency.code();

    if args.dry_run {
        print_records(&roster, &result.records);
        output::print_totals(&result.totals, currency);
        output::print_warnings(&result.warnings);
        println!("dry run: nothing recorded");
        return Ok(());
    }

    let committed = ledger.commit_settlement(&versioned, &result).await?;
    print_records(&roster, &committed.records);
    output::print_totals(&committed.totals, currency);
    output::print_warnings(&committed.warnings);
    println!(
        "run {} recorded for {period} with configuration version {}",
        committed.run.id, versioned.version
    );

    if let Some(path) = args.export {
        export_records(&path, &roster, &committed.records)?;
    }
    Ok(())
}

/// Projects lifetime allowances for one student or the whole roster.
pub async fn project(ctx: &Context, args: ProjectArgs) -> anyhow::Result<()> {
    let config = ctx.configs().latest().await?.config;
    let as_of = args.as_of.unwrap_or_else(|| Utc::now().date_naive());

    let roster = match &args.student {
        Some(id) => vec![find(ctx, id).await?],
        None => ctx.students().all().await?,
    };
    let results = match roster.as_slice() {
        [student] => vec![calculate_student_allowances(student, &config, as_of)?],
        _ => calculate_roster(&roster, &config, as_of)?,
    };

    let records: Vec<AllowanceRecord> = results
        .iter()
        .flat_map(|r| r.records.iter().cloned())
        .collect();

    let mut table = Table::new(
        "Projection",
        [
            "id".to_string(),
            "living_usd".to_string(),
            "study_usd".to_string(),
            "baggage_usd".to_string(),
            "total_usd".to_string(),
            format!("total_{}", config.local_currency.code().to_lowercase()),
        ],
    );
    for result in &results {
        let t = &result.totals;
        table.push_row([
            result.student_id.to_string(),
            t.for_type(AllowanceType::Living).usd.to_string(),
            t.for_type(AllowanceType::Study).usd.to_string(),
            t.for_type(AllowanceType::Baggage).usd.to_string(),
            t.total.usd.to_string(),
            t.total.local.to_string(),
        ]);
    }
    println!("Projection as of {as_of}:");
    output::print_table(&table);
    output::print_totals(
        &AllowanceTotals::from_records(&records),
        config.local_currency.code(),
    );

    if let Some(path) = args.export {
        export_records(&path, &roster, &records)?;
    }
    Ok(())
}

fn print_records(roster: &[Student], records: &[AllowanceRecord]) {
    let report = ReportService::build(roster, records);
    let mut table = Table::new(
        "Records",
        ["id", "name", "type", "period", "usd", "local", "rule"],
    );
    for row in &report.records {
        table.push_row([
            row.student_id.to_string(),
            row.student_name.clone(),
            row.allowance_type.to_string(),
            row.period.clone(),
            row.amount_usd.to_string(),
            row.amount_local.to_string(),
            row.rule_id.to_string(),
        ]);
    }
    output::print_table(&table);
}

fn export_records(
    path: &std::path::Path,
    roster: &[Student],
    records: &[AllowanceRecord],
) -> anyhow::Result<()> {
    let format = ExportFormat::from_path(path).unwrap_or_default();
    let report = ReportService::build(roster, records);
    for file in output::export_report(path, format, &report)? {
        println!("wrote {}", file.display());
    }
    Ok(())
}

const fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
