//! Roster commands: CSV import and student maintenance.

use std::fs::File;
use std::path::PathBuf;

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use stipend_core::export::Table;
use stipend_core::student::{DegreeLevel, StudentId, StudentStatus, import_roster};
use stipend_db::StudentFilter;
use stipend_shared::AppError;

use super::Context;
use crate::output;

/// Arguments of `stipend import`.
#[derive(Debug, Args)]
pub struct ImportArgs {
    /// CSV file with the roster columns.
    pub path: PathBuf,

    /// Validate only; write nothing.
    #[arg(long)]
    pub dry_run: bool,
}

/// `stipend students ...`
#[derive(Debug, Subcommand)]
pub enum StudentsCommand {
    /// List students.
    List {
        /// Substring of the id or name.
        #[arg(long, short)]
        query: Option<String>,
        /// Only this status (In-study, Graduated, Withdrawn).
        #[arg(long)]
        status: Option<StudentStatus>,
        /// Only this degree level.
        #[arg(long)]
        degree: Option<DegreeLevel>,
    },
    /// Record a graduation.
    Graduate {
        /// Student id.
        id: StudentId,
        /// Graduation date (YYYY-MM-DD).
        date: NaiveDate,
    },
    /// Record a withdrawal.
    Withdraw {
        /// Student id.
        id: StudentId,
        /// Withdrawal date (YYYY-MM-DD).
        date: NaiveDate,
    },
    /// Delete a student. Recorded allowances are kept.
    Delete {
        /// Student id.
        id: StudentId,
    },
}

/// Imports a CSV roster. Valid rows are written even when others fail.
pub async fn import(ctx: &Context, args: ImportArgs) -> anyhow::Result<()> {
    let file = File::open(&args.path)
        .with_context(|| format!("cannot open {}", args.path.display()))?;
    let result = import_roster(file).map_err(|e| AppError::Validation(e.to_string()))?;

    for (row, hint) in &result.hints {
        println!("hint: row {row}: {hint}");
    }
    for error in &result.errors {
        println!("error: {error}");
    }

    if args.dry_run {
        println!(
            "{} valid, {} rejected (dry run, nothing written)",
            result.students.len(),
            result.errors.len()
        );
        return Ok(());
    }

    let written = ctx.students().upsert_many(&result.students).await?;
    println!(
        "{written} students imported, {} rows rejected",
        result.errors.len()
    );
    Ok(())
}

/// Runs a `stipend students` subcommand.
pub async fn students(ctx: &Context, command: StudentsCommand) -> anyhow::Result<()> {
    let repo = ctx.students();
    match command {
        StudentsCommand::List {
            query,
            status,
            degree,
        } => {
            let students = repo
                .list(&StudentFilter {
                    query,
                    status,
                    degree,
                })
                .await?;

            let mut table = Table::new(
                "Students",
                ["id", "name", "degree", "entry", "status", "exit"],
            );
            for s in &students {
                table.push_row([
                    s.id().to_string(),
                    s.name().to_string(),
                    s.degree().to_string(),
                    s.entry_date().to_string(),
                    s.status().to_string(),
                    s.lifecycle()
                        .terminal_date()
                        .map(|d| d.to_string())
                        .unwrap_or_default(),
                ]);
            }
            output::print_table(&table);

            let counts = repo.counts().await?;
            println!(
                "{} shown; {} total ({} in study, {} graduated, {} withdrawn)",
                students.len(),
                counts.total,
                counts.in_study,
                counts.graduated,
                counts.withdrawn
            );
        }
        StudentsCommand::Graduate { id, date } => {
            let student = find(ctx, &id)
                .await?
                .graduate(date)
                .map_err(|e| AppError::Validation(e.to_string()))?;
            repo.upsert(&student).await?;
            println!("{id} graduated on {date}");
        }
        StudentsCommand::Withdraw { id, date } => {
            let student = find(ctx, &id)
                .await?
                .withdraw(date)
                .map_err(|e| AppError::Validation(e.to_string()))?;
            repo.upsert(&student).await?;
            println!("{id} withdrawn on {date}");
        }
        StudentsCommand::Delete { id } => {
            if !repo.delete(&id).await? {
                return Err(AppError::NotFound(format!("student {id}")).into());
            }
            println!("{id} deleted");
        }
    }
    Ok(())
}

pub(crate) async fn find(
    ctx: &Context,
    id: &StudentId,
) -> anyhow::Result<stipend_core::student::Student> {
    ctx.students()
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("student {id}")).into())
}
