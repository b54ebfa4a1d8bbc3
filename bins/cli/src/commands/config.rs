//! Allowance configuration commands.

use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use stipend_core::config::AllowanceConfig;
use stipend_core::export::Table;
use stipend_core::money::{RoundingMode, RoundingPolicy};
use stipend_shared::AppError;
use stipend_shared::types::Currency;

use super::Context;
use crate::output;

/// `stipend config ...`
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the latest configuration, or a given version.
    Show {
        /// Version to show.
        #[arg(long)]
        version: Option<i32>,
    },
    /// List every version.
    History,
    /// Save a new version: the latest one with the given changes.
    Set(ConfigChanges),
    /// Seed the default configuration if none exists.
    Init,
}

/// Fields to change; anything omitted keeps its current value.
#[derive(Debug, Default, Args)]
pub struct ConfigChanges {
    /// Monthly living rate for Bachelor students, USD.
    #[arg(long)]
    pub bachelor: Option<Decimal>,
    /// Monthly living rate for Master students, USD.
    #[arg(long)]
    pub master: Option<Decimal>,
    /// Monthly living rate for PhD students, USD.
    #[arg(long)]
    pub phd: Option<Decimal>,
    /// Annual study allowance, USD.
    #[arg(long)]
    pub study: Option<Decimal>,
    /// Excess baggage allowance, USD.
    #[arg(long)]
    pub baggage: Option<Decimal>,
    /// USD to local exchange rate.
    #[arg(long)]
    pub fx_rate: Option<Decimal>,
    /// Local currency code.
    #[arg(long)]
    pub currency: Option<Currency>,
    /// `final_only` or `two_step`.
    #[arg(long)]
    pub rounding_policy: Option<RoundingPolicy>,
    /// Rounding mode, e.g. `ROUND_HALF_UP`.
    #[arg(long)]
    pub rounding_mode: Option<RoundingMode>,
    /// USD rounding granularity, e.g. `0.01`.
    #[arg(long)]
    pub usd_quantum: Option<Decimal>,
    /// Local rounding granularity, e.g. `0.01` or `1`.
    #[arg(long)]
    pub local_quantum: Option<Decimal>,
    /// Month (1-12) in which the study allowance is paid.
    #[arg(long)]
    pub study_month: Option<u32>,
    /// Pay the entry year's study allowance when leaving before the study month.
    #[arg(long)]
    pub study_if_exit_before_study_month: Option<bool>,
    /// Pay the study allowance to students entering during the study month.
    #[arg(long)]
    pub study_in_entry_month: Option<bool>,
    /// Pre-select withdrawal-month living pay in the candidate list.
    #[arg(long)]
    pub withdrawal_living_default: Option<bool>,
}

impl ConfigChanges {
    /// Applies the changes on top of `config`.
    pub fn apply(self, config: AllowanceConfig) -> AllowanceConfig {
        let mut next = config;
        if let Some(v) = self.bachelor {
            next.living.bachelor = v;
        }
        if let Some(v) = self.master {
            next.living.master = v;
        }
        if let Some(v) = self.phd {
            next.living.phd = v;
        }
        next.study_annual_usd = self.study.unwrap_or(next.study_annual_usd);
        next.baggage_usd = self.baggage.unwrap_or(next.baggage_usd);
        next.fx_rate = self.fx_rate.unwrap_or(next.fx_rate);
        next.local_currency = self.currency.unwrap_or(next.local_currency);
        next.rounding_policy = self.rounding_policy.unwrap_or(next.rounding_policy);
        next.rounding_mode = self.rounding_mode.unwrap_or(next.rounding_mode);
        next.usd_quantum = self.usd_quantum.unwrap_or(next.usd_quantum);
        next.local_quantum = self.local_quantum.unwrap_or(next.local_quantum);
        next.study_month = self.study_month.unwrap_or(next.study_month);
        next.issue_study_if_exit_before_study_month = self
            .study_if_exit_before_study_month
            .unwrap_or(next.issue_study_if_exit_before_study_month);
        next.issue_study_in_entry_month = self
            .study_in_entry_month
            .unwrap_or(next.issue_study_in_entry_month);
        next.withdrawal_living_default = self
            .withdrawal_living_default
            .unwrap_or(next.withdrawal_living_default);
        next
    }
}

/// Runs a `stipend config` subcommand.
pub async fn run(ctx: &Context, command: ConfigCommand) -> anyhow::Result<()> {
    let repo = ctx.configs();
    match command {
        ConfigCommand::Show { version } => {
            let versioned = match version {
                Some(v) => repo
                    .by_version(v)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("config version {v}")))?,
                None => repo.latest().await?,
            };
            println!("{}", serde_json::to_string_pretty(&versioned)?);
        }
        ConfigCommand::History => {
            let mut table = Table::new(
                "Configurations",
                ["version", "created_at", "fx_rate", "currency", "policy", "mode"],
            );
            for v in repo.history().await? {
                table.push_row([
                    v.version.to_string(),
                    v.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    v.config.fx_rate.to_string(),
                    v.config.local_currency.to_string(),
                    v.config.rounding_policy.to_string(),
                    v.config.rounding_mode.to_string(),
                ]);
            }
            output::print_table(&table);
        }
        ConfigCommand::Set(changes) => {
            let current = repo.latest().await?.config;
            let saved = repo.save(&changes.apply(current)).await?;
            println!("saved configuration version {}", saved.version);
        }
        ConfigCommand::Init => {
            let versioned = repo.ensure_default().await?;
            println!("configuration version {} in force", versioned.version);
        }
    }
    Ok(())
}
