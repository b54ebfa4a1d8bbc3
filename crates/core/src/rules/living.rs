//! Monthly living allowance.
//!
//! Paid for every month from the entry month through the exit month. The
//! entry month is prorated by [`proration_fraction`]; all later months are
//! paid in full. In settlement mode a withdrawal month is paid only on
//! explicit request.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::types::{AllowanceRecord, AllowanceType, RuleId};
use super::{AllowanceRule, EvaluationWindow, RuleOutput, SettlementContext};
use crate::config::AllowanceConfig;
use crate::period::{iter_month_starts, month_end, month_start, proration_fraction};
use crate::settlement::SettlementWarning;
use crate::student::{Lifecycle, Student};

/// Living allowance rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct LivingRule;

impl AllowanceRule for LivingRule {
    fn allowance_type(&self) -> AllowanceType {
        AllowanceType::Living
    }

    fn evaluate(
        &self,
        student: &Student,
        config: &AllowanceConfig,
        window: &EvaluationWindow,
    ) -> RuleOutput {
        match window {
            EvaluationWindow::Lifetime { as_of } => RuleOutput::from_records(
                iter_month_starts(student.entry_date(), student.exit_date(*as_of))
                    .map(|month| living_record(student, config, month, false))
                    .collect(),
            ),
            EvaluationWindow::Settlement(ctx) => settle_month(student, config, ctx),
        }
    }
}

fn settle_month(student: &Student, config: &AllowanceConfig, ctx: &SettlementContext) -> RuleOutput {
    let month = ctx.period.start();
    let mut output = RuleOutput::default();

    let withdrawal_month = student.withdrawal_date().map(month_start);
    if ctx.pay_withdrawal_living && withdrawal_month != Some(month) {
        output.warnings.push(SettlementWarning::WithdrawalToggleNotApplicable {
            student_id: student.id().clone(),
            period: ctx.period,
        });
    }

    if month < month_start(student.entry_date()) {
        return output;
    }

    // Some(toggled) when the month is payable.
    let payable = match *student.lifecycle() {
        Lifecycle::InStudy => Some(false),
        Lifecycle::Graduated { graduation_date } => {
            (month <= month_start(graduation_date)).then_some(false)
        }
        Lifecycle::Withdrawn { withdrawal_date } => {
            let last_month = month_start(withdrawal_date);
            if month < last_month {
                Some(false)
            } else if month == last_month && ctx.pay_withdrawal_living {
                Some(true)
            } else {
                None
            }
        }
    };

    if let Some(toggled) = payable {
        output.records.push(living_record(student, config, month, toggled));
    }
    output
}

fn living_record(
    student: &Student,
    config: &AllowanceConfig,
    month: NaiveDate,
    withdrawal_toggle: bool,
) -> AllowanceRecord {
    let monthly = config.living.monthly_usd(student.degree());
    let entry_date = student.entry_date();
    let prorated = month == month_start(entry_date);
    let label = month.format("%Y-%m");

    let mut metadata = BTreeMap::new();
    metadata.insert("monthly_usd".to_string(), monthly.to_string());
    metadata.insert(
        "rounding_policy".to_string(),
        config.rounding_policy.to_string(),
    );
    if withdrawal_toggle {
        metadata.insert("withdrawal_toggle".to_string(), "true".to_string());
    }

    let (amount_usd, round_early, mut description) = if prorated {
        let fraction = proration_fraction(entry_date);
        metadata.insert("fraction".to_string(), fraction.to_string());
        metadata.insert("entry_date".to_string(), entry_date.to_string());
        (
            monthly * fraction,
            config.rounds_prorated_early(),
            format!("Living allowance {label} (prorated from {entry_date})"),
        )
    } else {
        (monthly, false, format!("Living allowance {label}"))
    };
    if withdrawal_toggle {
        description.push_str(", withdrawal month");
    }

    let rule_id = match (withdrawal_toggle, prorated) {
        (false, true) => RuleId::LivingEntryProrate,
        (false, false) => RuleId::LivingFullMonth,
        (true, false) => RuleId::LivingWithdrawalToggle,
        (true, true) => RuleId::LivingWithdrawalToggleProrate,
    };

    AllowanceRecord {
        student_id: student.id().clone(),
        allowance_type: AllowanceType::Living,
        period_start: month,
        period_end: month_end(month),
        amount: config.converter().to_money(amount_usd, round_early),
        rule_id,
        description,
        metadata,
    }
}
