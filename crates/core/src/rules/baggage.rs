//! One-time excess baggage allowance on graduation.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::types::{AllowanceRecord, AllowanceType, RuleId};
use super::{AllowanceRule, EvaluationWindow, RuleOutput};
use crate::config::AllowanceConfig;
use crate::period::SettlementPeriod;
use crate::settlement::SettlementWarning;
use crate::student::Student;

/// Baggage allowance rule.
///
/// Projections pay it on the graduation date. Settlement pays it only when
/// requested, never twice, and never before the graduation month.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaggageRule;

impl AllowanceRule for BaggageRule {
    fn allowance_type(&self) -> AllowanceType {
        AllowanceType::Baggage
    }

    fn evaluate(
        &self,
        student: &Student,
        config: &AllowanceConfig,
        window: &EvaluationWindow,
    ) -> RuleOutput {
        let graduation_date = student.graduation_date();
        match window {
            EvaluationWindow::Lifetime { .. } => RuleOutput::from_records(
                graduation_date
                    .map(|date| baggage_record(student, config, date, None))
                    .into_iter()
                    .collect(),
            ),
            EvaluationWindow::Settlement(ctx) if !ctx.pay_baggage => RuleOutput::default(),
            EvaluationWindow::Settlement(ctx) => {
                let student_id = student.id().clone();
                let mut output = RuleOutput::default();
                match graduation_date {
                    None => output.warnings.push(SettlementWarning::BaggageNotGraduated {
                        student_id,
                        status: student.status(),
                    }),
                    Some(_) if ctx.baggage_already_paid => output
                        .warnings
                        .push(SettlementWarning::BaggageAlreadyPaid { student_id }),
                    Some(date) if ctx.period < SettlementPeriod::from_date(date) => {
                        output
                            .warnings
                            .push(SettlementWarning::BaggageBeforeGraduationMonth {
                                student_id,
                                graduation_date: date,
                                period: ctx.period,
                            });
                    }
                    Some(date) => output
                        .records
                        .push(baggage_record(student, config, date, Some(ctx.period))),
                }
                output
            }
        }
    }
}

fn baggage_record(
    student: &Student,
    config: &AllowanceConfig,
    graduation_date: NaiveDate,
    settlement: Option<SettlementPeriod>,
) -> AllowanceRecord {
    let mut metadata = BTreeMap::from([
        ("graduation_date".to_string(), graduation_date.to_string()),
        ("baggage_toggle".to_string(), settlement.is_some().to_string()),
        (
            "rounding_policy".to_string(),
            config.rounding_policy.to_string(),
        ),
    ]);
    if let Some(period) = settlement {
        metadata.insert("settlement_month".to_string(), period.to_string());
    }

    AllowanceRecord {
        student_id: student.id().clone(),
        allowance_type: AllowanceType::Baggage,
        period_start: graduation_date,
        period_end: graduation_date,
        amount: config.converter().to_money(config.baggage_usd, false),
        rule_id: RuleId::BaggageOnGraduation,
        description: format!("Excess baggage allowance (graduated {graduation_date})"),
        metadata,
    }
}
