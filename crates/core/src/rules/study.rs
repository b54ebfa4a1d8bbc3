//! Annual study allowance.
//!
//! One flat payment per calendar year, dated on the first day of the
//! configured study month. A year qualifies when the student is enrolled on
//! that day. Two configurable overrides cover the entry year.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use super::types::{AllowanceRecord, AllowanceType, RuleId};
use super::{AllowanceRule, EvaluationWindow, RuleOutput};
use crate::config::AllowanceConfig;
use crate::period::year_month_first;
use crate::student::Student;

/// Study allowance rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct StudyRule;

impl AllowanceRule for StudyRule {
    fn allowance_type(&self) -> AllowanceType {
        AllowanceType::Study
    }

    fn evaluate(
        &self,
        student: &Student,
        config: &AllowanceConfig,
        window: &EvaluationWindow,
    ) -> RuleOutput {
        let evaluation_date = window.evaluation_date();
        let records = match window {
            EvaluationWindow::Lifetime { .. } => {
                let exit = student.exit_date(evaluation_date);
                (student.entry_date().year()..=exit.year())
                    .filter_map(|year| study_record(student, config, year, evaluation_date))
                    .collect()
            }
            EvaluationWindow::Settlement(ctx) if ctx.period.month() == config.study_month => {
                study_record(student, config, ctx.period.year(), evaluation_date)
                    .into_iter()
                    .collect()
            }
            EvaluationWindow::Settlement(_) => Vec::new(),
        };
        RuleOutput::from_records(records)
    }
}

fn study_record(
    student: &Student,
    config: &AllowanceConfig,
    year: i32,
    evaluation_date: NaiveDate,
) -> Option<AllowanceRecord> {
    let target = year_month_first(year, config.study_month)?;
    let entry = student.entry_date();
    let exit = student.exit_date(evaluation_date);
    let entry_year = year == entry.year();

    let qualifies_month = entry <= target && target <= exit;
    let entry_month_override = config.issue_study_in_entry_month
        && entry_year
        && entry.month() == config.study_month
        && entry <= exit;
    let special_case = config.issue_study_if_exit_before_study_month
        && student.is_terminal()
        && entry_year
        && exit < target;

    let rule_id = if special_case {
        RuleId::StudyEntryYearOverride
    } else if qualifies_month {
        RuleId::StudyMonthInStudy
    } else if entry_month_override {
        RuleId::StudyEntryMonth
    } else {
        return None;
    };

    let flag = |value: bool| value.to_string();
    let metadata = BTreeMap::from([
        ("year".to_string(), year.to_string()),
        ("study_month".to_string(), config.study_month.to_string()),
        ("qualifies_month".to_string(), flag(qualifies_month)),
        ("entry_month_override".to_string(), flag(entry_month_override)),
        ("special_case".to_string(), flag(special_case)),
        (
            "rounding_policy".to_string(),
            config.rounding_policy.to_string(),
        ),
    ]);

    Some(AllowanceRecord {
        student_id: student.id().clone(),
        allowance_type: AllowanceType::Study,
        period_start: target,
        period_end: target,
        amount: config.converter().to_money(config.study_annual_usd, false),
        rule_id,
        description: format!("Study allowance {year}"),
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::SettlementPeriod;
    use crate::rules::SettlementContext;
    use crate::rules::fixtures::{date, graduated, in_study, withdrawn};
    use crate::student::DegreeLevel;
    use rust_decimal_macros::dec;

    fn lifetime(student: &Student, config: &AllowanceConfig) -> Vec<AllowanceRecord> {
        StudyRule
            .evaluate(
                student,
                config,
                &EvaluationWindow::Lifetime {
                    as_of: date(2026, 12, 31),
                },
            )
            .records
    }

    fn settle(student: &Student, config: &AllowanceConfig, y: i32, m: u32) -> Vec<AllowanceRecord> {
        let ctx = SettlementContext::new(SettlementPeriod::new(y, m).unwrap());
        StudyRule
            .evaluate(student, config, &EvaluationWindow::Settlement(ctx))
            .records
    }

    #[test]
    fn test_phd_two_study_years() {
        let student = graduated(DegreeLevel::PhD, date(2023, 9, 1), date(2025, 6, 30));
        let records = lifetime(&student, &AllowanceConfig::default());
        let dates: Vec<_> = records.iter().map(|r| r.period_start).collect();
        assert_eq!(dates, vec![date(2023, 10, 1), date(2024, 10, 1)]);
        assert!(records.iter().all(|r| r.rule_id == RuleId::StudyMonthInStudy));
        assert_eq!(records[0].amount.usd(), dec!(800.00));
        assert_eq!(records[0].amount.local(), dec!(5680.00));
        assert_eq!(records[0].period_end, records[0].period_start);
        assert_eq!(records[0].metadata["year"], "2023");
        assert_eq!(records[0].metadata["qualifies_month"], "true");
    }

    #[test]
    fn test_entry_year_override_with_flag() {
        let config = AllowanceConfig {
            issue_study_if_exit_before_study_month: true,
            ..AllowanceConfig::default()
        };
        let student = withdrawn(DegreeLevel::Master, date(2024, 1, 5), date(2024, 8, 15));
        let records = lifetime(&student, &config);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].rule_id, RuleId::StudyEntryYearOverride);
        assert_eq!(records[0].period_start, date(2024, 10, 1));
        assert_eq!(records[0].metadata["special_case"], "true");

        assert!(lifetime(&student, &AllowanceConfig::default()).is_empty());
    }

    #[test]
    fn test_override_never_applies_to_enrolled_students() {
        let config = AllowanceConfig {
            issue_study_if_exit_before_study_month: true,
            ..AllowanceConfig::default()
        };
        let student = in_study(DegreeLevel::Master, date(2024, 1, 5));
        let records = StudyRule
            .evaluate(
                &student,
                &config,
                &EvaluationWindow::Lifetime {
                    as_of: date(2024, 8, 15),
                },
            )
            .records;
        assert!(records.is_empty());
    }

    #[test]
    fn test_entry_month_override() {
        let config = AllowanceConfig {
            issue_study_in_entry_month: true,
            ..AllowanceConfig::default()
        };
        let student = in_study(DegreeLevel::Bachelor, date(2024, 10, 15));
        let records = lifetime(&student, &config);
        assert_eq!(records[0].rule_id, RuleId::StudyEntryMonth);
        assert_eq!(records[0].period_start, date(2024, 10, 1));
        assert_eq!(records[1].rule_id, RuleId::StudyMonthInStudy);
        assert_eq!(records[1].period_start, date(2025, 10, 1));

        let without_flag = lifetime(&student, &AllowanceConfig::default());
        assert_eq!(without_flag.len(), 2);
        assert_eq!(without_flag[0].period_start, date(2025, 10, 1));
    }

    #[test]
    fn test_entry_on_study_month_first_is_standard() {
        let config = AllowanceConfig {
            issue_study_in_entry_month: true,
            ..AllowanceConfig::default()
        };
        let student = graduated(DegreeLevel::Bachelor, date(2024, 10, 1), date(2025, 3, 1));
        let records = lifetime(&student, &config);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].rule_id, RuleId::StudyMonthInStudy);
        assert_eq!(records[0].metadata["entry_month_override"], "true");
    }

    #[test]
    fn test_configurable_study_month() {
        let config = AllowanceConfig {
            study_month: 3,
            ..AllowanceConfig::default()
        };
        let student = graduated(DegreeLevel::PhD, date(2023, 9, 1), date(2025, 6, 30));
        let dates: Vec<_> = lifetime(&student, &config)
            .iter()
            .map(|r| r.period_start)
            .collect();
        assert_eq!(dates, vec![date(2024, 3, 1), date(2025, 3, 1)]);
    }

    #[test]
    fn test_settlement_only_in_study_month() {
        let config = AllowanceConfig::default();
        let student = in_study(DegreeLevel::PhD, date(2023, 9, 1));
        assert!(settle(&student, &config, 2024, 9).is_empty());
        let october = settle(&student, &config, 2024, 10);
        assert_eq!(october.len(), 1);
        assert_eq!(october[0].period_start, date(2024, 10, 1));
    }

    #[test]
    fn test_settlement_entry_month_override() {
        let config = AllowanceConfig {
            issue_study_in_entry_month: true,
            ..AllowanceConfig::default()
        };
        let student = in_study(DegreeLevel::PhD, date(2024, 10, 20));
        let records = settle(&student, &config, 2024, 10);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].rule_id, RuleId::StudyEntryMonth);
        assert!(settle(&student, &AllowanceConfig::default(), 2024, 10).is_empty());
    }

    #[test]
    fn test_settlement_withdrawn_before_study_month() {
        let student = withdrawn(DegreeLevel::Master, date(2024, 1, 5), date(2024, 8, 15));
        assert!(settle(&student, &AllowanceConfig::default(), 2024, 10).is_empty());
        let config = AllowanceConfig {
            issue_study_if_exit_before_study_month: true,
            ..AllowanceConfig::default()
        };
        let records = settle(&student, &config, 2024, 10);
        assert_eq!(records[0].rule_id, RuleId::StudyEntryYearOverride);
        assert!(settle(&student, &config, 2025, 10).is_empty());
    }
}
