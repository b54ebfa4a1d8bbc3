//! Property-based tests for the settlement engine.
//!
//! - Same inputs always produce identical records
//! - Totals always equal the sum of the records
//! - A settlement month never holds more than one living record per student

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::engine::SettlementEngine;
use super::types::SettlementToggles;
use crate::config::AllowanceConfig;
use crate::period::SettlementPeriod;
use crate::rules::AllowanceType;
use crate::rules::fixtures::student;
use crate::student::{DegreeLevel, Lifecycle, Student};

fn any_degree() -> impl Strategy<Value = DegreeLevel> {
    prop::sample::select(DegreeLevel::ALL.to_vec())
}

/// Strategy to generate a student with an entry in 2022-2024 and an
/// optional terminal date up to three years later.
fn any_student(index: usize) -> impl Strategy<Value = Student> {
    (
        any_degree(),
        0i64..1096,
        0u8..3,
        0i64..1096,
    )
        .prop_map(move |(degree, entry_offset, kind, length)| {
            let base = chrono::NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
            let entry = base + chrono::Duration::days(entry_offset);
            let terminal = entry + chrono::Duration::days(length);
            let lifecycle = match kind {
                0 => Lifecycle::InStudy,
                1 => Lifecycle::Graduated {
                    graduation_date: terminal,
                },
                _ => Lifecycle::Withdrawn {
                    withdrawal_date: terminal,
                },
            };
            student(&format!("S{index}"), degree, entry, lifecycle)
        })
}

fn any_roster() -> impl Strategy<Value = Vec<Student>> {
    (1usize..8).prop_flat_map(|n| (0..n).map(any_student).collect::<Vec<_>>())
}

fn any_period() -> impl Strategy<Value = SettlementPeriod> {
    (2022i32..2028, 1u32..=12).prop_map(|(y, m)| SettlementPeriod::new(y, m).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_settlement_is_idempotent(roster in any_roster(), period in any_period()) {
        let config = AllowanceConfig::default();
        let toggles = SettlementToggles {
            baggage: roster.iter().map(|s| s.id().clone()).collect(),
            withdrawal_living: roster.iter().map(|s| s.id().clone()).collect(),
        };
        let first = SettlementEngine::run(&roster, period, &config, &toggles, |_| false).unwrap();
        let second = SettlementEngine::run(&roster, period, &config, &toggles, |_| false).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_totals_match_records(roster in any_roster(), period in any_period()) {
        let result = SettlementEngine::run(
            &roster,
            period,
            &AllowanceConfig::default(),
            &SettlementToggles::default(),
            |_| false,
        )
        .unwrap();
        let local: Decimal = result.records.iter().map(|r| r.amount.local()).sum();
        prop_assert_eq!(result.totals.total.local, local);
        prop_assert_eq!(result.totals.total.count, result.records.len());
    }

    #[test]
    fn prop_one_living_record_per_student(roster in any_roster(), period in any_period()) {
        let result = SettlementEngine::run(
            &roster,
            period,
            &AllowanceConfig::default(),
            &SettlementToggles::default(),
            |_| false,
        )
        .unwrap();
        for student in &roster {
            let living = result
                .records
                .iter()
                .filter(|r| r.student_id == *student.id() && r.allowance_type == AllowanceType::Living)
                .count();
            prop_assert!(living <= 1);
        }
    }
}
