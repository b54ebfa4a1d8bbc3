//! Shared setup for the database integration tests.

#![allow(dead_code)]

use std::collections::BTreeSet;

use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use stipend_core::config::VersionedConfig;
use stipend_core::period::SettlementPeriod;
use stipend_core::settlement::{SettlementEngine, SettlementResult, SettlementToggles};
use stipend_core::student::{DegreeLevel, Lifecycle, Student, StudentId};
use stipend_shared::config::DatabaseConfig;
use tempfile::TempDir;

/// A migrated SQLite database in a temporary directory.
///
/// The directory is removed when the value is dropped.
pub struct TestDb {
    pub db: DatabaseConnection,
    _dir: TempDir,
}

pub async fn setup() -> TestDb {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("stipend-test.db").display()
    );
    let config = DatabaseConfig {
        url,
        max_connections: 1,
        min_connections: 1,
    };
    let db = stipend_db::connect_and_migrate(&config)
        .await
        .expect("Failed to set up database");
    TestDb { db, _dir: dir }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn id(value: &str) -> StudentId {
    StudentId::new(value).unwrap()
}

pub fn student(value: &str, degree: DegreeLevel, entry: NaiveDate, lifecycle: Lifecycle) -> Student {
    Student::new(id(value), format!("Student {value}"), degree, entry, lifecycle).unwrap()
}

/// S1 enrolled Bachelor, S2 PhD graduated 2025-06-30, S3 Master withdrawn 2025-03-10.
pub fn roster() -> Vec<Student> {
    vec![
        student("S1", DegreeLevel::Bachelor, date(2024, 9, 1), Lifecycle::InStudy),
        student(
            "S2",
            DegreeLevel::PhD,
            date(2023, 9, 1),
            Lifecycle::Graduated {
                graduation_date: date(2025, 6, 30),
            },
        ),
        student(
            "S3",
            DegreeLevel::Master,
            date(2024, 9, 16),
            Lifecycle::Withdrawn {
                withdrawal_date: date(2025, 3, 10),
            },
        ),
    ]
}

pub fn period(value: &str) -> SettlementPeriod {
    value.parse().unwrap()
}

/// Settles `period` with baggage requested for `baggage`, treating `paid` as already paid.
pub fn settle(
    config: &VersionedConfig,
    period: SettlementPeriod,
    baggage: &[&str],
    paid: &BTreeSet<StudentId>,
) -> SettlementResult {
    let toggles = SettlementToggles {
        baggage: baggage.iter().map(|s| id(s)).collect(),
        ..SettlementToggles::default()
    };
    SettlementEngine::run(&roster(), period, &config.config, &toggles, |sid| {
        paid.contains(sid)
    })
    .unwrap()
}
