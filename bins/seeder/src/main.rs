//! Database seeder for local development and demos.
//!
//! Seeds the default allowance configuration (only if none exists) and a
//! small demo roster covering every lifecycle state. Existing students with
//! the same ids are overwritten.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::NaiveDate;
use stipend_core::student::{DegreeLevel, Lifecycle, Student, StudentId};
use stipend_db::{ConfigRepository, StudentRepository};
use stipend_shared::AppConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Demo roster: id, name, degree, entry, graduation, withdrawal.
const DEMO_ROSTER: &[(&str, &str, DegreeLevel, &str, Option<&str>, Option<&str>)] = &[
    ("D001", "Amina Rahman", DegreeLevel::Bachelor, "2024-09-01", None, None),
    ("D002", "Li Wei", DegreeLevel::Master, "2024-09-16", None, None),
    ("D003", "Omar Haddad", DegreeLevel::PhD, "2022-10-10", Some("2025-06-30"), None),
    ("D004", "Sara Okafor", DegreeLevel::Master, "2023-09-01", Some("2025-07-15"), None),
    ("D005", "Yusuf Karimi", DegreeLevel::Bachelor, "2024-01-10", None, Some("2025-03-10")),
    ("D006", "Elena Petrova", DegreeLevel::PhD, "2025-10-20", None, None),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = stipend_db::connect_and_migrate(&config.database).await?;

    let versioned = ConfigRepository::new(db.clone()).ensure_default().await?;
    tracing::info!(version = versioned.version, "allowance configuration ready");

    let roster = demo_roster()?;
    let count = StudentRepository::new(db).upsert_many(&roster).await?;
    tracing::info!(students = count, "demo roster seeded");

    Ok(())
}

fn demo_roster() -> anyhow::Result<Vec<Student>> {
    let date = |value: &str| {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").with_context(|| format!("bad date {value}"))
    };

    DEMO_ROSTER
        .iter()
        .map(|&(id, name, degree, entry, graduation, withdrawal)| {
            let lifecycle = match (graduation, withdrawal) {
                (Some(d), _) => Lifecycle::Graduated {
                    graduation_date: date(d)?,
                },
                (None, Some(d)) => Lifecycle::Withdrawn {
                    withdrawal_date: date(d)?,
                },
                (None, None) => Lifecycle::InStudy,
            };
            Ok(Student::new(
                StudentId::new(id)?,
                name,
                degree,
                date(entry)?,
                lifecycle,
            )?)
        })
        .collect()
}
