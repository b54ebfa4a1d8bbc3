//! Stipend schema migration.
//!
//! Creates the roster, configuration versions, settlement runs, allowance
//! records and the baggage payment ledger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ROSTER AND CONFIGURATION
        // ============================================================
        db.execute_unprepared(STUDENTS_SQL).await?;
        db.execute_unprepared(STUDENTS_STATUS_INDEX_SQL).await?;
        db.execute_unprepared(ALLOWANCE_CONFIGS_SQL).await?;

        // ============================================================
        // PART 2: RUN LEDGER
        // ============================================================
        db.execute_unprepared(SETTLEMENT_RUNS_SQL).await?;
        db.execute_unprepared(SETTLEMENT_RUNS_PERIOD_INDEX_SQL).await?;
        db.execute_unprepared(ALLOWANCE_RECORDS_SQL).await?;
        db.execute_unprepared(ALLOWANCE_RECORDS_RUN_INDEX_SQL).await?;
        db.execute_unprepared(ALLOWANCE_RECORDS_STUDENT_INDEX_SQL).await?;
        db.execute_unprepared(BAGGAGE_PAYMENTS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for table in [
            "baggage_payments",
            "allowance_records",
            "settlement_runs",
            "allowance_configs",
            "students",
        ] {
            db.execute_unprepared(&format!("DROP TABLE IF EXISTS {table};"))
                .await?;
        }
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const STUDENTS_SQL: &str = r"
CREATE TABLE students (
    student_id TEXT PRIMARY KEY NOT NULL CHECK (length(trim(student_id)) > 0),
    name TEXT NOT NULL,
    degree_level TEXT NOT NULL CHECK (degree_level IN ('Bachelor', 'Master', 'PhD')),
    first_entry_date TEXT NOT NULL,
    graduation_date TEXT,
    withdrawal_date TEXT,
    status TEXT NOT NULL CHECK (status IN ('In-study', 'Graduated', 'Withdrawn')),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

const STUDENTS_STATUS_INDEX_SQL: &str =
    "CREATE INDEX idx_students_status ON students(status, student_id);";

const ALLOWANCE_CONFIGS_SQL: &str = r"
CREATE TABLE allowance_configs (
    version INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL,
    config_json TEXT NOT NULL
);
";

const SETTLEMENT_RUNS_SQL: &str = r"
CREATE TABLE settlement_runs (
    id BLOB PRIMARY KEY NOT NULL,
    created_at TEXT NOT NULL,
    config_version INTEGER NOT NULL REFERENCES allowance_configs(version),
    period TEXT NOT NULL,
    fx_rate TEXT NOT NULL,
    currency TEXT NOT NULL
);
";

const SETTLEMENT_RUNS_PERIOD_INDEX_SQL: &str =
    "CREATE INDEX idx_settlement_runs_period ON settlement_runs(period, created_at);";

const ALLOWANCE_RECORDS_SQL: &str = r"
CREATE TABLE allowance_records (
    id BLOB PRIMARY KEY NOT NULL,
    run_id BLOB NOT NULL REFERENCES settlement_runs(id) ON DELETE CASCADE,
    student_id TEXT NOT NULL,
    allowance_type TEXT NOT NULL CHECK (allowance_type IN ('Living', 'Study', 'ExcessBaggage')),
    period_start TEXT NOT NULL,
    period_end TEXT NOT NULL,
    amount_usd TEXT NOT NULL,
    amount_local TEXT NOT NULL,
    fx_rate TEXT NOT NULL,
    currency TEXT NOT NULL,
    rule_id TEXT NOT NULL,
    description TEXT NOT NULL,
    metadata_json TEXT NOT NULL,
    created_at TEXT NOT NULL,
    CHECK (period_end >= period_start)
);
";

const ALLOWANCE_RECORDS_RUN_INDEX_SQL: &str =
    "CREATE INDEX idx_allowance_records_run ON allowance_records(run_id);";

const ALLOWANCE_RECORDS_STUDENT_INDEX_SQL: &str = r"
CREATE INDEX idx_allowance_records_student
    ON allowance_records(student_id, allowance_type, period_start);
";

// One baggage payment per student, ever.
const BAGGAGE_PAYMENTS_SQL: &str = r"
CREATE TABLE baggage_payments (
    student_id TEXT PRIMARY KEY NOT NULL,
    run_id BLOB NOT NULL REFERENCES settlement_runs(id),
    period TEXT NOT NULL,
    paid_at TEXT NOT NULL
);
";
