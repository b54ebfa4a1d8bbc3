//! `SeaORM` entity definitions.
//!
//! Amounts and FX rates are stored as decimal strings so no precision is
//! lost in SQLite.

pub mod allowance_configs;
pub mod allowance_records;
pub mod baggage_payments;
pub mod settlement_runs;
pub mod students;
