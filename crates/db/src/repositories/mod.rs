//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod config;
pub mod run_ledger;
pub mod student;

pub use config::ConfigRepository;
pub use run_ledger::{CommittedSettlement, RunLedgerRepository, SettlementRun, StoredRecord};
pub use student::{StudentCounts, StudentFilter, StudentRepository};
