//! Student model errors.

use chrono::NaiveDate;
use thiserror::Error;

use super::types::StudentStatus;

/// Errors raised when building or transitioning a student.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StudentError {
    /// Student identifier is blank.
    #[error("student_id is required")]
    EmptyId,

    /// Student name is blank.
    #[error("name is required")]
    EmptyName,

    /// Graduation or withdrawal precedes the first entry.
    #[error("{status} date {date} is before first entry date {entry_date}")]
    TerminalBeforeEntry {
        /// Terminal status being entered.
        status: StudentStatus,
        /// Offending terminal date.
        date: NaiveDate,
        /// First entry date.
        entry_date: NaiveDate,
    },

    /// Graduated and withdrawn students cannot change status again.
    #[error("Student is already {0}; status changes are one-way")]
    AlreadyTerminal(StudentStatus),

    /// Degree level is not one of the known wire names.
    #[error("Unknown degree level: {0}")]
    UnknownDegree(String),

    /// Status is not one of the known wire names.
    #[error("Unknown status: {0}")]
    UnknownStatus(String),
}

/// Errors that reject a roster file as a whole.
///
/// Problems confined to single rows are reported as
/// [`RowError`](super::import::RowError)s instead.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The file has no header row.
    #[error("CSV has no header row")]
    NoHeaders,

    /// Required columns are absent from the header row.
    #[error("CSV is missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// The CSV stream itself could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
