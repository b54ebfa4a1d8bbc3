//! Settlement period errors.

use thiserror::Error;

/// Errors raised while building a settlement period.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    /// Input is not of the form `YYYY-MM`.
    #[error("Invalid settlement period '{0}', expected YYYY-MM")]
    Malformed(String),

    /// Month outside 1-12.
    #[error("Month {0} is out of range 1-12")]
    MonthOutOfRange(u32),

    /// Year outside the supported calendar.
    #[error("Year {0} is out of range")]
    YearOutOfRange(i32),
}
