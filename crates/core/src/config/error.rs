//! Configuration errors.
//!
//! All of these are fatal for a calculation or settlement run.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by an unusable or absent allowance configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No configuration has been saved yet.
    #[error("No allowance configuration has been saved")]
    Missing,

    /// FX rate must be strictly positive.
    #[error("FX rate must be positive, got {0}")]
    NonPositiveFxRate(Decimal),

    /// Allowance rates cannot be negative.
    #[error("{field} must not be negative, got {value}")]
    NegativeRate {
        /// Offending field.
        field: &'static str,
        /// Offending value.
        value: Decimal,
    },

    /// Study month outside 1-12.
    #[error("Study month must be between 1 and 12, got {0}")]
    StudyMonthOutOfRange(u32),

    /// Quantum must be strictly positive.
    #[error("{field} must be positive, got {value}")]
    NonPositiveQuantum {
        /// Offending field.
        field: &'static str,
        /// Offending value.
        value: Decimal,
    },
}

impl ConfigError {
    /// Stable code for CLI output.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Missing => "CONFIG_MISSING",
            Self::NonPositiveFxRate(_) => "INVALID_FX_RATE",
            Self::NegativeRate { .. } => "NEGATIVE_RATE",
            Self::StudyMonthOutOfRange(_) => "INVALID_STUDY_MONTH",
            Self::NonPositiveQuantum { .. } => "INVALID_QUANTUM",
        }
    }
}
