//! Rounding setting parse errors.

use thiserror::Error;

/// A stored or command-line rounding setting is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundingParseError {
    /// Not one of the `ROUND_*` modes.
    #[error("Unknown rounding mode: {0}")]
    UnknownMode(String),

    /// Neither `final_only` nor `two_step`.
    #[error("Unknown rounding policy: {0}")]
    UnknownPolicy(String),
}
