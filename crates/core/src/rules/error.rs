//! Errors raised when stored rule output is read back.

use thiserror::Error;

/// A stored record names an allowance type or rule this build does not know.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// Unrecognized allowance type.
    #[error("Unknown allowance type: {0}")]
    UnknownAllowanceType(String),

    /// Unrecognized rule id.
    #[error("Unknown rule id: {0}")]
    UnknownRuleId(String),
}
