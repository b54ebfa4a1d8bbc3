//! Parse errors of the shared types.

use thiserror::Error;

/// A shared type could not be parsed from text.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Text is not a UUID.
    #[error("Invalid {kind} '{input}': {source}")]
    InvalidId {
        /// Kind of id, such as `run id`.
        kind: &'static str,
        /// Rejected text.
        input: String,
        /// Why the UUID parser refused it.
        #[source]
        source: uuid::Error,
    },

    /// Not one of the supported currency codes.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
}
