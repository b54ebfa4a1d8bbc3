//! Monthly settlement across a roster.
//!
//! The engine evaluates every student for one settlement period, applies
//! the one-time toggles the operator chose, and returns records, warnings
//! and totals. It never persists anything; the caller commits the result.

pub mod engine;
pub mod types;
pub mod warning;

#[cfg(test)]
mod props;

pub use engine::SettlementEngine;
pub use types::{
    BaggageCandidate, SettlementResult, SettlementToggles, ToggleCandidates, WithdrawalCandidate,
};
pub use warning::{SettlementWarning, ToggleKind};
