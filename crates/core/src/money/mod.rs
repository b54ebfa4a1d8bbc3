//! Paired USD / local-currency amounts and the rounding rules that produce them.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every amount is a `rust_decimal::Decimal`; rounding only ever happens in
//! [`quantize`], driven by the configured [`RoundingMode`] and quantum.

pub mod conversion;
pub mod error;
pub mod rounding;

#[cfg(test)]
mod props;

pub use conversion::{MoneyAmount, MoneyConverter};
pub use error::RoundingParseError;
pub use rounding::{RoundingMode, RoundingPolicy, quantize};
