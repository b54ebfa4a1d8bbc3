//! Month arithmetic and settlement periods.
//!
//! Proration happens only in the entry month, using
//! [`proration_fraction`]; every other month is paid in full.

pub mod calendar;
pub mod error;
pub mod settlement;

#[cfg(test)]
mod props;

pub use calendar::{
    MonthStarts, days_in_month, iter_month_starts, month_end, month_start, proration_fraction,
    year_month_first,
};
pub use error::PeriodError;
pub use settlement::SettlementPeriod;
