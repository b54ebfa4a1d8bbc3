//! Currency codes for paired stipend amounts.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts themselves are `rust_decimal::Decimal` values owned by the engine;
//! this module only names the currencies they are expressed in.

use serde::{Deserialize, Serialize};

use super::error::ParseError;

/// ISO 4217 currency codes supported by the system.
///
/// Stipend rates are always configured in US dollars and converted into one
/// local payout currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar
    Usd,
    /// Chinese Yuan Renminbi
    #[default]
    Cny,
    /// Omani Rial
    Omr,
    /// Euro
    Eur,
}

impl Currency {
    /// Returns the ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Cny => "CNY",
            Self::Omr => "OMR",
            Self::Eur => "EUR",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "CNY" => Ok(Self::Cny),
            "OMR" => Ok(Self::Omr),
            "EUR" => Ok(Self::Eur),
            _ => Err(ParseError::UnknownCurrency(s.to_string())),
        }
    }
}
