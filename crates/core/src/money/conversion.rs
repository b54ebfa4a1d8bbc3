//! USD to local-currency conversion.
//!
//! CRITICAL: Rounding strategy for paired amounts:
//! - The local amount is always quantized to the local quantum
//! - The USD amount is quantized only when `round_early` is requested
//! - Both amounts and the FX rate used are kept together

use rust_decimal::Decimal;
use serde::Serialize;
use stipend_shared::types::Currency;

use super::rounding::{RoundingMode, quantize};

/// Default quantum for both currencies: one cent.
pub const DEFAULT_QUANTUM: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// A USD amount paired with its converted local amount.
///
/// Values are produced by [`MoneyConverter::to_money`]; already persisted
/// amounts are rehydrated with [`MoneyAmount::restore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoneyAmount {
    usd: Decimal,
    local: Decimal,
    fx_rate: Decimal,
    currency: Currency,
}

impl MoneyAmount {
    /// Rebuilds an amount read back from storage. No rounding is applied.
    #[must_use]
    pub const fn restore(usd: Decimal, local: Decimal, fx_rate: Decimal, currency: Currency) -> Self {
        Self {
            usd,
            local,
            fx_rate,
            currency,
        }
    }

    /// USD amount (full precision unless it was rounded early).
    #[must_use]
    pub const fn usd(&self) -> Decimal {
        self.usd
    }

    /// Local amount, quantized.
    #[must_use]
    pub const fn local(&self) -> Decimal {
        self.local
    }

    /// FX rate used for the conversion.
    #[must_use]
    pub const fn fx_rate(&self) -> Decimal {
        self.fx_rate
    }

    /// Local currency.
    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.currency
    }
}

/// Converts USD amounts under one FX rate and rounding setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoneyConverter {
    fx_rate: Decimal,
    usd_quantum: Decimal,
    local_quantum: Decimal,
    mode: RoundingMode,
    currency: Currency,
}

impl MoneyConverter {
    /// Creates a converter with cent quanta and half-up rounding.
    #[must_use]
    pub const fn new(fx_rate: Decimal, currency: Currency) -> Self {
        Self {
            fx_rate,
            usd_quantum: DEFAULT_QUANTUM,
            local_quantum: DEFAULT_QUANTUM,
            mode: RoundingMode::HalfUp,
            currency,
        }
    }

    /// Overrides the USD and local quanta.
    #[must_use]
    pub const fn with_quanta(mut self, usd_quantum: Decimal, local_quantum: Decimal) -> Self {
        self.usd_quantum = usd_quantum;
        self.local_quantum = local_quantum;
        self
    }

    /// Overrides the rounding mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: RoundingMode) -> Self {
        self.mode = mode;
        self
    }

    /// FX rate applied by this converter.
    #[must_use]
    pub const fn fx_rate(&self) -> Decimal {
        self.fx_rate
    }

    /// Converts `amount_usd` into a paired amount.
    ///
    /// With `round_early` the USD amount is quantized before conversion,
    /// otherwise it is converted at full precision. The local result is
    /// always quantized.
    #[must_use]
    pub fn to_money(&self, amount_usd: Decimal, round_early: bool) -> MoneyAmount {
        let usd = if round_early {
            quantize(amount_usd, self.usd_quantum, self.mode)
        } else {
            amount_usd
        };
        let local = quantize(usd * self.fx_rate, self.local_quantum, self.mode);
        MoneyAmount {
            usd,
            local,
            fx_rate: self.fx_rate,
            currency: self.currency,
        }
    }
}
