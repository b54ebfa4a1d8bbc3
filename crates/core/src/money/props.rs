//! Property-based tests for money conversion.
//!
//! - Local amounts always land exactly on the local quantum
//! - Early rounding never moves USD by more than half a quantum
//! - Amounts already on the quantum convert identically under both policies

use proptest::prelude::*;
use rust_decimal::Decimal;
use stipend_shared::types::Currency;

use super::conversion::MoneyConverter;
use super::rounding::{RoundingMode, quantize};

/// Strategy to generate positive USD amounts with up to 6 decimal places.
fn usd_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000i64).prop_map(|v| Decimal::new(v, 6))
}

/// Strategy to generate FX rates (0.0001 to 100.0000).
fn fx_rate() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

/// Strategy to generate whole-cent amounts.
fn cent_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn rounding_mode() -> impl Strategy<Value = RoundingMode> {
    prop::sample::select(RoundingMode::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Local amount always has exactly the local quantum's scale.
    #[test]
    fn prop_local_scale_matches_quantum(
        amount in usd_amount(),
        fx in fx_rate(),
        mode in rounding_mode(),
        round_early in any::<bool>(),
    ) {
        let conv = MoneyConverter::new(fx, Currency::Cny).with_mode(mode);
        let money = conv.to_money(amount, round_early);
        prop_assert_eq!(money.local().scale(), 2);
        prop_assert_eq!(quantize(money.local(), Decimal::new(1, 2), mode), money.local());
    }

    /// Half-up early rounding moves USD by at most half a cent.
    #[test]
    fn prop_round_early_error_is_bounded(amount in usd_amount(), fx in fx_rate()) {
        let money = MoneyConverter::new(fx, Currency::Cny).to_money(amount, true);
        let diff = (money.usd() - amount).abs();
        prop_assert!(diff <= Decimal::new(5, 3), "diff {} too large", diff);
    }

    /// Amounts already on the USD quantum are unaffected by the policy.
    #[test]
    fn prop_policies_agree_on_quantized_amounts(
        amount in cent_amount(),
        fx in fx_rate(),
        mode in rounding_mode(),
    ) {
        let conv = MoneyConverter::new(fx, Currency::Cny).with_mode(mode);
        let early = conv.to_money(amount, true);
        let late = conv.to_money(amount, false);
        prop_assert_eq!(early.local(), late.local());
    }

    /// Conversion is deterministic.
    #[test]
    fn prop_conversion_is_deterministic(amount in usd_amount(), fx in fx_rate()) {
        let conv = MoneyConverter::new(fx, Currency::Cny);
        prop_assert_eq!(conv.to_money(amount, false), conv.to_money(amount, false));
    }
}
