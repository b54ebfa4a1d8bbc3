//! Rounding modes, rounding policies and quantization.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::error::RoundingParseError;

/// How a value is rounded onto its quantum.
///
/// Wire names follow the `ROUND_*` convention used in stored configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoundingMode {
    /// Ties away from zero.
    #[default]
    #[serde(rename = "ROUND_HALF_UP")]
    HalfUp,
    /// Ties to the even neighbour (banker's rounding).
    #[serde(rename = "ROUND_HALF_EVEN")]
    HalfEven,
    /// Ties toward zero.
    #[serde(rename = "ROUND_HALF_DOWN")]
    HalfDown,
    /// Always away from zero.
    #[serde(rename = "ROUND_UP")]
    Up,
    /// Always toward zero (truncation).
    #[serde(rename = "ROUND_DOWN")]
    Down,
    /// Toward positive infinity.
    #[serde(rename = "ROUND_CEILING")]
    Ceiling,
    /// Toward negative infinity.
    #[serde(rename = "ROUND_FLOOR")]
    Floor,
}

impl RoundingMode {
    /// All supported modes, in presentation order.
    pub const ALL: [Self; 7] = [
        Self::HalfUp,
        Self::HalfEven,
        Self::HalfDown,
        Self::Up,
        Self::Down,
        Self::Ceiling,
        Self::Floor,
    ];

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HalfUp => "ROUND_HALF_UP",
            Self::HalfEven => "ROUND_HALF_EVEN",
            Self::HalfDown => "ROUND_HALF_DOWN",
            Self::Up => "ROUND_UP",
            Self::Down => "ROUND_DOWN",
            Self::Ceiling => "ROUND_CEILING",
            Self::Floor => "ROUND_FLOOR",
        }
    }

    /// Maps the mode onto the `rust_decimal` strategy that implements it.
    #[must_use]
    pub const fn strategy(self) -> RoundingStrategy {
        match self {
            Self::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            Self::HalfEven => RoundingStrategy::MidpointNearestEven,
            Self::HalfDown => RoundingStrategy::MidpointTowardZero,
            Self::Up => RoundingStrategy::AwayFromZero,
            Self::Down => RoundingStrategy::ToZero,
            Self::Ceiling => RoundingStrategy::ToPositiveInfinity,
            Self::Floor => RoundingStrategy::ToNegativeInfinity,
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoundingMode {
    type Err = RoundingParseError;

    /// Accepts the wire name with or without the `ROUND_` prefix, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        let name = upper.strip_prefix("ROUND_").unwrap_or(&upper);
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().strip_prefix("ROUND_") == Some(name))
            .ok_or_else(|| RoundingParseError::UnknownMode(s.to_string()))
    }
}

/// When prorated amounts are rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    /// Keep USD at full precision and round only the converted local amount.
    #[default]
    FinalOnly,
    /// Round the prorated USD amount first, then convert and round again.
    TwoStep,
}

impl RoundingPolicy {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FinalOnly => "final_only",
            Self::TwoStep => "two_step",
        }
    }
}

impl fmt::Display for RoundingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoundingPolicy {
    type Err = RoundingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "final_only" => Ok(Self::FinalOnly),
            "two_step" => Ok(Self::TwoStep),
            _ => Err(RoundingParseError::UnknownPolicy(s.to_string())),
        }
    }
}

/// Rounds `amount` onto `quantum` using `mode`.
///
/// The number of decimal places is the scale of the quantum (`0.01` keeps two
/// places, `1` keeps none). The result always carries exactly that many
/// places, so `150` quantized to `0.01` is `150.00`.
#[must_use]
pub fn quantize(amount: Decimal, quantum: Decimal, mode: RoundingMode) -> Decimal {
    let dp = quantum.scale();
    let mut rounded = amount.round_dp_with_strategy(dp, mode.strategy());
    rounded.rescale(dp);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(RoundingMode::HalfUp, dec!(2.345), dec!(2.35))]
    #[case(RoundingMode::HalfEven, dec!(2.345), dec!(2.34))]
    #[case(RoundingMode::HalfEven, dec!(2.355), dec!(2.36))]
    #[case(RoundingMode::HalfDown, dec!(2.345), dec!(2.34))]
    #[case(RoundingMode::Up, dec!(2.341), dec!(2.35))]
    #[case(RoundingMode::Down, dec!(2.349), dec!(2.34))]
    #[case(RoundingMode::Ceiling, dec!(-2.349), dec!(-2.34))]
    #[case(RoundingMode::Floor, dec!(-2.341), dec!(-2.35))]
    #[case(RoundingMode::HalfUp, dec!(-2.345), dec!(-2.35))]
    fn test_quantize_modes(
        #[case] mode: RoundingMode,
        #[case] amount: Decimal,
        #[case] expected: Decimal,
    ) {
        assert_eq!(quantize(amount, dec!(0.01), mode), expected);
    }

    #[test]
    fn test_quantize_pads_to_quantum_scale() {
        let result = quantize(dec!(150), dec!(0.01), RoundingMode::HalfUp);
        assert_eq!(result.to_string(), "150.00");
    }

    #[test]
    fn test_quantize_whole_units() {
        assert_eq!(quantize(dec!(1511.61), dec!(1), RoundingMode::HalfUp), dec!(1512));
        assert_eq!(quantize(dec!(1511.5), dec!(1), RoundingMode::HalfEven), dec!(1512));
        assert_eq!(quantize(dec!(1510.5), dec!(1), RoundingMode::HalfEven), dec!(1510));
    }

    #[test]
    fn test_rounding_mode_parse() {
        assert_eq!("ROUND_HALF_UP".parse::<RoundingMode>().unwrap(), RoundingMode::HalfUp);
        assert_eq!("half_even".parse::<RoundingMode>().unwrap(), RoundingMode::HalfEven);
        assert_eq!(" round_floor ".parse::<RoundingMode>().unwrap(), RoundingMode::Floor);
        assert_eq!(
            "ROUND_SIDEWAYS".parse::<RoundingMode>(),
            Err(RoundingParseError::UnknownMode("ROUND_SIDEWAYS".into()))
        );
    }

    #[test]
    fn test_rounding_mode_wire_names_roundtrip() {
        for mode in RoundingMode::ALL {
            assert_eq!(mode.as_str().parse::<RoundingMode>().unwrap(), mode);
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.as_str()));
        }
    }

    #[test]
    fn test_rounding_policy_wire_names() {
        assert_eq!(RoundingPolicy::default(), RoundingPolicy::FinalOnly);
        assert_eq!("two_step".parse::<RoundingPolicy>().unwrap(), RoundingPolicy::TwoStep);
        assert_eq!(
            "both".parse::<RoundingPolicy>(),
            Err(RoundingParseError::UnknownPolicy("both".into()))
        );
        assert_eq!(
            serde_json::to_string(&RoundingPolicy::TwoStep).unwrap(),
            "\"two_step\""
        );
    }
}
