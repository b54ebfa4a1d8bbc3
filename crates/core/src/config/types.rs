//! Allowance configuration types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stipend_shared::types::Currency;

use super::error::ConfigError;
use crate::money::{MoneyConverter, RoundingMode, RoundingPolicy};
use crate::student::DegreeLevel;

/// Monthly living rates in USD, per degree level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivingRates {
    /// Bachelor monthly rate.
    pub bachelor: Decimal,
    /// Master monthly rate.
    pub master: Decimal,
    /// PhD monthly rate.
    pub phd: Decimal,
}

impl LivingRates {
    /// Monthly rate for `degree`.
    #[must_use]
    pub const fn monthly_usd(&self, degree: DegreeLevel) -> Decimal {
        match degree {
            DegreeLevel::Bachelor => self.bachelor,
            DegreeLevel::Master => self.master,
            DegreeLevel::PhD => self.phd,
        }
    }
}

impl Default for LivingRates {
    fn default() -> Self {
        Self {
            bachelor: Decimal::new(30000, 2),
            master: Decimal::new(35000, 2),
            phd: Decimal::new(40000, 2),
        }
    }
}

/// Rates, FX and rounding rules for one configuration version.
///
/// Missing fields deserialize to their defaults, so configurations saved
/// before a field existed keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllowanceConfig {
    /// Monthly living rates.
    pub living: LivingRates,
    /// Flat annual study allowance in USD.
    pub study_annual_usd: Decimal,
    /// One-time excess baggage allowance in USD.
    pub baggage_usd: Decimal,
    /// USD to local currency rate.
    pub fx_rate: Decimal,
    /// Local payout currency.
    pub local_currency: Currency,
    /// When prorated amounts are rounded.
    pub rounding_policy: RoundingPolicy,
    /// How amounts are rounded.
    pub rounding_mode: RoundingMode,
    /// USD rounding granularity.
    pub usd_quantum: Decimal,
    /// Local currency rounding granularity.
    pub local_quantum: Decimal,
    /// Month (1-12) in which the annual study allowance falls due.
    pub study_month: u32,
    /// Pay the entry-year study allowance even if the student leaves before the study month.
    pub issue_study_if_exit_before_study_month: bool,
    /// Pay the study allowance for an entry month that is itself the study month.
    pub issue_study_in_entry_month: bool,
    /// Whether withdrawal-month living pay is pre-selected for withdrawing students.
    pub withdrawal_living_default: bool,
}

impl Default for AllowanceConfig {
    fn default() -> Self {
        Self {
            living: LivingRates::default(),
            study_annual_usd: Decimal::new(80000, 2),
            baggage_usd: Decimal::new(120_000, 2),
            fx_rate: Decimal::new(710, 2),
            local_currency: Currency::Cny,
            rounding_policy: RoundingPolicy::FinalOnly,
            rounding_mode: RoundingMode::HalfUp,
            usd_quantum: Decimal::new(1, 2),
            local_quantum: Decimal::new(1, 2),
            study_month: 10,
            issue_study_if_exit_before_study_month: false,
            issue_study_in_entry_month: false,
            withdrawal_living_default: false,
        }
    }
}

impl AllowanceConfig {
    /// Checks rates, FX, quanta and the study month.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fx_rate <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveFxRate(self.fx_rate));
        }
        let rates = [
            ("living.bachelor", self.living.bachelor),
            ("living.master", self.living.master),
            ("living.phd", self.living.phd),
            ("study_annual_usd", self.study_annual_usd),
            ("baggage_usd", self.baggage_usd),
        ];
        if let Some((field, value)) = rates.into_iter().find(|(_, v)| *v < Decimal::ZERO) {
            return Err(ConfigError::NegativeRate { field, value });
        }
        if !(1..=12).contains(&self.study_month) {
            return Err(ConfigError::StudyMonthOutOfRange(self.study_month));
        }
        let quanta = [
            ("usd_quantum", self.usd_quantum),
            ("local_quantum", self.local_quantum),
        ];
        if let Some((field, value)) = quanta.into_iter().find(|(_, v)| *v <= Decimal::ZERO) {
            return Err(ConfigError::NonPositiveQuantum { field, value });
        }
        Ok(())
    }

    /// Converter applying this configuration's FX rate and rounding.
    #[must_use]
    pub const fn converter(&self) -> MoneyConverter {
        MoneyConverter::new(self.fx_rate, self.local_currency)
            .with_quanta(self.usd_quantum, self.local_quantum)
            .with_mode(self.rounding_mode)
    }

    /// Whether prorated USD amounts are rounded before conversion.
    #[must_use]
    pub fn rounds_prorated_early(&self) -> bool {
        self.rounding_policy == RoundingPolicy::TwoStep
    }
}

/// A saved configuration and its version number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedConfig {
    /// Monotonic version, starting at 1.
    pub version: i32,
    /// When the version was saved.
    pub created_at: DateTime<Utc>,
    /// The configuration itself.
    pub config: AllowanceConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = AllowanceConfig::default();
        assert_eq!(config.living.monthly_usd(DegreeLevel::Bachelor), dec!(300.00));
        assert_eq!(config.living.monthly_usd(DegreeLevel::Master), dec!(350.00));
        assert_eq!(config.living.monthly_usd(DegreeLevel::PhD), dec!(400.00));
        assert_eq!(config.study_annual_usd, dec!(800.00));
        assert_eq!(config.baggage_usd, dec!(1200.00));
        assert_eq!(config.fx_rate, dec!(7.10));
        assert_eq!(config.study_month, 10);
        assert!(!config.issue_study_in_entry_month);
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case(AllowanceConfig { fx_rate: dec!(0), ..AllowanceConfig::default() }, "INVALID_FX_RATE")]
    #[case(AllowanceConfig { fx_rate: dec!(-7.1), ..AllowanceConfig::default() }, "INVALID_FX_RATE")]
    #[case(AllowanceConfig { baggage_usd: dec!(-1), ..AllowanceConfig::default() }, "NEGATIVE_RATE")]
    #[case(AllowanceConfig { study_month: 0, ..AllowanceConfig::default() }, "INVALID_STUDY_MONTH")]
    #[case(AllowanceConfig { study_month: 13, ..AllowanceConfig::default() }, "INVALID_STUDY_MONTH")]
    #[case(AllowanceConfig { local_quantum: dec!(0), ..AllowanceConfig::default() }, "INVALID_QUANTUM")]
    fn test_validate_rejects(#[case] config: AllowanceConfig, #[case] code: &str) {
        assert_eq!(config.validate().unwrap_err().error_code(), code);
    }

    #[test]
    fn test_negative_living_rate_names_field() {
        let config = AllowanceConfig {
            living: LivingRates {
                master: dec!(-350),
                ..LivingRates::default()
            },
            ..AllowanceConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NegativeRate {
                field: "living.master",
                value: dec!(-350)
            })
        );
    }

    #[test]
    fn test_zero_rates_are_allowed() {
        let config = AllowanceConfig {
            baggage_usd: Decimal::ZERO,
            ..AllowanceConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: AllowanceConfig = serde_json::from_str(
            r#"{"fx_rate": "7.25", "rounding_policy": "two_step", "living": {"phd": "450"}}"#,
        )
        .unwrap();
        assert_eq!(config.fx_rate, dec!(7.25));
        assert!(config.rounds_prorated_early());
        assert_eq!(config.living.phd, dec!(450));
        assert_eq!(config.living.bachelor, dec!(300.00));
        assert_eq!(config.rounding_mode, RoundingMode::HalfUp);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = AllowanceConfig {
            local_currency: Currency::Omr,
            rounding_mode: RoundingMode::HalfEven,
            ..AllowanceConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"ROUND_HALF_EVEN\""));
        assert!(json.contains("\"OMR\""));
        let parsed: AllowanceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_converter_uses_config() {
        let config = AllowanceConfig {
            local_quantum: dec!(1),
            ..AllowanceConfig::default()
        };
        let money = config.converter().to_money(dec!(212.9), false);
        assert_eq!(money.local(), dec!(1512));
    }
}
