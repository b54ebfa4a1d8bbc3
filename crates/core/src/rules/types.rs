//! Allowance records and their totals.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::RuleError;
use crate::money::MoneyAmount;
use crate::student::StudentId;

/// Kind of allowance a record pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AllowanceType {
    /// Monthly living allowance.
    Living,
    /// Annual study allowance.
    Study,
    /// One-time excess baggage allowance on graduation.
    #[serde(rename = "ExcessBaggage")]
    Baggage,
}

impl AllowanceType {
    /// All allowance types, in report order.
    pub const ALL: [Self; 3] = [Self::Living, Self::Study, Self::Baggage];

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Living => "Living",
            Self::Study => "Study",
            Self::Baggage => "ExcessBaggage",
        }
    }
}

impl fmt::Display for AllowanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AllowanceType {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RuleError::UnknownAllowanceType(s.to_string()))
    }
}

/// Identifies which rule produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleId {
    /// Entry month, prorated.
    LivingEntryProrate,
    /// Any later month, paid in full.
    LivingFullMonth,
    /// Withdrawal month paid on request.
    LivingWithdrawalToggle,
    /// Withdrawal month paid on request, which is also the entry month.
    LivingWithdrawalToggleProrate,
    /// Enrolled on the study month's first day.
    StudyMonthInStudy,
    /// Entered during the study month itself.
    StudyEntryMonth,
    /// Left before the study month of the entry year.
    StudyEntryYearOverride,
    /// Baggage paid on graduation.
    BaggageOnGraduation,
}

impl RuleId {
    /// All rule ids.
    pub const ALL: [Self; 8] = [
        Self::LivingEntryProrate,
        Self::LivingFullMonth,
        Self::LivingWithdrawalToggle,
        Self::LivingWithdrawalToggleProrate,
        Self::StudyMonthInStudy,
        Self::StudyEntryMonth,
        Self::StudyEntryYearOverride,
        Self::BaggageOnGraduation,
    ];

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LivingEntryProrate => "LIVING_ENTRY_PRORATE",
            Self::LivingFullMonth => "LIVING_FULL_MONTH",
            Self::LivingWithdrawalToggle => "LIVING_WITHDRAWAL_TOGGLE",
            Self::LivingWithdrawalToggleProrate => "LIVING_WITHDRAWAL_TOGGLE_PRORATE",
            Self::StudyMonthInStudy => "STUDY_MONTH_IN_STUDY",
            Self::StudyEntryMonth => "STUDY_ENTRY_MONTH",
            Self::StudyEntryYearOverride => "STUDY_ENTRY_YEAR_OVERRIDE",
            Self::BaggageOnGraduation => "BAGGAGE_ON_GRADUATION",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleId {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s.trim())
            .ok_or_else(|| RuleError::UnknownRuleId(s.to_string()))
    }
}

/// One dated payment line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllowanceRecord {
    /// Student paid.
    pub student_id: StudentId,
    /// Kind of allowance.
    pub allowance_type: AllowanceType,
    /// First day covered (inclusive).
    pub period_start: NaiveDate,
    /// Last day covered (inclusive).
    pub period_end: NaiveDate,
    /// Paired USD and local amount.
    pub amount: MoneyAmount,
    /// Rule that produced the record.
    pub rule_id: RuleId,
    /// Human-readable description.
    pub description: String,
    /// Inputs the rule used, for audit.
    pub metadata: BTreeMap<String, String>,
}

/// Count and sums for one allowance type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeTotal {
    /// Number of records.
    pub count: usize,
    /// Sum of USD amounts.
    pub usd: Decimal,
    /// Sum of local amounts.
    pub local: Decimal,
}

impl TypeTotal {
    fn add(&mut self, amount: &MoneyAmount) {
        self.count += 1;
        self.usd += amount.usd();
        self.local += amount.local();
    }
}

/// Totals per allowance type plus grand totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllowanceTotals {
    /// Totals keyed by allowance type; types without records are absent.
    pub by_type: BTreeMap<AllowanceType, TypeTotal>,
    /// Grand total over every record.
    pub total: TypeTotal,
}

impl AllowanceTotals {
    /// Sums a set of records.
    #[must_use]
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a AllowanceRecord>) -> Self {
        let mut totals = Self::default();
        for record in records {
            totals
                .by_type
                .entry(record.allowance_type)
                .or_default()
                .add(&record.amount);
            totals.total.add(&record.amount);
        }
        totals
    }

    /// Totals for one type, zero if no records of that type exist.
    #[must_use]
    pub fn for_type(&self, allowance_type: AllowanceType) -> TypeTotal {
        self.by_type.get(&allowance_type).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use stipend_shared::types::Currency;

    fn record(allowance_type: AllowanceType, usd: Decimal, local: Decimal) -> AllowanceRecord {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        AllowanceRecord {
            student_id: StudentId::new("S1").unwrap(),
            allowance_type,
            period_start: day,
            period_end: day,
            amount: MoneyAmount::restore(usd, local, dec!(7.10), Currency::Cny),
            rule_id: RuleId::LivingFullMonth,
            description: String::new(),
            metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn test_totals_by_type() {
        let records = vec![
            record(AllowanceType::Living, dec!(300), dec!(2130.00)),
            record(AllowanceType::Living, dec!(212.90), dec!(1511.59)),
            record(AllowanceType::Baggage, dec!(1200), dec!(8520.00)),
        ];
        let totals = AllowanceTotals::from_records(&records);
        let living = totals.for_type(AllowanceType::Living);
        assert_eq!(living.count, 2);
        assert_eq!(living.usd, dec!(512.90));
        assert_eq!(living.local, dec!(3641.59));
        assert_eq!(totals.for_type(AllowanceType::Study), TypeTotal::default());
        assert_eq!(totals.total.count, 3);
        assert_eq!(totals.total.local, dec!(12161.59));
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&AllowanceType::Baggage).unwrap(),
            "\"ExcessBaggage\""
        );
        assert_eq!(
            "excessbaggage".parse::<AllowanceType>().unwrap(),
            AllowanceType::Baggage
        );
        for id in RuleId::ALL {
            assert_eq!(
                serde_json::to_string(&id).unwrap(),
                format!("\"{}\"", id.as_str())
            );
            assert_eq!(id.as_str().parse::<RuleId>().unwrap(), id);
        }
    }

    #[test]
    fn test_unknown_names_are_typed_errors() {
        assert_eq!(
            "Housing".parse::<AllowanceType>(),
            Err(RuleError::UnknownAllowanceType("Housing".into()))
        );
        assert_eq!(
            "living_full_month".parse::<RuleId>(),
            Err(RuleError::UnknownRuleId("living_full_month".into()))
        );
        assert_eq!(
            RuleError::UnknownRuleId("X".into()).to_string(),
            "Unknown rule id: X"
        );
    }
}
