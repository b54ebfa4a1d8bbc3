//! The `YYYY-MM` settlement period.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::calendar::{month_end, month_start};
use super::error::PeriodError;

/// A calendar month that a settlement run pays for.
///
/// Ordered chronologically. Serialized as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SettlementPeriod {
    start: NaiveDate,
}

impl SettlementPeriod {
    /// Builds the period for `year` and `month` (1-12).
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodError::MonthOutOfRange(month));
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|start| Self { start })
            .ok_or(PeriodError::YearOutOfRange(year))
    }

    /// Period containing `date`.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            start: month_start(date),
        }
    }

    /// First day of the period.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the period.
    #[must_use]
    pub fn end(&self) -> NaiveDate {
        month_end(self.start)
    }

    /// Returns true if `date` falls within the period.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        month_start(date) == self.start
    }

    /// Calendar year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.start.year()
    }

    /// Calendar month, 1-12.
    #[must_use]
    pub fn month(&self) -> u32 {
        self.start.month()
    }
}

impl fmt::Display for SettlementPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for SettlementPeriod {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let malformed = || PeriodError::Malformed(s.to_string());
        let (year, month) = trimmed.split_once('-').ok_or_else(malformed)?;
        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if year.len() != 4 || month.len() > 2 || !all_digits(year) || !all_digits(month) {
            return Err(malformed());
        }
        let year: i32 = year.parse().map_err(|_| malformed())?;
        let month: u32 = month.parse().map_err(|_| malformed())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for SettlementPeriod {
    type Error = PeriodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SettlementPeriod> for String {
    fn from(period: SettlementPeriod) -> Self {
        period.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_and_bounds() {
        let period: SettlementPeriod = "2024-02".parse().unwrap();
        assert_eq!(period.year(), 2024);
        assert_eq!(period.month(), 2);
        assert_eq!(period.start(), date(2024, 2, 1));
        assert_eq!(period.end(), date(2024, 2, 29));
        assert_eq!(period.to_string(), "2024-02");
    }

    #[test]
    fn test_single_digit_month_is_accepted() {
        let period: SettlementPeriod = "2024-3".parse().unwrap();
        assert_eq!(period.to_string(), "2024-03");
    }

    #[rstest]
    #[case("")]
    #[case("2024")]
    #[case("24-01")]
    #[case("2024/01")]
    #[case("2024-001")]
    #[case("2024-ab")]
    #[case("2024-01-01")]
    fn test_malformed_periods(#[case] input: &str) {
        assert!(matches!(
            input.parse::<SettlementPeriod>(),
            Err(PeriodError::Malformed(_))
        ));
    }

    #[test]
    fn test_month_out_of_range() {
        assert_eq!(
            "2024-13".parse::<SettlementPeriod>(),
            Err(PeriodError::MonthOutOfRange(13))
        );
        assert_eq!(
            SettlementPeriod::new(2024, 0),
            Err(PeriodError::MonthOutOfRange(0))
        );
    }

    #[test]
    fn test_contains_and_from_date() {
        let period = SettlementPeriod::from_date(date(2024, 10, 17));
        assert_eq!(period, SettlementPeriod::new(2024, 10).unwrap());
        assert!(period.contains(date(2024, 10, 1)));
        assert!(period.contains(date(2024, 10, 31)));
        assert!(!period.contains(date(2024, 11, 1)));
    }

    #[test]
    fn test_ordering_is_chronological() {
        let dec = SettlementPeriod::new(2023, 12).unwrap();
        let jan = SettlementPeriod::new(2024, 1).unwrap();
        assert!(dec < jan);
    }

    #[test]
    fn test_serde_as_string() {
        let period = SettlementPeriod::new(2025, 6).unwrap();
        assert_eq!(serde_json::to_string(&period).unwrap(), "\"2025-06\"");
        let parsed: SettlementPeriod = serde_json::from_str("\"2025-06\"").unwrap();
        assert_eq!(parsed, period);
        assert!(serde_json::from_str::<SettlementPeriod>("\"2025-6x\"").is_err());
    }
}
