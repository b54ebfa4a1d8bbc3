//! Calendar helpers over `chrono::NaiveDate`.

use chrono::{Datelike, Days, Months, NaiveDate};
use rust_decimal::Decimal;

/// First day of the month containing `date`.
#[must_use]
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// Last day of the month containing `date`.
#[must_use]
pub fn month_end(date: NaiveDate) -> NaiveDate {
    month_start(date)
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// Number of days in the month containing `date`.
#[must_use]
pub fn days_in_month(date: NaiveDate) -> u32 {
    month_end(date).day()
}

/// First day of `month` in `year`, or `None` for an invalid month.
#[must_use]
pub fn year_month_first(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Share of the entry month from (and including) the entry day to month end.
///
/// `(L - day + 1) / L` where `L` is the month length, so the first of the
/// month yields exactly one.
#[must_use]
pub fn proration_fraction(entry_date: NaiveDate) -> Decimal {
    let length = days_in_month(entry_date);
    let remaining = length - entry_date.day() + 1;
    Decimal::from(remaining) / Decimal::from(length)
}

/// Iterator over the first day of every month in an inclusive range.
///
/// The iterator is `Clone`, so one range can be walked more than once.
#[derive(Debug, Clone)]
pub struct MonthStarts {
    next: Option<NaiveDate>,
    last: NaiveDate,
}

impl Iterator for MonthStarts {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current
            .checked_add_months(Months::new(1))
            .filter(|next| *next <= self.last);
        Some(current)
    }
}

/// First-of-month dates from `month_start(start)` through `month_start(end)`.
///
/// Empty when `end` falls in an earlier month than `start`.
#[must_use]
pub fn iter_month_starts(start: NaiveDate, end: NaiveDate) -> MonthStarts {
    let first = month_start(start);
    let last = month_start(end);
    MonthStarts {
        next: (first <= last).then_some(first),
        last,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(date(2024, 2, 15), date(2024, 2, 1), date(2024, 2, 29), 29)]
    #[case(date(2023, 2, 28), date(2023, 2, 1), date(2023, 2, 28), 28)]
    #[case(date(2024, 12, 31), date(2024, 12, 1), date(2024, 12, 31), 31)]
    #[case(date(2024, 4, 1), date(2024, 4, 1), date(2024, 4, 30), 30)]
    fn test_month_boundaries(
        #[case] d: NaiveDate,
        #[case] start: NaiveDate,
        #[case] end: NaiveDate,
        #[case] length: u32,
    ) {
        assert_eq!(month_start(d), start);
        assert_eq!(month_end(d), end);
        assert_eq!(days_in_month(d), length);
    }

    #[test]
    fn test_proration_fraction() {
        assert_eq!(proration_fraction(date(2024, 1, 1)), Decimal::ONE);
        assert_eq!(proration_fraction(date(2024, 4, 16)), dec!(0.5));
        assert_eq!(
            proration_fraction(date(2024, 1, 10)),
            Decimal::from(22) / Decimal::from(31)
        );
        assert_eq!(
            proration_fraction(date(2024, 1, 31)),
            Decimal::ONE / Decimal::from(31)
        );
    }

    #[test]
    fn test_iter_month_starts_crosses_years() {
        let months: Vec<_> = iter_month_starts(date(2023, 11, 20), date(2024, 2, 3)).collect();
        assert_eq!(
            months,
            vec![
                date(2023, 11, 1),
                date(2023, 12, 1),
                date(2024, 1, 1),
                date(2024, 2, 1)
            ]
        );
    }

    #[test]
    fn test_iter_month_starts_single_and_empty() {
        assert_eq!(
            iter_month_starts(date(2024, 3, 5), date(2024, 3, 20)).count(),
            1
        );
        assert_eq!(
            iter_month_starts(date(2024, 3, 5), date(2024, 2, 29)).count(),
            0
        );
    }

    #[test]
    fn test_iter_month_starts_is_restartable() {
        let months = iter_month_starts(date(2024, 1, 15), date(2024, 6, 1));
        let first_pass: Vec<_> = months.clone().collect();
        let second_pass: Vec<_> = months.collect();
        assert_eq!(first_pass, second_pass);
        assert_eq!(first_pass.len(), 6);
    }

    #[test]
    fn test_year_month_first() {
        assert_eq!(year_month_first(2024, 10), Some(date(2024, 10, 1)));
        assert_eq!(year_month_first(2024, 13), None);
        assert_eq!(year_month_first(2024, 0), None);
    }
}
