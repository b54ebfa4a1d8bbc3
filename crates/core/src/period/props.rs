//! Property-based tests for month arithmetic.

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::calendar::{days_in_month, iter_month_starts, month_end, month_start, proration_fraction};

/// Strategy to generate dates between 1990 and 2100.
fn any_date() -> impl Strategy<Value = NaiveDate> {
    (1990i32..2100, 1u32..=12, 1u32..=31).prop_filter_map("valid date", |(y, m, d)| {
        NaiveDate::from_ymd_opt(y, m, d)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// The fraction is `(L - d + 1) / L` and lies in (0, 1].
    #[test]
    fn prop_proration_fraction_formula(date in any_date()) {
        let length = days_in_month(date);
        let fraction = proration_fraction(date);
        prop_assert_eq!(
            fraction * Decimal::from(length),
            Decimal::from(length - date.day() + 1)
        );
        prop_assert!(fraction > Decimal::ZERO);
        prop_assert!(fraction <= Decimal::ONE);
    }

    /// The first of the month always yields a full month.
    #[test]
    fn prop_first_of_month_is_full(date in any_date()) {
        prop_assert_eq!(proration_fraction(month_start(date)), Decimal::ONE);
    }

    /// Month bounds enclose the date and stay in the same month.
    #[test]
    fn prop_month_bounds_enclose_date(date in any_date()) {
        let start = month_start(date);
        let end = month_end(date);
        prop_assert!(start <= date && date <= end);
        prop_assert_eq!(start.month(), end.month());
        prop_assert_eq!(start.day(), 1);
        prop_assert!(end.succ_opt().is_none_or(|next| next.day() == 1));
    }

    /// Month iteration yields one entry per calendar month, strictly increasing.
    #[test]
    fn prop_month_iteration_counts(a in any_date(), b in any_date()) {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        let months: Vec<_> = iter_month_starts(start, end).collect();
        let expected = (end.year() - start.year()) * 12
            + i32::try_from(end.month()).unwrap()
            - i32::try_from(start.month()).unwrap()
            + 1;
        prop_assert_eq!(i32::try_from(months.len()).unwrap(), expected);
        prop_assert!(months.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(months.iter().all(|m| m.day() == 1));
    }
}
