//! Report data types.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use stipend_shared::types::Currency;

use crate::rules::{AllowanceTotals, AllowanceType, RuleId};
use crate::student::StudentId;

/// One record, flattened for output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordRow {
    /// Student identifier.
    pub student_id: StudentId,
    /// Student name, empty if the student is no longer on the roster.
    pub student_name: String,
    /// Allowance type.
    pub allowance_type: AllowanceType,
    /// `YYYY-MM` for living, `YYYY` for study, ISO date for baggage.
    pub period: String,
    /// First day covered.
    pub period_start: NaiveDate,
    /// Last day covered.
    pub period_end: NaiveDate,
    /// USD amount.
    pub amount_usd: Decimal,
    /// Local amount.
    pub amount_local: Decimal,
    /// FX rate used.
    pub fx_rate: Decimal,
    /// Producing rule.
    pub rule_id: RuleId,
    /// Description.
    pub description: String,
    /// Metadata as `key=value` pairs joined by `|`.
    pub metadata: String,
}

/// Flat rows plus summaries for a set of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTables {
    /// Local currency of the amounts.
    pub currency: Currency,
    /// One row per record, in input order.
    pub records: Vec<RecordRow>,
    /// Totals per student.
    pub by_student: BTreeMap<StudentId, AllowanceTotals>,
    /// Totals per calendar year of the period start.
    pub by_year: BTreeMap<i32, AllowanceTotals>,
    /// Totals over everything, per type.
    pub overall: AllowanceTotals,
}
