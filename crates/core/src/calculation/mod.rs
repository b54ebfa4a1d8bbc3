//! Lifetime allowance projection for individual students.

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::{AllowanceConfig, ConfigError};
use crate::rules::{AllowanceRecord, AllowanceTotals, EvaluationWindow, evaluate_all};
use crate::student::{Student, StudentId};

/// Every allowance a student is entitled to up to a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalculationResult {
    /// Student projected.
    pub student_id: StudentId,
    /// Evaluation date used for enrolled students.
    pub as_of: NaiveDate,
    /// Living, study and baggage records, in that order.
    pub records: Vec<AllowanceRecord>,
    /// Totals per allowance type.
    pub totals: AllowanceTotals,
}

/// Projects all allowances for `student` up to `as_of`.
///
/// Graduated and withdrawn students are projected to their terminal date
/// regardless of `as_of`. No toggles apply: withdrawal months and baggage
/// are included as entitlements.
pub fn calculate_student_allowances(
    student: &Student,
    config: &AllowanceConfig,
    as_of: NaiveDate,
) -> Result<CalculationResult, ConfigError> {
    config.validate()?;
    let output = evaluate_all(student, config, &EvaluationWindow::Lifetime { as_of });
    let totals = AllowanceTotals::from_records(&output.records);
    Ok(CalculationResult {
        student_id: student.id().clone(),
        as_of,
        records: output.records,
        totals,
    })
}

/// Projects every student on a roster.
pub fn calculate_roster(
    roster: &[Student],
    config: &AllowanceConfig,
    as_of: NaiveDate,
) -> Result<Vec<CalculationResult>, ConfigError> {
    roster
        .iter()
        .map(|student| calculate_student_allowances(student, config, as_of))
        .collect()
}
