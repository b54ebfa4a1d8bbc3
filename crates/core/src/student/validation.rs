//! Field-level validation of raw student input.
//!
//! Every problem in a draft is reported at once instead of stopping at the
//! first one, so a roster row can be fixed in a single pass.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use super::types::{DegreeLevel, Lifecycle, Student, StudentId, StudentStatus};

/// One invalid field of a draft.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    /// Column or form field name.
    pub field: &'static str,
    /// Human-readable problem.
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Raw student fields as typed by a user or read from a CSV row.
///
/// Empty strings stand for absent values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StudentDraft {
    /// Student identifier.
    #[serde(default)]
    pub student_id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Degree level wire name.
    #[serde(default)]
    pub degree_level: String,
    /// First entry date, `YYYY-MM-DD`.
    #[serde(default)]
    pub first_entry_date: String,
    /// Status wire name.
    #[serde(default)]
    pub status: String,
    /// Graduation date, `YYYY-MM-DD`.
    #[serde(default)]
    pub graduation_date: String,
    /// Withdrawal date, `YYYY-MM-DD`.
    #[serde(default)]
    pub withdrawal_date: String,
}

/// A draft that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedStudent {
    /// The resulting student.
    pub student: Student,
    /// Non-blocking remarks about ignored input.
    pub hints: Vec<String>,
}

impl StudentDraft {
    /// Validates every field and builds the student.
    pub fn validate(&self) -> Result<ValidatedStudent, Vec<FieldError>> {
        let mut errors = Vec::new();
        let mut hints = Vec::new();

        let id = StudentId::new(self.student_id.as_str())
            .map_err(|_| errors.push(FieldError::new("student_id", "is required")))
            .ok();
        let name = self.name.trim();
        if name.is_empty() {
            errors.push(FieldError::new("name", "is required"));
        }
        let degree = required(&self.degree_level, "degree_level", &mut errors)
            .and_then(|raw| record(raw.parse::<DegreeLevel>(), "degree_level", &mut errors));
        let status = required(&self.status, "status", &mut errors)
            .and_then(|raw| record(raw.parse::<StudentStatus>(), "status", &mut errors));
        let entry_date = required(&self.first_entry_date, "first_entry_date", &mut errors)
            .and_then(|raw| parse_date(raw, "first_entry_date", &mut errors));
        let graduation_date = optional(&self.graduation_date)
            .and_then(|raw| parse_date(raw, "graduation_date", &mut errors));
        let withdrawal_date = optional(&self.withdrawal_date)
            .and_then(|raw| parse_date(raw, "withdrawal_date", &mut errors));

        let lifecycle = match status {
            Some(StudentStatus::InStudy) => {
                if graduation_date.is_some() {
                    hints.push(
                        "graduation_date is ignored while the student is In-study".to_string(),
                    );
                }
                Some(Lifecycle::InStudy)
            }
            Some(StudentStatus::Graduated) => match graduation_date {
                Some(graduation_date) => Some(Lifecycle::Graduated { graduation_date }),
                None => {
                    if optional(&self.graduation_date).is_none() {
                        errors.push(FieldError::new(
                            "graduation_date",
                            "is required for Graduated status",
                        ));
                    }
                    None
                }
            },
            Some(StudentStatus::Withdrawn) => match withdrawal_date {
                Some(withdrawal_date) => Some(Lifecycle::Withdrawn { withdrawal_date }),
                None => {
                    if optional(&self.withdrawal_date).is_none() {
                        errors.push(FieldError::new(
                            "withdrawal_date",
                            "is required for Withdrawn status",
                        ));
                    }
                    None
                }
            },
            None => None,
        };

        let terminal_date = lifecycle.and_then(|l| l.terminal_date());
        if let (Some(entry), Some(terminal)) = (entry_date, terminal_date)
            && terminal < entry
        {
            let field = match lifecycle {
                Some(Lifecycle::Withdrawn { .. }) => "withdrawal_date",
                _ => "graduation_date",
            };
            errors.push(FieldError::new(
                field,
                format!("must be on or after first_entry_date ({entry})"),
            ));
        }

        match (id, degree, entry_date, lifecycle) {
            (Some(id), Some(degree), Some(entry_date), Some(lifecycle)) if errors.is_empty() => {
                Student::new(id, name, degree, entry_date, lifecycle)
                    .map(|student| ValidatedStudent { student, hints })
                    .map_err(|err| vec![FieldError::new("student", err.to_string())])
            }
            _ => Err(errors),
        }
    }
}

fn optional(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn required<'a>(raw: &'a str, field: &'static str, errors: &mut Vec<FieldError>) -> Option<&'a str> {
    let value = optional(raw);
    if value.is_none() {
        errors.push(FieldError::new(field, "is required"));
    }
    value
}

fn record<T, E: ToString>(
    result: Result<T, E>,
    field: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    result
        .map_err(|err| errors.push(FieldError::new(field, err.to_string())))
        .ok()
}

fn parse_date(raw: &str, field: &'static str, errors: &mut Vec<FieldError>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| {
            errors.push(FieldError::new(
                field,
                format!("invalid date '{raw}', expected YYYY-MM-DD"),
            ));
        })
        .ok()
}
