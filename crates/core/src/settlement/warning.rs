//! Non-fatal policy warnings raised during settlement.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::period::SettlementPeriod;
use crate::student::{StudentId, StudentStatus};

/// Which one-time toggle a warning concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleKind {
    /// Excess baggage payment.
    Baggage,
    /// Withdrawal-month living payment.
    WithdrawalLiving,
}

impl fmt::Display for ToggleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Baggage => "baggage",
            Self::WithdrawalLiving => "withdrawal living",
        })
    }
}

/// A toggle that could not be honoured. The run continues without it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementWarning {
    /// Baggage was already paid by an earlier run.
    BaggageAlreadyPaid {
        /// Student concerned.
        student_id: StudentId,
    },
    /// Baggage requested before the graduation month.
    BaggageBeforeGraduationMonth {
        /// Student concerned.
        student_id: StudentId,
        /// Graduation date.
        graduation_date: NaiveDate,
        /// Settlement period of the run.
        period: SettlementPeriod,
    },
    /// Baggage requested for a student who has not graduated.
    BaggageNotGraduated {
        /// Student concerned.
        student_id: StudentId,
        /// Current status.
        status: StudentStatus,
    },
    /// Withdrawal-month living pay requested, but the student does not
    /// withdraw in the settlement month.
    WithdrawalToggleNotApplicable {
        /// Student concerned.
        student_id: StudentId,
        /// Settlement period of the run.
        period: SettlementPeriod,
    },
    /// A toggle names a student who is not on the roster.
    UnknownStudent {
        /// Identifier given.
        student_id: StudentId,
        /// Toggle it was given for.
        toggle: ToggleKind,
    },
}

impl SettlementWarning {
    /// Student the warning concerns.
    #[must_use]
    pub const fn student_id(&self) -> &StudentId {
        match self {
            Self::BaggageAlreadyPaid { student_id }
            | Self::BaggageBeforeGraduationMonth { student_id, .. }
            | Self::BaggageNotGraduated { student_id, .. }
            | Self::WithdrawalToggleNotApplicable { student_id, .. }
            | Self::UnknownStudent { student_id, .. } => student_id,
        }
    }

    /// Stable code for output and filtering.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BaggageAlreadyPaid { .. } => "BAGGAGE_ALREADY_PAID",
            Self::BaggageBeforeGraduationMonth { .. } => "BAGGAGE_BEFORE_GRADUATION_MONTH",
            Self::BaggageNotGraduated { .. } => "BAGGAGE_NOT_GRADUATED",
            Self::WithdrawalToggleNotApplicable { .. } => "WITHDRAWAL_TOGGLE_NOT_APPLICABLE",
            Self::UnknownStudent { .. } => "UNKNOWN_STUDENT",
        }
    }
}

impl fmt::Display for SettlementWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BaggageAlreadyPaid { student_id } => {
                write!(f, "{student_id}: baggage allowance was already paid")
            }
            Self::BaggageBeforeGraduationMonth {
                student_id,
                graduation_date,
                period,
            } => write!(
                f,
                "{student_id}: baggage cannot be paid in {period}, before graduation on {graduation_date}"
            ),
            Self::BaggageNotGraduated { student_id, status } => {
                write!(f, "{student_id}: baggage requires Graduated status, student is {status}")
            }
            Self::WithdrawalToggleNotApplicable { student_id, period } => write!(
                f,
                "{student_id}: withdrawal living pay ignored, student does not withdraw in {period}"
            ),
            Self::UnknownStudent { student_id, toggle } => {
                write!(f, "{student_id}: {toggle} toggle ignored, student not found")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_code() {
        let warning = SettlementWarning::BaggageBeforeGraduationMonth {
            student_id: StudentId::new("S7").unwrap(),
            graduation_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            period: SettlementPeriod::new(2024, 5).unwrap(),
        };
        assert_eq!(warning.code(), "BAGGAGE_BEFORE_GRADUATION_MONTH");
        assert_eq!(warning.student_id().as_str(), "S7");
        assert_eq!(
            warning.to_string(),
            "S7: baggage cannot be paid in 2024-05, before graduation on 2024-06-30"
        );
    }

    #[test]
    fn test_serializes_with_code_tag() {
        let warning = SettlementWarning::UnknownStudent {
            student_id: StudentId::new("X9").unwrap(),
            toggle: ToggleKind::WithdrawalLiving,
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["code"], "UNKNOWN_STUDENT");
        assert_eq!(json["student_id"], "X9");
        assert_eq!(json["toggle"], "withdrawal_living");
        assert_eq!(
            warning.to_string(),
            "X9: withdrawal living toggle ignored, student not found"
        );
    }
}
