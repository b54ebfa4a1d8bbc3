//! Settlement inputs and outputs.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use super::warning::SettlementWarning;
use crate::period::SettlementPeriod;
use crate::rules::{AllowanceRecord, AllowanceTotals, AllowanceType};
use crate::student::StudentId;

/// One-time payments the operator requested for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettlementToggles {
    /// Students to pay the baggage allowance.
    pub baggage: BTreeSet<StudentId>,
    /// Withdrawing students to pay for their withdrawal month.
    pub withdrawal_living: BTreeSet<StudentId>,
}

/// Outcome of settling one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementResult {
    /// Period settled.
    pub period: SettlementPeriod,
    /// Records, grouped by student in roster order.
    pub records: Vec<AllowanceRecord>,
    /// Toggles that could not be honoured.
    pub warnings: Vec<SettlementWarning>,
    /// Totals over `records`.
    pub totals: AllowanceTotals,
}

impl SettlementResult {
    /// Students receiving a baggage payment in this result.
    #[must_use]
    pub fn baggage_student_ids(&self) -> BTreeSet<&StudentId> {
        self.records
            .iter()
            .filter(|r| r.allowance_type == AllowanceType::Baggage)
            .map(|r| &r.student_id)
            .collect()
    }
}

/// A graduate whose baggage allowance is still unpaid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaggageCandidate {
    /// Student identifier.
    pub student_id: StudentId,
    /// Display name.
    pub name: String,
    /// Graduation date.
    pub graduation_date: NaiveDate,
    /// False while the period is before the graduation month.
    pub payable_this_period: bool,
}

/// A student withdrawing during the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithdrawalCandidate {
    /// Student identifier.
    pub student_id: StudentId,
    /// Display name.
    pub name: String,
    /// Withdrawal date.
    pub withdrawal_date: NaiveDate,
    /// Pre-selected from the configured default.
    pub selected: bool,
}

/// Students the operator can toggle for a period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToggleCandidates {
    /// Baggage candidates.
    pub baggage: Vec<BaggageCandidate>,
    /// Withdrawal-month candidates.
    pub withdrawal: Vec<WithdrawalCandidate>,
}

impl ToggleCandidates {
    /// Toggles matching the pre-selection: no baggage, withdrawal students
    /// per the configured default.
    #[must_use]
    pub fn default_toggles(&self) -> SettlementToggles {
        SettlementToggles {
            baggage: BTreeSet::new(),
            withdrawal_living: self
                .withdrawal
                .iter()
                .filter(|c| c.selected)
                .map(|c| c.student_id.clone())
                .collect(),
        }
    }
}
