//! Settlement engine.

use std::collections::BTreeSet;

use super::types::{
    BaggageCandidate, SettlementResult, SettlementToggles, ToggleCandidates, WithdrawalCandidate,
};
use super::warning::{SettlementWarning, ToggleKind};
use crate::config::{AllowanceConfig, ConfigError};
use crate::period::SettlementPeriod;
use crate::rules::{
    AllowanceTotals, EvaluationWindow, RuleOutput, SettlementContext, evaluate_all,
};
use crate::student::{Student, StudentId};

/// Settlement engine.
///
/// Pure: the baggage ledger is consulted through a lookup supplied by the
/// caller, so the same inputs always yield the same result.
pub struct SettlementEngine;

impl SettlementEngine {
    /// Settles `period` for every student on the roster.
    ///
    /// # Arguments
    ///
    /// * `roster` - Students to evaluate
    /// * `period` - Month being settled
    /// * `config` - Configuration version in force
    /// * `toggles` - One-time payments requested by the operator
    /// * `is_baggage_paid` - Looks up whether a student's baggage was paid by an earlier run
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is unusable. Policy
    /// problems never fail the run; they come back as warnings.
    pub fn run<P>(
        roster: &[Student],
        period: SettlementPeriod,
        config: &AllowanceConfig,
        toggles: &SettlementToggles,
        is_baggage_paid: P,
    ) -> Result<SettlementResult, ConfigError>
    where
        P: Fn(&StudentId) -> bool,
    {
        config.validate()?;

        let mut output = RuleOutput::default();
        for student in roster {
            let id = student.id();
            let pay_baggage = toggles.baggage.contains(id);
            let ctx = SettlementContext {
                period,
                pay_baggage,
                pay_withdrawal_living: toggles.withdrawal_living.contains(id),
                baggage_already_paid: pay_baggage
                    && student.graduation_date().is_some()
                    && is_baggage_paid(id),
            };
            output.merge(evaluate_all(
                student,
                config,
                &EvaluationWindow::Settlement(ctx),
            ));
        }
        output.warnings.extend(Self::unknown_toggles(roster, toggles));

        for warning in &output.warnings {
            tracing::debug!(
                period = %period,
                student_id = %warning.student_id(),
                code = warning.code(),
                "settlement warning"
            );
        }

        let totals = AllowanceTotals::from_records(&output.records);
        tracing::info!(
            period = %period,
            students = roster.len(),
            records = output.records.len(),
            warnings = output.warnings.len(),
            total_local = %totals.total.local,
            "settlement computed"
        );

        Ok(SettlementResult {
            period,
            records: output.records,
            warnings: output.warnings,
            totals,
        })
    }

    /// Lists the students the operator may toggle for `period`.
    ///
    /// Baggage candidates are graduates whose baggage is unpaid; withdrawal
    /// candidates are students withdrawing during the period, pre-selected
    /// according to `withdrawal_living_default`.
    pub fn candidates<P>(
        roster: &[Student],
        period: SettlementPeriod,
        config: &AllowanceConfig,
        is_baggage_paid: P,
    ) -> ToggleCandidates
    where
        P: Fn(&StudentId) -> bool,
    {
        let baggage = roster
            .iter()
            .filter_map(|student| {
                let graduation_date = student.graduation_date()?;
                (!is_baggage_paid(student.id())).then(|| BaggageCandidate {
                    student_id: student.id().clone(),
                    name: student.name().to_string(),
                    graduation_date,
                    payable_this_period: SettlementPeriod::from_date(graduation_date) <= period,
                })
            })
            .collect();

        let withdrawal = roster
            .iter()
            .filter_map(|student| {
                let withdrawal_date = student.withdrawal_date()?;
                period.contains(withdrawal_date).then(|| WithdrawalCandidate {
                    student_id: student.id().clone(),
                    name: student.name().to_string(),
                    withdrawal_date,
                    selected: config.withdrawal_living_default,
                })
            })
            .collect();

        ToggleCandidates {
            baggage,
            withdrawal,
        }
    }

    fn unknown_toggles(roster: &[Student], toggles: &SettlementToggles) -> Vec<SettlementWarning> {
        let known: BTreeSet<&StudentId> = roster.iter().map(Student::id).collect();
        let known = &known;
        [
            (ToggleKind::Baggage, &toggles.baggage),
            (ToggleKind::WithdrawalLiving, &toggles.withdrawal_living),
        ]
        .into_iter()
        .flat_map(|(toggle, ids)| {
            ids.iter()
                .filter(move |id| !known.contains(id))
                .map(move |id| SettlementWarning::UnknownStudent {
                    student_id: id.clone(),
                    toggle,
                })
        })
        .collect()
    }
}
