//! Allowance rules.
//!
//! Each rule is a pure function of a student, a configuration and an
//! evaluation window. The same rules serve lifetime projections and monthly
//! settlement; only the window differs.

pub mod baggage;
pub mod error;
pub mod living;
pub mod study;
pub mod types;

use chrono::NaiveDate;

use crate::config::AllowanceConfig;
use crate::period::SettlementPeriod;
use crate::settlement::SettlementWarning;
use crate::student::Student;

pub use baggage::BaggageRule;
pub use error::RuleError;
pub use living::LivingRule;
pub use study::StudyRule;
pub use types::{AllowanceRecord, AllowanceTotals, AllowanceType, RuleId, TypeTotal};

/// What a rule is asked to cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationWindow {
    /// Everything from entry up to the exit date, with `as_of` standing in
    /// for the exit date of enrolled students. No toggles apply.
    Lifetime {
        /// Evaluation date.
        as_of: NaiveDate,
    },
    /// A single settlement month with its one-time toggles.
    Settlement(SettlementContext),
}

impl EvaluationWindow {
    /// Date that stands in for the exit date of enrolled students.
    #[must_use]
    pub fn evaluation_date(&self) -> NaiveDate {
        match self {
            Self::Lifetime { as_of } => *as_of,
            Self::Settlement(ctx) => ctx.period.end(),
        }
    }
}

/// Per-student settlement inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementContext {
    /// Month being settled.
    pub period: SettlementPeriod,
    /// Baggage was requested for this student.
    pub pay_baggage: bool,
    /// Withdrawal-month living pay was requested for this student.
    pub pay_withdrawal_living: bool,
    /// Baggage has already been paid by an earlier run.
    pub baggage_already_paid: bool,
}

impl SettlementContext {
    /// Context with every toggle off.
    #[must_use]
    pub const fn new(period: SettlementPeriod) -> Self {
        Self {
            period,
            pay_baggage: false,
            pay_withdrawal_living: false,
            baggage_already_paid: false,
        }
    }
}

/// Records and warnings produced by one or more rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleOutput {
    /// Payment records.
    pub records: Vec<AllowanceRecord>,
    /// Policy warnings; never fatal.
    pub warnings: Vec<SettlementWarning>,
}

impl RuleOutput {
    /// Output holding only `records`.
    #[must_use]
    pub fn from_records(records: Vec<AllowanceRecord>) -> Self {
        Self {
            records,
            warnings: Vec::new(),
        }
    }

    /// Appends another output.
    pub fn merge(&mut self, other: Self) {
        self.records.extend(other.records);
        self.warnings.extend(other.warnings);
    }
}

/// A rule producing one kind of allowance.
pub trait AllowanceRule {
    /// Kind of allowance the rule produces.
    fn allowance_type(&self) -> AllowanceType;

    /// Evaluates the rule for one student.
    fn evaluate(
        &self,
        student: &Student,
        config: &AllowanceConfig,
        window: &EvaluationWindow,
    ) -> RuleOutput;
}

/// Living, study and baggage rules, in record order.
#[must_use]
pub fn standard_rules() -> [&'static dyn AllowanceRule; 3] {
    [&LivingRule, &StudyRule, &BaggageRule]
}

/// Runs every standard rule for one student.
#[must_use]
pub fn evaluate_all(
    student: &Student,
    config: &AllowanceConfig,
    window: &EvaluationWindow,
) -> RuleOutput {
    standard_rules()
        .into_iter()
        .fold(RuleOutput::default(), |mut output, rule| {
            output.merge(rule.evaluate(student, config, window));
            output
        })
}
