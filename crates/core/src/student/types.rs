//! Student domain types.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::StudentError;

/// Unique, non-empty student identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StudentId(String);

impl StudentId {
    /// Creates an identifier from trimmed, non-empty input.
    pub fn new(value: impl Into<String>) -> Result<Self, StudentError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(StudentError::EmptyId);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for StudentId {
    type Err = StudentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for StudentId {
    type Error = StudentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StudentId> for String {
    fn from(id: StudentId) -> Self {
        id.0
    }
}

/// Degree level, which selects the monthly living rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DegreeLevel {
    /// Undergraduate.
    Bachelor,
    /// Master's programme.
    Master,
    /// Doctoral programme.
    #[serde(rename = "PhD")]
    PhD,
}

impl DegreeLevel {
    /// All degree levels.
    pub const ALL: [Self; 3] = [Self::Bachelor, Self::Master, Self::PhD];

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bachelor => "Bachelor",
            Self::Master => "Master",
            Self::PhD => "PhD",
        }
    }
}

impl fmt::Display for DegreeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DegreeLevel {
    type Err = StudentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bachelor" => Ok(Self::Bachelor),
            "master" => Ok(Self::Master),
            "phd" => Ok(Self::PhD),
            _ => Err(StudentError::UnknownDegree(s.to_string())),
        }
    }
}

/// Flat lifecycle status, used for filters and wire formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StudentStatus {
    /// Currently enrolled.
    #[serde(rename = "In-study")]
    InStudy,
    /// Completed the programme.
    Graduated,
    /// Left before completing.
    Withdrawn,
}

impl StudentStatus {
    /// All statuses.
    pub const ALL: [Self; 3] = [Self::InStudy, Self::Graduated, Self::Withdrawn];

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InStudy => "In-study",
            Self::Graduated => "Graduated",
            Self::Withdrawn => "Withdrawn",
        }
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudentStatus {
    type Err = StudentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "in-study" | "instudy" => Ok(Self::InStudy),
            "graduated" => Ok(Self::Graduated),
            "withdrawn" => Ok(Self::Withdrawn),
            _ => Err(StudentError::UnknownStatus(s.to_string())),
        }
    }
}

/// Where a student is in their programme.
///
/// Terminal states carry their date, so a graduated student always has a
/// graduation date and an enrolled one never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "status")]
pub enum Lifecycle {
    /// Currently enrolled.
    #[serde(rename = "In-study")]
    InStudy,
    /// Graduated on the given date.
    Graduated {
        /// Graduation date.
        graduation_date: NaiveDate,
    },
    /// Withdrew on the given date.
    Withdrawn {
        /// Withdrawal date.
        withdrawal_date: NaiveDate,
    },
}

impl Lifecycle {
    /// Flat status of this lifecycle.
    #[must_use]
    pub const fn status(&self) -> StudentStatus {
        match self {
            Self::InStudy => StudentStatus::InStudy,
            Self::Graduated { .. } => StudentStatus::Graduated,
            Self::Withdrawn { .. } => StudentStatus::Withdrawn,
        }
    }

    /// Graduation or withdrawal date, if terminal.
    #[must_use]
    pub const fn terminal_date(&self) -> Option<NaiveDate> {
        match self {
            Self::InStudy => None,
            Self::Graduated { graduation_date } => Some(*graduation_date),
            Self::Withdrawn { withdrawal_date } => Some(*withdrawal_date),
        }
    }
}

/// An enrolled, graduated or withdrawn student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Student {
    id: StudentId,
    name: String,
    degree: DegreeLevel,
    entry_date: NaiveDate,
    #[serde(flatten)]
    lifecycle: Lifecycle,
}

impl Student {
    /// Builds a student, checking that any terminal date is on or after entry.
    pub fn new(
        id: StudentId,
        name: impl Into<String>,
        degree: DegreeLevel,
        entry_date: NaiveDate,
        lifecycle: Lifecycle,
    ) -> Result<Self, StudentError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(StudentError::EmptyName);
        }
        check_terminal_date(entry_date, &lifecycle)?;
        Ok(Self {
            id,
            name,
            degree,
            entry_date,
            lifecycle,
        })
    }

    /// Student identifier.
    #[must_use]
    pub const fn id(&self) -> &StudentId {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Degree level.
    #[must_use]
    pub const fn degree(&self) -> DegreeLevel {
        self.degree
    }

    /// First entry date.
    #[must_use]
    pub const fn entry_date(&self) -> NaiveDate {
        self.entry_date
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Flat status.
    #[must_use]
    pub const fn status(&self) -> StudentStatus {
        self.lifecycle.status()
    }

    /// Graduation date, for graduated students.
    #[must_use]
    pub const fn graduation_date(&self) -> Option<NaiveDate> {
        match self.lifecycle {
            Lifecycle::Graduated { graduation_date } => Some(graduation_date),
            _ => None,
        }
    }

    /// Withdrawal date, for withdrawn students.
    #[must_use]
    pub const fn withdrawal_date(&self) -> Option<NaiveDate> {
        match self.lifecycle {
            Lifecycle::Withdrawn { withdrawal_date } => Some(withdrawal_date),
            _ => None,
        }
    }

    /// Returns true once the student has graduated or withdrawn.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self.lifecycle, Lifecycle::InStudy)
    }

    /// Last day the student is entitled to allowances.
    ///
    /// Enrolled students run up to `evaluation_date`; terminal students stop
    /// at their graduation or withdrawal date.
    #[must_use]
    pub fn exit_date(&self, evaluation_date: NaiveDate) -> NaiveDate {
        self.lifecycle.terminal_date().unwrap_or(evaluation_date)
    }

    /// Marks an enrolled student as graduated.
    pub fn graduate(self, graduation_date: NaiveDate) -> Result<Self, StudentError> {
        self.transition(Lifecycle::Graduated { graduation_date })
    }

    /// Marks an enrolled student as withdrawn.
    pub fn withdraw(self, withdrawal_date: NaiveDate) -> Result<Self, StudentError> {
        self.transition(Lifecycle::Withdrawn { withdrawal_date })
    }

    fn transition(mut self, next: Lifecycle) -> Result<Self, StudentError> {
        if self.is_terminal() {
            return Err(StudentError::AlreadyTerminal(self.status()));
        }
        check_terminal_date(self.entry_date, &next)?;
        self.lifecycle = next;
        Ok(self)
    }
}

fn check_terminal_date(entry_date: NaiveDate, lifecycle: &Lifecycle) -> Result<(), StudentError> {
    match lifecycle.terminal_date() {
        Some(date) if date < entry_date => Err(StudentError::TerminalBeforeEntry {
            status: lifecycle.status(),
            date,
            entry_date,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn enrolled() -> Student {
        Student::new(
            StudentId::new("S001").unwrap(),
            "Amal",
            DegreeLevel::Master,
            date(2024, 1, 10),
            Lifecycle::InStudy,
        )
        .unwrap()
    }

    #[test]
    fn test_student_id_is_trimmed_and_required() {
        assert_eq!(StudentId::new("  S1 ").unwrap().as_str(), "S1");
        assert_eq!(StudentId::new("   "), Err(StudentError::EmptyId));
    }

    #[test]
    fn test_name_is_required() {
        let result = Student::new(
            StudentId::new("S1").unwrap(),
            " ",
            DegreeLevel::PhD,
            date(2024, 1, 1),
            Lifecycle::InStudy,
        );
        assert_eq!(result, Err(StudentError::EmptyName));
    }

    #[test]
    fn test_terminal_date_before_entry_is_rejected() {
        let result = Student::new(
            StudentId::new("S1").unwrap(),
            "Amal",
            DegreeLevel::PhD,
            date(2024, 3, 1),
            Lifecycle::Graduated {
                graduation_date: date(2024, 2, 28),
            },
        );
        assert!(matches!(
            result,
            Err(StudentError::TerminalBeforeEntry {
                status: StudentStatus::Graduated,
                ..
            })
        ));
    }

    #[test]
    fn test_terminal_date_on_entry_day_is_allowed() {
        let student = enrolled().withdraw(date(2024, 1, 10)).unwrap();
        assert_eq!(student.withdrawal_date(), Some(date(2024, 1, 10)));
        assert_eq!(student.status(), StudentStatus::Withdrawn);
    }

    #[test]
    fn test_graduate_then_withdraw_fails() {
        let graduated = enrolled().graduate(date(2025, 6, 30)).unwrap();
        assert_eq!(graduated.graduation_date(), Some(date(2025, 6, 30)));
        assert_eq!(
            graduated.withdraw(date(2025, 7, 1)),
            Err(StudentError::AlreadyTerminal(StudentStatus::Graduated))
        );
    }

    #[test]
    fn test_exit_date() {
        let student = enrolled();
        assert_eq!(student.exit_date(date(2024, 3, 15)), date(2024, 3, 15));
        let graduated = student.graduate(date(2024, 3, 20)).unwrap();
        assert_eq!(graduated.exit_date(date(2030, 1, 1)), date(2024, 3, 20));
        assert!(graduated.is_terminal());
    }

    #[rstest]
    #[case("Bachelor", DegreeLevel::Bachelor)]
    #[case("master", DegreeLevel::Master)]
    #[case(" PHD ", DegreeLevel::PhD)]
    fn test_degree_parse(#[case] input: &str, #[case] expected: DegreeLevel) {
        assert_eq!(input.parse::<DegreeLevel>().unwrap(), expected);
    }

    #[rstest]
    #[case("In-study", StudentStatus::InStudy)]
    #[case("in_study", StudentStatus::InStudy)]
    #[case("GRADUATED", StudentStatus::Graduated)]
    #[case("withdrawn", StudentStatus::Withdrawn)]
    fn test_status_parse(#[case] input: &str, #[case] expected: StudentStatus) {
        assert_eq!(input.parse::<StudentStatus>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_wire_names() {
        assert!(matches!(
            "Diploma".parse::<DegreeLevel>(),
            Err(StudentError::UnknownDegree(_))
        ));
        assert!(matches!(
            "Suspended".parse::<StudentStatus>(),
            Err(StudentError::UnknownStatus(_))
        ));
    }

    #[test]
    fn test_student_serializes_with_wire_names() {
        let student = enrolled().graduate(date(2025, 6, 30)).unwrap();
        let json = serde_json::to_value(&student).unwrap();
        assert_eq!(json["id"], "S001");
        assert_eq!(json["degree"], "Master");
        assert_eq!(json["status"], "Graduated");
        assert_eq!(json["graduation_date"], "2025-06-30");
    }
}
