//! Students, their lifecycle, and roster intake.
//!
//! A [`Student`] can only be built through [`Student::new`], which enforces
//! the lifecycle invariants. Raw input goes through [`StudentDraft`] first.

pub mod error;
pub mod import;
pub mod types;
pub mod validation;

pub use error::{ImportError, StudentError};
pub use import::{REQUIRED_COLUMNS, RosterImport, RowError, import_roster};
pub use types::{DegreeLevel, Lifecycle, Student, StudentId, StudentStatus};
pub use validation::{FieldError, StudentDraft, ValidatedStudent};
