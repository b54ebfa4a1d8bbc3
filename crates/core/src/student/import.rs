//! CSV roster import.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;

use super::error::ImportError;
use super::types::Student;
use super::validation::{FieldError, StudentDraft};

/// Columns every roster file must carry, in the canonical order.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "student_id",
    "name",
    "degree_level",
    "first_entry_date",
    "graduation_date",
    "withdrawal_date",
    "status",
];

/// All problems found on one data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based line number, counting the header as row 1.
    pub row: usize,
    /// Field errors for the row.
    pub errors: Vec<FieldError>,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: ", self.row)?;
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

/// Outcome of importing a roster file.
#[derive(Debug, Default)]
pub struct RosterImport {
    /// Students from rows that passed validation.
    pub students: Vec<Student>,
    /// Rows that were rejected.
    pub errors: Vec<RowError>,
    /// Non-blocking remarks, as `(row, message)`.
    pub hints: Vec<(usize, String)>,
}

impl RosterImport {
    /// Returns true if every row was accepted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Reads a roster CSV, validating each row independently.
///
/// Invalid rows never stop the batch; they are returned alongside the
/// accepted students. A student id repeated within the file is rejected on
/// every occurrence after the first.
pub fn import_roster<R: Read>(input: R) -> Result<RosterImport, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        return Err(ImportError::NoHeaders);
    }
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| (*column).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns(missing));
    }

    let mut result = RosterImport::default();
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (index, row) in reader.deserialize::<StudentDraft>().enumerate() {
        let line = index + 2;
        let draft = match row {
            Ok(draft) => draft,
            Err(err) => {
                result.errors.push(RowError {
                    row: line,
                    errors: vec![FieldError {
                        field: "row",
                        message: err.to_string(),
                    }],
                });
                continue;
            }
        };

        match draft.validate() {
            Ok(validated) => {
                let id = validated.student.id().as_str().to_string();
                if let Some(first) = seen.get(&id) {
                    result.errors.push(RowError {
                        row: line,
                        errors: vec![FieldError {
                            field: "student_id",
                            message: format!("duplicate of row {first}"),
                        }],
                    });
                    continue;
                }
                seen.insert(id, line);
                result
                    .hints
                    .extend(validated.hints.into_iter().map(|hint| (line, hint)));
                result.students.push(validated.student);
            }
            Err(errors) => result.errors.push(RowError { row: line, errors }),
        }
    }

    tracing::debug!(
        accepted = result.students.len(),
        rejected = result.errors.len(),
        "roster import parsed"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::student::StudentStatus;

    const HEADER: &str =
        "student_id,name,degree_level,first_entry_date,graduation_date,withdrawal_date,status\n";

    #[test]
    fn test_import_valid_rows() {
        let csv = format!(
            "{HEADER}S1,Amal,Bachelor,2024-01-10,,,In-study\n\
             S2,Badr,PhD,2023-09-01,2025-06-30,,Graduated\n\
             S3,Dana,Master,2024-01-05,,2024-08-15,Withdrawn\n"
        );
        let import = import_roster(csv.as_bytes()).unwrap();
        assert!(import.is_clean());
        assert_eq!(import.students.len(), 3);
        assert_eq!(import.students[1].status(), StudentStatus::Graduated);
        assert_eq!(import.students[2].status(), StudentStatus::Withdrawn);
    }

    #[test]
    fn test_bad_rows_do_not_abort_batch() {
        let csv = format!(
            "{HEADER}S1,Amal,Bachelor,2024-01-10,,,In-study\n\
             S2,,Doctor,2024-01-10,,,In-study\n\
             S3,Dana,Master,2024-01-05,,,Withdrawn\n"
        );
        let import = import_roster(csv.as_bytes()).unwrap();
        assert_eq!(import.students.len(), 1);
        assert_eq!(import.errors.len(), 2);
        assert_eq!(import.errors[0].row, 3);
        assert_eq!(
            import.errors[0].to_string(),
            "row 3: name: is required; degree_level: Unknown degree level: Doctor"
        );
        assert_eq!(import.errors[1].row, 4);
    }

    #[test]
    fn test_missing_columns() {
        let csv = "student_id,name,status\nS1,Amal,In-study\n";
        let err = import_roster(csv.as_bytes()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "CSV is missing columns: degree_level, first_entry_date, graduation_date, withdrawal_date"
        );
    }

    #[test]
    fn test_empty_file_has_no_headers() {
        assert!(matches!(
            import_roster("".as_bytes()),
            Err(ImportError::NoHeaders)
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected_after_first() {
        let csv = format!(
            "{HEADER}S1,Amal,Bachelor,2024-01-10,,,In-study\n\
             S1,Amal Again,Bachelor,2024-02-10,,,In-study\n"
        );
        let import = import_roster(csv.as_bytes()).unwrap();
        assert_eq!(import.students.len(), 1);
        assert_eq!(import.errors[0].to_string(), "row 3: student_id: duplicate of row 2");
    }

    #[test]
    fn test_hints_carry_row_numbers() {
        let csv = format!("{HEADER}S1,Amal,Bachelor,2024-01-10,2025-06-30,,In-study\n");
        let import = import_roster(csv.as_bytes()).unwrap();
        assert_eq!(import.students.len(), 1);
        assert_eq!(import.hints.len(), 1);
        assert_eq!(import.hints[0].0, 2);
    }
}
