//! CSV output.

use std::fs;
use std::io::Write;
use std::path::Path;

use super::error::ExportError;
use super::table::Table;

/// Writes `table` as CSV: header row then data rows.
pub fn write_csv<W: Write>(writer: W, table: &Table) -> Result<(), ExportError> {
    table.check_width()?;
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(&table.headers)?;
    for row in &table.rows {
        out.write_record(row)?;
    }
    out.flush()?;
    Ok(())
}

/// Writes `table` to `path`, creating parent directories.
pub fn write_csv_file(path: &Path, table: &Table) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    write_csv(fs::File::create(path)?, table)?;
    tracing::debug!(path = %path.display(), rows = table.rows.len(), "csv written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_csv_quotes_when_needed() {
        let mut table = Table::new("records", ["student_id", "description"]);
        table.push_row(["S1", "Living allowance 2024-01, withdrawal month"]);
        let mut out = Vec::new();
        write_csv(&mut out, &table).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "student_id,description\nS1,\"Living allowance 2024-01, withdrawal month\"\n"
        );
    }

    #[test]
    fn test_write_csv_file_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.csv");
        let mut table = Table::new("t", ["a"]);
        table.push_row(["1"]);
        write_csv_file(&path, &table).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "a\n1\n");
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let mut table = Table::new("t", ["a", "b"]);
        table.push_row(["1"]);
        assert!(matches!(
            write_csv(Vec::new(), &table),
            Err(ExportError::RowWidth { .. })
        ));
    }
}
