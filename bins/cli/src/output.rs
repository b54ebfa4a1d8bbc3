//! Terminal tables and export files.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use stipend_core::export::{ExportError, Table, write_csv_file, write_xlsx_file};
use stipend_core::reports::{ReportService, ReportTables};
use stipend_core::rules::AllowanceTotals;
use stipend_core::settlement::SettlementWarning;

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExportFormat {
    /// One CSV file per table.
    Csv,
    /// One workbook with a sheet per table.
    #[default]
    Xlsx,
}

impl ExportFormat {
    /// Format implied by a file extension, if any.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            _ => None,
        }
    }

    /// File extension without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }
}

/// Prints `table` with left-aligned, padded columns.
pub fn print_table(table: &Table) {
    print!("{}", render_table(table));
}

fn render_table(table: &Table) -> String {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = line(&table.headers);
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.push('\n');
    for row in &table.rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

/// Prints totals per allowance type and the grand total.
pub fn print_totals(totals: &AllowanceTotals, currency: &str) {
    let mut table = Table::new(
        "Totals",
        [
            "allowance_type".to_string(),
            "count".to_string(),
            "usd".to_string(),
            currency.to_lowercase(),
        ],
    );
    for (allowance_type, total) in &totals.by_type {
        table.push_row([
            allowance_type.to_string(),
            total.count.to_string(),
            total.usd.to_string(),
            total.local.to_string(),
        ]);
    }
    table.push_row([
        "TOTAL".to_string(),
        totals.total.count.to_string(),
        totals.total.usd.to_string(),
        totals.total.local.to_string(),
    ]);
    print_table(&table);
}

/// Prints one line per warning.
pub fn print_warnings(warnings: &[SettlementWarning]) {
    for warning in warnings {
        println!("warning [{}]: {warning}", warning.code());
    }
}

/// Writes `report` to `path`. Returns the files written.
///
/// XLSX writes a single workbook. CSV writes the records table to `path`
/// and each summary next to it, suffixed with the table name.
pub fn export_report(
    path: &Path,
    format: ExportFormat,
    report: &ReportTables,
) -> Result<Vec<PathBuf>, ExportError> {
    let tables = ReportService::to_tables(report);
    match format {
        ExportFormat::Xlsx => {
            write_xlsx_file(path, &tables)?;
            Ok(vec![path.to_path_buf()])
        }
        ExportFormat::Csv => {
            let mut written = Vec::with_capacity(tables.len());
            for (index, table) in tables.iter().enumerate() {
                let target = if index == 0 {
                    path.to_path_buf()
                } else {
                    sibling_path(path, &table.name)
                };
                write_csv_file(&target, table)?;
                written.push(target);
            }
            Ok(written)
        }
    }
}

/// `out/report.csv` + `By student` -> `out/report_by_student.csv`.
fn sibling_path(path: &Path, table_name: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = table_name.to_lowercase().replace(' ', "_");
    path.with_file_name(format!("{stem}_{suffix}.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table_pads_columns() {
        let mut table = Table::new("T", ["id", "amount"]);
        table.push_row(["S100", "1.5"]);
        table.push_row(["S2", "1200.00"]);

        assert_eq!(
            render_table(&table),
            "id    amount\n----  -------\nS100  1.5\nS2    1200.00\n"
        );
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ExportFormat::from_path(Path::new("out/run.CSV")),
            Some(ExportFormat::Csv)
        );
        assert_eq!(
            ExportFormat::from_path(Path::new("run.xlsx")),
            Some(ExportFormat::Xlsx)
        );
        assert_eq!(ExportFormat::from_path(Path::new("run")), None);
    }

    #[test]
    fn test_csv_export_writes_summaries_beside_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("july.csv");
        let report = ReportService::build(&[], &[]);

        let written = export_report(&path, ExportFormat::Csv, &report).unwrap();
        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "july.csv",
                "july_by_student.csv",
                "july_by_year.csv",
                "july_by_type.csv"
            ]
        );
        assert!(written.iter().all(|p| p.exists()));
    }
}
