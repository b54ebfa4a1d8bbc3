//! Export errors.

use thiserror::Error;

/// Errors raised while writing an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A row has a different number of cells than the header.
    #[error("Table '{table}' row {row} has {found} cells, expected {expected}")]
    RowWidth {
        /// Table name.
        table: String,
        /// 0-based data row index.
        row: usize,
        /// Header width.
        expected: usize,
        /// Cells in the row.
        found: usize,
    },

    /// CSV writer failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook writer failure.
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// A table has more rows or columns than a worksheet holds.
    #[error("Table '{0}' does not fit in a worksheet")]
    SheetTooLarge(String),

    /// File system failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
