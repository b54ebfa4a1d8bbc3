//! Tabular export.
//!
//! Reports are flattened into [`Table`]s of strings, then written as CSV
//! or as a multi-sheet XLSX workbook.

pub mod csv_writer;
pub mod error;
pub mod table;
pub mod xlsx;

pub use csv_writer::{write_csv, write_csv_file};
pub use error::ExportError;
pub use table::{ColumnKind, Table};
pub use xlsx::{write_xlsx_bytes, write_xlsx_file};
