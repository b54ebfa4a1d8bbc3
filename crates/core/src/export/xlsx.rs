//! XLSX workbook export.
//!
//! One worksheet per [`Table`], bold header row, optional frozen header and
//! column widths. Cells of [`ColumnKind::Number`] columns are written as
//! numbers; every other cell is written as text, so identifiers such as
//! `00123` keep their leading zeros.

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook, Worksheet};

use super::error::ExportError;
use super::table::{ColumnKind, Table};

/// Builds a workbook with one sheet per table.
pub fn build_workbook(tables: &[Table]) -> Result<Workbook, ExportError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    for table in tables {
        table.check_width()?;
        let sheet = workbook.add_worksheet();
        sheet.set_name(sheet_name(&table.name))?;
        write_sheet(sheet, table, &header)?;
    }
    Ok(workbook)
}

/// Writes `tables` as one workbook held in memory.
pub fn write_xlsx_bytes(tables: &[Table]) -> Result<Vec<u8>, ExportError> {
    Ok(build_workbook(tables)?.save_to_buffer()?)
}

/// Writes `tables` to `path`, creating parent directories.
pub fn write_xlsx_file(path: &Path, tables: &[Table]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    build_workbook(tables)?.save(path)?;
    tracing::debug!(path = %path.display(), sheets = tables.len(), "xlsx written");
    Ok(())
}

fn write_sheet(sheet: &mut Worksheet, table: &Table, header: &Format) -> Result<(), ExportError> {
    let too_large = || ExportError::SheetTooLarge(table.name.clone());

    for (c, title) in table.headers.iter().enumerate() {
        let col = ColNum::try_from(c).map_err(|_| too_large())?;
        sheet.write_string_with_format(0, col, title, header)?;
    }
    if table.freeze_header {
        sheet.set_freeze_panes(1, 0)?;
    }
    if let Some(widths) = &table.column_widths {
        for (c, &width) in widths.iter().enumerate() {
            let col = ColNum::try_from(c).map_err(|_| too_large())?;
            sheet.set_column_width(col, f64::from(width))?;
        }
    }

    for (r, cells) in table.rows.iter().enumerate() {
        let row = RowNum::try_from(r + 1).map_err(|_| too_large())?;
        for (c, value) in cells.iter().enumerate() {
            let col = ColNum::try_from(c).map_err(|_| too_large())?;
            match (table.column_kind(c), as_number(value)) {
                (ColumnKind::Number, Some(number)) => {
                    sheet.write_number(row, col, number)?;
                }
                _ if value.is_empty() => {}
                _ => {
                    sheet.write_string(row, col, value)?;
                }
            }
        }
    }
    Ok(())
}

fn as_number(value: &str) -> Option<f64> {
    value.trim().parse::<Decimal>().ok()?.to_f64()
}

/// Sheet names are limited to 31 characters and may not contain `[]:*?/\`.
fn sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if "[]:*?/\\".contains(c) { '_' } else { c })
        .take(31)
        .collect();
    if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned
    }
}
