//! Named table of string cells.

use super::error::ExportError;

/// How a column's cells are written to a spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnKind {
    /// Written verbatim as text, even when it looks like a number.
    #[default]
    Text,
    /// Decimal amount or count, written as a number when it parses.
    Number,
}

/// A named table: one header row plus data rows of equal width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Sheet or file name.
    pub name: String,
    /// Column headers.
    pub headers: Vec<String>,
    /// Data rows, one cell per header.
    pub rows: Vec<Vec<String>>,
    /// Cell kind per column; missing entries are text.
    pub column_kinds: Vec<ColumnKind>,
    /// Optional column widths in characters.
    pub column_widths: Option<Vec<u16>>,
    /// Freeze the header row when shown as a sheet.
    pub freeze_header: bool,
}

impl Table {
    /// Creates an empty table with a frozen header.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            column_kinds: Vec::new(),
            column_widths: None,
            freeze_header: true,
        }
    }

    /// Marks the columns at `indices` as numeric.
    #[must_use]
    pub fn with_numeric_columns(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.column_kinds.resize(self.headers.len(), ColumnKind::Text);
        for index in indices {
            if let Some(kind) = self.column_kinds.get_mut(index) {
                *kind = ColumnKind::Number;
            }
        }
        self
    }

    /// Kind of the column at `index`.
    #[must_use]
    pub fn column_kind(&self, index: usize) -> ColumnKind {
        self.column_kinds.get(index).copied().unwrap_or_default()
    }

    /// Appends a row.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.rows
            .push(cells.into_iter().map(|c| c.to_string()).collect());
    }

    /// Checks that every row matches the header width.
    pub fn check_width(&self) -> Result<(), ExportError> {
        let expected = self.headers.len();
        match self.rows.iter().position(|row| row.len() != expected) {
            Some(row) => Err(ExportError::RowWidth {
                table: self.name.clone(),
                row,
                expected,
                found: self.rows[row].len(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_check() {
        let mut table = Table::new("t", ["a", "b"]);
        table.push_row(["1", "2"]);
        assert!(table.check_width().is_ok());
        table.push_row(["3"]);
        let err = table.check_width().unwrap_err();
        assert_eq!(err.to_string(), "Table 't' row 1 has 1 cells, expected 2");
    }

    #[test]
    fn test_columns_default_to_text() {
        let table = Table::new("t", ["id", "amount", "note"]).with_numeric_columns([1, 7]);
        assert_eq!(table.column_kind(0), ColumnKind::Text);
        assert_eq!(table.column_kind(1), ColumnKind::Number);
        assert_eq!(table.column_kind(2), ColumnKind::Text);
        assert_eq!(table.column_kind(7), ColumnKind::Text);
    }
}
