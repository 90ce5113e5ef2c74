//! Parsed report tables and the summary derived from them.

use serde::{Deserialize, Serialize};

use crate::options::EmptyTablePolicy;

/// Marker that ends the table name inside the last header cell.
pub const TABLE_NAME_MARKER: &str = "_onCloud";

/// A header row plus its data rows, as found between two sentinel lines.
///
/// Row lengths are not checked against the header length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Column names, in order
    pub header: Vec<String>,
    /// Data rows, in input order
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a table with a header and no rows.
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    /// Builder: add a data row
    pub fn with_row<I, S>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
        self
    }

    /// Name of the table, derived from the last header cell.
    ///
    /// Everything from [`TABLE_NAME_MARKER`] onward is dropped; a cell
    /// without the marker is used whole. `None` for an empty header.
    pub fn name(&self) -> Option<&str> {
        self.header.last().map(|cell| derive_name(cell))
    }

    /// Number of data rows. Every data row is one mismatch.
    pub fn mismatch_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of sheets this table occupies with `max_rows` rows per sheet.
    pub fn sheet_count(&self, max_rows: usize, policy: EmptyTablePolicy) -> usize {
        let full = self.rows.len().div_ceil(max_rows.max(1));
        match policy {
            EmptyTablePolicy::HeaderSheet => full.max(1),
            EmptyTablePolicy::Skip => full,
        }
    }

    /// Summary row for this table, if it has a name.
    pub fn summary_entry(&self) -> Option<MismatchSummaryEntry> {
        self.name().map(|name| MismatchSummaryEntry {
            column_name: name.to_string(),
            mismatch_count: self.mismatch_count(),
        })
    }
}

/// Strip everything from the table name marker onward.
pub fn derive_name(cell: &str) -> &str {
    match cell.find(TABLE_NAME_MARKER) {
        Some(pos) => &cell[..pos],
        None => cell,
    }
}

/// One row of the summary sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MismatchSummaryEntry {
    /// Derived table name
    pub column_name: String,
    /// Data rows recorded for the table
    pub mismatch_count: usize,
}
