//! Output documents: where sheets and rows end up.
//!
//! The writer only needs a handful of capabilities from a spreadsheet
//! library, captured by [`DocumentSink`]:
//!
//! - **create_sheet**: add an empty named sheet
//! - **append_row**: add a row at the bottom of a sheet
//! - **remove_sheet**: drop a sheet by name
//! - **persist**: write the document to a path, once
//!
//! Two sinks are provided: [`MemoryDocument`] keeps everything in memory and
//! is what tests compare against, [`XlsxDocument`] renders an `.xlsx` file
//! with `rust_xlsxwriter`.
//!
//! Sinks are not required to be thread-safe; the writer serializes every
//! call through a single lock.

pub mod memory;
pub mod xlsx;

pub use memory::MemoryDocument;
pub use xlsx::XlsxDocument;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Title of the blank sheet some documents start with.
pub const DEFAULT_SHEET_TITLE: &str = "Sheet";

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    /// Display form of the value.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<&String> for Cell {
    fn from(s: &String) -> Self {
        Cell::Text(s.clone())
    }
}

impl From<usize> for Cell {
    fn from(n: usize) -> Self {
        Cell::Number(n as f64)
    }
}

/// Capability surface the writer needs from a spreadsheet document.
pub trait DocumentSink: Send {
    /// Add an empty sheet at the end of the document.
    fn create_sheet(&mut self, title: &str) -> Result<()>;

    /// Append one row to an existing sheet.
    fn append_row(&mut self, title: &str, row: Vec<Cell>) -> Result<()>;

    /// Remove a sheet. Returns whether it existed.
    fn remove_sheet(&mut self, title: &str) -> Result<bool>;

    /// Write the document to `path`.
    fn persist(&mut self, path: &Path) -> Result<()>;

    /// Sheet titles in document order.
    fn sheet_names(&self) -> Vec<String>;

    /// Rows in a sheet, or `None` if there is no such sheet.
    fn row_count(&self, title: &str) -> Option<usize>;

    /// Append several rows to a sheet.
    fn append_rows(&mut self, title: &str, rows: Vec<Vec<Cell>>) -> Result<()> {
        for row in rows {
            self.append_row(title, row)?;
        }
        Ok(())
    }
}

/// Key under which sheet titles collide.
///
/// Uses full Unicode lowercasing, matching how `rust_xlsxwriter` rejects
/// duplicate worksheet names at save time (`Ärger` and `ärger` collide).
pub fn title_key(title: &str) -> String {
    title.to_lowercase()
}

/// Build a text row from string cells.
pub fn text_row<S: AsRef<str>>(cells: &[S]) -> Vec<Cell> {
    cells.iter().map(|c| Cell::Text(c.as_ref().to_string())).collect()
}

/// In-memory sheet storage shared by the bundled sinks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetData {
    /// Sheet title
    pub title: String,
    /// Rows, top to bottom
    pub rows: Vec<Vec<Cell>>,
}

impl SheetData {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
        }
    }
}

/// Ordered list of sheets with title lookup.
///
/// Titles are compared case-insensitively through [`title_key`].
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct SheetList {
    sheets: Vec<SheetData>,
}

impl SheetList {
    pub(crate) fn position(&self, title: &str) -> Option<usize> {
        let key = title_key(title);
        self.sheets.iter().position(|s| title_key(&s.title) == key)
    }

    pub(crate) fn create(&mut self, title: &str) -> Result<()> {
        if self.position(title).is_some() {
            return Err(crate::ConvertError::DuplicateSheet(title.to_string()));
        }
        self.sheets.push(SheetData::new(title));
        Ok(())
    }

    pub(crate) fn push_blank(&mut self, title: &str) {
        if self.position(title).is_none() {
            self.sheets.push(SheetData::new(title));
        }
    }

    pub(crate) fn get_mut(&mut self, title: &str) -> Result<&mut SheetData> {
        match self.position(title) {
            Some(idx) => Ok(&mut self.sheets[idx]),
            None => Err(crate::ConvertError::UnknownSheet(title.to_string())),
        }
    }

    pub(crate) fn get(&self, title: &str) -> Option<&SheetData> {
        self.position(title).map(|idx| &self.sheets[idx])
    }

    pub(crate) fn remove(&mut self, title: &str) -> bool {
        match self.position(title) {
            Some(idx) => {
                self.sheets.remove(idx);
                true
            }
            None => false,
        }
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.title.clone()).collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &SheetData> {
        self.sheets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConvertError;

    #[test]
    fn test_cell_conversions() {
        assert_eq!(Cell::from("a"), Cell::Text("a".to_string()));
        assert_eq!(Cell::from(3usize), Cell::Number(3.0));
        assert_eq!(Cell::Number(3.0).as_text(), "3");
    }

    #[test]
    fn test_sheet_list_case_insensitive() {
        let mut list = SheetList::default();
        list.create("Summary").unwrap();
        let err = list.create("SUMMARY").unwrap_err();
        assert!(matches!(err, ConvertError::DuplicateSheet(_)));
        assert!(list.get("summary").is_some());
    }

    #[test]
    fn test_sheet_list_unicode_case() {
        let mut list = SheetList::default();
        list.create("Ärger_1").unwrap();
        let err = list.create("ärger_1").unwrap_err();
        assert!(matches!(err, ConvertError::DuplicateSheet(_)));
        assert!(list.remove("ÄRGER_1"));
    }

    #[test]
    fn test_sheet_list_unknown() {
        let mut list = SheetList::default();
        assert!(matches!(
            list.get_mut("nope"),
            Err(ConvertError::UnknownSheet(_))
        ));
        assert!(!list.remove("nope"));
    }
}
