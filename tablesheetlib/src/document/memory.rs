//! In-memory document sink.

use std::path::Path;

use super::{Cell, DocumentSink, SheetData, SheetList, DEFAULT_SHEET_TITLE};
use crate::Result;

/// A workbook held entirely in memory.
///
/// `persist` records the path and writes nothing, which makes this the sink
/// for tests and for single-threaded reference runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryDocument {
    sheets: SheetList,
    persisted_to: Vec<std::path::PathBuf>,
}

impl MemoryDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document that starts with a blank [`DEFAULT_SHEET_TITLE`] sheet.
    pub fn with_default_sheet() -> Self {
        let mut doc = Self::default();
        doc.sheets.push_blank(DEFAULT_SHEET_TITLE);
        doc
    }

    /// A sheet by title.
    pub fn sheet(&self, title: &str) -> Option<&SheetData> {
        self.sheets.get(title)
    }

    /// All sheets, in document order.
    pub fn sheets(&self) -> impl Iterator<Item = &SheetData> {
        self.sheets.iter()
    }

    /// Paths passed to `persist`, in call order.
    pub fn persisted_to(&self) -> &[std::path::PathBuf] {
        &self.persisted_to
    }
}

impl DocumentSink for MemoryDocument {
    fn create_sheet(&mut self, title: &str) -> Result<()> {
        self.sheets.create(title)
    }

    fn append_row(&mut self, title: &str, row: Vec<Cell>) -> Result<()> {
        self.sheets.get_mut(title)?.rows.push(row);
        Ok(())
    }

    fn append_rows(&mut self, title: &str, rows: Vec<Vec<Cell>>) -> Result<()> {
        self.sheets.get_mut(title)?.rows.extend(rows);
        Ok(())
    }

    fn remove_sheet(&mut self, title: &str) -> Result<bool> {
        Ok(self.sheets.remove(title))
    }

    fn persist(&mut self, path: &Path) -> Result<()> {
        self.persisted_to.push(path.to_path_buf());
        Ok(())
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.names()
    }

    fn row_count(&self, title: &str) -> Option<usize> {
        self.sheets.get(title).map(|s| s.rows.len())
    }
}
