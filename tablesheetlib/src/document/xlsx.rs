//! `.xlsx` document sink backed by `rust_xlsxwriter`.
//!
//! Sheets are buffered in memory while the writer works, since sheets may
//! be removed before the end and `rust_xlsxwriter` cannot drop a worksheet
//! once added. On `persist` the workbook is rendered to a buffer, written to
//! a temporary file next to the destination and renamed into place, so a
//! failed conversion never leaves a half-written file at the destination.

use std::io::Write;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;
use tempfile::NamedTempFile;
use tracing::debug;

use super::{Cell, DocumentSink, SheetList};
use crate::error::ConvertError;
use crate::Result;

/// Longest sheet title Excel accepts.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Rows per worksheet in the xlsx format.
pub const MAX_ROWS: usize = 1_048_576;

/// Columns per worksheet in the xlsx format.
pub const MAX_COLS: usize = 16_384;

/// Characters Excel refuses in sheet titles.
pub const FORBIDDEN_NAME_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Buffered xlsx workbook.
///
/// Starts with no sheets, so there is never a blank default sheet for the
/// writer to remove.
#[derive(Debug, Default)]
pub struct XlsxDocument {
    sheets: SheetList,
}

impl XlsxDocument {
    /// Create an empty workbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the workbook to xlsx bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();

        for sheet in self.sheets.iter() {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.title)?;

            for (row_idx, row) in sheet.rows.iter().enumerate() {
                let row_num = row_idx as u32;
                for (col_idx, cell) in row.iter().enumerate() {
                    let col_num = col_idx as u16;
                    match cell {
                        Cell::Text(s) => {
                            worksheet.write_string(row_num, col_num, s)?;
                        }
                        Cell::Number(n) => {
                            worksheet.write_number(row_num, col_num, *n)?;
                        }
                    }
                }
            }
        }

        Ok(workbook.save_to_buffer()?)
    }
}

/// Check a title against the xlsx sheet naming rules.
pub fn validate_sheet_name(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("name is empty".to_string());
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(format!("longer than {} characters", MAX_SHEET_NAME_LEN));
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_NAME_CHARS.contains(c)) {
        return Err(format!("contains forbidden character '{}'", c));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err("starts or ends with an apostrophe".to_string());
    }
    Ok(())
}

impl DocumentSink for XlsxDocument {
    fn create_sheet(&mut self, title: &str) -> Result<()> {
        validate_sheet_name(title).map_err(|reason| ConvertError::InvalidSheetName {
            name: title.to_string(),
            reason,
        })?;
        self.sheets.create(title)
    }

    fn append_row(&mut self, title: &str, row: Vec<Cell>) -> Result<()> {
        if row.len() > MAX_COLS {
            return Err(ConvertError::SheetLimit {
                name: title.to_string(),
                reason: format!("row has {} cells, limit is {}", row.len(), MAX_COLS),
            });
        }
        let sheet = self.sheets.get_mut(title)?;
        if sheet.rows.len() >= MAX_ROWS {
            return Err(ConvertError::SheetLimit {
                name: title.to_string(),
                reason: format!("sheet is full ({} rows)", MAX_ROWS),
            });
        }
        sheet.rows.push(row);
        Ok(())
    }

    fn remove_sheet(&mut self, title: &str) -> Result<bool> {
        Ok(self.sheets.remove(title))
    }

    fn persist(&mut self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        let persist_err = |source: std::io::Error| ConvertError::Persist {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut tmp = NamedTempFile::new_in(&dir).map_err(persist_err)?;
        tmp.write_all(&bytes).map_err(persist_err)?;
        tmp.flush().map_err(persist_err)?;
        tmp.persist(path).map_err(|e| persist_err(e.error))?;

        debug!(path = %path.display(), bytes = bytes.len(), "workbook persisted");
        Ok(())
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.names()
    }

    fn row_count(&self, title: &str) -> Option<usize> {
        self.sheets.get(title).map(|s| s.rows.len())
    }
}
