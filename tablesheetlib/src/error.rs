//! Error types for tablesheetlib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while parsing a report or writing a workbook
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Input path does not exist
    #[error("input file does not exist: {0}")]
    InputNotFound(PathBuf),

    /// Failed to read the input report
    #[error("failed to read input '{path}': {source}")]
    InputRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A table cannot be turned into sheets (e.g. it has no header)
    #[error("malformed table #{index}: {reason}")]
    MalformedTable { index: usize, reason: String },

    /// Writer options are out of range
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// A sheet with this title already exists in the document
    #[error("sheet '{0}' already exists")]
    DuplicateSheet(String),

    /// Row appended to a sheet that was never created
    #[error("no sheet named '{0}'")]
    UnknownSheet(String),

    /// Title rejected by the spreadsheet format
    #[error("invalid sheet name '{name}': {reason}")]
    InvalidSheetName { name: String, reason: String },

    /// A row does not fit in a sheet of the output format
    #[error("sheet '{name}' over limit: {reason}")]
    SheetLimit { name: String, reason: String },

    /// The xlsx library failed to render the workbook
    #[error("xlsx error: {0}")]
    Xlsx(String),

    /// Failed to write the finished document to its destination
    #[error("failed to write '{path}': {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A table worker panicked
    #[error("table worker panicked: {0}")]
    WorkerPanicked(String),

    /// Work stopped because another table failed first
    #[error("conversion aborted")]
    Aborted,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rust_xlsxwriter::XlsxError> for ConvertError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ConvertError::Xlsx(err.to_string())
    }
}
