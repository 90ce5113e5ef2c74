//! # tablesheetlib
//!
//! Turns mismatch reports (free text with pipe-delimited tables) into
//! spreadsheet workbooks.
//!
//! ## Overview
//!
//! Data-comparison jobs print one table per mismatching column, each closed
//! by a `[FAILED] Source and Target Data is not matching for column ...`
//! line. This library:
//!
//! - **Parses** the report into ordered [`Table`]s (header + data rows)
//! - **Summarizes** each table as a `(name, mismatch_count)` row on a
//!   `Summary` sheet
//! - **Writes** every table to its own sheets concurrently, splitting tables
//!   that exceed a row ceiling across `name_1`, `name_2`, ...
//! - **Persists** the workbook once, atomically, after all tables are done
//!
//! The table name comes from the last header cell, cut at `_onCloud`
//! (`status_onCloud` → `status`).
//!
//! ## Example
//!
//! ```rust
//! use tablesheetlib::{parse_str, write_document, MemoryDocument, NoProgress, WriteOptions};
//! use std::path::Path;
//!
//! let report = "\
//! [FAILED] Source and Target Data is not matching for column col2
//! | col1 | col2_onCloud |
//! | v1 | v2 |
//! | v3 | v4 |
//! [FAILED] Source and Target Data is not matching for column col2
//! ";
//!
//! let tables = parse_str(report);
//! assert_eq!(tables.len(), 1);
//!
//! let mut doc = MemoryDocument::new();
//! let options = WriteOptions::new().max_rows_per_sheet(250_000);
//! let result = write_document(&tables, &mut doc, Path::new("out.xlsx"), &options, &NoProgress).unwrap();
//!
//! assert_eq!(result.summary[0].column_name, "col2");
//! assert_eq!(result.summary[0].mismatch_count, 2);
//! assert_eq!(doc.sheet("col2_1").unwrap().rows.len(), 3);
//! ```

pub mod convert;
pub mod document;
pub mod error;
pub mod options;
pub mod parser;
pub mod plan;
pub mod progress;
pub mod table;
pub mod writer;

pub use convert::{convert_file, default_output_path};
pub use document::{Cell, DocumentSink, MemoryDocument, SheetData, XlsxDocument};
pub use error::ConvertError;
pub use options::{Concurrency, EmptyTablePolicy, WriteOptions, DEFAULT_MAX_ROWS_PER_SHEET};
pub use parser::{parse_file, parse_row, parse_str, SENTINEL_PREFIX};
pub use plan::{plan_tables, SheetPlan, TablePlan};
pub use progress::{FnProgress, NoProgress, ProgressSink};
pub use table::{MismatchSummaryEntry, Table, TABLE_NAME_MARKER};
pub use writer::{
    write_document, write_workbook, SheetReport, WriteReport, SUMMARY_HEADER, SUMMARY_SHEET_TITLE,
};

/// Result type for tablesheetlib operations
pub type Result<T> = std::result::Result<T, ConvertError>;
