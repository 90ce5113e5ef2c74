//! Writer options.
//!
//! This module contains the configuration types that control how parsed
//! tables are laid out across sheets and how many workers write them.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Row ceiling per table sheet used by the command-line tool.
pub const DEFAULT_MAX_ROWS_PER_SHEET: usize = 250_000;

/// Rows appended per document lock acquisition.
pub const DEFAULT_APPEND_CHUNK: usize = 1024;

/// What to do with a table that has a header but no data rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EmptyTablePolicy {
    /// Emit one sheet holding only the header
    #[default]
    HeaderSheet,
    /// Emit no sheet; the table only shows up in the summary
    Skip,
}

impl FromStr for EmptyTablePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "header" | "header-sheet" => Ok(EmptyTablePolicy::HeaderSheet),
            "skip" => Ok(EmptyTablePolicy::Skip),
            _ => Err(format!("Unknown empty table policy: {}", s)),
        }
    }
}

/// How many table workers run at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Concurrency {
    /// One worker per table
    #[default]
    PerTable,
    /// At most this many workers, pulling tables from a shared queue
    Bounded(usize),
}

impl Concurrency {
    /// Bounded pool sized to the machine's available parallelism.
    pub fn available() -> Self {
        let n = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Concurrency::Bounded(n)
    }

    /// Number of worker threads to spawn for `tables` tables.
    pub fn workers_for(&self, tables: usize) -> usize {
        match *self {
            Concurrency::PerTable => tables,
            Concurrency::Bounded(n) => n.max(1).min(tables),
        }
    }
}

/// Options for writing tables into a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteOptions {
    /// Maximum data rows per table sheet (header excluded)
    pub max_rows_per_sheet: usize,
    /// Handling of header-only tables
    pub empty_tables: EmptyTablePolicy,
    /// Worker fan-out
    pub concurrency: Concurrency,
    /// Rows appended per lock acquisition
    pub append_chunk: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            max_rows_per_sheet: DEFAULT_MAX_ROWS_PER_SHEET,
            empty_tables: EmptyTablePolicy::default(),
            concurrency: Concurrency::default(),
            append_chunk: DEFAULT_APPEND_CHUNK,
        }
    }
}

impl WriteOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the row ceiling per sheet.
    pub fn max_rows_per_sheet(mut self, rows: usize) -> Self {
        self.max_rows_per_sheet = rows;
        self
    }

    /// Set the header-only table policy.
    pub fn empty_tables(mut self, policy: EmptyTablePolicy) -> Self {
        self.empty_tables = policy;
        self
    }

    /// Set worker fan-out.
    pub fn concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set rows appended per lock acquisition.
    pub fn append_chunk(mut self, rows: usize) -> Self {
        self.append_chunk = rows;
        self
    }

    /// Check that the options can drive a conversion.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_rows_per_sheet == 0 {
            return Err("max_rows_per_sheet must be at least 1".to_string());
        }
        if self.append_chunk == 0 {
            return Err("append_chunk must be at least 1".to_string());
        }
        if self.concurrency == Concurrency::Bounded(0) {
            return Err("bounded concurrency needs at least one worker".to_string());
        }
        Ok(())
    }
}
