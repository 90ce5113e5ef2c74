//! Sheet planning: which sheets each table gets and which rows go where.
//!
//! Planning runs once, in input order, before any worker starts. That keeps
//! sheet titles deterministic even though workers race to create them, and
//! rejects malformed tables before the document is touched.
//!
//! Title rules:
//!
//! - A table named `status` with three sheets gets `status_1`, `status_2`,
//!   `status_3`.
//! - Characters spreadsheets refuse in titles (`[]:*?/\`) become `_`, and the
//!   name is shortened so the longest title fits in 31 characters.
//! - When a title is already taken (case-insensitively, including the summary
//!   sheet) the table's stem becomes `<name>~2`, `<name>~3`, ... until all of
//!   its titles are free.

use std::collections::HashSet;
use std::ops::Range;

use serde::Serialize;
use tracing::warn;

use crate::document::title_key;
use crate::document::xlsx::{FORBIDDEN_NAME_CHARS, MAX_SHEET_NAME_LEN};
use crate::error::ConvertError;
use crate::options::{EmptyTablePolicy, WriteOptions};
use crate::table::Table;
use crate::Result;

/// One sheet of a table: its title and the slice of data rows it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetPlan {
    /// Sheet title, unique within the document
    pub title: String,
    /// Data rows written below the header
    pub rows: Range<usize>,
}

/// All sheets for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TablePlan {
    /// Position of the table in the input
    pub index: usize,
    /// Derived table name, as shown in the summary
    pub name: String,
    /// Title stem actually used for the sheets
    pub stem: String,
    /// Sheets in order
    pub sheets: Vec<SheetPlan>,
}

/// Plan sheets for every table. `reserved` titles are treated as taken.
pub fn plan_tables(
    tables: &[Table],
    options: &WriteOptions,
    reserved: &[&str],
) -> Result<Vec<TablePlan>> {
    let mut taken: HashSet<String> = reserved.iter().map(|t| title_key(t)).collect();
    let mut plans = Vec::with_capacity(tables.len());

    for (index, table) in tables.iter().enumerate() {
        let name = table_name(index, table)?;
        let ranges = split_rows(table.rows.len(), options);
        let plan = plan_one(index, name, ranges, &mut taken);
        if plan.stem != sanitize(name) {
            warn!(table = index, name, stem = %plan.stem, "table sheets use an adjusted name");
        }
        plans.push(plan);
    }

    Ok(plans)
}

/// Derived name of a table, or a malformed-table error.
pub fn table_name(index: usize, table: &Table) -> Result<&str> {
    match table.name() {
        None => Err(ConvertError::MalformedTable {
            index,
            reason: "table has no header".to_string(),
        }),
        Some(name) if name.trim().is_empty() => Err(ConvertError::MalformedTable {
            index,
            reason: format!(
                "last header cell '{}' gives an empty table name",
                table.header.last().map(String::as_str).unwrap_or_default()
            ),
        }),
        Some(name) => Ok(name),
    }
}

/// Row ranges for `rows` data rows under the configured ceiling.
pub fn split_rows(rows: usize, options: &WriteOptions) -> Vec<Range<usize>> {
    let max = options.max_rows_per_sheet.max(1);
    let mut ranges: Vec<Range<usize>> = (0..rows)
        .step_by(max)
        .map(|start| start..(start + max).min(rows))
        .collect();
    if ranges.is_empty() && options.empty_tables == EmptyTablePolicy::HeaderSheet {
        ranges.push(0..0);
    }
    ranges
}

fn plan_one(
    index: usize,
    name: &str,
    ranges: Vec<Range<usize>>,
    taken: &mut HashSet<String>,
) -> TablePlan {
    let base = sanitize(name);
    let suffix_len = ranges.len().to_string().len() + 1;

    let mut occurrence = 1;
    let (stem, titles) = loop {
        let marker = if occurrence == 1 {
            String::new()
        } else {
            format!("~{}", occurrence)
        };
        let room = MAX_SHEET_NAME_LEN.saturating_sub(suffix_len + marker.chars().count());
        let stem = format!("{}{}", truncate(&base, room), marker);
        let titles: Vec<String> = (1..=ranges.len())
            .map(|n| format!("{}_{}", stem, n))
            .collect();

        if titles.iter().all(|t| !taken.contains(&title_key(t))) {
            break (stem, titles);
        }
        occurrence += 1;
    };

    taken.extend(titles.iter().map(|t| title_key(t)));

    TablePlan {
        index,
        name: name.to_string(),
        stem,
        sheets: titles
            .into_iter()
            .zip(ranges)
            .map(|(title, rows)| SheetPlan { title, rows })
            .collect(),
    }
}

fn sanitize(name: &str) -> String {
    name.trim()
        .trim_matches('\'')
        .chars()
        .map(|c| if FORBIDDEN_NAME_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
