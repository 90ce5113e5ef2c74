//! Parser for pipe-delimited mismatch reports.
//!
//! A report is free text with tables embedded in it:
//!
//! ```text
//! [FAILED] Source and Target Data is not matching for column status
//! | id | status_onCloud |
//! | 1  | open           |
//! | 2  | closed         |
//! [FAILED] Source and Target Data is not matching for column amount
//! ```
//!
//! Lines starting with `|` are table rows; the first one after a sentinel is
//! the header. A sentinel line closes the table in progress. Anything else is
//! ignored. The closing sentinel of the last table is optional.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::ConvertError;
use crate::table::Table;
use crate::Result;

/// Literal prefix of the line that closes a table.
pub const SENTINEL_PREFIX: &str = "[FAILED] Source and Target Data is not matching for column";

const CELL_SEPARATOR: &str = " | ";

/// Parse report text into tables, in order of appearance.
pub fn parse_str(text: &str) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut current: Option<Table> = None;

    for line in text.lines() {
        if line.starts_with('|') {
            let cells = parse_row(line);
            match current.as_mut() {
                Some(table) => table.rows.push(cells),
                None => current = Some(Table::new(cells)),
            }
        } else if line.starts_with(SENTINEL_PREFIX) {
            if let Some(table) = current.take() {
                tables.push(table);
            }
        }
    }

    if let Some(table) = current {
        tables.push(table);
    }

    debug!(tables = tables.len(), "parsed report");
    tables
}

/// Read and parse a report file.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<Table>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConvertError::InputNotFound(path.to_path_buf()));
    }

    let bytes = fs::read(path).map_err(|source| ConvertError::InputRead {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(parse_str(&String::from_utf8_lossy(&bytes)))
}

/// Split one `|` line into trimmed cells.
///
/// The line is split on `" | "`. The first cell keeps a leading `"| "` and
/// the last one a trailing `" |"` after the split; both fragments are dropped
/// before whitespace is trimmed. A bare `|a|` has neither fragment and is kept.
pub fn parse_row(line: &str) -> Vec<String> {
    line.trim()
        .split(CELL_SEPARATOR)
        .map(|piece| clean_cell(piece.trim()).to_string())
        .collect()
}

fn clean_cell(piece: &str) -> &str {
    let piece = piece.strip_prefix("| ").unwrap_or(piece);
    piece.strip_suffix(" |").unwrap_or(piece).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentinel(column: &str) -> String {
        format!("{} {}", SENTINEL_PREFIX, column)
    }

    #[test]
    fn test_parse_row_basic() {
        assert_eq!(parse_row("| a | b |"), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_row_padded_cells() {
        assert_eq!(
            parse_row("|   id   |  name  | total |\n"),
            vec!["id", "name", "total"]
        );
    }

    #[test]
    fn test_parse_row_without_inner_spaces() {
        // No "| " prefix and no " |" suffix, so the cell is kept as is.
        assert_eq!(parse_row("|a|"), vec!["|a|"]);
    }

    #[test]
    fn test_parse_row_single_cell() {
        assert_eq!(parse_row("| only |"), vec!["only"]);
    }

    #[test]
    fn test_parse_row_empty_inner_cell() {
        assert_eq!(parse_row("| a |  | c |"), vec!["a", "", "c"]);
    }

    #[test]
    fn test_parse_header_and_rows() {
        let text = format!(
            "{}\n| col1 | col2_onCloud |\n| v1 | v2 |\n| v3 | v4 |\n{}\n",
            sentinel("col2"),
            sentinel("col2")
        );
        let tables = parse_str(&text);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].header, vec!["col1", "col2_onCloud"]);
        assert_eq!(tables[0].rows, vec![vec!["v1", "v2"], vec!["v3", "v4"]]);
    }

    #[test]
    fn test_parse_preserves_table_order() {
        let text = format!(
            "| a | first |\n| 1 | 2 |\n{s}\n| b | second |\n{s}\nnoise\n| c | third |\n| 3 | 4 |\n",
            s = sentinel("x")
        );
        let names: Vec<String> = parse_str(&text)
            .iter()
            .map(|t| t.header[1].clone())
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_final_table_without_sentinel() {
        let tables = parse_str("| h |\n| r1 |\n| r2 |");
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].mismatch_count(), 2);
    }

    #[test]
    fn test_trailing_sentinel_adds_no_table() {
        let text = format!("| h |\n| r |\n{}\n{}\n", sentinel("a"), sentinel("b"));
        assert_eq!(parse_str(&text).len(), 1);
    }

    #[test]
    fn test_sentinel_without_rows_is_noop() {
        let text = format!("{}\n\n{}\n", sentinel("a"), sentinel("b"));
        assert!(parse_str(&text).is_empty());
    }

    #[test]
    fn test_header_only_table() {
        let text = format!("{}\n| id | status_onCloud |\n{}\n", sentinel("a"), sentinel("a"));
        let tables = parse_str(&text);
        assert_eq!(tables.len(), 1);
        assert!(tables[0].rows.is_empty());
    }

    #[test]
    fn test_indented_lines_ignored() {
        let text = "  | not | a row |\n  [FAILED] Source and Target Data is not matching for column\n";
        assert!(parse_str(text).is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "| h1 | h2 |\r\n| a | b |\r\n";
        let tables = parse_str(text);
        assert_eq!(tables[0].header, vec!["h1", "h2"]);
        assert_eq!(tables[0].rows[0], vec!["a", "b"]);
    }

    #[test]
    fn test_parse_file_missing() {
        let err = parse_file("/nonexistent/report.txt").unwrap_err();
        assert!(matches!(err, ConvertError::InputNotFound(_)));
    }

    #[test]
    fn test_parse_file_lossy_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        fs::write(&path, b"| h |\n| caf\xe9 |\n").unwrap();

        let tables = parse_file(&path).unwrap();
        assert_eq!(tables[0].rows[0], vec!["caf\u{fffd}"]);
    }
}
