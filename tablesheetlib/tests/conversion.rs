//! End-to-end tests: report text through to document contents.

use std::path::Path;

use parking_lot::Mutex;
use tablesheetlib::{
    parse_str, write_document, Cell, Concurrency, DocumentSink, FnProgress, MemoryDocument,
    NoProgress, Table, WriteOptions, SENTINEL_PREFIX, SUMMARY_SHEET_TITLE,
};

fn sentinel(column: &str) -> String {
    format!("{} {}\n", SENTINEL_PREFIX, column)
}

/// A report with `sizes.len()` tables; table `i` has `sizes[i]` data rows.
fn report(sizes: &[usize]) -> String {
    let mut text = String::from("comparison run started\n\n");
    for (i, &rows) in sizes.iter().enumerate() {
        let name = format!("col{}", i);
        text.push_str(&sentinel(&name));
        text.push_str(&format!("| id | {}_onPrem | {}_onCloud |\n", name, name));
        for r in 0..rows {
            text.push_str(&format!("| {} | src-{}-{} | tgt-{}-{} |\n", r, i, r, i, r));
        }
    }
    text.push_str(&sentinel("end"));
    text
}

fn convert(tables: &[Table], options: &WriteOptions) -> MemoryDocument {
    let mut doc = MemoryDocument::new();
    write_document(tables, &mut doc, Path::new("out.xlsx"), options, &NoProgress).unwrap();
    doc
}

#[test]
fn test_end_to_end_scenario() {
    let text = format!(
        "{}| col1 | col2_onCloud |\n| v1 | v2 |\n| v3 | v4 |\n{}",
        sentinel("col2"),
        sentinel("col2")
    );
    let tables = parse_str(&text);
    let doc = convert(&tables, &WriteOptions::new());

    assert_eq!(doc.sheet_names(), vec!["Summary", "col2_1"]);

    let summary = doc.sheet(SUMMARY_SHEET_TITLE).unwrap();
    assert_eq!(summary.rows[1], vec![Cell::from("col2"), Cell::Number(2.0)]);

    let sheet = doc.sheet("col2_1").unwrap();
    let text_rows: Vec<Vec<String>> = sheet
        .rows
        .iter()
        .map(|r| r.iter().map(Cell::as_text).collect())
        .collect();
    assert_eq!(
        text_rows,
        vec![
            vec!["col1", "col2_onCloud"],
            vec!["v1", "v2"],
            vec!["v3", "v4"],
        ]
    );
}

#[test]
fn test_summary_counts_match_rows() {
    let sizes = [4, 0, 7, 1];
    let tables = parse_str(&report(&sizes));
    let doc = convert(&tables, &WriteOptions::new().max_rows_per_sheet(3));

    let summary = doc.sheet(SUMMARY_SHEET_TITLE).unwrap();
    assert_eq!(summary.rows.len(), sizes.len() + 1);
    for (i, &rows) in sizes.iter().enumerate() {
        assert_eq!(
            summary.rows[i + 1],
            vec![Cell::from(format!("col{}", i)), Cell::from(rows)]
        );
    }
}

#[test]
fn test_concurrent_matches_single_threaded() {
    let sizes: Vec<usize> = (0..24).map(|i| (i * 7) % 23).collect();
    let tables = parse_str(&report(&sizes));
    let options = WriteOptions::new().max_rows_per_sheet(5).append_chunk(2);

    let concurrent = convert(&tables, &options);
    let reference = convert(&tables, &options.clone().concurrency(Concurrency::Bounded(1)));

    // Summary + ceil(rows / max) per table, with header-only tables getting one sheet.
    let expected_sheets: usize = 1 + sizes.iter().map(|&n| n.div_ceil(5).max(1)).sum::<usize>();
    assert_eq!(concurrent.sheet_names().len(), expected_sheets);
    assert_eq!(concurrent.sheet_names()[0], SUMMARY_SHEET_TITLE);

    let mut names = concurrent.sheet_names();
    let mut reference_names = reference.sheet_names();
    names.sort();
    reference_names.sort();
    assert_eq!(names, reference_names);

    for name in &names {
        assert_eq!(concurrent.sheet(name), reference.sheet(name), "sheet {}", name);
    }

    // No lost or duplicated rows: data rows across table sheets add up.
    let data_rows: usize = concurrent
        .sheets()
        .filter(|s| s.title != SUMMARY_SHEET_TITLE)
        .map(|s| s.rows.len() - 1)
        .sum();
    assert_eq!(data_rows, sizes.iter().sum::<usize>());
}

#[test]
fn test_rows_keep_input_order_across_sheets() {
    let tables = parse_str(&report(&[11]));
    let doc = convert(&tables, &WriteOptions::new().max_rows_per_sheet(4).append_chunk(3));

    let ids: Vec<String> = ["col0_1", "col0_2", "col0_3"]
        .iter()
        .flat_map(|t| doc.sheet(t).unwrap().rows[1..].to_vec())
        .map(|row| row[0].as_text())
        .collect();
    let expected: Vec<String> = (0..11).map(|i| i.to_string()).collect();
    assert_eq!(ids, expected);
}

#[test]
fn test_progress_reaches_100_then_resets() {
    let events = Mutex::new(Vec::new());
    let progress = FnProgress(|label: &str, percent: f64| {
        events.lock().push((label.to_string(), percent));
    });

    let tables = parse_str(&report(&[1, 2, 3, 4]));
    let mut doc = MemoryDocument::new();
    write_document(
        &tables,
        &mut doc,
        Path::new("out.xlsx"),
        &WriteOptions::new(),
        &progress,
    )
    .unwrap();

    let events = events.into_inner();
    assert_eq!(events.len(), 5);
    let mut percents: Vec<f64> = events[..4].iter().map(|(_, p)| *p).collect();
    percents.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(percents, vec![25.0, 50.0, 75.0, 100.0]);
    assert!(events[..4].iter().all(|(l, _)| l.starts_with("Converting: col")));
    assert_eq!(events[4], ("Converting:".to_string(), 0.0));
}
