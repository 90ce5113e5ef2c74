//! Writing parsed tables into a document.
//!
//! A conversion runs in four steps:
//!
//! 1. **Plan**: derive every table's name and sheet titles, rejecting
//!    malformed tables before anything is written.
//! 2. **Summary**: single-threaded, write the `Summary` sheet with one
//!    `(name, mismatch_count)` row per table in input order.
//! 3. **Tables**: one worker per table (or a bounded pool) creates the
//!    table's sheets and appends its rows. Every document call goes through
//!    one lock; converting rows to cells happens outside it.
//! 4. **Finalize**: join all workers, drop the unused default sheet, persist
//!    once.
//!
//! The first worker failure stops the others at their next chunk and is
//! returned; the document is not persisted in that case.

use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::document::xlsx::MAX_ROWS;
use crate::document::{text_row, Cell, DocumentSink, XlsxDocument, DEFAULT_SHEET_TITLE};
use crate::error::ConvertError;
use crate::options::WriteOptions;
use crate::plan::{plan_tables, TablePlan};
use crate::progress::{ProgressSink, SharedProgress};
use crate::table::{MismatchSummaryEntry, Table};
use crate::Result;

/// Title of the summary sheet.
pub const SUMMARY_SHEET_TITLE: &str = "Summary";

/// Header row of the summary sheet.
pub const SUMMARY_HEADER: [&str; 2] = ["mismatch_column", "mismatch_count"];

/// One sheet written for a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetReport {
    /// Position of the source table in the input
    pub table: usize,
    /// Sheet title
    pub title: String,
    /// Data rows written (header excluded)
    pub data_rows: usize,
}

/// What a successful conversion produced.
#[derive(Debug, Clone, Serialize)]
pub struct WriteReport {
    /// Where the document was persisted
    pub destination: PathBuf,
    /// Summary rows, in input order
    pub summary: Vec<MismatchSummaryEntry>,
    /// Table sheets, grouped by table in input order
    pub sheets: Vec<SheetReport>,
}

impl WriteReport {
    /// Sheets in the document, summary included.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len() + 1
    }

    /// Total data rows across all tables.
    pub fn total_mismatches(&self) -> usize {
        self.summary.iter().map(|e| e.mismatch_count).sum()
    }
}

/// Write `tables` into a fresh xlsx workbook at `destination`.
pub fn write_workbook(
    tables: &[Table],
    destination: impl AsRef<Path>,
    options: &WriteOptions,
    progress: &dyn ProgressSink,
) -> Result<WriteReport> {
    if options.max_rows_per_sheet >= MAX_ROWS {
        return Err(ConvertError::InvalidOptions(format!(
            "max_rows_per_sheet must be below {} for xlsx output",
            MAX_ROWS
        )));
    }
    let mut document = XlsxDocument::new();
    write_document(tables, &mut document, destination.as_ref(), options, progress)
}

/// Write `tables` into `document` and persist it to `destination`.
///
/// The progress indicator is reset to idle whether or not the write succeeds.
pub fn write_document<D: DocumentSink>(
    tables: &[Table],
    document: &mut D,
    destination: &Path,
    options: &WriteOptions,
    progress: &dyn ProgressSink,
) -> Result<WriteReport> {
    let shared = SharedProgress::new(progress, tables.len());
    let result = write_and_persist(tables, document, destination, options, &shared);
    shared.reset();

    if let Err(e) = &result {
        warn!(error = %e, "conversion failed");
    }
    result
}

fn write_and_persist<D: DocumentSink>(
    tables: &[Table],
    document: &mut D,
    destination: &Path,
    options: &WriteOptions,
    progress: &SharedProgress<'_>,
) -> Result<WriteReport> {
    options.validate().map_err(ConvertError::InvalidOptions)?;

    let plans = plan_tables(tables, options, &[SUMMARY_SHEET_TITLE])?;
    info!(
        tables = tables.len(),
        sheets = plans.iter().map(|p| p.sheets.len()).sum::<usize>(),
        "writing workbook"
    );

    let summary = write_summary(tables, &plans, document)?;
    let sheets = write_table_sheets(tables, &plans, document, options, progress)?;

    if document.row_count(DEFAULT_SHEET_TITLE) == Some(0) {
        document.remove_sheet(DEFAULT_SHEET_TITLE)?;
        debug!("removed unused default sheet");
    }

    document.persist(destination)?;
    info!(destination = %destination.display(), "workbook saved");

    Ok(WriteReport {
        destination: destination.to_path_buf(),
        summary,
        sheets,
    })
}

/// Write the summary sheet. Runs before any table sheet exists.
fn write_summary<D: DocumentSink>(
    tables: &[Table],
    plans: &[TablePlan],
    document: &mut D,
) -> Result<Vec<MismatchSummaryEntry>> {
    document.create_sheet(SUMMARY_SHEET_TITLE)?;
    document.append_row(SUMMARY_SHEET_TITLE, text_row(&SUMMARY_HEADER))?;

    let entries: Vec<MismatchSummaryEntry> = tables
        .iter()
        .zip(plans)
        .map(|(table, plan)| MismatchSummaryEntry {
            column_name: plan.name.clone(),
            mismatch_count: table.mismatch_count(),
        })
        .collect();

    let rows = entries
        .iter()
        .map(|e| vec![Cell::from(&e.column_name), Cell::from(e.mismatch_count)])
        .collect();
    document.append_rows(SUMMARY_SHEET_TITLE, rows)?;

    Ok(entries)
}

/// Shared state of one table-writing pass.
struct Pass<'a, 'p, D> {
    tables: &'a [Table],
    plans: &'a [TablePlan],
    options: &'a WriteOptions,
    document: Mutex<&'a mut D>,
    progress: &'a SharedProgress<'p>,
    next: AtomicUsize,
    abort: AtomicBool,
    first_error: Mutex<Option<ConvertError>>,
}

fn write_table_sheets<D: DocumentSink>(
    tables: &[Table],
    plans: &[TablePlan],
    document: &mut D,
    options: &WriteOptions,
    progress: &SharedProgress<'_>,
) -> Result<Vec<SheetReport>> {
    let workers = options.concurrency.workers_for(tables.len());
    let pass = Pass {
        tables,
        plans,
        options,
        document: Mutex::new(document),
        progress,
        next: AtomicUsize::new(0),
        abort: AtomicBool::new(false),
        first_error: Mutex::new(None),
    };

    let mut reports: Vec<SheetReport> = Vec::new();
    thread::scope(|scope| {
        let pass = &pass;
        let handles: Vec<_> = (0..workers)
            .map(|_| scope.spawn(move || pass.run_worker()))
            .collect();

        for handle in handles {
            match handle.join() {
                Ok(done) => reports.extend(done),
                Err(payload) => pass.fail(ConvertError::WorkerPanicked(panic_message(payload))),
            }
        }
    });

    if let Some(err) = pass.first_error.into_inner() {
        return Err(err);
    }

    reports.sort_by_key(|r| r.table);
    Ok(reports)
}

impl<D: DocumentSink> Pass<'_, '_, D> {
    /// Take tables off the queue until it is empty or the pass is aborted.
    fn run_worker(&self) -> Vec<SheetReport> {
        let mut done = Vec::new();
        loop {
            let index = self.next.fetch_add(1, Ordering::SeqCst);
            if index >= self.tables.len() || self.abort.load(Ordering::SeqCst) {
                break;
            }

            let plan = &self.plans[index];
            match self.write_table(&self.tables[index], plan) {
                Ok(reports) => {
                    self.progress.table_done(&plan.name);
                    done.extend(reports);
                }
                Err(err) => {
                    self.fail(err);
                    break;
                }
            }
        }
        done
    }

    fn write_table(&self, table: &Table, plan: &TablePlan) -> Result<Vec<SheetReport>> {
        let header = text_row(&table.header);
        let mut reports = Vec::with_capacity(plan.sheets.len());

        for sheet in &plan.sheets {
            self.check_abort()?;
            {
                let mut doc = self.document.lock();
                doc.create_sheet(&sheet.title)?;
                doc.append_row(&sheet.title, header.clone())?;
            }

            for chunk in table.rows[sheet.rows.clone()].chunks(self.options.append_chunk) {
                self.check_abort()?;
                let rows: Vec<Vec<Cell>> = chunk.iter().map(|r| text_row(r)).collect();
                self.document.lock().append_rows(&sheet.title, rows)?;
            }

            debug!(sheet = %sheet.title, rows = sheet.rows.len(), "sheet written");
            reports.push(SheetReport {
                table: plan.index,
                title: sheet.title.clone(),
                data_rows: sheet.rows.len(),
            });
        }

        Ok(reports)
    }

    fn check_abort(&self) -> Result<()> {
        if self.abort.load(Ordering::SeqCst) {
            Err(ConvertError::Aborted)
        } else {
            Ok(())
        }
    }

    /// Record a failure; only the first one is kept.
    fn fail(&self, err: ConvertError) {
        self.abort.store(true, Ordering::SeqCst);
        let mut slot = self.first_error.lock();
        if slot.is_none() && !matches!(err, ConvertError::Aborted) {
            *slot = Some(err);
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
