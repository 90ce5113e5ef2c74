//! # tablesheet
//!
//! A CLI tool for turning mismatch reports into xlsx workbooks.
//!
//! ## Overview
//!
//! tablesheet is built on top of tablesheetlib. It reads a text report with
//! pipe-delimited tables, writes one sheet per table (split when a table
//! grows past the row ceiling) plus a `Summary` sheet, and prints the
//! per-table mismatch counts.
//!
//! ## Usage
//!
//! ```bash
//! # Convert report.txt into report.xlsx next to it
//! tablesheet report.txt
//!
//! # Choose the output file and a smaller row ceiling
//! tablesheet report.txt -o /tmp/mismatches.xlsx --max-rows 100000
//!
//! # Limit writer threads and print the result as JSON
//! tablesheet report.txt --jobs 4 --format json
//!
//! # Debug logging
//! tablesheet report.txt -vv
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use console::{Style, Term};
use tablesheetlib::{
    convert_file, default_output_path, Concurrency, EmptyTablePolicy, FnProgress, NoProgress,
    ProgressSink, WriteOptions, WriteReport, DEFAULT_MAX_ROWS_PER_SHEET, SUMMARY_HEADER,
};
use tracing_subscriber::EnvFilter;

/// Width of the name column in the text summary
const NAME_WIDTH: usize = 40;

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("tablesheet")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Arthur Debert")
        .about("Convert pipe-delimited mismatch reports into xlsx workbooks")
        .arg(
            Arg::new("input")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Report file to convert"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_parser(value_parser!(PathBuf))
                .help("Workbook to write (defaults to the input path with .xlsx)"),
        )
        .arg(
            Arg::new("max-rows")
                .long("max-rows")
                .value_parser(value_parser!(usize))
                .default_value("250000")
                .help("Maximum data rows per sheet before a table is split"),
        )
        .arg(
            Arg::new("skip-empty")
                .long("skip-empty")
                .action(ArgAction::SetTrue)
                .help("Do not write sheets for tables without data rows"),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .value_parser(value_parser!(usize))
                .help("Maximum concurrent table writers (default: one per table)"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_parser(["text", "json"])
                .default_value("text")
                .help("How to print the conversion summary"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Do not show progress"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v info, -vv debug)"),
        )
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("tablesheet={level},tablesheetlib={level},warn"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Build writer options from matches
fn build_options(matches: &ArgMatches) -> WriteOptions {
    let max_rows = matches
        .get_one::<usize>("max-rows")
        .copied()
        .unwrap_or(DEFAULT_MAX_ROWS_PER_SHEET);

    let empty_tables = if matches.get_flag("skip-empty") {
        EmptyTablePolicy::Skip
    } else {
        EmptyTablePolicy::HeaderSheet
    };

    let concurrency = match matches.get_one::<usize>("jobs") {
        Some(&n) => Concurrency::Bounded(n),
        None => Concurrency::PerTable,
    };

    WriteOptions::new()
        .max_rows_per_sheet(max_rows)
        .empty_tables(empty_tables)
        .concurrency(concurrency)
}

/// Progress line on stderr, rewritten in place when attached to a terminal
fn progress_printer(term: &Term) -> impl Fn(&str, f64) + Send + Sync + '_ {
    move |label: &str, percent: f64| {
        let line = if percent > 0.0 {
            format!("{:<50} {:>5.1}%", label, percent)
        } else {
            String::new()
        };
        if term.is_term() {
            let _ = term.clear_line();
            let _ = term.write_str(&line);
            if line.is_empty() {
                let _ = term.flush();
            }
        } else if !line.is_empty() {
            let _ = term.write_line(&line);
        }
    }
}

/// Render the summary as an aligned text table
fn render_text(report: &WriteReport) -> String {
    let bold = Style::new().bold();
    let dim = Style::new().dim();
    let mut out = String::new();

    out.push_str(&format!(
        "{}\n",
        bold.apply_to(format!(
            "{:<width$}{:>16}",
            SUMMARY_HEADER[0],
            SUMMARY_HEADER[1],
            width = NAME_WIDTH
        ))
    ));
    out.push_str(&format!("{}\n", "-".repeat(NAME_WIDTH + 16)));

    for entry in &report.summary {
        out.push_str(&format!(
            "{:<width$}{:>16}\n",
            truncate_name(&entry.column_name, NAME_WIDTH - 2),
            entry.mismatch_count,
            width = NAME_WIDTH
        ));
    }

    out.push_str(&format!("{}\n", "-".repeat(NAME_WIDTH + 16)));
    out.push_str(&format!(
        "{:<width$}{:>16}\n",
        format!("Total ({} tables)", report.summary.len()),
        report.total_mismatches(),
        width = NAME_WIDTH
    ));
    out.push_str(&format!(
        "{}\n",
        dim.apply_to(format!(
            "{} sheets written to {}",
            report.sheet_count(),
            report.destination.display()
        ))
    ));
    out
}

/// Truncate a name to fit within max_len
fn truncate_name(name: &str, max_len: usize) -> String {
    let count = name.chars().count();
    if count > max_len {
        let tail: String = name.chars().skip(count - max_len + 2).collect();
        format!("..{}", tail)
    } else {
        name.to_string()
    }
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let input = matches
        .get_one::<PathBuf>("input")
        .cloned()
        .context("missing input path")?;
    let output = matches
        .get_one::<PathBuf>("output")
        .cloned()
        .unwrap_or_else(|| default_output_path(&input));
    let options = build_options(matches);

    let term = Term::stderr();
    let printer = FnProgress(progress_printer(&term));
    let progress: &dyn ProgressSink = if matches.get_flag("quiet") {
        &NoProgress
    } else {
        &printer
    };

    let report = convert_file(&input, &output, &options, progress)
        .with_context(|| format!("converting {}", input.display()))?;

    match matches.get_one::<String>("format").map(|s| s.as_str()) {
        Some("json") => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print!("{}", render_text(&report)),
    }
    Ok(())
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();
    init_logging(matches.get_count("verbose"));

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
