//! High-level conversion API: report file in, workbook file out.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::options::WriteOptions;
use crate::parser::parse_file;
use crate::progress::ProgressSink;
use crate::writer::{write_workbook, WriteReport};
use crate::Result;

/// Output path next to the input: same directory and stem, `.xlsx` extension.
pub fn default_output_path(input: impl AsRef<Path>) -> PathBuf {
    input.as_ref().with_extension("xlsx")
}

/// Convert the report at `input` into an xlsx workbook at `output`.
///
/// Input errors are returned before anything is written.
///
/// # Example
///
/// ```rust
/// use tablesheetlib::{convert_file, NoProgress, WriteOptions};
/// use std::fs;
/// use tempfile::tempdir;
///
/// let dir = tempdir().unwrap();
/// let input = dir.path().join("report.txt");
/// fs::write(&input, "| id | status_onCloud |\n| 1 | open |\n").unwrap();
///
/// let output = dir.path().join("report.xlsx");
/// let report = convert_file(&input, &output, &WriteOptions::new(), &NoProgress).unwrap();
/// assert_eq!(report.summary[0].column_name, "status");
/// assert!(output.exists());
/// ```
pub fn convert_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &WriteOptions,
    progress: &dyn ProgressSink,
) -> Result<WriteReport> {
    let input = input.as_ref();
    let tables = parse_file(input)?;
    info!(input = %input.display(), tables = tables.len(), "report parsed");

    write_workbook(&tables, output, options, progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;
    use crate::progress::NoProgress;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path("/data/run-1/report.txt"),
            PathBuf::from("/data/run-1/report.xlsx")
        );
        assert_eq!(default_output_path("report"), PathBuf::from("report.xlsx"));
    }

    #[test]
    fn test_missing_input_writes_nothing() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.xlsx");
        let err = convert_file(
            dir.path().join("missing.txt"),
            &output,
            &WriteOptions::new(),
            &NoProgress,
        )
        .unwrap_err();

        assert!(matches!(err, ConvertError::InputNotFound(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_convert_writes_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("report.txt");
        fs::write(
            &input,
            "[FAILED] Source and Target Data is not matching for column col2\n\
             | col1 | col2_onCloud |\n\
             | v1 | v2 |\n\
             | v3 | v4 |\n\
             [FAILED] Source and Target Data is not matching for column col2\n",
        )
        .unwrap();
        let output = default_output_path(&input);

        let report = convert_file(&input, &output, &WriteOptions::new(), &NoProgress).unwrap();

        assert_eq!(report.summary.len(), 1);
        assert_eq!(report.summary[0].column_name, "col2");
        assert_eq!(report.summary[0].mismatch_count, 2);
        assert_eq!(report.sheets[0].title, "col2_1");
        assert_eq!(&fs::read(&output).unwrap()[..2], b"PK");
    }
}
