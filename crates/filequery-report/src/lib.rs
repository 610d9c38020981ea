//! Report writers for filequery.
//!
//! A [`RecordSet`] is written with one column layout, the
//! [`ReportSchema`], in any of three formats:
//!
//! - **CSV**: comma separated, every field double-quoted
//! - **DAT**: pipe separated, every field quoted with `^`
//! - **HTML**: a self-contained table page, capped at [`HTML_ROW_CAP`] rows
//!
//! Missing values are written as placeholders so that no cell is left
//! out of a row.

mod delimited;
mod error;
mod html;
mod schema;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use filequery_core::{OutputFormat, RecordSet};

pub use delimited::{Dialect, write_delimited};
pub use error::{WriteError, WriteResult};
pub use html::{HTML_ROW_CAP, HtmlWriter};
pub use schema::{Column, NOT_APPLICABLE, PLACEHOLDER, ReportSchema, UNAVAILABLE};

/// Base name of report files.
pub const REPORT_STEM: &str = "datafile";

/// File name for a report, with an optional timestamp suffix.
///
/// `datafile.csv` without a stamp, `datafile-<stamp>.csv` with one.
pub fn report_file_name(format: OutputFormat, stamp: Option<&str>) -> String {
    match stamp {
        Some(stamp) => format!("{REPORT_STEM}-{stamp}.{}", format.extension()),
        None => format!("{REPORT_STEM}.{}", format.extension()),
    }
}

/// Write `records` in `format` to `writer`.
///
/// Returns the number of data rows written.
pub fn write_to<W: Write>(
    writer: W,
    records: &RecordSet,
    format: OutputFormat,
    schema: &ReportSchema,
) -> WriteResult<usize> {
    match format {
        OutputFormat::Csv => write_delimited(writer, records, schema, Dialect::CSV),
        OutputFormat::Dat => write_delimited(writer, records, schema, Dialect::DAT),
        OutputFormat::Html => HtmlWriter::new()?.write(writer, records, schema),
    }
}

/// Create `path` and write the report into it.
///
/// The file is opened once and flushed before returning.
pub fn write_report(
    path: &Path,
    records: &RecordSet,
    format: OutputFormat,
    schema: &ReportSchema,
) -> WriteResult<usize> {
    let file = File::create(path).map_err(|source| WriteError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let mut out = BufWriter::new(file);
    let rows = write_to(&mut out, records, format, schema)?;
    out.flush()?;

    tracing::info!(
        path = %path.display(),
        %format,
        rows,
        "report written"
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_file_name() {
        assert_eq!(report_file_name(OutputFormat::Csv, None), "datafile.csv");
        assert_eq!(
            report_file_name(OutputFormat::Html, Some("20240102-030405")),
            "datafile-20240102-030405.html"
        );
        assert_eq!(report_file_name(OutputFormat::Dat, None), "datafile.dat");
    }
}
