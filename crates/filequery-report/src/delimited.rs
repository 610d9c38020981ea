//! CSV and DAT writers.

use std::io::Write;

use csv::{QuoteStyle, WriterBuilder};
use filequery_core::RecordSet;

use crate::error::WriteResult;
use crate::schema::ReportSchema;

/// Delimiter and quote characters for a delimited format.
///
/// Every field is quoted. A quote character inside a field is doubled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
    pub quote: u8,
}

impl Dialect {
    /// Comma separated, double-quote quoted.
    pub const CSV: Self = Self {
        delimiter: b',',
        quote: b'"',
    };

    /// Pipe separated, caret quoted.
    pub const DAT: Self = Self {
        delimiter: b'|',
        quote: b'^',
    };
}

/// Write a header row followed by one row per record.
///
/// Returns the number of data rows written.
pub fn write_delimited<W: Write>(
    writer: W,
    records: &RecordSet,
    schema: &ReportSchema,
    dialect: Dialect,
) -> WriteResult<usize> {
    let mut out = WriterBuilder::new()
        .delimiter(dialect.delimiter)
        .quote(dialect.quote)
        .quote_style(QuoteStyle::Always)
        .double_quote(true)
        .from_writer(writer);

    out.write_record(schema.headers())?;

    let mut rows = 0;
    for record in records {
        let cells = schema.row(record);
        out.write_record(cells.iter().map(|cell| cell.as_bytes()))?;
        rows += 1;
    }

    out.flush()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use filequery_core::{FileRecord, TextSnippets};

    fn render(records: &RecordSet, dialect: Dialect) -> String {
        let mut buf = Vec::new();
        write_delimited(&mut buf, records, &ReportSchema::default(), dialect).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn record_with_text(path: &str, text: &str) -> FileRecord {
        let mut record = FileRecord::new(path);
        record.size_bytes = Some(text.len() as u64);
        record.type_description = Some("ASCII text".to_string());
        record.text = Some(TextSnippets {
            text: text.to_string(),
            text_escaped: text.to_string(),
            ..Default::default()
        });
        record
    }

    #[test]
    fn test_empty_set_writes_header_only() {
        let out = render(&RecordSet::new(), Dialect::CSV);
        assert_eq!(out.lines().count(), 1);
        assert!(out.starts_with("\"fullname\",\"file name\",\"extension\""));
    }

    #[test]
    fn test_every_field_quoted() {
        let records: RecordSet = [record_with_text("/d/a.txt", "plain")].into_iter().collect();
        let out = render(&records, Dialect::CSV);
        let row = out.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "\"/d/a.txt\",\"a\",\".txt\",\"5\",\"not applicable\",\"ASCII text\",\"plain\",\"plain\",\"none\""
        );
    }

    #[test]
    fn test_dat_dialect_doubles_carets() {
        let records: RecordSet = [record_with_text("/d/b.txt", "x^y|z")].into_iter().collect();
        let out = render(&records, Dialect::DAT);
        let row = out.lines().nth(1).unwrap();
        assert!(row.starts_with("^/d/b.txt^|^b^|^.txt^|"));
        assert!(row.contains("^x^^y|z^"));
    }

    #[test]
    fn test_csv_doubles_quotes() {
        let records: RecordSet = [record_with_text("/d/c.txt", "say \"hi\", ok")]
            .into_iter()
            .collect();
        let out = render(&records, Dialect::CSV);
        assert!(out.contains("\"say \"\"hi\"\", ok\""));
    }
}
