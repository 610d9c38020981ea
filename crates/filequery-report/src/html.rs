//! Self-contained HTML table output.
//!
//! The page is rendered with an [upon] template and carries its own
//! stylesheet. Rows alternate between the `even` and `odd` classes and are
//! capped at [`HTML_ROW_CAP`].
//!
//! Cell values are HTML-escaped by the `html` formatter rather than inserted
//! verbatim. Snippets contain the `<NL>` marker and arbitrary file content,
//! either of which would otherwise be parsed as markup.

use std::borrow::Cow;
use std::io::Write;

use filequery_core::RecordSet;
use serde::Serialize;
use upon::{Engine, Template};

use crate::error::WriteResult;
use crate::schema::ReportSchema;

/// Most data rows rendered into an HTML report.
pub const HTML_ROW_CAP: usize = 100;

const TITLE: &str = "File Query Report";

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{ title | html }}</title>
<style>
body { font-family: sans-serif; margin: 1.5em; color: #222; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #c8ccd0; padding: 4px 8px; text-align: left; vertical-align: top; font-size: 0.9em; }
th { background: #34495e; color: #fff; }
tr.even { background: #fff; }
tr.odd { background: #eef2f6; }
p.summary { color: #555; }
</style>
</head>
<body>
<h1>{{ title | html }}</h1>
<p class="summary">Showing {{ shown }} of {{ total }} files.</p>
<table>
<thead>
<tr>{% for header in headers %}<th>{{ header | html }}</th>{% endfor %}</tr>
</thead>
<tbody>
{% for row in rows %}<tr class="{{ row.class }}">{% for cell in row.cells %}<td>{{ cell | html }}</td>{% endfor %}</tr>
{% endfor %}</tbody>
</table>
</body>
</html>
"#;

#[derive(Serialize)]
struct Page<'a> {
    title: &'a str,
    shown: usize,
    total: usize,
    headers: Vec<&'static str>,
    rows: Vec<Row<'a>>,
}

#[derive(Serialize)]
struct Row<'a> {
    class: &'static str,
    cells: Vec<Cow<'a, str>>,
}

/// Renders record sets as HTML pages.
pub struct HtmlWriter {
    engine: Engine<'static>,
    template: Template<'static>,
    row_cap: usize,
}

impl HtmlWriter {
    /// Compile the page template.
    pub fn new() -> WriteResult<Self> {
        let mut engine = Engine::new();
        engine.add_formatter("html", escape_formatter);
        let template = engine.compile(PAGE)?;
        Ok(Self {
            engine,
            template,
            row_cap: HTML_ROW_CAP,
        })
    }

    /// Render `records` as a page and write it to `writer`.
    ///
    /// Returns the number of data rows rendered.
    pub fn write<W: Write>(
        &self,
        mut writer: W,
        records: &RecordSet,
        schema: &ReportSchema,
    ) -> WriteResult<usize> {
        let rows: Vec<Row<'_>> = records
            .iter()
            .take(self.row_cap)
            .enumerate()
            .map(|(i, record)| Row {
                class: if i % 2 == 0 { "even" } else { "odd" },
                cells: schema.row(record),
            })
            .collect();

        if records.len() > self.row_cap {
            tracing::info!(
                total = records.len(),
                shown = self.row_cap,
                "HTML report truncated"
            );
        }

        let page = Page {
            title: TITLE,
            shown: rows.len(),
            total: records.len(),
            headers: schema.headers(),
            rows,
        };
        let shown = page.shown;

        let html = self.template.render(&self.engine, &page).to_string()?;
        writer.write_all(html.as_bytes())?;
        writer.flush()?;
        Ok(shown)
    }
}

/// Escape markup-significant characters in string values.
fn escape_formatter(f: &mut upon::fmt::Formatter<'_>, value: &upon::Value) -> upon::fmt::Result {
    use std::fmt::Write as _;

    match value {
        upon::Value::String(s) => {
            for ch in s.chars() {
                match ch {
                    '&' => f.write_str("&amp;")?,
                    '<' => f.write_str("&lt;")?,
                    '>' => f.write_str("&gt;")?,
                    '"' => f.write_str("&quot;")?,
                    '\'' => f.write_str("&#39;")?,
                    c => f.write_char(c)?,
                }
            }
        }
        v => upon::fmt::default(f, v)?,
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use filequery_core::{FileRecord, TextSnippets};

    fn render(records: &RecordSet) -> String {
        let mut buf = Vec::new();
        HtmlWriter::new()
            .unwrap()
            .write(&mut buf, records, &ReportSchema::default())
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn records(n: usize) -> RecordSet {
        (0..n)
            .map(|i| FileRecord::new(format!("/d/file{i:03}.txt")))
            .collect()
    }

    #[test]
    fn test_rows_alternate_classes() {
        let html = render(&records(3));
        assert_eq!(html.matches("<tr class=\"even\">").count(), 2);
        assert_eq!(html.matches("<tr class=\"odd\">").count(), 1);
        assert!(html.contains("<th>fullname</th>"));
        assert!(html.contains("Showing 3 of 3 files."));
    }

    #[test]
    fn test_rows_capped() {
        let html = render(&records(HTML_ROW_CAP + 25));
        assert_eq!(html.matches("<tr class=").count(), HTML_ROW_CAP);
        assert!(html.contains("/d/file099.txt"));
        assert!(!html.contains("/d/file100.txt"));
        assert!(html.contains("Showing 100 of 125 files."));
    }

    #[test]
    fn test_cells_escaped() {
        let mut record = FileRecord::new("/d/tags.txt");
        record.text = Some(TextSnippets {
            text: "<b>bold</b><NL>& 'more'".to_string(),
            ..Default::default()
        });
        let set: RecordSet = [record].into_iter().collect();

        let html = render(&set);
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;&lt;NL&gt;&amp; &#39;more&#39;"));
        assert!(!html.contains("<b>bold"));
    }

    #[test]
    fn test_empty_set_renders_header_only() {
        let html = render(&RecordSet::new());
        assert!(html.contains("<title>File Query Report</title>"));
        assert!(html.contains("<th>errors</th>"));
        assert!(html.contains("Showing 0 of 0 files."));
        assert_eq!(html.matches("<tr class=").count(), 0);
    }
}
