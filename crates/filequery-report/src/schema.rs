//! Report column schema and placeholder rendering.

use std::borrow::Cow;

use filequery_core::{FileRecord, LineCounts, SnippetSizes};

/// Value written when a field could not be collected.
pub const PLACEHOLDER: &str = "NA";

/// Word-count value for files that are not text.
pub const NOT_APPLICABLE: &str = "not applicable";

/// Value written when an external tool failed for a file.
pub const UNAVAILABLE: &str = "unavailable";

/// One report column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    FullPath,
    ShortName,
    Extension,
    Size,
    WordCount,
    TypeDescription,
    TextField,
    ListField,
    MemoField,
    TextEscaped,
    Error,
}

impl Column {
    /// Header label.
    pub fn header(self) -> &'static str {
        match self {
            Self::FullPath => "fullname",
            Self::ShortName => "file name",
            Self::Extension => "extension",
            Self::Size => "file size",
            Self::WordCount => "word count",
            Self::TypeDescription => "file description",
            Self::TextField => "text field",
            Self::ListField => "list field",
            Self::MemoField => "memo field",
            Self::TextEscaped => "text field escaped",
            Self::Error => "errors",
        }
    }

    /// Render this column's cell for `record`, substituting placeholders
    /// for values that were not collected.
    pub fn render(self, record: &FileRecord) -> Cow<'_, str> {
        let snippet = |field: fn(&filequery_core::TextSnippets) -> &str| match &record.text {
            Some(text) => Cow::Borrowed(field(text)),
            None => Cow::Borrowed(PLACEHOLDER),
        };

        match self {
            Self::FullPath => record.full_path.to_string_lossy(),
            Self::ShortName => Cow::Borrowed(&record.short_name),
            Self::Extension => Cow::Borrowed(&record.extension),
            Self::Size => match record.size_bytes {
                Some(size) => Cow::Owned(size.to_string()),
                None => Cow::Borrowed(PLACEHOLDER),
            },
            Self::WordCount => match record.counts {
                LineCounts::Counted(c) => Cow::Owned(format!(
                    "lines={} words={} chars={}",
                    c.lines, c.words, c.chars
                )),
                LineCounts::NotApplicable => Cow::Borrowed(NOT_APPLICABLE),
                LineCounts::Unavailable => Cow::Borrowed(UNAVAILABLE),
            },
            Self::TypeDescription => match &record.type_description {
                Some(description) => Cow::Borrowed(description),
                None => Cow::Borrowed(UNAVAILABLE),
            },
            Self::TextField => snippet(|t| &t.text),
            Self::ListField => snippet(|t| &t.list),
            Self::MemoField => snippet(|t| &t.memo),
            Self::TextEscaped => snippet(|t| &t.text_escaped),
            Self::Error => Cow::Borrowed(record.status.as_str()),
        }
    }
}

/// Ordered set of columns shared by every output format.
///
/// The list and memo columns are present only when their snippet size is
/// non-zero; the header and every row always have the same width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSchema {
    columns: Vec<Column>,
}

impl ReportSchema {
    /// Schema for the given snippet configuration.
    pub fn new(sizes: &SnippetSizes) -> Self {
        let mut columns = vec![
            Column::FullPath,
            Column::ShortName,
            Column::Extension,
            Column::Size,
            Column::WordCount,
            Column::TypeDescription,
            Column::TextField,
        ];
        if sizes.list > 0 {
            columns.push(Column::ListField);
        }
        if sizes.memo > 0 {
            columns.push(Column::MemoField);
        }
        columns.extend([Column::TextEscaped, Column::Error]);
        Self { columns }
    }

    /// Columns in output order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Header labels in output order.
    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.header()).collect()
    }

    /// Cells for one record in output order.
    pub fn row<'r>(&self, record: &'r FileRecord) -> Vec<Cow<'r, str>> {
        self.columns.iter().map(|c| c.render(record)).collect()
    }
}

impl Default for ReportSchema {
    fn default() -> Self {
        Self::new(&SnippetSizes::default())
    }
}
