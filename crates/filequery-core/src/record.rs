//! Per-file record types.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

/// Outcome tag recorded for every file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum RecordStatus {
    /// Everything was collected.
    #[default]
    #[strum(to_string = "none")]
    #[serde(rename = "none")]
    Ok,
    /// Name does not carry the text suffix, so no text was read.
    NotText,
    /// The file could not be opened for reading.
    OpenFailed,
    /// The file content was not valid in the text encoding.
    DecodeFailed,
    /// Reading failed after the file was opened.
    ReadFailed,
    /// Filesystem metadata could not be read.
    StatFailed,
    /// The content classifier failed.
    ProbeFailed,
    /// The line/word counter failed.
    CountFailed,
}

impl RecordStatus {
    /// Code written to the report's error column.
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Check if this status records a failure.
    pub fn is_failure(self) -> bool {
        self != Self::Ok
    }
}

/// Line, word and character counts for a text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCounts {
    pub lines: u64,
    pub words: u64,
    pub chars: u64,
}

impl WordCounts {
    /// Create new counts.
    pub fn new(lines: u64, words: u64, chars: u64) -> Self {
        Self {
            lines,
            words,
            chars,
        }
    }
}

/// Counting outcome for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineCounts {
    /// Counts from the external counter.
    Counted(WordCounts),
    /// The file is not text, so the counter was not run.
    NotApplicable,
    /// The counter was run and failed.
    Unavailable,
}

impl LineCounts {
    /// Get the counts if the counter succeeded.
    pub fn counted(&self) -> Option<WordCounts> {
        match self {
            Self::Counted(counts) => Some(*counts),
            _ => None,
        }
    }
}

/// Snippet fields read from the start of a text file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSnippets {
    /// Text field with newlines replaced by the marker.
    pub text: String,
    /// List field, read after the text field.
    pub list: String,
    /// Memo field, read after the list field.
    pub memo: String,
    /// Escaped rendering of the unmodified text field.
    pub text_escaped: String,
}

/// Everything collected about one discovered file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute path; unique within a run.
    pub full_path: PathBuf,

    /// File name without extension.
    pub short_name: String,

    /// Lower-cased extension with leading dot, or empty.
    pub extension: String,

    /// Size from filesystem metadata.
    pub size_bytes: Option<u64>,

    /// Line/word/char counts.
    pub counts: LineCounts,

    /// Classifier output with the path prefix removed.
    pub type_description: Option<String>,

    /// Snippets, when the file was read successfully.
    pub text: Option<TextSnippets>,

    /// First failure recorded for this file.
    pub status: RecordStatus,
}

impl FileRecord {
    /// Create a record for a path with names derived from it and nothing
    /// collected yet.
    pub fn new(full_path: impl Into<PathBuf>) -> Self {
        let full_path = full_path.into();
        let short_name = full_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = full_path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();

        Self {
            full_path,
            short_name,
            extension,
            size_bytes: None,
            counts: LineCounts::NotApplicable,
            type_description: None,
            text: None,
            status: RecordStatus::Ok,
        }
    }

    /// Record a failure unless an earlier one is already recorded.
    pub fn fail(&mut self, status: RecordStatus) {
        if !self.status.is_failure() {
            self.status = status;
        }
    }

    /// Record the outcome of text extraction.
    ///
    /// A failed extraction replaces any earlier failure, since it decides
    /// what the text columns hold.
    pub fn fail_extraction(&mut self, status: RecordStatus) {
        self.status = status;
    }
}

/// Ordered collection of records with lookup by path.
///
/// Iteration follows insertion order, which is discovery order.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: Vec<FileRecord>,
    index: HashMap<PathBuf, usize>,
}

impl RecordSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set with room for `capacity` records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Append a record. Returns false, leaving the set unchanged, when a
    /// record for the same path already exists.
    pub fn insert(&mut self, record: FileRecord) -> bool {
        if self.index.contains_key(&record.full_path) {
            tracing::warn!(path = %record.full_path.display(), "duplicate record ignored");
            return false;
        }
        self.index
            .insert(record.full_path.clone(), self.records.len());
        self.records.push(record);
        true
    }

    /// Look up a record by path.
    pub fn get(&self, path: &Path) -> Option<&FileRecord> {
        self.index.get(path).map(|&i| &self.records[i])
    }

    /// Look up a record by path for in-place update.
    pub fn get_mut(&mut self, path: &Path) -> Option<&mut FileRecord> {
        self.index.get(path).map(|&i| &mut self.records[i])
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, FileRecord> {
        self.records.iter()
    }

    /// Iterate records mutably in discovery order.
    ///
    /// `full_path` must not be changed through this iterator; the lookup
    /// index is keyed by it.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, FileRecord> {
        self.records.iter_mut()
    }

    /// Number of records carrying a failure status.
    pub fn failure_count(&self) -> usize {
        self.records.iter().filter(|r| r.status.is_failure()).count()
    }

    /// Sum of known file sizes.
    pub fn total_size(&self) -> u64 {
        self.records.iter().filter_map(|r| r.size_bytes).sum()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a FileRecord;
    type IntoIter = std::slice::Iter<'a, FileRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<FileRecord> for RecordSet {
    fn from_iter<I: IntoIterator<Item = FileRecord>>(iter: I) -> Self {
        let mut set = RecordSet::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_names() {
        let record = FileRecord::new("/data/Report.Final.TXT");
        assert_eq!(record.short_name, "Report.Final");
        assert_eq!(record.extension, ".txt");

        let record = FileRecord::new("/data/Makefile");
        assert_eq!(record.short_name, "Makefile");
        assert_eq!(record.extension, "");

        let record = FileRecord::new("/data/.bashrc");
        assert_eq!(record.short_name, ".bashrc");
        assert_eq!(record.extension, "");
    }

    #[test]
    fn test_first_failure_wins() {
        let mut record = FileRecord::new("/data/a.txt");
        assert_eq!(record.status, RecordStatus::Ok);

        record.fail(RecordStatus::ProbeFailed);
        record.fail(RecordStatus::CountFailed);
        assert_eq!(record.status, RecordStatus::ProbeFailed);
    }

    #[test]
    fn test_extraction_failure_replaces_earlier_failure() {
        let mut record = FileRecord::new("/data/gone.txt");
        record.fail(RecordStatus::StatFailed);
        record.fail_extraction(RecordStatus::OpenFailed);
        assert_eq!(record.status, RecordStatus::OpenFailed);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(RecordStatus::Ok.as_str(), "none");
        assert_eq!(RecordStatus::NotText.as_str(), "not-text");
        assert_eq!(RecordStatus::OpenFailed.as_str(), "open-failed");
        assert_eq!(RecordStatus::DecodeFailed.as_str(), "decode-failed");
        assert_eq!(RecordStatus::CountFailed.to_string(), "count-failed");
    }
}
