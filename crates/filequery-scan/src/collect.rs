//! Per-file metadata collection.

use std::fs;
use std::path::{Path, PathBuf};

use filequery_core::{FileRecord, LineCounts, RecordSet, RecordStatus, TextSuffix};

use crate::count::Counter;
use crate::probe::Classifier;

/// Builds a [`FileRecord`] for each discovered path from filesystem
/// metadata, the content classifier and, for text files, the counter.
///
/// Every path yields a record. Failures are recorded on the record and
/// never stop the batch.
pub struct MetadataCollector<'a> {
    classifier: &'a dyn Classifier,
    counter: &'a dyn Counter,
    text_suffix: TextSuffix,
}

impl<'a> MetadataCollector<'a> {
    /// Create a collector using the given tools.
    pub fn new(
        classifier: &'a dyn Classifier,
        counter: &'a dyn Counter,
        text_suffix: TextSuffix,
    ) -> Self {
        Self {
            classifier,
            counter,
            text_suffix,
        }
    }

    /// Collect records for `paths`, keeping their order.
    pub fn collect(&self, paths: &[PathBuf]) -> RecordSet {
        let mut records = RecordSet::with_capacity(paths.len());
        for path in paths {
            records.insert(self.collect_one(path));
        }
        records
    }

    /// Collect the record for a single path.
    pub fn collect_one(&self, path: &Path) -> FileRecord {
        let mut record = FileRecord::new(path);

        match fs::metadata(path) {
            Ok(metadata) => record.size_bytes = Some(metadata.len()),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "stat failed");
                record.fail(RecordStatus::StatFailed);
            }
        }

        match self.classifier.probe(path) {
            Ok(description) => record.type_description = Some(description),
            Err(err) => {
                tracing::warn!(error = %err, "classification unavailable");
                record.fail(RecordStatus::ProbeFailed);
            }
        }

        if self.text_suffix.matches_path(path) {
            record.counts = match self.counter.count(path) {
                Ok(counts) => LineCounts::Counted(counts),
                Err(err) => {
                    tracing::warn!(error = %err, "counts unavailable");
                    record.fail(RecordStatus::CountFailed);
                    LineCounts::Unavailable
                }
            };
        }

        tracing::debug!(path = %path.display(), status = %record.status, "metadata collected");
        record
    }
}
