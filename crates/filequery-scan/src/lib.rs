//! File discovery, metadata collection and text extraction for filequery.
//!
//! # Overview
//!
//! A query runs three stages, one file at a time:
//!
//! - **Discovery** lists candidate files under a root, optionally
//!   recursing into non-hidden subdirectories
//! - **Collection** stats each file, asks a [`Classifier`] for its content
//!   type and a [`Counter`] for line/word/char counts of text files
//! - **Extraction** reads bounded UTF-8 snippets from text files
//!
//! Failures for one file are recorded on its
//! [`FileRecord`](filequery_core::FileRecord) and never stop the run.
//!
//! # Example
//!
//! ```rust,no_run
//! use filequery_core::QueryConfig;
//! use filequery_scan::run_query_with_shell_tools;
//!
//! let config = QueryConfig::new("/path/to/scan");
//! let records = run_query_with_shell_tools(&config).unwrap();
//!
//! for record in &records {
//!     println!("{} {}", record.full_path.display(), record.status);
//! }
//! ```
//!
//! # Testing without external tools
//!
//! [`StaticClassifier`] and [`StaticCounter`] stand in for `file` and `wc`:
//!
//! ```rust,no_run
//! use filequery_core::{QueryConfig, WordCounts};
//! use filequery_scan::{run_query, StaticClassifier, StaticCounter};
//!
//! let classifier = StaticClassifier::new("ASCII text");
//! let counter = StaticCounter::new(WordCounts::new(1, 1, 5));
//! let records = run_query(&QueryConfig::new("/tmp/data"), &classifier, &counter).unwrap();
//! ```

mod collect;
mod count;
mod discover;
mod extract;
mod pipeline;
mod probe;
mod tool;

pub use collect::MetadataCollector;
pub use count::{CountError, Counter, StaticCounter, WcCommand, parse_counts};
pub use discover::Discoverer;
pub use extract::{NEWLINE_MARKER, TextExtractor, escape, mark_newlines};
pub use pipeline::{run_query, run_query_with_shell_tools};
pub use probe::{Classifier, FileCommand, ProbeError, StaticClassifier, strip_path_prefix};
pub use tool::{ToolCommand, ToolError};

// Re-export core types for convenience
pub use filequery_core::{
    FileRecord, LineCounts, QueryConfig, QueryError, RecordSet, RecordStatus, SnippetSizes,
    TextSnippets, TextSuffix, WordCounts,
};
