//! Core types and configuration for filequery.
//!
//! This crate provides the data structures shared by the scanning and
//! report crates: per-file records, the ordered record set, the query
//! configuration, and the fatal error type.

mod config;
mod error;
mod record;

pub use config::{
    DEFAULT_TOOL_TIMEOUT, MAX_SNIPPET_CHARS, OutputFormat, QueryConfig, QueryConfigBuilder,
    SnippetSizes, TextSuffix,
};
pub use error::QueryError;
pub use record::{FileRecord, LineCounts, RecordSet, RecordStatus, TextSnippets, WordCounts};
