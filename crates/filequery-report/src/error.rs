//! Error types for report writing.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a report from being written.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The output file could not be created.
    #[error("Cannot create report {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing to the output failed.
    #[error("I/O error while writing report: {0}")]
    Io(#[from] std::io::Error),

    /// The delimited writer failed.
    #[error("Delimited output error: {0}")]
    Csv(#[from] csv::Error),

    /// The HTML template failed to compile or render.
    #[error("Template error: {0}")]
    Template(#[from] upon::Error),
}

/// Result type for report writing.
pub type WriteResult<T> = std::result::Result<T, WriteError>;
