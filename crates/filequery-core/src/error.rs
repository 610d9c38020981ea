//! Error types for query runs.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a query run.
///
/// Per-file problems never surface here; they are recorded on the
/// affected [`FileRecord`](crate::FileRecord) as a [`RecordStatus`](crate::RecordStatus).
#[derive(Debug, Error)]
pub enum QueryError {
    /// Permission denied for the input directory.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Input directory not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Input directory could not be read.
    #[error("Could not read directory {path}: {source}")]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Output destination cannot be used.
    #[error("Could not open {path} for writing: {source}")]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl QueryError {
    /// Create an input error with path context.
    pub fn input(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::InputUnreadable { path, source },
        }
    }

    /// Create an output error with path context.
    pub fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputUnwritable {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_input() {
        let err = QueryError::input(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, QueryError::PermissionDenied { .. }));

        let err = QueryError::input(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, QueryError::NotFound { .. }));

        let err = QueryError::input("/test/path", std::io::Error::other("boom"));
        assert!(matches!(err, QueryError::InputUnreadable { .. }));
    }

    #[test]
    fn test_query_error_messages() {
        let err = QueryError::config("too much text");
        assert_eq!(err.to_string(), "Invalid configuration: too much text");

        let err = QueryError::output("/out/datafile.csv", std::io::Error::other("read-only"));
        assert!(err.to_string().contains("/out/datafile.csv"));
    }
}
