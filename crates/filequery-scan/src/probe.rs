//! Content-type classification of single files.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::tool::{ToolCommand, ToolError};

/// The content classifier could not describe a file.
#[derive(Debug, Error)]
#[error("content probe failed for {path}: {source}")]
pub struct ProbeError {
    pub path: PathBuf,
    #[source]
    pub source: ToolError,
}

/// Something that can describe the content type of a file.
pub trait Classifier {
    /// Return a human-readable description of the file's content.
    fn probe(&self, path: &Path) -> Result<String, ProbeError>;
}

/// Classifier backed by the `file` command.
#[derive(Debug, Clone)]
pub struct FileCommand {
    tool: ToolCommand,
}

impl FileCommand {
    /// Use `file` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("file")
    }

    /// Use a specific program with `file`'s output convention.
    pub fn with_program(program: impl AsRef<std::ffi::OsStr>) -> Self {
        Self {
            tool: ToolCommand::new(program),
        }
    }

    /// Kill the classifier if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.tool = self.tool.with_timeout(timeout);
        self
    }
}

impl Default for FileCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for FileCommand {
    fn probe(&self, path: &Path) -> Result<String, ProbeError> {
        let output = self.tool.run(path).map_err(|source| ProbeError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(strip_path_prefix(path, &output))
    }
}

/// Remove the `<path>:` prefix `file` puts before the description.
///
/// The exact path is tried first so that paths containing `:` are handled;
/// otherwise everything up to the first `:` is dropped.
pub fn strip_path_prefix(path: &Path, output: &str) -> String {
    let output = output.trim();
    let prefix = format!("{}:", path.display());
    let description = match output.strip_prefix(&prefix) {
        Some(rest) => rest,
        None => output
            .split_once(':')
            .map(|(_, rest)| rest)
            .unwrap_or(output),
    };
    description.trim().to_string()
}

/// In-memory classifier for tests.
///
/// Returns a fixed description per path (or a default), fails for paths
/// registered with [`fail_on`](Self::fail_on), and records every call.
#[derive(Debug, Default)]
pub struct StaticClassifier {
    descriptions: HashMap<PathBuf, String>,
    failures: HashSet<PathBuf>,
    default: String,
    calls: RefCell<Vec<PathBuf>>,
}

impl StaticClassifier {
    /// Describe every file as `default`.
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            ..Default::default()
        }
    }

    /// Use a specific description for one path.
    pub fn with_description(
        mut self,
        path: impl Into<PathBuf>,
        description: impl Into<String>,
    ) -> Self {
        self.descriptions.insert(path.into(), description.into());
        self
    }

    /// Fail when probing this path.
    pub fn fail_on(mut self, path: impl Into<PathBuf>) -> Self {
        self.failures.insert(path.into());
        self
    }

    /// Paths probed so far, in call order.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.borrow().clone()
    }
}

impl Classifier for StaticClassifier {
    fn probe(&self, path: &Path) -> Result<String, ProbeError> {
        self.calls.borrow_mut().push(path.to_path_buf());
        if self.failures.contains(path) {
            return Err(ProbeError {
                path: path.to_path_buf(),
                source: ToolError::Spawn {
                    program: "static".to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "simulated failure"),
                },
            });
        }
        Ok(self
            .descriptions
            .get(path)
            .cloned()
            .unwrap_or_else(|| self.default.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_exact_prefix() {
        let path = Path::new("/data/a:b.txt");
        let output = "/data/a:b.txt: ASCII text, with no line terminators\n";
        assert_eq!(
            strip_path_prefix(path, output),
            "ASCII text, with no line terminators"
        );
    }

    #[test]
    fn test_strip_falls_back_to_first_colon() {
        let path = Path::new("/data/report.txt");
        assert_eq!(strip_path_prefix(path, "report.txt: empty\n"), "empty");
        assert_eq!(strip_path_prefix(path, "data"), "data");
    }

    #[test]
    fn test_static_classifier() {
        let classifier = StaticClassifier::new("data")
            .with_description("/a.txt", "ASCII text")
            .fail_on("/b.txt");

        assert_eq!(classifier.probe(Path::new("/a.txt")).unwrap(), "ASCII text");
        assert_eq!(classifier.probe(Path::new("/c.bin")).unwrap(), "data");
        assert!(classifier.probe(Path::new("/b.txt")).is_err());
        assert_eq!(classifier.calls().len(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_command_with_echo() {
        let classifier = FileCommand::with_program("echo");
        let description = classifier.probe(Path::new("/x:y")).unwrap();
        assert_eq!(description, "y");
    }
}
