//! Line, word and character counting of single files.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use thiserror::Error;

use filequery_core::WordCounts;

use crate::tool::{ToolCommand, ToolError};

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("number pattern is valid"));

/// The counter could not produce counts for a file.
#[derive(Debug, Error)]
pub enum CountError {
    /// The counting tool failed.
    #[error("line count failed for {path}: {source}")]
    Tool {
        path: PathBuf,
        #[source]
        source: ToolError,
    },

    /// The tool's output did not contain three counts.
    #[error("could not read counts for {path} from {output:?}")]
    Unparseable { path: PathBuf, output: String },
}

/// Something that can count lines, words and characters of a file.
pub trait Counter {
    fn count(&self, path: &Path) -> Result<WordCounts, CountError>;
}

/// Counter backed by the `wc` command.
#[derive(Debug, Clone)]
pub struct WcCommand {
    tool: ToolCommand,
}

impl WcCommand {
    /// Use `wc` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("wc")
    }

    /// Use a specific program with `wc`'s output convention.
    pub fn with_program(program: impl AsRef<std::ffi::OsStr>) -> Self {
        Self {
            tool: ToolCommand::new(program),
        }
    }

    /// Kill the counter if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.tool = self.tool.with_timeout(timeout);
        self
    }
}

impl Default for WcCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Counter for WcCommand {
    fn count(&self, path: &Path) -> Result<WordCounts, CountError> {
        let output = self.tool.run(path).map_err(|source| CountError::Tool {
            path: path.to_path_buf(),
            source,
        })?;
        parse_counts(&output).ok_or_else(|| CountError::Unparseable {
            path: path.to_path_buf(),
            output: output.trim().to_string(),
        })
    }
}

/// Take the first three integers in `output` as lines, words and chars.
///
/// Column widths differ between `wc` implementations, so no positional
/// parsing is attempted.
pub fn parse_counts(output: &str) -> Option<WordCounts> {
    let mut numbers = NUMBER.find_iter(output).map(|m| m.as_str().parse::<u64>());
    let lines = numbers.next()?.ok()?;
    let words = numbers.next()?.ok()?;
    let chars = numbers.next()?.ok()?;
    Some(WordCounts::new(lines, words, chars))
}

/// In-memory counter for tests.
#[derive(Debug, Default)]
pub struct StaticCounter {
    counts: HashMap<PathBuf, WordCounts>,
    failures: HashSet<PathBuf>,
    default: Option<WordCounts>,
    calls: RefCell<Vec<PathBuf>>,
}

impl StaticCounter {
    /// Report `default` for every file.
    pub fn new(default: WordCounts) -> Self {
        Self {
            default: Some(default),
            ..Default::default()
        }
    }

    /// Use specific counts for one path.
    pub fn with_counts(mut self, path: impl Into<PathBuf>, counts: WordCounts) -> Self {
        self.counts.insert(path.into(), counts);
        self
    }

    /// Fail when counting this path.
    pub fn fail_on(mut self, path: impl Into<PathBuf>) -> Self {
        self.failures.insert(path.into());
        self
    }

    /// Paths counted so far, in call order.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.borrow().clone()
    }
}

impl Counter for StaticCounter {
    fn count(&self, path: &Path) -> Result<WordCounts, CountError> {
        self.calls.borrow_mut().push(path.to_path_buf());
        if self.failures.contains(path) {
            return Err(CountError::Unparseable {
                path: path.to_path_buf(),
                output: "simulated failure".to_string(),
            });
        }
        self.counts
            .get(path)
            .copied()
            .or(self.default)
            .ok_or_else(|| CountError::Unparseable {
                path: path.to_path_buf(),
                output: String::new(),
            })
    }
}
