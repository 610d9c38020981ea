//! Query configuration types.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use derive_builder::{Builder, UninitializedFieldError};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::error::QueryError;

/// Upper bound on the total number of characters read per file.
pub const MAX_SNIPPET_CHARS: usize = 20_000;

/// Default timeout for external tool invocations.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Report output format.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma separated, double-quote quoted.
    Csv,
    /// Pipe separated, caret quoted.
    #[default]
    Dat,
    /// Self-contained HTML table.
    Html,
}

impl OutputFormat {
    /// Resolve a user-supplied format name, falling back to the default
    /// format when the name is not recognized.
    pub fn from_name(name: &str) -> Self {
        Self::from_str(name.trim()).unwrap_or_else(|_| {
            let fallback = Self::default();
            tracing::warn!(requested = name, using = %fallback, "unknown output format");
            fallback
        })
    }

    /// File extension for reports in this format.
    pub fn extension(self) -> &'static str {
        self.into()
    }
}

/// Case-insensitive file name suffix that marks a file as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TextSuffix(String);

impl TextSuffix {
    /// Create a suffix, adding the leading dot if missing.
    pub fn new(suffix: impl AsRef<str>) -> Result<Self, QueryError> {
        let suffix = suffix.as_ref().trim().to_lowercase();
        let suffix = suffix.strip_prefix('.').unwrap_or(&suffix);
        if suffix.is_empty() || suffix.contains(['.', '/', '\\']) {
            return Err(QueryError::config(format!(
                "text suffix must be a single extension like \".txt\", got {suffix:?}"
            )));
        }
        Ok(Self(format!(".{suffix}")))
    }

    /// The suffix including its leading dot, lower-cased.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether a file name ends with this suffix.
    ///
    /// A name that is only the suffix, such as `.txt`, matches. Such a file
    /// has no extension, so it is discovered and counted but not read.
    pub fn matches_name(&self, name: &str) -> bool {
        name.to_lowercase().ends_with(&self.0)
    }

    /// Check whether a path's file name ends with this suffix.
    pub fn matches_path(&self, path: &Path) -> bool {
        path.file_name()
            .map(|n| self.matches_name(&n.to_string_lossy()))
            .unwrap_or(false)
    }

    /// Check whether a record extension (with leading dot) is this suffix.
    pub fn matches_extension(&self, extension: &str) -> bool {
        extension.eq_ignore_ascii_case(&self.0)
    }
}

impl Default for TextSuffix {
    fn default() -> Self {
        Self(".txt".to_string())
    }
}

impl fmt::Display for TextSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TextSuffix {
    type Error = QueryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TextSuffix> for String {
    fn from(value: TextSuffix) -> Self {
        value.0
    }
}

/// Number of characters read into each snippet field.
///
/// The fields are read consecutively from the start of the file. A size of
/// zero disables the list or memo field and removes its report column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetSizes {
    pub text: usize,
    #[serde(default)]
    pub list: usize,
    #[serde(default)]
    pub memo: usize,
}

impl SnippetSizes {
    /// Sizes for a text field only.
    pub fn text_only(text: usize) -> Self {
        Self {
            text,
            list: 0,
            memo: 0,
        }
    }

    /// Total characters read per file.
    pub fn total(&self) -> usize {
        self.text
            .saturating_add(self.list)
            .saturating_add(self.memo)
    }

    /// Reject sizes whose total exceeds [`MAX_SNIPPET_CHARS`].
    pub fn validate(&self) -> Result<(), QueryError> {
        let total = self.total();
        if total > MAX_SNIPPET_CHARS {
            return Err(QueryError::config(format!(
                "requested {total} characters of text per file, the limit is {MAX_SNIPPET_CHARS}"
            )));
        }
        Ok(())
    }
}

impl Default for SnippetSizes {
    fn default() -> Self {
        Self::text_only(20)
    }
}

/// Configuration for a query run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(
    setter(into),
    build_fn(validate = "Self::validate", error = "QueryError")
)]
pub struct QueryConfig {
    /// Directory to scan.
    pub root: PathBuf,

    /// Directory the report is written to.
    #[builder(default = "PathBuf::from(\".\")")]
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Descend into subdirectories (hidden ones are skipped).
    #[builder(default = "false")]
    #[serde(default)]
    pub recursive: bool,

    /// Report every file, not only those with the text suffix.
    #[builder(default = "false")]
    #[serde(default)]
    pub include_all: bool,

    /// Suffix identifying text files.
    #[builder(default)]
    #[serde(default)]
    pub text_suffix: TextSuffix,

    /// Characters read into the snippet fields.
    #[builder(default)]
    #[serde(default)]
    pub snippet_sizes: SnippetSizes,

    /// Report format.
    #[builder(default)]
    #[serde(default)]
    pub format: OutputFormat,

    /// Embed a generation timestamp in the report file name.
    #[builder(default = "false")]
    #[serde(default)]
    pub timestamped: bool,

    /// Timeout for each external tool invocation (None = wait forever).
    #[builder(default = "Some(DEFAULT_TOOL_TIMEOUT)")]
    #[serde(default = "default_tool_timeout")]
    pub tool_timeout: Option<Duration>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_tool_timeout() -> Option<Duration> {
    Some(DEFAULT_TOOL_TIMEOUT)
}

impl From<UninitializedFieldError> for QueryError {
    fn from(err: UninitializedFieldError) -> Self {
        QueryError::config(err.to_string())
    }
}

impl QueryConfigBuilder {
    fn validate(&self) -> Result<(), QueryError> {
        match self.root {
            Some(ref root) if root.as_os_str().is_empty() => {
                return Err(QueryError::config("Root path cannot be empty"));
            }
            None => return Err(QueryError::config("Root path is required")),
            Some(_) => {}
        }
        if let Some(sizes) = self.snippet_sizes {
            sizes.validate()?;
        }
        Ok(())
    }
}

impl QueryConfig {
    /// Create a new query config builder.
    pub fn builder() -> QueryConfigBuilder {
        QueryConfigBuilder::default()
    }

    /// Create a simple config for scanning a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output_dir: default_output_dir(),
            recursive: false,
            include_all: false,
            text_suffix: TextSuffix::default(),
            snippet_sizes: SnippetSizes::default(),
            format: OutputFormat::default(),
            timestamped: false,
            tool_timeout: default_tool_timeout(),
        }
    }

    /// Validate a config that was not produced by the builder.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.root.as_os_str().is_empty() {
            return Err(QueryError::config("Root path cannot be empty"));
        }
        self.snippet_sizes.validate()
    }

    /// Check whether a file name marks a text file.
    pub fn is_text_name(&self, name: &str) -> bool {
        self.text_suffix.matches_name(name)
    }

    /// Check whether a discovered file should be reported.
    pub fn should_include(&self, name: &str) -> bool {
        self.include_all || self.is_text_name(name)
    }
}
