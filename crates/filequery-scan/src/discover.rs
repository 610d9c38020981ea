//! Candidate file discovery.

use std::fs;
use std::path::{Path, PathBuf};

use filequery_core::{QueryConfig, QueryError, TextSuffix};

/// Enumerates the files a query should report on.
///
/// Non-recursive discovery lists the root's immediate children. Recursive
/// discovery walks an explicit stack of directories and never enters a
/// directory whose name starts with `.`. Entries of each directory are
/// visited in file name order, so the result is stable for an unchanged
/// filesystem.
#[derive(Debug, Clone)]
pub struct Discoverer {
    root: PathBuf,
    recursive: bool,
    include_all: bool,
    text_suffix: TextSuffix,
}

impl Discoverer {
    /// Create a non-recursive discoverer for text files under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            recursive: false,
            include_all: false,
            text_suffix: TextSuffix::default(),
        }
    }

    /// Create a discoverer from a query configuration.
    pub fn from_config(config: &QueryConfig) -> Self {
        Self {
            root: config.root.clone(),
            recursive: config.recursive,
            include_all: config.include_all,
            text_suffix: config.text_suffix.clone(),
        }
    }

    /// Descend into non-hidden subdirectories.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Report files of every extension.
    pub fn include_all(mut self, include_all: bool) -> Self {
        self.include_all = include_all;
        self
    }

    /// Suffix identifying text files.
    pub fn text_suffix(mut self, text_suffix: TextSuffix) -> Self {
        self.text_suffix = text_suffix;
        self
    }

    /// Return absolute paths of all matching files in traversal order.
    ///
    /// An unreadable root is fatal; an unreadable subdirectory is logged and
    /// skipped.
    pub fn discover(&self) -> Result<Vec<PathBuf>, QueryError> {
        let root = self
            .root
            .canonicalize()
            .map_err(|e| QueryError::input(&self.root, e))?;
        if !root.is_dir() {
            return Err(QueryError::NotADirectory { path: root });
        }

        let mut found = Vec::new();
        let mut pending = vec![root.clone()];

        while let Some(dir) = pending.pop() {
            let entries = match list_dir(&dir) {
                Ok(entries) => entries,
                Err(err) if dir == root => return Err(QueryError::input(&dir, err)),
                Err(err) => {
                    tracing::warn!(
                        path = %dir.display(),
                        error = %err,
                        "skipping unreadable directory"
                    );
                    continue;
                }
            };

            let mut subdirs = Vec::new();
            for entry in entries {
                match entry.kind {
                    EntryKind::File => {
                        if self.include_all || self.text_suffix.matches_name(&entry.name) {
                            found.push(entry.path);
                        }
                    }
                    EntryKind::Dir if self.recursive && !is_hidden(&entry.name) => {
                        subdirs.push(entry.path);
                    }
                    EntryKind::Dir => {}
                }
            }
            // Reversed so the stack pops subdirectories in name order.
            pending.extend(subdirs.into_iter().rev());
        }

        tracing::debug!(root = %root.display(), files = found.len(), "discovery finished");
        Ok(found)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Dir,
}

struct Entry {
    name: String,
    path: PathBuf,
    kind: EntryKind,
}

/// List regular files (including symlinks to them) and real directories in
/// `dir`, sorted by name. Symlinks to directories are not followed.
fn list_dir(dir: &Path) -> std::io::Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(path = %dir.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        let kind = if file_type.is_file() {
            EntryKind::File
        } else if file_type.is_dir() {
            EntryKind::Dir
        } else if file_type.is_symlink() && fs::metadata(&path).is_ok_and(|m| m.is_file()) {
            EntryKind::File
        } else {
            continue;
        };

        entries.push(Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
            kind,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}
