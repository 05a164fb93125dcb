/*!
 * Core types and data structures for the snapfs application
 */

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};

use crate::error::Result;

/// Deduplicated, lexicographically sorted set of project-relative paths
///
/// Paths always use `/` as separator regardless of the host OS.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    paths: BTreeSet<String>,
}

impl FileSet {
    /// Create an empty file set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a relative path, returning false if it was already present
    pub fn insert(&mut self, rel_path: impl Into<String>) -> bool {
        self.paths.insert(rel_path.into())
    }

    /// Number of paths in the set
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Whether the set contains the given relative path
    pub fn contains(&self, rel_path: &str) -> bool {
        self.paths.contains(rel_path)
    }

    /// Iterate paths in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for FileSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

/// Name of the environment the snapshot is generated in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment(String);

impl Environment {
    /// Create an environment tag from its name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Whether this is a production environment
    pub fn is_production(&self) -> bool {
        self.0.trim().eq_ignore_ascii_case("production")
    }

    /// Refuse to continue in a production environment
    pub fn ensure_allowed(&self) -> Result<()> {
        crate::ensure!(
            !self.is_production(),
            Refused,
            "snapshot is disabled in the {} environment",
            self
        );
        Ok(())
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new("local")
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Point-in-time inputs for a snapshot run
#[derive(Debug, Clone)]
pub struct SnapshotContext {
    /// Generation timestamp
    pub generated_at: DateTime<FixedOffset>,
    /// Environment the run happens in
    pub environment: Environment,
}

/// A single bundled file
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    /// Project-relative path
    pub path: String,
    /// Fence label for the content block (may be empty)
    pub language: String,
    /// Content after scrubbing (if enabled)
    pub content: String,
    /// Size of the file before scrubbing
    pub raw_bytes: u64,
    /// Number of redactions applied to this file
    pub redactions: usize,
}

/// Metadata block fields
#[derive(Debug, Clone)]
pub struct SnapshotMetadata {
    /// Displayed project name
    pub project_name: String,
    /// Generation time, ISO-8601
    pub generated_at_iso: String,
    /// Generation time, human readable
    pub generated_at_human: String,
    /// Generator identifier
    pub generator: String,
    /// Environment name
    pub environment: String,
    /// Number of bundled files
    pub file_count: usize,
    /// Sum of raw (pre-scrub) file sizes
    pub total_bytes: u64,
    /// Effective include roots
    pub include: Vec<String>,
    /// Effective exclude prefixes
    pub exclude: Vec<String>,
    /// Effective never-include patterns
    pub never_include: Vec<String>,
    /// Effective allowed extensions
    pub allowed_extensions: Vec<String>,
    /// Whether secret scrubbing was applied
    pub scrub_enabled: bool,
}

/// The assembled snapshot, prior to rendering
#[derive(Debug, Clone)]
pub struct SnapshotDocument {
    /// Metadata block (absent when disabled)
    pub metadata: Option<SnapshotMetadata>,
    /// Rendered tree lines
    pub tree: Vec<String>,
    /// File blocks in FileSet order
    pub files: Vec<SnapshotFile>,
}

impl SnapshotDocument {
    /// Total raw bytes across all bundled files
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.raw_bytes).sum()
    }

    /// Total redactions across all bundled files
    pub fn total_redactions(&self) -> usize {
        self.files.iter().map(|f| f.redactions).sum()
    }
}

/// Terminal state of a snapshot run
#[derive(Debug)]
pub enum SnapshotOutcome {
    /// No file passed the filters; nothing was written
    NoFilesMatched,
    /// The document was written to `output`
    Written {
        /// Destination of the snapshot
        output: PathBuf,
        /// Number of bundled files
        files: usize,
        /// Sum of raw file sizes
        total_bytes: u64,
        /// Number of redactions applied
        redactions: usize,
    },
}
