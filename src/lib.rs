/*!
 * snapfs - Bundle a project's tree and file contents into one markdown snapshot
 *
 * Files are collected from configured include roots, filtered by exclude
 * prefixes, never-include patterns and an extension allowlist, scrubbed of
 * secret-looking values and written together with a directory tree and a
 * metadata block.
 */

pub mod config;
pub mod error;
pub mod filter;
pub mod report;
pub mod scanner;
pub mod scrub;
pub mod snapshot;
pub mod tree;
pub mod types;
pub mod utils;
pub mod writer;


// Re-export main components for easier access
pub use config::{Args, Config, SnapshotConfig};
pub use error::{Result, SnapFsError};
pub use filter::{should_include, PathFilter};
pub use report::{ReportFormat, Reporter, SnapshotReport};
pub use scanner::{collect, Scanner};
pub use scrub::{scrub, ScrubRule, Scrubbed, Scrubber};
pub use snapshot::{Assembler, ContentSource, FsSource, Snapshot};
pub use tree::TreeNode;
pub use types::{
    Environment, FileSet, SnapshotContext, SnapshotDocument, SnapshotFile, SnapshotMetadata,
    SnapshotOutcome,
};
pub use utils::{fence_language, format_file_size};
pub use writer::MarkdownWriter;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
