/*!
 * Markdown writer implementation for snapfs
 */

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use crate::error::{Result, ResultExt};
use crate::types::{SnapshotDocument, SnapshotFile, SnapshotMetadata};
use crate::utils::format_kb;

/// Markdown writer for snapshot documents
pub struct MarkdownWriter {
    /// Destination file
    output: PathBuf,
}

impl MarkdownWriter {
    /// Create a new markdown writer
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
        }
    }

    /// Render the document and replace the destination file with it
    ///
    /// The text is written to a temporary file next to the destination and
    /// then moved over it, so a failed run never leaves a partial snapshot.
    pub fn write(&self, document: &SnapshotDocument) -> Result<()> {
        crate::ensure!(
            !self.output.is_dir(),
            Writer,
            "output path is a directory: {}",
            self.output.display()
        );
        let text = render(document);

        let parent = match self.output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).with_path(&parent)?;

        let mut tmp = NamedTempFile::new_in(&parent).with_path(&parent)?;
        tmp.write_all(text.as_bytes()).with_path(tmp.path())?;
        tmp.persist(&self.output)
            .map_err(|e| e.error)
            .with_path(&self.output)?;

        log::info!("Wrote snapshot to {}", self.output.display());
        Ok(())
    }
}

/// Render the full document text
pub fn render(document: &SnapshotDocument) -> String {
    let mut out = String::from("# Project Snapshot\n\n");

    if let Some(metadata) = &document.metadata {
        out.push_str(&render_metadata(metadata));
        out.push_str("\n\n");
    }

    out.push_str("## File Tree\n```text\n");
    out.push_str(&document.tree.join("\n"));
    out.push_str("\n```\n\n");

    let sections: Vec<String> = document.files.iter().map(render_file).collect();
    out.push_str(&sections.join("\n"));

    out
}

/// Render the metadata block, without a trailing newline
pub fn render_metadata(metadata: &SnapshotMetadata) -> String {
    let lines = [
        "## Snapshot Metadata".to_string(),
        format!("- **Project:** {}", metadata.project_name),
        format!("- **Generated:** {}", metadata.generated_at_human),
        format!("- **Generated (ISO):** {}", metadata.generated_at_iso),
        format!("- **Generator:** {}", metadata.generator),
        format!("- **Environment:** {}", metadata.environment),
        format!("- **Files included:** {}", metadata.file_count),
        format!("- **Approx size (raw):** {} KB", format_kb(metadata.total_bytes)),
        format!("- **Include roots:** {}", metadata.include.join(", ")),
        format!("- **Excluded paths:** {}", metadata.exclude.join(", ")),
        format!(
            "- **Excluded files (globs):** {}",
            metadata.never_include.join(", ")
        ),
        format!(
            "- **Allowed extensions:** {}",
            metadata.allowed_extensions.join(", ")
        ),
        format!(
            "- **Secret scrubbing:** {}",
            if metadata.scrub_enabled {
                "enabled"
            } else {
                "disabled"
            }
        ),
        String::new(),
        "### Notes".to_string(),
        "- **.env and other sensitive key files are excluded by pattern** (see *Excluded files* above).".to_string(),
        "- **Secrets are also scrubbed inside included files** (JWT/Bearer/AWS/Stripe/common secret assignments).".to_string(),
    ];

    lines.join("\n")
}

/// Render one file block
fn render_file(file: &SnapshotFile) -> String {
    format!(
        "## FILE: {}\n```{}\n{}\n```\n",
        file.path,
        file.language,
        file.content.trim_end()
    )
}
