/*!
 * Utility functions for snapfs
 */

use std::path::Path;

use strum::{Display, EnumString};

/// Fence labels for bundled file contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum FenceLanguage {
    #[strum(serialize = "php")]
    Php,
    #[strum(to_string = "javascript", serialize = "js")]
    JavaScript,
    #[strum(to_string = "typescript", serialize = "ts")]
    TypeScript,
    #[strum(serialize = "css")]
    Css,
    #[strum(serialize = "scss")]
    Scss,
    #[strum(serialize = "json")]
    Json,
    #[strum(to_string = "yaml", serialize = "yaml", serialize = "yml")]
    Yaml,
    #[strum(to_string = "markdown", serialize = "md")]
    Markdown,
}

impl FenceLanguage {
    /// Best-effort label for a relative path, based on its extension
    pub fn for_path(rel_path: &str) -> Option<Self> {
        let lower = rel_path.to_lowercase();
        if lower.ends_with(".blade.php") {
            return Some(Self::Php);
        }

        let name = basename(&lower);
        let (_, extension) = name.rsplit_once('.')?;
        extension.parse().ok()
    }
}

/// Fence label string for a relative path; empty when unknown
pub fn fence_language(rel_path: &str) -> String {
    FenceLanguage::for_path(rel_path)
        .map(|lang| lang.to_string())
        .unwrap_or_default()
}

/// Replace backslashes with `/`
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Last `/`-separated segment of a path
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Express `path` relative to `root` using `/` separators
///
/// Paths outside of `root` are returned with leading slashes stripped.
pub fn normalize_rel_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    normalize_separators(&joined).trim_start_matches('/').to_string()
}

/// Kilobytes rounded to two decimals
pub fn format_kb(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / 1024.0)
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
