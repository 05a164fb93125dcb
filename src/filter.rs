/*!
 * Inclusion rules for candidate files
 */

use regex::{Regex, RegexBuilder};

use crate::error::{Result, SnapFsError};
use crate::utils::{basename, normalize_separators};

/// A compiled never-include rule
#[derive(Debug, Clone)]
enum NeverInclude {
    /// Pattern containing `*`, matched case-insensitively against the basename
    Glob(Regex),
    /// Literal name, matched against the basename or the whole relative path
    Exact { name: String, path: String },
}

impl NeverInclude {
    fn compile(pattern: &str) -> Result<Self> {
        let pattern = normalize_separators(pattern);

        if pattern.contains('*') {
            let body = pattern
                .split('*')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(".*");
            let regex = RegexBuilder::new(&format!("^{}$", body))
                .case_insensitive(true)
                .dot_matches_new_line(true)
                .build()
                .map_err(|e| {
                    SnapFsError::Config(format!("invalid never-include pattern {pattern:?}: {e}"))
                })?;
            Ok(Self::Glob(regex))
        } else {
            Ok(Self::Exact {
                name: basename(&pattern).to_string(),
                path: pattern.strip_prefix('/').unwrap_or(&pattern).to_string(),
            })
        }
    }

    fn matches(&self, rel_path: &str, name: &str) -> bool {
        match self {
            Self::Glob(regex) => regex.is_match(name),
            Self::Exact { name: exact, path } => name == exact || rel_path == path,
        }
    }
}

/// Decides whether a project-relative path belongs in the snapshot
///
/// Rules are evaluated in order and the first one that rejects wins:
/// exclude prefixes, never-include patterns, then the extension allowlist.
#[derive(Debug, Clone)]
pub struct PathFilter {
    exclude_prefixes: Vec<String>,
    never_include: Vec<NeverInclude>,
    allowed_extensions: Vec<String>,
}

impl PathFilter {
    /// Compile the filter rules
    pub fn new<S: AsRef<str>>(
        exclude_prefixes: &[S],
        never_include: &[S],
        allowed_extensions: &[S],
    ) -> Result<Self> {
        let exclude_prefixes = exclude_prefixes
            .iter()
            .map(|p| normalize_separators(p.as_ref()).trim_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .collect();

        let never_include = never_include
            .iter()
            .map(|p| NeverInclude::compile(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let allowed_extensions = allowed_extensions
            .iter()
            .map(|e| e.as_ref().to_lowercase())
            .collect();

        Ok(Self {
            exclude_prefixes,
            never_include,
            allowed_extensions,
        })
    }

    /// Check whether the relative path passes every rule
    pub fn should_include(&self, rel_path: &str) -> bool {
        let normalized = normalize_separators(rel_path);
        let rel_path = normalized.trim_matches('/');
        let name = basename(rel_path);

        if self.is_excluded_by_prefix(rel_path) {
            log::debug!("{}: excluded by prefix", rel_path);
            return false;
        }

        if self.never_include.iter().any(|rule| rule.matches(rel_path, name)) {
            log::debug!("{}: matches a never-include pattern", rel_path);
            return false;
        }

        let extension = match name.rfind('.') {
            Some(idx) => name[idx + 1..].to_lowercase(),
            None => String::new(),
        };
        if extension.is_empty() || !self.allowed_extensions.contains(&extension) {
            log::debug!("{}: extension {:?} not allowed", rel_path, extension);
            return false;
        }

        true
    }

    /// Whether a directory, and therefore everything beneath it, is excluded
    pub fn is_excluded_dir(&self, rel_dir: &str) -> bool {
        self.is_excluded_by_prefix(normalize_separators(rel_dir).trim_matches('/'))
    }

    fn is_excluded_by_prefix(&self, rel_path: &str) -> bool {
        self.exclude_prefixes.iter().any(|prefix| {
            rel_path == prefix
                || rel_path
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

/// One-shot form of [`PathFilter::should_include`]
///
/// Rules that cannot be compiled reject the path.
pub fn should_include<S: AsRef<str>>(
    rel_path: &str,
    exclude_prefixes: &[S],
    never_include: &[S],
    allowed_extensions: &[S],
) -> bool {
    match PathFilter::new(exclude_prefixes, never_include, allowed_extensions) {
        Ok(filter) => filter.should_include(rel_path),
        Err(e) => {
            log::warn!("{}", e);
            false
        }
    }
}
