/*!
 * Candidate file discovery
 */

use std::fs;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, ResultExt};
use crate::filter::PathFilter;
use crate::types::FileSet;
use crate::utils::{normalize_rel_path, normalize_separators};

/// Walks include roots and collects the paths that pass the filter
pub struct Scanner {
    /// Project root all paths are relative to
    root: PathBuf,
    /// Inclusion rules
    filter: PathFilter,
    /// Absolute paths never collected (e.g. the output file)
    skip: Vec<PathBuf>,
}

impl Scanner {
    /// Create a new scanner
    pub fn new(root: impl Into<PathBuf>, filter: PathFilter) -> Self {
        Self {
            root: root.into(),
            filter,
            skip: Vec::new(),
        }
    }

    /// Never collect the given path
    ///
    /// The path does not have to exist yet; it is compared against
    /// candidates by canonical location.
    pub fn skip_path(mut self, path: &Path) -> Self {
        self.skip.push(absolutize(path));
        self
    }

    /// Collect every accepted file beneath the include roots
    ///
    /// Roots that do not exist are skipped. Symbolic links are followed;
    /// a link cycle is reported as an error.
    pub fn scan<S: AsRef<str>>(&self, include_roots: &[S]) -> Result<FileSet> {
        let mut files = FileSet::new();

        for include in include_roots {
            let abs_path = self.root.join(include_root(include.as_ref())?);
            let metadata = match fs::metadata(&abs_path) {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    log::debug!("Include root {} does not exist, skipping", abs_path.display());
                    continue;
                }
                Err(e) => return Err(e).with_path(&abs_path),
            };

            if metadata.is_file() {
                self.consider(&abs_path, &mut files);
                continue;
            }

            let walker = WalkDir::new(&abs_path)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| {
                    !entry.file_type().is_dir()
                        || !self
                            .filter
                            .is_excluded_dir(&normalize_rel_path(&self.root, entry.path()))
                });

            for entry in walker {
                let entry = entry?;
                if entry.file_type().is_file() {
                    self.consider(entry.path(), &mut files);
                }
            }
        }

        log::debug!("Collected {} files", files.len());
        Ok(files)
    }

    fn consider(&self, abs_path: &Path, files: &mut FileSet) {
        let relative = abs_path.strip_prefix(&self.root).unwrap_or(abs_path);
        if relative.to_str().is_none() {
            log::warn!("{}: not valid UTF-8, skipping", abs_path.display());
            return;
        }

        let rel_path = normalize_rel_path(&self.root, abs_path);
        if self.is_skipped(abs_path) {
            log::debug!("{}: skipped", rel_path);
            return;
        }
        if self.filter.should_include(&rel_path) {
            files.insert(rel_path);
        }
    }

    fn is_skipped(&self, abs_path: &Path) -> bool {
        let name = abs_path.file_name();
        if !self.skip.iter().any(|skip| skip.file_name() == name) {
            return false;
        }
        let candidate = absolutize(abs_path);
        self.skip.contains(&candidate)
    }
}

/// Turn an include entry into a path below the project root
///
/// Leading separators are ignored, so `/app` and `app` name the same root.
/// Entries that climb out of the root are rejected.
fn include_root(include: &str) -> Result<PathBuf> {
    let normalized = normalize_separators(include);
    let trimmed = normalized.trim_start_matches('/');
    let path = PathBuf::from(trimmed);

    crate::ensure!(
        path.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir)),
        Config,
        "include root must stay inside the project: {}",
        include
    );
    Ok(path)
}

/// Canonical form of `path`, falling back to the canonical parent for
/// files that do not exist yet
fn absolutize(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match (fs::canonicalize(parent), path.file_name()) {
        (Ok(parent), Some(name)) => parent.join(name),
        _ => std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf()),
    }
}

/// Collect the file set for a project
pub fn collect<S: AsRef<str>>(
    project_root: &Path,
    include_roots: &[S],
    exclude_prefixes: &[S],
    never_include: &[S],
    allowed_extensions: &[S],
) -> Result<FileSet> {
    let filter = PathFilter::new(exclude_prefixes, never_include, allowed_extensions)?;
    Scanner::new(project_root, filter).scan(include_roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::{self, Write};

    fn touch(root: &Path, rel: &str) -> io::Result<()> {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        writeln!(file, "// {}", rel)?;
        Ok(())
    }

    fn php_filter() -> PathFilter {
        PathFilter::new(&["storage"], &[".env*"], &["php"]).unwrap()
    }

    #[test]
    fn test_collects_sorted_and_filtered() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        for rel in [
            "app/Models/User.php",
            "app/Http/Kernel.php",
            "app/README",
            "app/.env.php",
            "storage/cache.php",
            "storage2/kept.php",
        ] {
            touch(dir.path(), rel).unwrap();
        }

        let files = Scanner::new(dir.path(), php_filter()).scan(&["app", "storage", "storage2"])?;
        assert_eq!(
            files.iter().collect::<Vec<_>>(),
            vec!["app/Http/Kernel.php", "app/Models/User.php", "storage2/kept.php"]
        );
        Ok(())
    }

    #[test]
    fn test_overlapping_roots_dedup() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "app/Models/User.php").unwrap();

        let files = Scanner::new(dir.path(), php_filter()).scan(&[
            "app",
            "app/Models",
            "app/Models/User.php",
        ])?;
        assert_eq!(files.len(), 1);
        assert!(files.contains("app/Models/User.php"));
        Ok(())
    }

    #[test]
    fn test_missing_roots_are_skipped() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let files = Scanner::new(dir.path(), php_filter()).scan(&["nope", "also/missing.php"])?;
        assert!(files.is_empty());
        Ok(())
    }

    #[test]
    fn test_skip_path() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "docs/guide.md").unwrap();
        touch(dir.path(), "docs/snapshot.md").unwrap();

        let filter = PathFilter::new(&[] as &[&str], &[], &["md"]).unwrap();
        let files = Scanner::new(dir.path(), filter)
            .skip_path(&dir.path().join("docs/snapshot.md"))
            .scan(&["docs"])?;
        assert_eq!(files.iter().collect::<Vec<_>>(), vec!["docs/guide.md"]);
        Ok(())
    }

    #[test]
    fn test_include_roots_stay_inside_project() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "app/User.php").unwrap();

        let files = Scanner::new(dir.path(), php_filter()).scan(&["/app", "\\app"])?;
        assert_eq!(files.iter().collect::<Vec<_>>(), vec!["app/User.php"]);

        let result = Scanner::new(dir.path().join("app"), php_filter()).scan(&["../app"]);
        assert!(matches!(result, Err(crate::error::SnapFsError::Config(_))));
        Ok(())
    }

    #[test]
    fn test_skip_path_with_differently_spelled_root() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "docs/guide.md").unwrap();
        touch(dir.path(), "docs/snapshot.md").unwrap();

        // Same directory, but not a textual prefix of the output path
        let root = dir.path().join("docs").join("..");
        let filter = PathFilter::new(&[], &[], &["md"]).unwrap();
        let files = Scanner::new(&root, filter)
            .skip_path(&dir.path().join("docs/snapshot.md"))
            .scan(&["docs"])?;

        assert_eq!(files.iter().collect::<Vec<_>>(), vec!["docs/guide.md"]);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_file_names_are_skipped() -> Result<()> {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "app/User.php").unwrap();
        let name = OsStr::from_bytes(b"caf\xe9.php");
        if File::create(dir.path().join("app").join(name)).is_err() {
            // Filesystem refuses non-UTF-8 names
            return Ok(());
        }

        let files = Scanner::new(dir.path(), php_filter()).scan(&["app"])?;
        assert_eq!(files.iter().collect::<Vec<_>>(), vec!["app/User.php"]);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "app/a.php").unwrap();
        std::os::unix::fs::symlink(dir.path().join("app"), dir.path().join("app/loop")).unwrap();

        let result = Scanner::new(dir.path(), php_filter()).scan(&["app"]);
        assert!(matches!(result, Err(crate::error::SnapFsError::Walk(_))));
    }
}
