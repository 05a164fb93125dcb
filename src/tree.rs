/*!
 * Hierarchical rendering of a flat path list
 */

use std::collections::{BTreeMap, BTreeSet};

use crate::types::FileSet;
use crate::utils::normalize_separators;

/// A directory level of the rendered tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    /// Subdirectories by name
    pub directories: BTreeMap<String, TreeNode>,
    /// File basenames at this level
    pub files: BTreeSet<String>,
}

impl TreeNode {
    /// Build a tree from `/`-separated relative paths
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized: Vec<String> = paths
            .into_iter()
            .map(|p| normalize_separators(p.as_ref()))
            .collect();
        let segments: Vec<Vec<&str>> = normalized
            .iter()
            .map(|p| p.split('/').filter(|s| !s.is_empty()).collect::<Vec<_>>())
            .filter(|s| !s.is_empty())
            .collect();
        let slices: Vec<&[&str]> = segments.iter().map(Vec::as_slice).collect();

        Self::build(&slices)
    }

    /// Group paths by their first segment and build each child level
    fn build(paths: &[&[&str]]) -> Self {
        let mut files = BTreeSet::new();
        let mut children: BTreeMap<&str, Vec<&[&str]>> = BTreeMap::new();

        for segments in paths {
            match segments {
                [name] => {
                    files.insert(name.to_string());
                }
                [dir, rest @ ..] => children.entry(*dir).or_default().push(rest),
                [] => {}
            }
        }

        let directories = children
            .into_iter()
            .map(|(name, rest)| (name.to_string(), Self::build(&rest)))
            .collect();

        Self { directories, files }
    }

    /// Render the tree as indented list lines
    ///
    /// Directories come first at every level, suffixed with `/`, followed by
    /// the files of that level.
    pub fn render(&self) -> Vec<String> {
        let mut lines = Vec::new();
        self.render_into(0, &mut lines);
        lines
    }

    fn render_into(&self, depth: usize, lines: &mut Vec<String>) {
        let indent = "  ".repeat(depth);

        for (name, child) in &self.directories {
            lines.push(format!("{}- {}/", indent, name));
            child.render_into(depth + 1, lines);
        }

        for name in &self.files {
            lines.push(format!("{}- {}", indent, name));
        }
    }
}

/// Render the display lines for a file set
pub fn render(files: &FileSet) -> Vec<String> {
    TreeNode::from_paths(files.iter()).render()
}
