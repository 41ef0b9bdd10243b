// Tree node type.
// One file or directory in the assembled repository tree.

use std::collections::BTreeMap;

use crate::github::EntryKind;

/// A file or directory in the nested repository tree.
///
/// `path` is always the `/`-join of the names from the root down to this node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    pub path: String,
    pub kind: EntryKind,
    /// Content hash from the provider; empty for synthesized directories.
    pub identity: String,
    pub size: Option<u64>,
    pub children: BTreeMap<String, TreeNode>,
}

/// Number of files and directories below a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeCounts {
    pub files: usize,
    pub directories: usize,
}

impl Default for TreeNode {
    fn default() -> Self {
        Self::root()
    }
}

impl TreeNode {
    /// The synthetic root with an empty name and path.
    pub fn root() -> Self {
        Self::directory("", String::new())
    }

    /// A directory synthesized from a path prefix.
    pub(crate) fn directory(name: &str, path: String) -> Self {
        Self {
            name: name.to_string(),
            path,
            kind: EntryKind::Directory,
            identity: String::new(),
            size: None,
            children: BTreeMap::new(),
        }
    }

    #[cfg(test)]
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Find a descendant by its full path.
    pub fn find(&self, path: &str) -> Option<&TreeNode> {
        let mut current = self;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = current.children.get(segment)?;
        }
        Some(current)
    }

    /// Count all descendants, excluding this node.
    pub fn count(&self) -> TreeCounts {
        let mut counts = TreeCounts::default();
        let mut stack: Vec<&TreeNode> = self.children.values().collect();

        while let Some(node) = stack.pop() {
            if node.is_directory() {
                counts.directories += 1;
            } else {
                counts.files += 1;
            }
            stack.extend(node.children.values());
        }

        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode {
        let mut root = TreeNode::root();
        let mut src = TreeNode::directory("src", "src".to_string());
        let mut main = TreeNode::directory("main.rs", "src/main.rs".to_string());
        main.kind = EntryKind::File;
        src.children.insert("main.rs".to_string(), main);
        root.children.insert("src".to_string(), src);
        root
    }

    #[test]
    fn test_root() {
        let root = TreeNode::root();
        assert!(root.is_root());
        assert!(root.is_directory());
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_find() {
        let root = sample();
        assert_eq!(root.find("src/main.rs").unwrap().name, "main.rs");
        assert_eq!(root.find("src").unwrap().path, "src");
        assert!(root.find("").unwrap().is_root());
        assert!(root.find("src/lib.rs").is_none());
    }

    #[test]
    fn test_count() {
        let counts = sample().count();
        assert_eq!(
            counts,
            TreeCounts {
                files: 1,
                directories: 1
            }
        );
    }
}
