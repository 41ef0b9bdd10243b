// Visible row flattening.
// Walks the tree in display order, descending only into open folders.

use crate::github::EntryKind;

use super::node::TreeNode;

/// One line of the rendered tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub depth: usize,
    pub name: String,
    pub path: String,
    pub kind: EntryKind,
    pub expanded: bool,
}

impl VisibleRow {
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Flatten `root` into display rows.
///
/// Siblings are listed directories first, then by name. Children are only
/// emitted below directories for which `is_open` returns true. The root
/// itself is not a row.
pub fn visible_rows(root: &TreeNode, is_open: impl Fn(&str) -> bool) -> Vec<VisibleRow> {
    let mut rows = Vec::new();
    let mut stack: Vec<(&TreeNode, usize)> = Vec::new();
    push_children(&mut stack, root, 0);

    while let Some((node, depth)) = stack.pop() {
        let expanded = node.is_directory() && is_open(node.path.as_str());
        rows.push(VisibleRow {
            depth,
            name: node.name.clone(),
            path: node.path.clone(),
            kind: node.kind,
            expanded,
        });

        if expanded {
            push_children(&mut stack, node, depth + 1);
        }
    }

    rows
}

/// Push children in reverse display order so they pop in display order.
fn push_children<'a>(stack: &mut Vec<(&'a TreeNode, usize)>, node: &'a TreeNode, depth: usize) {
    let mut children: Vec<&TreeNode> = node.children.values().collect();
    children.sort_by(|a, b| {
        b.is_directory()
            .cmp(&a.is_directory())
            .then_with(|| a.name.cmp(&b.name))
    });
    stack.extend(children.into_iter().rev().map(|child| (child, depth)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::RepositoryEntry;
    use crate::tree::{ExpansionTracker, build_tree};

    fn file(path: &str) -> RepositoryEntry {
        RepositoryEntry {
            path: path.to_string(),
            kind: EntryKind::File,
            identity: String::new(),
            size: None,
        }
    }

    fn paths(rows: &[VisibleRow]) -> Vec<&str> {
        rows.iter().map(|row| row.path.as_str()).collect()
    }

    #[test]
    fn test_collapsed_tree_shows_top_level() {
        let root = build_tree(&[file("a/b.txt"), file("a/c/d.txt"), file("e.txt")]);
        let tracker = ExpansionTracker::new();
        let snapshot = tracker.snapshot();

        let rows = visible_rows(&root, |path| snapshot.is_expanded(path));
        assert_eq!(paths(&rows), vec!["a", "e.txt"]);
        assert!(!rows[0].expanded);
    }

    #[test]
    fn test_expanded_directories_show_children() {
        let root = build_tree(&[file("a/b.txt"), file("a/c/d.txt"), file("e.txt")]);
        let mut tracker = ExpansionTracker::new();
        tracker.toggle("a");
        let snapshot = tracker.snapshot();

        let rows = visible_rows(&root, |path| snapshot.is_expanded(path));
        assert_eq!(paths(&rows), vec!["a", "a/c", "a/b.txt", "e.txt"]);
        assert_eq!(rows[1].depth, 1);
        assert!(rows[0].expanded);
        assert!(!rows[1].expanded);
    }

    #[test]
    fn test_open_nested_under_closed_parent_stays_hidden() {
        let root = build_tree(&[file("a/c/d.txt")]);
        let mut tracker = ExpansionTracker::new();
        tracker.toggle("a/c");
        let snapshot = tracker.snapshot();

        let rows = visible_rows(&root, |path| snapshot.is_expanded(path));
        assert_eq!(paths(&rows), vec!["a"]);
    }

    #[test]
    fn test_fully_open() {
        let root = build_tree(&[file("z.txt"), file("a/c/d.txt"), file("b/x.txt")]);
        let rows = visible_rows(&root, |_| true);
        assert_eq!(
            paths(&rows),
            vec!["a", "a/c", "a/c/d.txt", "b", "b/x.txt", "z.txt"]
        );
        assert_eq!(rows[2].depth, 2);
    }
}
