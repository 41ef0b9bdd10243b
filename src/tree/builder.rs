// Tree builder.
// Converts the flat recursive tree listing into a nested TreeNode hierarchy.

use crate::github::RepositoryEntry;

use super::node::TreeNode;

/// Build a nested tree from a flat list of repository entries.
///
/// Intermediate directories are created once per distinct prefix. The
/// entry at a path always supplies that node's kind and identity, whether
/// it arrives before or after entries below it; for duplicate paths the
/// last entry wins. Entries with an empty path are skipped.
pub fn build_tree(entries: &[RepositoryEntry]) -> TreeNode {
    let mut root = TreeNode::root();

    for entry in entries {
        let segments: Vec<&str> = entry.path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((leaf, parents)) = segments.split_last() else {
            tracing::debug!(path = %entry.path, "skipping entry with empty path");
            continue;
        };

        let mut current = &mut root;
        for segment in parents {
            let path = child_path(&current.path, segment);
            current = current
                .children
                .entry((*segment).to_string())
                .or_insert_with(|| TreeNode::directory(segment, path));
        }

        let path = child_path(&current.path, leaf);
        let node = current
            .children
            .entry((*leaf).to_string())
            .or_insert_with(|| TreeNode::directory(leaf, path));
        node.kind = entry.kind;
        node.identity = entry.identity.clone();
        node.size = entry.size;
    }

    root
}

fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::EntryKind;

    fn file(path: &str, sha: &str) -> RepositoryEntry {
        RepositoryEntry {
            path: path.to_string(),
            kind: EntryKind::File,
            identity: sha.to_string(),
            size: Some(10),
        }
    }

    fn dir(path: &str, sha: &str) -> RepositoryEntry {
        RepositoryEntry {
            path: path.to_string(),
            kind: EntryKind::Directory,
            identity: sha.to_string(),
            size: None,
        }
    }

    #[test]
    fn test_empty_input() {
        let root = build_tree(&[]);
        assert!(root.is_root());
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_tree_shape() {
        let root = build_tree(&[
            file("a/b.txt", "1"),
            file("a/c/d.txt", "2"),
            file("e.txt", "3"),
        ]);

        assert_eq!(root.children.len(), 2);

        let a = &root.children["a"];
        assert!(a.is_directory());
        assert_eq!(a.path, "a");
        assert_eq!(a.children.len(), 2);
        assert_eq!(a.children["b.txt"].kind, EntryKind::File);

        let c = &a.children["c"];
        assert!(c.is_directory());
        assert_eq!(c.path, "a/c");
        assert_eq!(c.children["d.txt"].path, "a/c/d.txt");
        assert_eq!(c.children["d.txt"].identity, "2");

        let e = &root.children["e.txt"];
        assert_eq!(e.kind, EntryKind::File);
        assert_eq!(e.path, "e.txt");
    }

    #[test]
    fn test_single_segment_is_root_child() {
        let root = build_tree(&[file("README.md", "r")]);
        assert_eq!(root.children["README.md"].path, "README.md");
    }

    #[test]
    fn test_explicit_directory_entry_keeps_children() {
        let root = build_tree(&[file("src/main.rs", "m"), dir("src", "tree-sha")]);

        let src = &root.children["src"];
        assert_eq!(src.identity, "tree-sha");
        assert_eq!(src.children.len(), 1);
    }

    #[test]
    fn test_duplicate_paths_last_wins() {
        let root = build_tree(&[file("a.txt", "old"), file("a.txt", "new")]);
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children["a.txt"].identity, "new");
    }

    #[test]
    fn test_order_independent() {
        let entries = vec![
            dir("a", "ta"),
            file("a/b.txt", "1"),
            file("a/c/d.txt", "2"),
            dir("a/c", "tc"),
            file("e.txt", "3"),
        ];
        let mut reversed = entries.clone();
        reversed.reverse();

        assert_eq!(build_tree(&entries), build_tree(&reversed));
    }

    #[test]
    fn test_leaf_kind_wins_over_implied_directory() {
        let forward = build_tree(&[file("x/y", "child"), file("x", "leaf")]);
        let backward = build_tree(&[file("x", "leaf"), file("x/y", "child")]);

        assert_eq!(forward, backward);
        let x = &forward.children["x"];
        assert_eq!(x.kind, EntryKind::File);
        assert_eq!(x.identity, "leaf");
    }

    #[test]
    fn test_stray_slashes_and_empty_paths() {
        let root = build_tree(&[file("", "skip"), file("/a//b.txt", "1")]);
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.find("a/b.txt").unwrap().path, "a/b.txt");
    }

    #[test]
    fn test_deep_path() {
        let path = (0..500).map(|i| i.to_string()).collect::<Vec<_>>().join("/");
        let root = build_tree(&[file(&path, "deep")]);
        assert_eq!(root.find(&path).unwrap().identity, "deep");
        assert_eq!(root.count().directories, 499);
    }
}
