// Folder expansion state.
// Tracks which directory paths are open, independent of the tree they belong to.

use std::collections::HashSet;
use std::sync::Arc;

/// Set of expanded directory paths.
///
/// Keyed by path rather than node, so it survives tree rebuilds: a folder
/// that is still present after a refresh stays open. Absence means collapsed.
#[derive(Debug, Clone, Default)]
pub struct ExpansionTracker {
    expanded: Arc<HashSet<String>>,
}

/// Immutable view of the expansion state for one render pass.
#[derive(Debug, Clone, Default)]
pub struct ExpansionSnapshot {
    expanded: Arc<HashSet<String>>,
}

impl ExpansionSnapshot {
    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }
}

#[cfg(test)]
impl ExpansionSnapshot {
    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

impl ExpansionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a path between collapsed and expanded. Returns the new state.
    pub fn toggle(&mut self, path: &str) -> bool {
        let expanded = Arc::make_mut(&mut self.expanded);
        if expanded.remove(path) {
            false
        } else {
            expanded.insert(path.to_string());
            true
        }
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }

    pub fn expand(&mut self, path: &str) {
        if !self.is_expanded(path) {
            Arc::make_mut(&mut self.expanded).insert(path.to_string());
        }
    }

    pub fn collapse(&mut self, path: &str) {
        if self.is_expanded(path) {
            Arc::make_mut(&mut self.expanded).remove(path);
        }
    }

    /// Collapse everything.
    pub fn reset(&mut self) {
        self.expanded = Arc::default();
    }

    /// Capture the current state. Later toggles do not affect the snapshot.
    pub fn snapshot(&self) -> ExpansionSnapshot {
        ExpansionSnapshot {
            expanded: Arc::clone(&self.expanded),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{EntryKind, RepositoryEntry};
    use crate::tree::build_tree;

    fn file(path: &str) -> RepositoryEntry {
        RepositoryEntry {
            path: path.to_string(),
            kind: EntryKind::File,
            identity: String::new(),
            size: None,
        }
    }

    #[test]
    fn test_collapsed_by_default() {
        let tracker = ExpansionTracker::new();
        assert!(!tracker.is_expanded("a"));
        assert!(!tracker.is_expanded(""));
    }

    #[test]
    fn test_toggle_is_symmetric() {
        let mut tracker = ExpansionTracker::new();

        assert!(tracker.toggle("a"));
        assert!(tracker.is_expanded("a"));

        assert!(!tracker.toggle("a"));
        assert!(!tracker.is_expanded("a"));
    }

    #[test]
    fn test_expand_and_collapse_are_idempotent() {
        let mut tracker = ExpansionTracker::new();
        tracker.expand("a");
        tracker.expand("a");
        assert!(tracker.is_expanded("a"));

        tracker.collapse("a");
        tracker.collapse("a");
        assert!(!tracker.is_expanded("a"));
    }

    #[test]
    fn test_snapshot_is_immutable() {
        let mut tracker = ExpansionTracker::new();
        tracker.toggle("a");
        let snapshot = tracker.snapshot();

        tracker.toggle("a");
        tracker.toggle("b");

        assert!(snapshot.is_expanded("a"));
        assert!(!snapshot.is_expanded("b"));
        assert_eq!(snapshot.len(), 1);
        assert!(tracker.snapshot().is_expanded("b"));
    }

    #[test]
    fn test_survives_tree_rebuild() {
        let mut tracker = ExpansionTracker::new();
        let first = build_tree(&[file("a/b.txt"), file("c.txt")]);
        assert!(first.find("a").is_some());
        tracker.toggle("a");

        let second = build_tree(&[file("a/b.txt"), file("a/new.txt"), file("d.txt")]);
        assert!(second.find("a").is_some());
        assert!(tracker.is_expanded("a"));
    }

    #[test]
    fn test_reset() {
        let mut tracker = ExpansionTracker::new();
        tracker.toggle("a");
        tracker.toggle("a/b");
        tracker.reset();
        assert!(!tracker.is_expanded("a"));
        assert!(tracker.snapshot().is_empty());
    }
}
