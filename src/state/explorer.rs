// Tree pane state.
// Holds the built tree, which folders are open, and the list selection.

use ratatui::widgets::ListState;

use crate::github::RepositoryEntry;
use crate::tree::{ExpansionTracker, TreeCounts, TreeNode, VisibleRow, build_tree, visible_rows};

/// What activating the selected row asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// A folder was opened or closed.
    Toggled,
    /// A file should be shown in the viewer.
    OpenFile(String),
}

/// State behind the tree pane.
#[derive(Debug, Default)]
pub struct ExplorerState {
    tree: TreeNode,
    counts: TreeCounts,
    expansion: ExpansionTracker,
    rows: Vec<VisibleRow>,
    pub list_state: ListState,
}

impl ExplorerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tree with one built from `entries`.
    /// Open folders and the selected path carry over when they still exist.
    pub fn rebuild(&mut self, entries: &[RepositoryEntry]) {
        let selected = self.selected_row().map(|row| row.path.clone());
        self.tree = build_tree(entries);
        self.counts = self.tree.count();
        self.refresh_rows();
        self.reselect(selected.as_deref());
    }

    /// Drop the tree but keep expansion state for the next rebuild.
    pub fn clear(&mut self) {
        self.tree = TreeNode::root();
        self.counts = TreeCounts::default();
        self.rows.clear();
        self.list_state.select(None);
    }

    /// Collapse every folder.
    pub fn collapse_all(&mut self) {
        self.expansion.reset();
        let selected = self.selected_row().map(|row| top_level(&row.path).to_string());
        self.refresh_rows();
        self.reselect(selected.as_deref());
    }

    pub fn tree(&self) -> &TreeNode {
        &self.tree
    }

    pub fn counts(&self) -> TreeCounts {
        self.counts
    }

    pub fn rows(&self) -> &[VisibleRow] {
        &self.rows
    }

    pub fn selected_row(&self) -> Option<&VisibleRow> {
        self.list_state.selected().and_then(|i| self.rows.get(i))
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.expansion.is_expanded(path)
    }

    /// Open a folder or request a file for the selected row.
    pub fn activate_selected(&mut self) -> Option<Activation> {
        let row = self.selected_row()?.clone();
        if row.is_directory() {
            self.expansion.toggle(&row.path);
            self.refresh_rows();
            Some(Activation::Toggled)
        } else {
            Some(Activation::OpenFile(row.path))
        }
    }

    /// Open the selected folder.
    pub fn expand_selected(&mut self) {
        if let Some(row) = self.selected_row().filter(|row| row.is_directory()).cloned() {
            self.expansion.expand(&row.path);
            self.refresh_rows();
        }
    }

    /// Close the selected folder, or jump to the parent of a closed row.
    pub fn collapse_selected(&mut self) {
        let Some(row) = self.selected_row().cloned() else {
            return;
        };

        if row.expanded {
            self.expansion.collapse(&row.path);
            self.refresh_rows();
        } else if let Some((parent, _)) = row.path.rsplit_once('/') {
            let parent = parent.to_string();
            self.reselect(Some(parent.as_str()));
        }
    }

    pub fn select_next(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < self.rows.len() => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_prev(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.rows.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.rows.is_empty() {
            self.list_state.select(Some(self.rows.len() - 1));
        }
    }

    /// Recompute rows from an expansion snapshot.
    fn refresh_rows(&mut self) {
        let snapshot = self.expansion.snapshot();
        self.rows = visible_rows(&self.tree, |path| snapshot.is_expanded(path));
    }

    /// Select the row at `path`, falling back to a clamped index.
    fn reselect(&mut self, path: Option<&str>) {
        if self.rows.is_empty() {
            self.list_state.select(None);
            return;
        }

        let index = path
            .and_then(|path| self.rows.iter().position(|row| row.path == path))
            .or_else(|| self.list_state.selected().map(|i| i.min(self.rows.len() - 1)))
            .unwrap_or(0);
        self.list_state.select(Some(index));
    }
}

fn top_level(path: &str) -> &str {
    path.split('/').next().unwrap_or(path)
}
