// Repository tree module.
// Assembles flat GitHub tree entries into a nested tree and tracks which folders are open.

pub mod builder;
pub mod expansion;
pub mod node;
pub mod rows;

pub use builder::build_tree;
pub use expansion::ExpansionTracker;
pub use node::{TreeCounts, TreeNode};
pub use rows::{VisibleRow, visible_rows};
