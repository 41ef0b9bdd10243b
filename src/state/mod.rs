// State management module.
// Handles repository data loading, caching decisions, and tree pane state.

pub mod controller;
pub mod explorer;
pub mod loading;

pub use controller::{
    Completion, DEFAULT_BRANCH, FetchOutcome, FileView, Lookup, RepositoryDataController, perform,
};
pub use explorer::{Activation, ExplorerState};
pub use loading::LoadingState;
