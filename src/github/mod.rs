// GitHub API module.
// Provides the client, the remote API contract, and response types.

pub mod api;
pub mod client;
pub mod endpoints;
pub mod types;

pub use api::RepositoryApi;
pub use client::GitHubClient;
pub use types::*;
