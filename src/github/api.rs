// Remote repository API contract.
// The controller talks to this trait so tests can substitute a fake provider.

use crate::error::Result;

use super::client::GitHubClient;
use super::types::{Branch, TreeSnapshot};

/// Remote operations the explorer depends on.
#[allow(async_fn_in_trait)]
pub trait RepositoryApi {
    /// Branch list for a repository.
    async fn fetch_branches(&mut self, owner: &str, repo: &str) -> Result<Vec<Branch>>;

    /// Full recursive structure of a branch, flagged when incomplete.
    async fn fetch_tree(&mut self, owner: &str, repo: &str, branch: &str) -> Result<TreeSnapshot>;

    /// Decoded content of one file.
    async fn fetch_file_content(
        &mut self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
    ) -> Result<String>;
}

impl RepositoryApi for GitHubClient {
    async fn fetch_branches(&mut self, owner: &str, repo: &str) -> Result<Vec<Branch>> {
        self.get_branches(owner, repo).await
    }

    async fn fetch_tree(&mut self, owner: &str, repo: &str, branch: &str) -> Result<TreeSnapshot> {
        self.get_tree(owner, repo, branch).await
    }

    async fn fetch_file_content(
        &mut self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
    ) -> Result<String> {
        self.get_file_content(owner, repo, branch, path).await
    }
}
