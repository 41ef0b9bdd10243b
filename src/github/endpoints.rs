// GitHub API endpoint functions.
// Provides typed methods for fetching branches, trees, and file contents.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::error::{ExplorerError, Result};

use super::client::GitHubClient;
use super::types::{Branch, FileContentResponse, TreeSnapshot};

const BRANCHES_PER_PAGE: usize = 100;

/// Safety stop for repositories with an unusual number of branches.
const MAX_BRANCH_PAGES: u32 = 10;

impl GitHubClient {
    /// Get all branches for a repository, in the order GitHub returns them.
    pub async fn get_branches(&mut self, owner: &str, repo: &str) -> Result<Vec<Branch>> {
        let url = self.url_for(&["repos", owner, repo, "branches"])?;
        let mut branches = Vec::new();

        for page in 1..=MAX_BRANCH_PAGES {
            let params = [
                ("per_page", BRANCHES_PER_PAGE.to_string()),
                ("page", page.to_string()),
            ];
            let response = self.get_url(url.clone(), &params).await?;
            let batch: Vec<Branch> = response.json().await?;
            let done = batch.len() < BRANCHES_PER_PAGE;
            branches.extend(batch);
            if done {
                break;
            }
        }

        Ok(branches)
    }

    /// Get the full recursive tree of a branch.
    pub async fn get_tree(&mut self, owner: &str, repo: &str, branch: &str) -> Result<TreeSnapshot> {
        // Branch names may contain slashes, which GitHub expects unescaped
        let mut segments = vec!["repos", owner, repo, "git", "trees"];
        segments.extend(branch.split('/').filter(|s| !s.is_empty()));
        let url = self.url_for(&segments)?;
        let response = self.get_url(url, &[("recursive", "1")]).await?;
        let snapshot: TreeSnapshot = response.json().await?;
        Ok(snapshot)
    }

    /// Get a file's content on a branch, decoded to text.
    pub async fn get_file_content(
        &mut self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
    ) -> Result<String> {
        let mut segments = vec!["repos", owner, repo, "contents"];
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
        let url = self.url_for(&segments)?;

        let response = self.get_url(url, &[("ref", branch)]).await?;
        let file: FileContentResponse = response.json().await?;
        decode_content(&file)
    }
}

/// Decode a contents API payload.
fn decode_content(file: &FileContentResponse) -> Result<String> {
    match file.encoding.as_deref() {
        Some("base64") => {
            // GitHub wraps base64 at 60 columns
            let cleaned: String = file
                .content
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect();
            let bytes = STANDARD
                .decode(cleaned)
                .map_err(|e| ExplorerError::Decode(e.to_string()))?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        Some("none") | None if file.content.is_empty() && file.size > 0 => Err(
            ExplorerError::Other(format!("File too large to display ({} bytes)", file.size)),
        ),
        _ => Ok(file.content.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(content: &str, encoding: Option<&str>, size: u64) -> FileContentResponse {
        FileContentResponse {
            content: content.to_string(),
            encoding: encoding.map(str::to_string),
            size,
        }
    }

    #[test]
    fn test_decode_wrapped_base64() {
        let file = response("aGVsbG8g\nd29ybGQ=\n", Some("base64"), 11);
        assert_eq!(decode_content(&file).unwrap(), "hello world");
    }

    #[test]
    fn test_decode_invalid_base64() {
        let file = response("@@@", Some("base64"), 3);
        assert!(matches!(
            decode_content(&file),
            Err(ExplorerError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_large_file_without_content() {
        let file = response("", Some("none"), 5_000_000);
        assert!(decode_content(&file).is_err());
    }

    #[test]
    fn test_decode_empty_file() {
        let file = response("", Some("base64"), 0);
        assert_eq!(decode_content(&file).unwrap(), "");
    }
}
