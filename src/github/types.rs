// GitHub API response types.
// Defines structs for deserializing tree, branch, and contents responses.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, Result};

/// Kind of a tree entry.
/// Submodules (`commit`) are listed as files since they cannot be expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    #[serde(rename = "blob", alias = "commit")]
    File,
    #[serde(rename = "tree")]
    Directory,
}

/// One item of a recursive git tree listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryEntry {
    /// Slash-delimited path relative to the repository root.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Git object hash.
    #[serde(rename = "sha")]
    pub identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Response of `GET /repos/{owner}/{repo}/git/trees/{ref}?recursive=1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSnapshot {
    #[serde(rename = "tree")]
    pub entries: Vec<RepositoryEntry>,
    /// Set when GitHub could not return the full tree.
    #[serde(default)]
    pub truncated: bool,
}

/// Commit a branch points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRef {
    pub sha: String,
}

/// Repository branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub commit: CommitRef,
}

impl Branch {
    pub fn commit_identity(&self) -> &str {
        &self.commit.sha
    }
}

/// Response of `GET /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, Deserialize)]
pub struct FileContentResponse {
    #[serde(default)]
    pub content: String,
    pub encoding: Option<String>,
    pub size: u64,
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parse `owner/repo` or a github.com URL.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let rest = match trimmed.find("github.com") {
            Some(idx) => &trimmed[idx + "github.com".len()..],
            None => trimmed,
        };

        let mut parts = rest
            .trim_start_matches([':', '/'])
            .split('/')
            .filter(|s| !s.is_empty());

        match (parts.next(), parts.next()) {
            (Some(owner), Some(repo)) => {
                let repo = repo.trim_end_matches(".git");
                if repo.is_empty() {
                    return Err(ExplorerError::InvalidRepository(input.to_string()));
                }
                Ok(Self::new(owner, repo))
            }
            _ => Err(ExplorerError::InvalidRepository(input.to_string())),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_tree_response() {
        let json = r#"{
            "sha": "abc",
            "url": "https://api.github.com/repos/o/r/git/trees/abc",
            "tree": [
                {"path": "src", "mode": "040000", "type": "tree", "sha": "t1", "url": "u"},
                {"path": "src/main.rs", "mode": "100644", "type": "blob", "sha": "b1", "size": 42, "url": "u"},
                {"path": "vendor/lib", "mode": "160000", "type": "commit", "sha": "c1"}
            ],
            "truncated": true
        }"#;

        let snapshot: TreeSnapshot = serde_json::from_str(json).unwrap();
        assert!(snapshot.truncated);
        assert_eq!(snapshot.entries.len(), 3);
        assert_eq!(snapshot.entries[0].kind, EntryKind::Directory);
        assert_eq!(snapshot.entries[1].size, Some(42));
        assert_eq!(snapshot.entries[1].identity, "b1");
        assert_eq!(snapshot.entries[2].kind, EntryKind::File);
    }

    #[test]
    fn test_deserialize_file_content() {
        let json = r#"{
            "type": "file",
            "encoding": "base64",
            "size": 5,
            "name": "README.md",
            "path": "README.md",
            "content": "aGVsbG8=\n",
            "sha": "3d21ec53a331a6f037a91c368710b99387d012c1"
        }"#;

        let file: FileContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(file.encoding.as_deref(), Some("base64"));
        assert_eq!(file.size, 5);
        assert_eq!(file.content, "aGVsbG8=\n");
    }

    #[test]
    fn test_deserialize_branch() {
        let json = r#"[{"name": "main", "commit": {"sha": "deadbeef", "url": "u"}, "protected": false}]"#;
        let branches: Vec<Branch> = serde_json::from_str(json).unwrap();
        assert_eq!(branches[0].name, "main");
        assert_eq!(branches[0].commit_identity(), "deadbeef");
    }

    #[test]
    fn test_parse_repo_id() {
        assert_eq!(
            RepoId::parse("rust-lang/rust").unwrap(),
            RepoId::new("rust-lang", "rust")
        );
        assert_eq!(
            RepoId::parse("https://github.com/octo-org/hello-world").unwrap(),
            RepoId::new("octo-org", "hello-world")
        );
        assert_eq!(
            RepoId::parse("https://github.com/octo-org/hello-world.git").unwrap(),
            RepoId::new("octo-org", "hello-world")
        );
        assert_eq!(
            RepoId::parse("git@github.com:octo-org/hello-world.git").unwrap(),
            RepoId::new("octo-org", "hello-world")
        );
        assert_eq!(
            RepoId::parse("github.com/a/b/tree/main/src").unwrap(),
            RepoId::new("a", "b")
        );
    }

    #[test]
    fn test_parse_repo_id_rejects_incomplete() {
        assert!(RepoId::parse("").is_err());
        assert!(RepoId::parse("just-owner").is_err());
        assert!(RepoId::parse("https://github.com/owner").is_err());
    }
}
