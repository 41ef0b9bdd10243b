// Cache key construction.
// Keys are derived from the resource type and its repository coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of remote resource a cache entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Structure,
    Branches,
    Content,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Structure => "structure",
            ResourceType::Branches => "branches",
            ResourceType::Content => "content",
        }
    }
}

/// Repository branch an entry belongs to.
/// Stored next to the entry so a branch can be invalidated without parsing keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheScope {
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl CacheScope {
    pub fn new(owner: &str, repo: &str, branch: &str) -> Self {
        Self {
            owner: owner.to_lowercase(),
            repo: repo.to_lowercase(),
            branch: branch.to_lowercase(),
        }
    }

    /// Check whether this scope names the given branch (case-insensitive).
    pub fn matches(&self, owner: &str, repo: &str, branch: &str) -> bool {
        self.owner == owner.to_lowercase()
            && self.repo == repo.to_lowercase()
            && self.branch == branch.to_lowercase()
    }
}

/// Cache key for one remote request.
///
/// Renders as `<resource>_<owner>_<repo>_<branch>_<path>`, lower-cased.
/// Branch-list keys leave branch and path empty; structure keys leave path empty.
/// `_` and `%` inside a field are percent-escaped so field boundaries stay unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    resource: ResourceType,
    owner: String,
    repo: String,
    branch: String,
    path: String,
}

impl CacheKey {
    fn new(resource: ResourceType, owner: &str, repo: &str, branch: &str, path: &str) -> Self {
        Self {
            resource,
            owner: owner.to_lowercase(),
            repo: repo.to_lowercase(),
            branch: branch.to_lowercase(),
            path: path.trim_start_matches('/').to_lowercase(),
        }
    }

    /// Key for the recursive tree of a branch.
    pub fn structure(owner: &str, repo: &str, branch: &str) -> Self {
        Self::new(ResourceType::Structure, owner, repo, branch, "")
    }

    /// Key for a repository's branch list.
    pub fn branches(owner: &str, repo: &str) -> Self {
        Self::new(ResourceType::Branches, owner, repo, "", "")
    }

    /// Key for one file's decoded content on a branch.
    pub fn content(owner: &str, repo: &str, branch: &str, path: &str) -> Self {
        Self::new(ResourceType::Content, owner, repo, branch, path)
    }

    pub fn resource(&self) -> ResourceType {
        self.resource
    }

    /// Branch scope of this key. Branch lists are not tied to a branch.
    pub fn scope(&self) -> Option<CacheScope> {
        match self.resource {
            ResourceType::Branches => None,
            ResourceType::Structure | ResourceType::Content => Some(CacheScope {
                owner: self.owner.clone(),
                repo: self.repo.clone(),
                branch: self.branch.clone(),
            }),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}_{}",
            self.resource.as_str(),
            escape_field(&self.owner),
            escape_field(&self.repo),
            escape_field(&self.branch),
            escape_field(&self.path)
        )
    }
}

fn escape_field(field: &str) -> String {
    field.replace('%', "%25").replace('_', "%5f")
}
