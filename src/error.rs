// Error types for gh-explorer.
// Covers GitHub API failures, cache persistence failures, and invalid input.

use thiserror::Error;

/// Coarse classification used to decide how an error is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Repository, branch, or path does not exist or is inaccessible.
    NotFound,
    /// The provider is throttling requests.
    RateLimited,
    /// Network, HTTP, or parse failure; retrying may help.
    Transient,
    /// Persisted cache could not be read.
    CacheCorruption,
    /// Persisted cache could not be written.
    StorageExhausted,
    /// Bad repository identifier or other user input.
    Invalid,
}

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("GitHub API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Authentication failed: GITHUB_TOKEN is invalid or expired")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("Invalid repository: {0}")]
    InvalidRepository(String),

    #[error("Could not decode file content: {0}")]
    Decode(String),

    #[error("Cache unreadable: {0}")]
    CacheCorruption(String),

    #[error("Cache write failed: {0}")]
    StorageExhausted(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl ExplorerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExplorerError::NotFound(_) | ExplorerError::Unauthorized => ErrorKind::NotFound,
            ExplorerError::RateLimited { .. } => ErrorKind::RateLimited,
            ExplorerError::CacheCorruption(_) => ErrorKind::CacheCorruption,
            ExplorerError::StorageExhausted(_) => ErrorKind::StorageExhausted,
            ExplorerError::InvalidRepository(_) => ErrorKind::Invalid,
            ExplorerError::Api(_)
            | ExplorerError::Decode(_)
            | ExplorerError::Json(_)
            | ExplorerError::Io(_)
            | ExplorerError::Other(_) => ErrorKind::Transient,
        }
    }

    /// Message shown to the user in the status bar or a pane.
    pub fn user_message(&self) -> String {
        match self {
            ExplorerError::NotFound(what) => format!("Not found or private: {}", what),
            ExplorerError::RateLimited { .. } => format!("API rate limit exceeded. {}", self),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
