// GitHub API HTTP client.
// Handles optional authentication, rate limiting, and response status mapping.

use reqwest::{
    Client, Response, StatusCode, Url,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};

use crate::error::{ExplorerError, Result};

use super::types::RateLimit;

const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// GitHub API client with rate limit tracking.
///
/// Clones share the underlying connection pool; each clone tracks the
/// rate limit headers it has seen.
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
    rate_limit: RateLimit,
}

impl GitHubClient {
    /// Create a new GitHub client. Public repositories work without a token.
    pub fn new(token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();

        if let Some(token) = token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| ExplorerError::Other(e.to_string()))?,
            );
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("gh-explorer"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ExplorerError::Api)?;

        Ok(Self {
            client,
            base_url: GITHUB_API_BASE.to_string(),
            rate_limit: RateLimit::default(),
        })
    }

    /// Create a client, authenticating with GITHUB_TOKEN when it is set.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        if token.is_none() {
            tracing::info!("GITHUB_TOKEN not set, using unauthenticated requests");
        }
        Self::new(token.as_deref())
    }

    /// Point the client at another API root (GitHub Enterprise).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Get the current rate limit information.
    pub fn rate_limit(&self) -> &RateLimit {
        &self.rate_limit
    }

    /// Build an API URL from path segments, percent-encoding each one.
    pub fn url_for(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ExplorerError::Other(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ExplorerError::Other(format!("invalid API base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Make a GET request with query parameters.
    pub async fn get_url<T: serde::Serialize + ?Sized>(
        &mut self,
        url: Url,
        params: &T,
    ) -> Result<Response> {
        tracing::debug!(url = %url, "GET");
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(ExplorerError::Api)?;

        self.update_rate_limit(&response);
        self.check_response(response).await
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&mut self, response: &Response) {
        let header = |name: &str| -> Option<u64> {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
        };

        if let Some(limit) = header("x-ratelimit-limit") {
            self.rate_limit.limit = limit;
        }
        if let Some(remaining) = header("x-ratelimit-remaining") {
            self.rate_limit.remaining = remaining;
        }
        if let Some(reset) = header("x-ratelimit-reset") {
            self.rate_limit.reset = reset;
        }
    }

    fn rate_limited(&self) -> ExplorerError {
        let reset_at = chrono::DateTime::from_timestamp(self.rate_limit.reset as i64, 0)
            .map(|dt| dt.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        ExplorerError::RateLimited { reset_at }
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        match response.status() {
            StatusCode::OK => Ok(response),
            StatusCode::UNAUTHORIZED => Err(ExplorerError::Unauthorized),
            StatusCode::NOT_FOUND => {
                let url = response.url().to_string();
                Err(ExplorerError::NotFound(url))
            }
            StatusCode::TOO_MANY_REQUESTS => Err(self.rate_limited()),
            StatusCode::FORBIDDEN => {
                // Check if rate limited
                if self.rate_limit.remaining == 0 {
                    Err(self.rate_limited())
                } else {
                    Err(ExplorerError::Other(format!(
                        "Forbidden: {}",
                        response.text().await.unwrap_or_default()
                    )))
                }
            }
            status => Err(ExplorerError::Other(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            ))),
        }
    }
}
