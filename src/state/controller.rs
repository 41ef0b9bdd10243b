// Repository data controller.
// Consults the cache before fetching and applies fetch results only while they are current.

use crate::cache::{CacheKey, CacheStore, ResourceType};
use crate::error::{ExplorerError, Result};
use crate::github::{Branch, RepoId, RepositoryApi, RepositoryEntry, TreeSnapshot};

use super::loading::LoadingState;

/// Branch used until the user picks another one.
pub const DEFAULT_BRANCH: &str = "main";

const TRUNCATED_WARNING: &str = "Repository too large, showing partial structure";

/// A remote request that missed the cache.
///
/// Carries everything needed to perform the fetch away from the controller
/// and the generation it was issued under.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    pub generation: u64,
    pub key: CacheKey,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub path: String,
}

impl FetchTicket {
    pub fn resource(&self) -> ResourceType {
        self.key.resource()
    }

    /// Message for a failed fetch, naming what was missing on a 404.
    pub fn failure_message(&self, error: &ExplorerError) -> String {
        if !matches!(error, ExplorerError::NotFound(_)) {
            return error.user_message();
        }

        match self.resource() {
            ResourceType::Branches => {
                format!("Repository {}/{} not found or private", self.owner, self.repo)
            }
            ResourceType::Structure => format!(
                "Branch '{}' not found in {}/{} (or the repository is private)",
                self.branch, self.owner, self.repo
            ),
            ResourceType::Content => {
                format!("File '{}' not found on branch '{}'", self.path, self.branch)
            }
        }
    }
}

/// Result of asking the controller for a resource.
#[derive(Debug)]
pub enum Lookup {
    /// Served from the cache and already applied.
    Cached,
    /// Must be fetched; hand the ticket back with the result.
    Fetch(FetchTicket),
}

/// Payload of a finished fetch.
#[derive(Debug)]
pub enum FetchResult {
    Structure(Result<TreeSnapshot>),
    Branches(Result<Vec<Branch>>),
    Content(Result<String>),
}

/// A finished fetch together with the ticket that started it.
#[derive(Debug)]
pub struct FetchOutcome {
    pub ticket: FetchTicket,
    pub result: FetchResult,
}

/// Whether a completed fetch changed controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer request for the same resource was issued meanwhile.
    Discarded,
}

/// File shown in the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileView {
    pub path: String,
    pub content: String,
}

/// Latest issued request generation per resource.
#[derive(Debug, Default)]
struct Generations {
    structure: u64,
    branches: u64,
    content: u64,
}

impl Generations {
    fn slot(&mut self, resource: ResourceType) -> &mut u64 {
        match resource {
            ResourceType::Structure => &mut self.structure,
            ResourceType::Branches => &mut self.branches,
            ResourceType::Content => &mut self.content,
        }
    }

    fn issue(&mut self, resource: ResourceType) -> u64 {
        let slot = self.slot(resource);
        *slot += 1;
        *slot
    }

    fn is_current(&mut self, resource: ResourceType, generation: u64) -> bool {
        *self.slot(resource) == generation
    }

    fn advance_all(&mut self) {
        self.structure += 1;
        self.branches += 1;
        self.content += 1;
    }
}

/// Loads repository structure, branches, and file contents through the cache.
pub struct RepositoryDataController {
    cache: CacheStore,
    repo: Option<RepoId>,
    branch: String,
    generations: Generations,
    structure: LoadingState<TreeSnapshot>,
    branches: LoadingState<Vec<Branch>>,
    content: LoadingState<FileView>,
    selected_path: Option<String>,
    warning: Option<String>,
}

impl RepositoryDataController {
    pub fn new(cache: CacheStore) -> Self {
        Self {
            cache,
            repo: None,
            branch: DEFAULT_BRANCH.to_string(),
            generations: Generations::default(),
            structure: LoadingState::Idle,
            branches: LoadingState::Idle,
            content: LoadingState::Idle,
            selected_path: None,
            warning: None,
        }
    }

    pub fn repo(&self) -> Option<&RepoId> {
        self.repo.as_ref()
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn structure(&self) -> &LoadingState<TreeSnapshot> {
        &self.structure
    }

    /// Flat entry list of the loaded structure, ready for the tree builder.
    pub fn entries(&self) -> Option<&[RepositoryEntry]> {
        self.structure.data().map(|snapshot| snapshot.entries.as_slice())
    }

    pub fn branches(&self) -> &LoadingState<Vec<Branch>> {
        &self.branches
    }

    pub fn content(&self) -> &LoadingState<FileView> {
        &self.content
    }

    /// Path of the file last requested for the viewer.
    pub fn selected_path(&self) -> Option<&str> {
        self.selected_path.as_deref()
    }

    /// Non-blocking warning, such as a truncated structure.
    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Switch to another repository. In-flight requests become stale.
    pub fn open_repository(&mut self, repo: RepoId, branch: &str) {
        tracing::info!(repo = %repo, branch, "opening repository");
        self.repo = Some(repo);
        self.branch = branch.to_string();
        self.reset_views();
    }

    /// Switch branch, dropping cached data of the previous branch only.
    /// Returns false if `branch` is already active.
    pub fn switch_branch(&mut self, branch: &str) -> bool {
        if branch == self.branch {
            return false;
        }

        if let Some(repo) = &self.repo {
            self.cache
                .invalidate_branch(&repo.owner, &repo.repo, &self.branch);
        }
        tracing::info!(from = %self.branch, to = branch, "switching branch");
        self.branch = branch.to_string();
        self.reset_views();
        true
    }

    /// Forget cached data for the active branch and the branch list.
    pub fn refresh(&mut self) {
        if let Some(repo) = &self.repo {
            self.cache
                .invalidate_branch(&repo.owner, &repo.repo, &self.branch);
            self.cache.remove(&CacheKey::branches(&repo.owner, &repo.repo));
        }
        self.reset_views();
    }

    /// Drop every cached response, persisted copy included.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn reset_views(&mut self) {
        self.generations.advance_all();
        self.structure = LoadingState::Idle;
        self.branches = LoadingState::Idle;
        self.content = LoadingState::Idle;
        self.selected_path = None;
        self.warning = None;
    }

    fn active_repo(&self) -> Result<RepoId> {
        self.repo
            .clone()
            .ok_or_else(|| ExplorerError::InvalidRepository("no repository selected".to_string()))
    }

    fn ticket(&mut self, key: CacheKey, repo: RepoId, branch: &str, path: &str) -> FetchTicket {
        let generation = self.generations.issue(key.resource());
        FetchTicket {
            generation,
            key,
            owner: repo.owner,
            repo: repo.repo,
            branch: branch.to_string(),
            path: path.to_string(),
        }
    }

    /// Request the recursive structure of the active branch.
    pub fn request_structure(&mut self) -> Result<Lookup> {
        let repo = self.active_repo()?;
        let key = CacheKey::structure(&repo.owner, &repo.repo, &self.branch);

        if let Some(snapshot) = self.cache.get::<TreeSnapshot>(&key) {
            tracing::debug!(key = %key, "structure served from cache");
            self.generations.issue(ResourceType::Structure);
            self.apply_structure(snapshot);
            return Ok(Lookup::Cached);
        }

        self.structure = LoadingState::Loading;
        let branch = self.branch.clone();
        Ok(Lookup::Fetch(self.ticket(key, repo, &branch, "")))
    }

    /// Request the branch list of the active repository.
    pub fn request_branches(&mut self) -> Result<Lookup> {
        let repo = self.active_repo()?;
        let key = CacheKey::branches(&repo.owner, &repo.repo);

        if let Some(branches) = self.cache.get::<Vec<Branch>>(&key) {
            tracing::debug!(key = %key, "branches served from cache");
            self.generations.issue(ResourceType::Branches);
            self.branches = LoadingState::Loaded(branches);
            return Ok(Lookup::Cached);
        }

        self.branches = LoadingState::Loading;
        let branch = self.branch.clone();
        Ok(Lookup::Fetch(self.ticket(key, repo, &branch, "")))
    }

    /// Request a file's content on the active branch.
    pub fn request_content(&mut self, path: &str) -> Result<Lookup> {
        let repo = self.active_repo()?;
        let key = CacheKey::content(&repo.owner, &repo.repo, &self.branch, path);
        self.selected_path = Some(path.to_string());

        if let Some(content) = self.cache.get::<String>(&key) {
            tracing::debug!(key = %key, "content served from cache");
            self.generations.issue(ResourceType::Content);
            self.content = LoadingState::Loaded(FileView {
                path: path.to_string(),
                content,
            });
            return Ok(Lookup::Cached);
        }

        self.content = LoadingState::Loading;
        let branch = self.branch.clone();
        Ok(Lookup::Fetch(self.ticket(key, repo, &branch, path)))
    }

    /// Apply a finished fetch if its ticket is still the latest for its resource.
    pub fn complete(&mut self, outcome: FetchOutcome) -> Completion {
        let FetchOutcome { ticket, result } = outcome;

        if !self.generations.is_current(ticket.resource(), ticket.generation) {
            tracing::debug!(
                key = %ticket.key,
                generation = ticket.generation,
                "discarding stale response"
            );
            return Completion::Discarded;
        }

        match result {
            FetchResult::Structure(Ok(snapshot)) => {
                tracing::info!(
                    key = %ticket.key,
                    entries = snapshot.entries.len(),
                    truncated = snapshot.truncated,
                    "structure fetched"
                );
                self.cache.set(&ticket.key, &snapshot);
                self.apply_structure(snapshot);
            }
            FetchResult::Structure(Err(e)) => {
                tracing::warn!(key = %ticket.key, error = %e, "structure fetch failed");
                self.structure = LoadingState::Error(ticket.failure_message(&e));
            }
            FetchResult::Branches(Ok(branches)) => {
                tracing::info!(key = %ticket.key, count = branches.len(), "branches fetched");
                self.cache.set(&ticket.key, &branches);
                self.branches = LoadingState::Loaded(branches);
            }
            FetchResult::Branches(Err(e)) => {
                tracing::warn!(key = %ticket.key, error = %e, "branch fetch failed");
                self.branches = LoadingState::Error(ticket.failure_message(&e));
            }
            FetchResult::Content(Ok(content)) => {
                tracing::info!(key = %ticket.key, bytes = content.len(), "content fetched");
                self.cache.set(&ticket.key, &content);
                self.content = LoadingState::Loaded(FileView {
                    path: ticket.path,
                    content,
                });
            }
            FetchResult::Content(Err(e)) => {
                tracing::warn!(key = %ticket.key, error = %e, "content fetch failed");
                self.content = LoadingState::Error(ticket.failure_message(&e));
            }
        }

        Completion::Applied
    }

    fn apply_structure(&mut self, snapshot: TreeSnapshot) {
        self.warning = snapshot.truncated.then(|| TRUNCATED_WARNING.to_string());
        self.structure = LoadingState::Loaded(snapshot);
    }

    /// Fetch, cache, and apply the active branch's structure.
    pub async fn load_structure<A: RepositoryApi>(&mut self, api: &mut A) -> Result<Completion> {
        let lookup = self.request_structure()?;
        Ok(self.resolve(api, lookup).await)
    }

    /// Fetch, cache, and apply the branch list.
    pub async fn load_branches<A: RepositoryApi>(&mut self, api: &mut A) -> Result<Completion> {
        let lookup = self.request_branches()?;
        Ok(self.resolve(api, lookup).await)
    }

    /// Fetch, cache, and apply a file's content.
    pub async fn load_content<A: RepositoryApi>(
        &mut self,
        api: &mut A,
        path: &str,
    ) -> Result<Completion> {
        let lookup = self.request_content(path)?;
        Ok(self.resolve(api, lookup).await)
    }

    async fn resolve<A: RepositoryApi>(&mut self, api: &mut A, lookup: Lookup) -> Completion {
        match lookup {
            Lookup::Cached => Completion::Applied,
            Lookup::Fetch(ticket) => {
                let outcome = perform(api, ticket).await;
                self.complete(outcome)
            }
        }
    }
}

/// Perform the remote call a ticket describes.
pub async fn perform<A: RepositoryApi>(api: &mut A, ticket: FetchTicket) -> FetchOutcome {
    let result = match ticket.resource() {
        ResourceType::Structure => FetchResult::Structure(
            api.fetch_tree(&ticket.owner, &ticket.repo, &ticket.branch)
                .await,
        ),
        ResourceType::Branches => {
            FetchResult::Branches(api.fetch_branches(&ticket.owner, &ticket.repo).await)
        }
        ResourceType::Content => FetchResult::Content(
            api.fetch_file_content(&ticket.owner, &ticket.repo, &ticket.branch, &ticket.path)
                .await,
        ),
    };

    FetchOutcome { ticket, result }
}
