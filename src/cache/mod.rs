// Cache module for locally persisted GitHub responses.
// Stores repository structure, branch lists, and file contents with a TTL.

pub mod keys;
pub mod medium;
pub mod paths;
pub mod store;

pub use keys::{CacheKey, ResourceType};
pub use medium::{CacheMedium, FileMedium, MemoryMedium};
pub use store::CacheStore;
