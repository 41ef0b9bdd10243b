// Cache store for reading and writing cached responses.
// Handles JSON serialization, TTL checking, lazy eviction, and persistence.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{ExplorerError, Result};

use super::keys::{CacheKey, CacheScope};
use super::medium::CacheMedium;

/// Default TTL for cached responses: 1 hour.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Source of the current time for expiry checks.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// One cached payload with its write time and lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// The cached payload, exactly as passed to `set`.
    pub data: Value,
    /// When the payload was written.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub stored_at: DateTime<Utc>,
    /// Lifetime fixed at write time.
    #[serde(with = "duration_millis")]
    pub ttl: Duration,
    /// Branch the payload belongs to, when it is branch-specific.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<CacheScope>,
}

impl CacheEntry {
    /// Check if this entry has outlived its TTL at `now`.
    /// Entries stamped in the future (clock stepped back) count as fresh.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let elapsed = now
            .signed_duration_since(self.stored_at)
            .to_std()
            .unwrap_or(Duration::ZERO);

        elapsed > self.ttl
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ttl: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Expiring key-value cache backed by a durable medium.
///
/// The store hydrates once when constructed and writes the full document
/// back after every mutation. Persistence failures are logged and never
/// reach callers: a corrupt document yields an empty store, and a failed
/// write leaves the in-memory state in effect for the session.
pub struct CacheStore {
    entries: HashMap<String, CacheEntry>,
    medium: Box<dyn CacheMedium>,
    clock: Box<dyn Clock>,
    default_ttl: Duration,
}

impl CacheStore {
    /// Open a store over `medium` using wall-clock time.
    pub fn open(medium: Box<dyn CacheMedium>) -> Self {
        Self::with_clock(medium, Box::new(SystemClock))
    }

    /// Open a store with an explicit time source.
    pub fn with_clock(medium: Box<dyn CacheMedium>, clock: Box<dyn Clock>) -> Self {
        let mut store = Self {
            entries: HashMap::new(),
            medium,
            clock,
            default_ttl: DEFAULT_TTL,
        };
        store.hydrate();
        store
    }

    /// Override the TTL used by `set`.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    #[cfg(test)]
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get a cached value if present and not expired.
    ///
    /// Expired entries are evicted (in memory and on the medium) before
    /// returning `None`. A payload that does not decode as `T` is a miss.
    pub fn get<T: DeserializeOwned>(&mut self, key: &CacheKey) -> Option<T> {
        let scope = key.scope();
        let key = key.to_string();
        let now = self.clock.now();

        let entry = self.entries.get(&key)?;
        if entry.scope.as_ref() != scope.as_ref() {
            tracing::debug!(key = %key, "cache entry belongs to another scope");
            return None;
        }
        if entry.is_expired(now) {
            tracing::debug!(key = %key, "cache entry expired");
            self.entries.remove(&key);
            self.persist();
            return None;
        }

        match serde_json::from_value(entry.data.clone()) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "cached payload has unexpected shape");
                None
            }
        }
    }

    /// Store `data` under `key` with the default TTL.
    pub fn set<T: Serialize>(&mut self, key: &CacheKey, data: &T) {
        self.set_with_ttl(key, data, self.default_ttl);
    }

    /// Store `data` under `key`, replacing any previous entry.
    pub fn set_with_ttl<T: Serialize>(&mut self, key: &CacheKey, data: &T, ttl: Duration) {
        let data = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "payload could not be serialized");
                return;
            }
        };

        let entry = CacheEntry {
            data,
            stored_at: self.clock.now(),
            ttl,
            scope: key.scope(),
        };
        self.entries.insert(key.to_string(), entry);
        self.persist();
    }

    /// Remove one entry. Returns whether anything was removed.
    pub fn remove(&mut self, key: &CacheKey) -> bool {
        let removed = self.entries.remove(&key.to_string()).is_some();
        if removed {
            self.persist();
        }
        removed
    }

    /// Remove every entry scoped to `(owner, repo, branch)`.
    /// Returns the number of entries removed.
    pub fn invalidate_branch(&mut self, owner: &str, repo: &str, branch: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| {
            !entry
                .scope
                .as_ref()
                .is_some_and(|scope| scope.matches(owner, repo, branch))
        });

        let removed = before - self.entries.len();
        if removed > 0 {
            tracing::debug!(owner, repo, branch, removed, "invalidated branch entries");
            self.persist();
        }
        removed
    }

    /// Drop every entry and erase the persisted document.
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Err(e) = self.medium.erase() {
            tracing::warn!(error = %e, "failed to erase persisted cache");
        }
    }

    /// Load the persisted document, keeping only unexpired entries.
    fn hydrate(&mut self) {
        let now = self.clock.now();
        match self.read_persisted() {
            Ok(stored) => {
                let total = stored.len();
                self.entries = stored
                    .into_iter()
                    .filter(|(_, entry)| !entry.is_expired(now))
                    .collect();
                tracing::debug!(
                    loaded = self.entries.len(),
                    discarded = total - self.entries.len(),
                    "cache hydrated"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable cache, starting empty");
                self.entries.clear();
            }
        }
    }

    fn read_persisted(&self) -> Result<BTreeMap<String, CacheEntry>> {
        let raw = self
            .medium
            .load()
            .map_err(|e| ExplorerError::CacheCorruption(e.to_string()))?;

        match raw {
            None => Ok(BTreeMap::new()),
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| ExplorerError::CacheCorruption(e.to_string())),
        }
    }

    /// Write the full store; failures only cost durability.
    fn persist(&mut self) {
        if let Err(e) = self.write_persisted() {
            tracing::warn!(error = %e, "cache kept in memory only");
        }
    }

    fn write_persisted(&mut self) -> Result<()> {
        let document: BTreeMap<&String, &CacheEntry> = self.entries.iter().collect();
        let json = serde_json::to_string(&document)?;
        self.medium.save(&json)
    }
}

/// Manually advanced clock for expiry tests.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: std::rc::Rc<std::cell::Cell<DateTime<Utc>>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: std::rc::Rc::new(std::cell::Cell::new(Utc::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        let by = chrono::Duration::from_std(by).unwrap();
        self.now.set(self.now.get() + by);
    }

    pub fn rewind(&self, by: Duration) {
        let by = chrono::Duration::from_std(by).unwrap();
        self.now.set(self.now.get() - by);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{FileMedium, MemoryMedium};
    use tempfile::TempDir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn test_data(value: i32) -> TestData {
        TestData {
            name: "test".to_string(),
            value,
        }
    }

    fn store_with(medium: &MemoryMedium, clock: &ManualClock) -> CacheStore {
        CacheStore::with_clock(Box::new(medium.clone()), Box::new(clock.clone()))
    }

    fn key() -> CacheKey {
        CacheKey::structure("octo", "hello", "main")
    }

    #[test]
    fn test_set_and_get() {
        let medium = MemoryMedium::new();
        let clock = ManualClock::new();
        let mut store = store_with(&medium, &clock);

        store.set(&key(), &test_data(42));

        let cached: Option<TestData> = store.get(&key());
        assert_eq!(cached, Some(test_data(42)));
    }

    #[test]
    fn test_get_is_idempotent() {
        let medium = MemoryMedium::new();
        let clock = ManualClock::new();
        let mut store = store_with(&medium, &clock);
        store.set(&key(), &test_data(1));

        let first: Option<TestData> = store.get(&key());
        let second: Option<TestData> = store.get(&key());
        assert_eq!(first, second);
        assert!(first.is_some());
    }

    #[test]
    fn test_missing_key_is_absent() {
        let mut store = store_with(&MemoryMedium::new(), &ManualClock::new());
        let cached: Option<TestData> = store.get(&key());
        assert!(cached.is_none());
    }

    #[test]
    fn test_overwrite_returns_latest() {
        let mut store = store_with(&MemoryMedium::new(), &ManualClock::new());

        store.set(&key(), &test_data(1));
        store.set(&key(), &test_data(2));

        let cached: Option<TestData> = store.get(&key());
        assert_eq!(cached, Some(test_data(2)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_expiry_boundary() {
        let medium = MemoryMedium::new();
        let clock = ManualClock::new();
        let mut store = store_with(&medium, &clock);
        let ttl = Duration::from_secs(10);

        store.set_with_ttl(&key(), &test_data(7), ttl);

        clock.advance(ttl - Duration::from_millis(1));
        let before: Option<TestData> = store.get(&key());
        assert_eq!(before, Some(test_data(7)));

        clock.advance(Duration::from_millis(2));
        let after: Option<TestData> = store.get(&key());
        assert!(after.is_none());
    }

    #[test]
    fn test_clock_stepping_back_keeps_entries() {
        let medium = MemoryMedium::new();
        let clock = ManualClock::new();
        let mut store = store_with(&medium, &clock);

        store.set_with_ttl(&key(), &test_data(1), Duration::from_secs(3600));
        clock.rewind(Duration::from_secs(1));
        assert_eq!(store.get::<TestData>(&key()), Some(test_data(1)));

        // A document stamped ahead of this machine's clock survives hydration
        let reopened = store_with(&medium, &clock);
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn test_underscored_branch_and_path_do_not_collide() {
        let mut store = store_with(&MemoryMedium::new(), &ManualClock::new());
        let on_feat = CacheKey::content("octo", "hello", "feat", "x_y.txt");
        let on_feat_x = CacheKey::content("octo", "hello", "feat_x", "y.txt");

        store.set(&on_feat, &"content of x_y.txt on feat".to_string());
        assert_eq!(store.get::<String>(&on_feat_x), None);

        store.set(&on_feat_x, &"content of y.txt on feat_x".to_string());
        assert_eq!(
            store.get::<String>(&on_feat).as_deref(),
            Some("content of x_y.txt on feat")
        );
        assert_eq!(
            store.get::<String>(&on_feat_x).as_deref(),
            Some("content of y.txt on feat_x")
        );
    }

    #[test]
    fn test_entry_with_foreign_scope_is_a_miss() {
        let medium = MemoryMedium::new();
        let clock = ManualClock::new();
        let on_feat_x = CacheKey::content("octo", "hello", "feat_x", "y.txt");
        let stamp = clock.now().timestamp_millis();
        // Written under this key string by a build that did not escape fields
        medium.seed(&format!(
            r#"{{"{}":{{"data":"wrong file","storedAt":{},"ttl":60000,"scope":{{"owner":"octo","repo":"hello","branch":"feat"}}}}}}"#,
            on_feat_x, stamp
        ));

        let mut store = store_with(&medium, &clock);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get::<String>(&on_feat_x), None);
    }

    #[test]
    fn test_expired_entry_is_evicted_from_medium() {
        let medium = MemoryMedium::new();
        let clock = ManualClock::new();
        let mut store = store_with(&medium, &clock);

        store.set_with_ttl(&key(), &test_data(1), Duration::from_secs(1));
        assert!(medium.contents().unwrap().contains("structure_octo_hello_main_"));

        clock.advance(Duration::from_secs(2));
        let cached: Option<TestData> = store.get(&key());
        assert!(cached.is_none());
        assert!(store.is_empty());
        assert!(!medium.contents().unwrap().contains("structure_octo_hello_main_"));
    }

    #[test]
    fn test_default_ttl_is_one_hour() {
        let clock = ManualClock::new();
        let mut store = store_with(&MemoryMedium::new(), &clock);
        assert_eq!(store.default_ttl(), Duration::from_secs(3600));

        store.set(&key(), &test_data(1));
        clock.advance(Duration::from_secs(3599));
        assert!(store.get::<TestData>(&key()).is_some());

        clock.advance(Duration::from_secs(2));
        assert!(store.get::<TestData>(&key()).is_none());
    }

    #[test]
    fn test_hydrates_from_medium() {
        let medium = MemoryMedium::new();
        let clock = ManualClock::new();

        let mut first = store_with(&medium, &clock);
        first.set(&key(), &test_data(5));
        drop(first);

        let mut second = store_with(&medium, &clock);
        let cached: Option<TestData> = second.get(&key());
        assert_eq!(cached, Some(test_data(5)));
    }

    #[test]
    fn test_hydrate_discards_expired_entries() {
        let medium = MemoryMedium::new();
        let clock = ManualClock::new();

        let mut first = store_with(&medium, &clock);
        first.set_with_ttl(&key(), &test_data(1), Duration::from_secs(5));
        first.set_with_ttl(
            &CacheKey::branches("octo", "hello"),
            &test_data(2),
            Duration::from_secs(500),
        );

        clock.advance(Duration::from_secs(60));
        let second = store_with(&medium, &clock);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_corrupt_medium_yields_empty_store() {
        let medium = MemoryMedium::new();
        medium.seed("{not json");

        let mut store = store_with(&medium, &ManualClock::new());
        assert!(store.is_empty());
        assert!(store.get::<TestData>(&key()).is_none());

        // Store remains usable
        store.set(&key(), &test_data(3));
        assert_eq!(store.get::<TestData>(&key()), Some(test_data(3)));
    }

    #[test]
    fn test_failed_write_keeps_memory_entry() {
        let medium = MemoryMedium::with_quota(8);
        let mut store = store_with(&medium, &ManualClock::new());

        store.set(&key(), &test_data(9));

        assert_eq!(store.get::<TestData>(&key()), Some(test_data(9)));
        assert!(medium.contents().is_none());
    }

    #[test]
    fn test_clear_empties_memory_and_medium() {
        let medium = MemoryMedium::new();
        let clock = ManualClock::new();
        let mut store = store_with(&medium, &clock);
        store.set(&key(), &test_data(1));
        store.set(&CacheKey::branches("octo", "hello"), &test_data(2));

        store.clear();

        assert!(store.get::<TestData>(&key()).is_none());
        assert!(store.is_empty());
        assert!(medium.contents().is_none());

        let reopened = store_with(&medium, &clock);
        assert!(reopened.is_empty());
    }

    #[test]
    fn test_invalidate_branch_is_scoped() {
        let medium = MemoryMedium::new();
        let clock = ManualClock::new();
        let mut store = store_with(&medium, &clock);

        store.set(&CacheKey::structure("octo", "hello", "main"), &test_data(1));
        store.set(&CacheKey::content("octo", "hello", "main", "a.txt"), &test_data(2));
        store.set(&CacheKey::structure("octo", "hello", "main_x"), &test_data(3));
        store.set(&CacheKey::structure("octo", "hello", "dev"), &test_data(4));
        store.set(&CacheKey::branches("octo", "hello"), &test_data(5));

        let removed = store.invalidate_branch("Octo", "Hello", "MAIN");

        assert_eq!(removed, 2);
        assert_eq!(store.len(), 3);
        assert!(
            store
                .get::<TestData>(&CacheKey::structure("octo", "hello", "main_x"))
                .is_some()
        );
        assert!(
            store
                .get::<TestData>(&CacheKey::branches("octo", "hello"))
                .is_some()
        );

        let reopened = store_with(&medium, &clock);
        assert_eq!(reopened.len(), 3);
    }

    #[test]
    fn test_wrong_shape_is_a_miss() {
        let mut store = store_with(&MemoryMedium::new(), &ManualClock::new());
        store.set(&key(), &"just a string");

        let cached: Option<TestData> = store.get(&key());
        assert!(cached.is_none());
    }

    #[test]
    fn test_persisted_format() {
        let medium = MemoryMedium::new();
        let mut store = store_with(&medium, &ManualClock::new());
        store.set_with_ttl(&key(), &test_data(1), Duration::from_millis(1500));

        let doc: Value = serde_json::from_str(&medium.contents().unwrap()).unwrap();
        let entry = &doc["structure_octo_hello_main_"];
        assert_eq!(entry["ttl"], 1500);
        assert!(entry["storedAt"].is_i64());
        assert_eq!(entry["data"]["value"], 1);
    }

    #[test]
    fn test_file_medium_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cache.json");

        let mut store = CacheStore::open(Box::new(FileMedium::new(&path)));
        store.set(&key(), &test_data(11));
        drop(store);

        let mut reopened = CacheStore::open(Box::new(FileMedium::new(&path)));
        assert_eq!(reopened.get::<TestData>(&key()), Some(test_data(11)));
    }
}
