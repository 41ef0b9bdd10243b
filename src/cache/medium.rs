// Durable backing media for the cache store.
// The whole cache is persisted as a single JSON document.

use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{ExplorerError, Result};

/// A single-slot durable key-value medium holding the serialized cache.
pub trait CacheMedium {
    /// Read the persisted document, or `None` if nothing has been written.
    fn load(&self) -> Result<Option<String>>;

    /// Replace the persisted document.
    fn save(&mut self, contents: &str) -> Result<()>;

    /// Remove the persisted document entirely.
    fn erase(&mut self) -> Result<()>;
}

/// Persists the cache document to a file on disk.
#[derive(Debug, Clone)]
pub struct FileMedium {
    path: PathBuf,
}

impl FileMedium {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File medium at the platform cache location, if one can be resolved.
    pub fn default_location() -> Option<Self> {
        super::paths::cache_file_path().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheMedium for FileMedium {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)?;
        Ok(Some(contents))
    }

    fn save(&mut self, contents: &str) -> Result<()> {
        let write = || -> std::io::Result<()> {
            // Ensure parent directory exists
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }

            // Write atomically via temp file
            let temp_path = self.path.with_extension("tmp");
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(contents.as_bytes())?;
            file.sync_all()?;
            fs::rename(&temp_path, &self.path)
        };

        write().map_err(|e| {
            ExplorerError::StorageExhausted(format!("{}: {}", self.path.display(), e))
        })
    }

    fn erase(&mut self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// In-process medium used for `--no-persist` sessions and tests.
///
/// Clones share the same slot, so a handle kept outside the store sees
/// every write. An optional byte quota makes writes fail once exceeded.
#[derive(Debug, Clone, Default)]
pub struct MemoryMedium {
    slot: Rc<RefCell<Option<String>>>,
    quota: Option<usize>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    /// Medium that rejects documents larger than `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            slot: Rc::default(),
            quota: Some(bytes),
        }
    }

    /// Overwrite the slot directly, bypassing the quota.
    pub fn seed(&self, contents: &str) {
        *self.slot.borrow_mut() = Some(contents.to_string());
    }

    /// Current persisted document.
    pub fn contents(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl CacheMedium for MemoryMedium {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&mut self, contents: &str) -> Result<()> {
        if let Some(quota) = self.quota {
            if contents.len() > quota {
                return Err(ExplorerError::StorageExhausted(format!(
                    "document of {} bytes exceeds quota of {} bytes",
                    contents.len(),
                    quota
                )));
            }
        }
        *self.slot.borrow_mut() = Some(contents.to_string());
        Ok(())
    }

    fn erase(&mut self) -> Result<()> {
        *self.slot.borrow_mut() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_medium_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let mut medium = FileMedium::new(temp_dir.path().join("nested").join("cache.json"));

        assert!(medium.load().unwrap().is_none());

        medium.save("{\"a\":1}").unwrap();
        assert_eq!(medium.load().unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(!medium.path().with_extension("tmp").exists());

        medium.erase().unwrap();
        assert!(medium.load().unwrap().is_none());
        assert!(!medium.path().exists());
    }

    #[test]
    fn test_file_medium_erase_missing_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let mut medium = FileMedium::new(temp_dir.path().join("cache.json"));
        assert!(medium.erase().is_ok());
    }

    #[test]
    fn test_memory_medium_shares_slot() {
        let handle = MemoryMedium::new();
        let mut medium = handle.clone();

        medium.save("doc").unwrap();
        assert_eq!(handle.contents().as_deref(), Some("doc"));

        medium.erase().unwrap();
        assert!(handle.contents().is_none());
    }

    #[test]
    fn test_memory_medium_quota() {
        let mut medium = MemoryMedium::with_quota(4);
        assert!(medium.save("tiny").is_ok());

        let err = medium.save("too large").unwrap_err();
        assert!(matches!(err, ExplorerError::StorageExhausted(_)));
        assert_eq!(medium.contents().as_deref(), Some("tiny"));
    }
}
