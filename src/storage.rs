//! Local cart persistence
//!
//! The cart survives restarts through a [`CartStore`], a small key/value
//! repository holding the JSON-serialized cart. It is injected into the
//! controller so tests can use [`MemoryStore`] while the binary uses
//! [`JsonFileStore`].

use crate::cart::models::CartLine;
use crate::error::StorageError;
use dashmap::DashMap;
use std::path::PathBuf;

/// Key/value store for the persisted cart.
///
/// Access is synchronous; implementations should be cheap enough to call
/// after every cart mutation.
pub trait CartStore: Send + Sync {
    /// Reads the raw value stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrites the value stored under `key`.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Reads and decodes the cart stored under `key`.
    fn load(&self, key: &str) -> Result<Option<Vec<CartLine>>, StorageError> {
        match self.read(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Encodes and stores `lines` under `key`, replacing any previous cart.
    fn save(&self, key: &str, lines: &[CartLine]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(lines)?;
        self.write(key, &raw)
    }
}

// =============================================================================
// In-memory store
// =============================================================================

/// Process-local store. Nothing outlives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// DashMap allows concurrent access without external Mutexes.
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw value, e.g. a cart written by an earlier session.
    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }
}

impl CartStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// =============================================================================
// File-backed store
// =============================================================================

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Uses `dir` as the storage root. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl CartStore for JsonFileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        // Write-then-rename so a crash never leaves half a cart behind.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}
