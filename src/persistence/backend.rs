//! Key-value storage backends for drafts
//!
//! This module provides a trait-based abstraction over local persistent
//! storage, enabling:
//! - File-backed storage for the CLI and real sessions
//! - In-memory storage for tests, with quota and failure simulation

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

/// Errors raised inside a storage backend.
///
/// These never escape [`super::DraftStore`]; they are logged there and turned
/// into "not saved this cycle".
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage quota exceeded: {needed} bytes needed, {limit} available")]
    QuotaExceeded { needed: usize, limit: usize },

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode draft record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("stored record '{key}' is unreadable: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Minimal key-value surface the draft store needs
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Returns whether the key existed
    fn remove(&self, key: &str) -> Result<bool, StoreError>;

    /// All keys starting with `prefix`
    fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}

// ─── File backend ───────────────────────────────────────────────────────────

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key.replace(':', "__")))
    }

    fn key_for(file_name: &str) -> Option<String> {
        file_name
            .strip_suffix(".json")
            .map(|stem| stem.replace("__", ":"))
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        // Write then rename so a crash never leaves half a record behind
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry?;
            if let Some(key) = entry.file_name().to_str().and_then(Self::key_for) {
                if key.starts_with(prefix) {
                    keys.push(key);
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

// ─── Memory backend ─────────────────────────────────────────────────────────

/// In-memory backend for tests.
///
/// Clones share the same storage, so a test can keep a handle and inspect
/// writes made through a [`super::DraftStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<Mutex<HashMap<String, String>>>,
    /// Total bytes allowed across all values
    quota_bytes: Option<usize>,
    /// When set, every operation fails with [`StoreError::Unavailable`]
    pub offline: Arc<Mutex<bool>>,
    /// Keys written, in order
    pub write_log: Arc<Mutex<Vec<String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    pub fn set_offline(&self, offline: bool) {
        *lock(&self.offline) = offline;
    }

    pub fn write_count(&self) -> usize {
        lock(&self.write_log).len()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store a raw value, bypassing quota and logging
    pub fn insert_raw(&self, key: &str, value: &str) {
        lock(&self.entries).insert(key.to_string(), value.to_string());
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if *lock(&self.offline) {
            return Err(StoreError::Unavailable("backend is offline".to_string()));
        }
        Ok(())
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check_online()?;
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_online()?;
        let mut entries = lock(&self.entries);

        if let Some(limit) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let needed = others + value.len();
            if needed > limit {
                return Err(StoreError::QuotaExceeded { needed, limit });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        lock(&self.write_log).push(key.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        self.check_online()?;
        Ok(lock(&self.entries).remove(key).is_some())
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.check_online()?;
        let mut keys: Vec<String> = lock(&self.entries)
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

/// Lock a mutex, recovering the data if a previous holder panicked
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_backend_round_trip() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path().join("drafts"));

        assert_eq!(backend.get("offer-wizard:draft:a").unwrap(), None);
        backend.put("offer-wizard:draft:a", "{}").unwrap();
        backend.put("offer-wizard:draft:b", "[]").unwrap();
        backend.put("other:c", "1").unwrap();

        assert_eq!(
            backend.get("offer-wizard:draft:a").unwrap().as_deref(),
            Some("{}")
        );
        assert_eq!(
            backend.keys("offer-wizard:draft:").unwrap(),
            vec![
                "offer-wizard:draft:a".to_string(),
                "offer-wizard:draft:b".to_string()
            ]
        );
        assert!(backend.remove("offer-wizard:draft:a").unwrap());
        assert!(!backend.remove("offer-wizard:draft:a").unwrap());
    }

    #[test]
    fn test_file_backend_missing_dir_has_no_keys() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path().join("never-created"));
        assert!(backend.keys("").unwrap().is_empty());
    }

    #[test]
    fn test_memory_backend_quota() {
        let backend = MemoryBackend::with_quota(10);
        backend.put("a", "12345").unwrap();
        // overwriting the same key only counts the new value
        backend.put("a", "1234567890").unwrap();

        let err = backend.put("b", "x").unwrap_err();
        assert!(matches!(
            err,
            StoreError::QuotaExceeded {
                needed: 11,
                limit: 10
            }
        ));
        assert_eq!(backend.write_count(), 2);
    }

    #[test]
    fn test_memory_backend_offline() {
        let backend = MemoryBackend::new();
        let handle = backend.clone();
        backend.put("k", "v").unwrap();

        handle.set_offline(true);
        assert!(matches!(backend.get("k"), Err(StoreError::Unavailable(_))));

        handle.set_offline(false);
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("v"));
    }
}
