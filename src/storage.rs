use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

// Well-known keys. Every consumer goes through these constants so the durable
// area never accumulates ad hoc key spellings.
pub const SESSION_TOKEN_KEY: &str = "session_token";
pub const LOCALE_KEY: &str = "locale";

/// KeyValueStorage
///
/// Defines the abstract contract for the durable client-side key-value area
/// that survives restarts (session token, locale preference). The trait allows
/// swapping the concrete implementation, from the file-backed store used by a
/// real shell to the in-memory mock used in tests, without affecting callers.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Reads a value. Absent keys and unreadable state both resolve to `None`.
    async fn get(&self, key: &str) -> Option<String>;

    /// Writes a value durably.
    async fn set(&self, key: &str, value: &str) -> Result<(), String>;

    /// Removes a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), String>;
}

/// StorageState
///
/// The concrete type used to share the storage implementation across stores.
pub type StorageState = Arc<dyn KeyValueStorage>;

// 1. The Real Implementation (JSON file on disk)

/// FileStorage
///
/// Persists the key-value map as a single JSON file. Writes go through a
/// temporary file followed by a rename so an interrupted write never leaves a
/// truncated state file behind.
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles; the file itself is the source of truth.
    lock: Mutex<()>,
}

impl FileStorage {
    /// Creates a store backed by the given file path. The file is created on
    /// first write; a missing file reads as an empty map.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read_map(&self) -> HashMap<String, String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!("discarding unreadable storage file: {e}");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        }
    }

    async fn write_map(&self, map: &HashMap<String, String>) -> Result<(), String> {
        let raw = serde_json::to_string_pretty(map).map_err(|e| e.to_string())?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, raw).await.map_err(|e| e.to_string())?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().await;
        self.read_map().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), String> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map).await
    }

    async fn remove(&self, key: &str) -> Result<(), String> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await;
        if map.remove(key).is_some() {
            self.write_map(&map).await?;
        }
        Ok(())
    }
}

// 2. The Mock Implementation (For Tests)

/// MockStorage
///
/// An in-memory implementation of `KeyValueStorage` used in tests. The
/// `should_fail` switch simulates a broken durable area so failure paths can
/// be exercised without touching the filesystem.
pub struct MockStorage {
    entries: Mutex<HashMap<String, String>>,
    pub should_fail: bool,
}

impl MockStorage {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            should_fail: false,
        }
    }

    pub fn new_failing() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            should_fail: true,
        }
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStorage for MockStorage {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), String> {
        if self.should_fail {
            return Err("mock storage failure: write rejected".to_string());
        }
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), String> {
        if self.should_fail {
            return Err("mock storage failure: remove rejected".to_string());
        }
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
