use parking_lot::RwLock;
use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

/// StorageError
///
/// Failures of the backing store. The credential store logs these instead of
/// surfacing them, because its own contract has no error conditions.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// 1. KeyValueStore Contract
/// KeyValueStore
///
/// The abstract contract for persistent string storage, the native counterpart
/// of a browser's `localStorage`. Implementations are synchronous and must be
/// shareable across tasks, so the pipeline can hold them behind an `Arc`.
///
/// A missing key is `None`, never an error.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// 2. The Persistent Implementation
/// FileStorage
///
/// Keeps all entries as a single JSON object on disk. The whole object is
/// rewritten on every mutation (the store only ever holds a couple of short
/// strings), via a temporary file and a rename so a crash mid-write cannot
/// leave a truncated file behind.
pub struct FileStorage {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStorage {
    /// open
    ///
    /// Loads the file at `path`. A missing file starts empty; a corrupt file is
    /// reported and also starts empty, mirroring how a browser treats cleared
    /// site data.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "discarding unreadable credential file");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read credential file");
                BTreeMap::new()
            }
        };

        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // Hold the write lock across the flush so disk order matches memory order.
        let mut entries = self.entries.write();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write();
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&entries)
    }
}

// 3. The In-Memory Implementation
/// MemoryStorage
///
/// Process-local storage used by tests and by sessions that should not outlive
/// the process.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store, for tests that start from an existing session.
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            entries: RwLock::new(map),
        }
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// StorageState
///
/// The concrete type used to share the storage backend across the pipeline.
pub type StorageState = Arc<dyn KeyValueStore>;
