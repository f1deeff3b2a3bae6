//! Durable local key-value storage
//!
//! Storage is a plain byte store addressed by string keys. [`MemoryStore`]
//! backs tests and ephemeral sessions, [`FileStore`] keeps one file per key.

pub mod chat_history;

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::stores::lock;

pub use chat_history::{ChatHistoryRepository, ChatPersistence, CHAT_HISTORY_KEY};

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> DiscoveryResult<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> DiscoveryResult<()>;
    fn remove(&self, key: &str) -> DiscoveryResult<()>;
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> DiscoveryResult<Option<Vec<u8>>> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> DiscoveryResult<()> {
        lock(&self.entries).insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> DiscoveryResult<()> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// failed write leaves the previous value intact.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> DiscoveryResult<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DiscoveryError::Persistence(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> DiscoveryResult<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        fs::create_dir_all(&self.dir)
            .and_then(|_| fs::write(&tmp, value))
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| {
                let _ = fs::remove_file(&tmp);
                DiscoveryError::Persistence(format!("Failed to write {}: {}", path.display(), e))
            })
    }

    fn remove(&self, key: &str) -> DiscoveryResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DiscoveryError::Persistence(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
