//! Key-value persistence: a string-to-string mapping with prefix-friendly
//! key listing. `FileStore` keeps one file per key under a data directory;
//! `MemoryStore` is the in-process reference used by tests.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

fn join_error(e: tokio::task::JoinError) -> StoreError {
    StoreError::Io(std::io::Error::other(format!("spawn_blocking failed: {e}")))
}

/// Contract the journal requires of its persistence backend.
pub trait KeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
    async fn list_keys(&self) -> Result<Vec<String>, StoreError>;
}

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// `~/.eod-journal`, falling back to the working directory when no home
    /// directory can be resolved.
    pub fn default_location() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            root: home.join(".eod-journal"),
        }
    }

    fn file_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty()
            || key.contains('/')
            || key.contains('\\')
            || key.contains("..")
        {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.file_for(key)?;
        tokio::task::spawn_blocking(move || match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        })
        .await
        .map_err(join_error)?
    }

    /// Writes go through a temporary file and an atomic rename so a crash
    /// mid-write never leaves a partial document behind.
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let path = self.file_for(key)?;
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            fs::create_dir_all(&root)?;
            let temp = path.with_extension("tmp");
            let mut f = File::create(&temp)?;
            f.write_all(value.as_bytes())?;
            f.sync_all()?;
            fs::rename(temp, &path)?;
            Ok(())
        })
        .await
        .map_err(join_error)?
    }

    async fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<String>, StoreError> {
            let entries = match fs::read_dir(&root) {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
                Err(e) => return Err(StoreError::Io(e)),
            };
            let mut keys = Vec::new();
            for entry in entries {
                let name = entry?.file_name();
                if let Some(key) = name.to_str().and_then(|n| n.strip_suffix(".json")) {
                    keys.push(key.to_string());
                }
            }
            keys.sort();
            Ok(keys)
        })
        .await
        .map_err(join_error)?
    }
}

#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.data.lock().expect("store lock poisoned").get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.data
            .lock()
            .expect("store lock poisoned")
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self
            .data
            .lock()
            .expect("store lock poisoned")
            .keys()
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("questions").await.unwrap(), None);

        store.set("questions", "[]".to_string()).await.unwrap();
        assert_eq!(store.get("questions").await.unwrap().as_deref(), Some("[]"));

        store
            .set("responses:2025-01-02", "[]".to_string())
            .await
            .unwrap();
        let keys = store.list_keys().await.unwrap();
        assert_eq!(keys, vec!["questions", "responses:2025-01-02"]);
    }

    #[tokio::test]
    async fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("data"));

        assert_eq!(store.get("questions").await.unwrap(), None);
        assert!(store.list_keys().await.unwrap().is_empty());

        store
            .set("questions", "[{\"id\":\"1\"}]".to_string())
            .await
            .unwrap();
        store
            .set("responses:2025-01-02", "[]".to_string())
            .await
            .unwrap();

        assert_eq!(
            store.get("questions").await.unwrap().as_deref(),
            Some("[{\"id\":\"1\"}]")
        );
        assert_eq!(
            store.list_keys().await.unwrap(),
            vec!["questions", "responses:2025-01-02"]
        );
    }

    #[tokio::test]
    async fn file_store_overwrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());

        store.set("challenges", "[1]".to_string()).await.unwrap();
        store.set("challenges", "[2]".to_string()).await.unwrap();
        assert_eq!(
            store.get("challenges").await.unwrap().as_deref(),
            Some("[2]")
        );
        assert_eq!(store.list_keys().await.unwrap(), vec!["challenges"]);
    }

    #[tokio::test]
    async fn file_store_rejects_path_traversal_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());

        let err = store.set("../escape", "x".to_string()).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
        let err = store.get("a/b").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
    }
}
