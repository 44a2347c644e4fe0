// ABOUTME: Key-value persistence for conversation and theme preference
// ABOUTME: File-backed store for real use, in-memory store for tests and headless runs

use crate::error::{ChirpError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Key holding the serialized conversation
pub const MESSAGES_KEY: &str = "chatbot.messages.v1";

/// Key holding the theme preference ("dark" or "light")
pub const THEME_KEY: &str = "chatbot.theme";

/// Asynchronous string key-value storage. Callers treat both operations as
/// best-effort.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>>;
    async fn save(&self, key: &str, value: &str) -> Result<()>;
}

/// One file per key inside a directory
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

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(ChirpError::Store(format!("invalid key: {key:?}")));
        }
        Ok(self.dir.join(key))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        // Write-then-rename; readers never see a partial value
        let tmp = self.dir.join(format!("{key}.tmp"));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

/// In-memory store with switchable failures
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, key: &str, value: impl Into<String>) -> Self {
        self.lock().insert(key.to_string(), value.into());
        self
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(ChirpError::Store("load failed".to_string()));
        }
        Ok(self.get(key))
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(ChirpError::Store("save failed".to_string()));
        }
        self.lock().insert(key.to_string(), value.to_string());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_file_store_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.load(MESSAGES_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        store.save(THEME_KEY, "light").await.unwrap();
        assert_eq!(store.load(THEME_KEY).await.unwrap().as_deref(), Some("light"));

        store.save(THEME_KEY, "dark").await.unwrap();
        assert_eq!(store.load(THEME_KEY).await.unwrap().as_deref(), Some("dark"));
        assert!(!dir.path().join("nested").join("chatbot.theme.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_store_rejects_path_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(
            store.save("../escape", "x").await,
            Err(ChirpError::Store(_))
        ));
        assert!(matches!(store.load("a/b").await, Err(ChirpError::Store(_))));
        assert!(matches!(store.load("").await, Err(ChirpError::Store(_))));
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        tokio_test::block_on(async {
            assert_eq!(assert_ok!(store.load("k").await), None);
            assert_ok!(store.save("k", "v").await);
            assert_eq!(assert_ok!(store.load("k").await).as_deref(), Some("v"));
        });
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn test_memory_store_failures() {
        let store = MemoryStore::new().with_entry("k", "v");
        tokio_test::block_on(async {
            store.set_fail_loads(true);
            assert_err!(store.load("k").await);
            store.set_fail_loads(false);
            assert_eq!(assert_ok!(store.load("k").await).as_deref(), Some("v"));

            store.set_fail_saves(true);
            assert_err!(store.save("k", "w").await);
        });
        assert_eq!(store.get("k").as_deref(), Some("v"));
        assert_eq!(store.save_count(), 0);
    }
}
