//! Local session storage
//!
//! Persistent string-keyed store backing the chat session: auth token,
//! current user, conversation identifiers, and the local conversation
//! cache all survive restarts through this module. Backed by an embedded
//! `sled` database in the user's data directory.

use crate::error::{AssistError, Result};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;
use std::path::{Path, PathBuf};

/// Storage keys used by the session
///
/// Kept in one place so every component persists and clears the same keys.
pub mod keys {
    /// Bearer token for the authenticated user
    pub const AUTH_TOKEN: &str = "auth_token";
    /// Serialized record of the authenticated user
    pub const CURRENT_USER: &str = "current_user";
    /// Identifier of the last conversation touched, regardless of source
    pub const CONVERSATION_ID: &str = "conversation_id";
    /// Identifier of the explicitly loaded (active) conversation
    pub const ACTIVE_CONVERSATION_ID: &str = "active_conversation_id";
    /// Serialized map of locally cached conversations
    pub const CONVERSATIONS: &str = "conversations";
}

/// Key-value store for session state
///
/// Cloning is cheap; clones share the same underlying database.
#[derive(Clone)]
pub struct KvStore {
    db: Db,
}

impl KvStore {
    /// Open the store at the default location
    ///
    /// The database lives in the user's data directory. The
    /// `TOOLBOXX_STATE_DB` environment variable overrides the path, which
    /// makes it easy to point the binary at a test store or alternate file
    /// without changing the application data dir.
    pub fn open() -> Result<Self> {
        if let Ok(override_path) = std::env::var("TOOLBOXX_STATE_DB") {
            return Self::open_at(override_path);
        }

        let proj_dirs = ProjectDirs::from("uk.co", "toolboxx", "toolboxx-assist")
            .ok_or_else(|| AssistError::Storage("Could not determine data directory".into()))?;

        Self::open_at(proj_dirs.data_dir().join("session.db"))
    }

    /// Open the store at a specific path
    ///
    /// Primarily useful for tests where the default application data
    /// directory is not desirable (for example, a temporary directory).
    pub fn open_at<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !Path::new(parent).exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AssistError::Storage(format!("Failed to create data directory: {}", e))
                })?;
            }
        }

        let db = sled::open(&path)
            .map_err(|e| AssistError::Storage(format!("Failed to open database: {}", e)))?;
        Ok(Self { db })
    }

    /// Read a string value
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        match self
            .db
            .get(key.as_bytes())
            .map_err(|e| AssistError::Storage(format!("Get failed: {}", e)))?
        {
            Some(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            None => Ok(None),
        }
    }

    /// Write a string value
    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| AssistError::Storage(format!("Insert failed: {}", e)))?;
        self.flush()
    }

    /// Remove a key; removing an absent key is not an error
    pub fn remove(&self, key: &str) -> Result<()> {
        self.db
            .remove(key.as_bytes())
            .map_err(|e| AssistError::Storage(format!("Remove failed: {}", e)))?;
        self.flush()
    }

    /// Read and deserialize a JSON value
    ///
    /// A malformed payload degrades to `None` with a debug log rather than
    /// an error; persisted state is never allowed to wedge the session.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.get(key)? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::debug!("Discarding malformed stored value for {}: {}", key, e);
                Ok(None)
            }
        }
    }

    /// Serialize and write a JSON value
    pub fn put_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)
            .map_err(|e| AssistError::Storage(format!("Serialization failed: {}", e)))?;
        self.put(key, &raw)
    }

    fn flush(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| AssistError::Storage(format!("Flush failed: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::BTreeMap;
    use std::env;
    use tempfile::tempdir;

    fn create_test_store() -> (KvStore, tempfile::TempDir) {
        let dir = tempdir().expect("failed to create tempdir");
        let store = KvStore::open_at(dir.path().join("session.db")).expect("open failed");
        (store, dir)
    }

    #[test]
    fn test_put_get_roundtrip() {
        let (store, _dir) = create_test_store();
        store.put(keys::AUTH_TOKEN, "tok-123").expect("put failed");
        assert_eq!(
            store.get(keys::AUTH_TOKEN).expect("get failed"),
            Some("tok-123".to_string())
        );
    }

    #[test]
    fn test_get_missing_key_returns_none() {
        let (store, _dir) = create_test_store();
        assert_eq!(store.get("missing").expect("get failed"), None);
    }

    #[test]
    fn test_remove_deletes_key() {
        let (store, _dir) = create_test_store();
        store.put(keys::CONVERSATION_ID, "42").expect("put failed");
        store.remove(keys::CONVERSATION_ID).expect("remove failed");
        assert_eq!(store.get(keys::CONVERSATION_ID).expect("get failed"), None);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (store, _dir) = create_test_store();
        store.remove("never-existed").expect("first remove failed");
        store.remove("never-existed").expect("second remove failed");
    }

    #[test]
    fn test_json_roundtrip() {
        let (store, _dir) = create_test_store();
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), 1u32);
        store
            .put_json(keys::CONVERSATIONS, &map)
            .expect("put failed");

        let loaded: Option<BTreeMap<String, u32>> =
            store.get_json(keys::CONVERSATIONS).expect("get failed");
        assert_eq!(loaded, Some(map));
    }

    #[test]
    fn test_malformed_json_degrades_to_none() {
        let (store, _dir) = create_test_store();
        store.put(keys::CONVERSATIONS, "{not json").expect("put failed");

        let loaded: Option<BTreeMap<String, u32>> =
            store.get_json(keys::CONVERSATIONS).expect("get failed");
        assert_eq!(loaded, None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().expect("failed to create tempdir");
        let path = dir.path().join("session.db");

        {
            let store = KvStore::open_at(&path).expect("open failed");
            store.put(keys::AUTH_TOKEN, "persisted").expect("put failed");
        }

        let store = KvStore::open_at(&path).expect("reopen failed");
        assert_eq!(
            store.get(keys::AUTH_TOKEN).expect("get failed"),
            Some("persisted".to_string())
        );
    }

    #[test]
    #[serial]
    fn test_open_respects_env_override() {
        // Nested path exercises parent directory creation.
        let dir = tempdir().expect("failed to create tempdir");
        let path = dir.path().join("nested").join("session.db");
        env::set_var("TOOLBOXX_STATE_DB", path.to_string_lossy().to_string());

        let store = KvStore::open().expect("open failed with env override");
        store.put("probe", "1").expect("put failed");
        assert!(path.exists());

        env::remove_var("TOOLBOXX_STATE_DB");
    }
}
