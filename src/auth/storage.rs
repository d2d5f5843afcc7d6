use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};

/// Persisted key holding the opaque bearer token.
pub const TOKEN_KEY: &str = "authToken";
/// Persisted key holding the token expiry as an RFC 3339 instant.
pub const TOKEN_EXP_KEY: &str = "authTokenExpiresAt";
/// Persisted key holding the JSON-serialized user profile.
pub const USER_KEY: &str = "currentUser";

pub const SESSION_KEYS: [&str; 3] = [USER_KEY, TOKEN_KEY, TOKEN_EXP_KEY];

/// Durable client-side key/value storage for session fields.
///
/// `set_all` and `remove_all` apply every entry or none.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn get(&self, key: &str) -> ClientResult<Option<String>>;
    async fn set_all(&self, entries: &[(&str, String)]) -> ClientResult<()>;
    async fn remove_all(&self, keys: &[&str]) -> ClientResult<()>;
}

/// In-process storage. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> HashMap<String, String> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set_all(&self, entries: &[(&str, String)]) -> ClientResult<()> {
        let mut map = self.entries.write().await;
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    async fn remove_all(&self, keys: &[&str]) -> ClientResult<()> {
        let mut map = self.entries.write().await;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

/// Storage backed by a single JSON object file.
///
/// Writes go to a sibling temp file that is renamed over the target, so a
/// reader sees either the old set of keys or the new one. A missing or
/// unparsable file reads as empty.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> ClientResult<HashMap<String, String>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(self.io_error("read", e)),
        };

        match serde_json::from_slice::<HashMap<String, String>>(&bytes) {
            Ok(map) => Ok(map),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "session file is not a JSON string map, treating as empty"
                );
                Ok(HashMap::new())
            }
        }
    }

    async fn write_map(&self, map: &HashMap<String, String>) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.io_error("create directory for", e))?;
            }
        }

        let serialized = serde_json::to_vec_pretty(map)?;
        let tmp_path = self.path.with_extension("tmp");
        tokio::fs::write(&tmp_path, serialized)
            .await
            .map_err(|e| self.io_error("write", e))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| self.io_error("replace", e))?;
        Ok(())
    }

    fn io_error(&self, action: &str, e: std::io::Error) -> ClientError {
        ClientError::storage(format!("failed to {} {}: {}", action, self.path.display(), e))
    }
}

#[async_trait]
impl SessionStorage for FileStorage {
    async fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.read_map().await?.remove(key))
    }

    async fn set_all(&self, entries: &[(&str, String)]) -> ClientResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_map().await?;
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        self.write_map(&map).await
    }

    async fn remove_all(&self, keys: &[&str]) -> ClientResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_map().await?;
        let before = map.len();
        for key in keys {
            map.remove(*key);
        }
        if map.len() == before && !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(());
        }
        self.write_map(&map).await
    }
}
