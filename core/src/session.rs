//! Session persistence: the bearer token and username of the logged-in user.
//!
//! # Design
//! `SessionStore` reads and writes two string keys (`token`, `username`)
//! through a `KeyValueStore`. Hosts pick the backing: `MemoryStore` for tests
//! and embedded use, `FileStore` for a JSON file that survives restarts. The
//! store is passed around explicitly; nothing here is process-global.
//!
//! There is no expiry or refresh. A stale token fails on the next request.
//!
//! `FileStore` writes through a temporary file in the same directory and
//! renames it into place, so a crash mid-write leaves the old file intact.
//! A file that is corrupt anyway can still be cleared: removal drops it.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::warn;

pub const TOKEN_KEY: &str = "token";
pub const USERNAME_KEY: &str = "username";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupt session file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("store lock poisoned")]
    Poisoned,
}

impl<T> From<PoisonError<T>> for StoreError {
    fn from(_: PoisonError<T>) -> Self {
        StoreError::Poisoned
    }
}

/// String key-value area. Methods take `&self` so a store can be shared by
/// the facade and whoever else holds a reference.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Write several keys at once. Stores that can should apply all or none.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock()?.remove(key);
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        let mut map = self.entries.lock()?;
        for (key, value) in entries {
            map.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut map = self.entries.lock()?;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

/// A flat JSON object on disk, rewritten in full on every change.
///
/// A missing file reads as empty. Removing the last key deletes the file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(io_err(e)),
                _ => Ok(()),
            };
        }
        let raw =
            serde_json::to_string_pretty(entries).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(raw.as_bytes()).map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_many(&[(key, value)])
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.remove_many(&[key])
    }

    /// One read and one write for the whole batch.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        let mut map = self.load()?;
        for (key, value) in entries {
            map.insert(key.to_string(), value.to_string());
        }
        self.persist(&map)
    }

    /// A corrupt file is deleted outright; its contents cannot be kept.
    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut map = match self.load() {
            Ok(map) => map,
            Err(StoreError::Corrupt { path, source }) => {
                warn!(path = %path.display(), error = %source, "discarding corrupt session file");
                return self.persist(&BTreeMap::new());
            }
            Err(e) => return Err(e),
        };
        let before = map.len();
        for key in keys {
            map.remove(*key);
        }
        if map.len() != before {
            self.persist(&map)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub username: String,
}

#[derive(Debug)]
pub struct SessionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persist both values, replacing any previous session.
    pub fn save(&self, token: &str, username: &str) -> Result<(), StoreError> {
        self.store
            .set_many(&[(TOKEN_KEY, token), (USERNAME_KEY, username)])
    }

    /// The stored session, or `None` if no token is stored. A token without
    /// a username yields an empty username.
    pub fn get(&self) -> Result<Option<Session>, StoreError> {
        let Some(token) = self.store.get(TOKEN_KEY)? else {
            return Ok(None);
        };
        let username = self.store.get(USERNAME_KEY)?.unwrap_or_default();
        Ok(Some(Session { token, username }))
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove_many(&[TOKEN_KEY, USERNAME_KEY])
    }

    pub fn inner(&self) -> &S {
        &self.store
    }
}
