//! Durable snapshot storage.
//!
//! A game is one JSON document under one key. Reads treat anything unusable
//! as "no snapshot"; writes are best effort and never reach the player.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use log::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::state::GameState;

pub const DEFAULT_SAVE_KEY: &str = "vibe-game-state";

/// Minimal string key-value surface, shaped like browser local storage.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> StoreResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set_item(key, value)
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StoreError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root)?;
        // Readers only ever see a complete document.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        let items = self.items.lock().unwrap_or_else(|p| p.into_inner());
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut items = self.items.lock().unwrap_or_else(|p| p.into_inner());
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Loads and saves [`GameState`] snapshots under a single key.
#[derive(Debug)]
pub struct Persistence<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn try_load(&self) -> StoreResult<Option<GameState>> {
        let Some(raw) = self.store.get_item(&self.key)? else {
            return Ok(None);
        };
        let state: GameState = serde_json::from_str(&raw)?;
        Ok(Some(state.into_resumable()))
    }

    /// `None` for a missing, unreadable or malformed snapshot.
    pub fn load(&self) -> Option<GameState> {
        match self.try_load() {
            Ok(Some(state)) => {
                debug!("Loaded snapshot '{}'", self.key);
                Some(state)
            }
            Ok(None) => {
                debug!("No snapshot under '{}'", self.key);
                None
            }
            Err(err) => {
                warn!("Ignoring unusable snapshot '{}': {}", self.key, err);
                None
            }
        }
    }

    pub fn try_save(&self, state: &GameState) -> StoreResult<()> {
        let raw = serde_json::to_string(state)?;
        self.store.set_item(&self.key, &raw)
    }

    /// Failures are logged and dropped; the next flush tries again.
    pub fn save(&self, state: &GameState) {
        if let Err(err) = self.try_save(state) {
            warn!("Failed to save snapshot '{}': {}", self.key, err);
        }
    }
}
