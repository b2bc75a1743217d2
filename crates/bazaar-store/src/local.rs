//! Local durable store: a synchronous key → string map that survives remote
//! outages.
//!
//! Collections are persisted as JSON arrays of [`LineItem`] under a fixed key
//! per collection. The store is shared and passive; several collection store
//! instances may read and write the same key with last-writer-wins semantics.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use bazaar_core::{normalize_line_item, LineItem, UpstreamItem};

use crate::error::LocalStoreError;

/// Synchronous keyed string storage.
pub trait LocalStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`LocalStoreError`] if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`LocalStoreError`] if the backing medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError>;
}

/// In-process store, useful for tests and single-process sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| LocalStoreError::Unavailable("memory store lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| LocalStoreError::Unavailable("memory store lock poisoned".into()))?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Store backed by one JSON file per key inside a directory.
///
/// Writes go to a temporary sibling file first and are renamed into place,
/// so a crash mid-write never leaves a truncated record behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (creating if needed) a file store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`LocalStoreError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, LocalStoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| LocalStoreError::Io {
            key: dir.display().to_string(),
            source: e,
        })?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LocalStoreError::Io {
                key: key.to_owned(),
                source: e,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let io_err = |e| LocalStoreError::Io {
            key: key.to_owned(),
            source: e,
        };
        std::fs::write(&tmp, value).map_err(io_err)?;
        std::fs::rename(&tmp, &path).map_err(io_err)
    }
}

/// Reads the collection stored under `key`.
///
/// A missing key is an empty collection. Each record is passed through
/// normalization on the way out.
///
/// # Errors
///
/// Returns [`LocalStoreError::Corrupt`] if the stored value is not a JSON
/// array of line items, or any error from [`LocalStore::get`].
pub fn read_items(store: &dyn LocalStore, key: &str) -> Result<Vec<LineItem>, LocalStoreError> {
    let Some(raw) = store.get(key)? else {
        return Ok(Vec::new());
    };
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let items: Vec<LineItem> =
        serde_json::from_str(&raw).map_err(|e| LocalStoreError::Corrupt {
            key: key.to_owned(),
            source: e,
        })?;
    Ok(items
        .into_iter()
        .map(|item| normalize_line_item(UpstreamItem::Local(item)))
        .collect())
}

/// Serializes `items` and stores them under `key`.
///
/// # Errors
///
/// Returns [`LocalStoreError::Serialize`] if serialization fails, or any
/// error from [`LocalStore::set`].
pub fn write_items(
    store: &dyn LocalStore,
    key: &str,
    items: &[LineItem],
) -> Result<(), LocalStoreError> {
    let json = serde_json::to_string(items).map_err(|e| LocalStoreError::Serialize {
        key: key.to_owned(),
        source: e,
    })?;
    store.set(key, &json)
}
