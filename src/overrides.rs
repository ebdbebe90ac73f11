//! Client-local list of offers flagged as damaged.
//!
//! The list lives in one named slot as a JSON array of offer ids. Nothing is
//! synchronized: two writers on the same slot simply overwrite each other.
//! Rendering only sees changes after the markers are rebuilt.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::StoreError;

/// Default slot name for the damaged list
pub const DEFAULT_NAMESPACE: &str = "listing-map.damaged";

/// Durable key-value slots holding strings
pub trait SlotStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per slot inside a directory
#[derive(Debug, Clone)]
pub struct FileSlotStore {
    dir: PathBuf,
}

impl FileSlotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SlotStore for FileSlotStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.slot_path(key);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.slot_path(key);
        fs::write(&path, value).map_err(|source| StoreError::Io { path, source })
    }
}

/// Volatile slots, for tests and embedding without a disk
#[derive(Debug, Clone, Default)]
pub struct MemorySlotStore {
    slots: HashMap<String, String>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemorySlotStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Set of damaged offer ids, kept in insertion order
#[derive(Debug)]
pub struct OverrideStore<S: SlotStore> {
    backend: S,
    namespace: String,
    ids: Vec<String>,
    lookup: HashSet<String>,
}

impl<S: SlotStore> OverrideStore<S> {
    /// Load the slot. A missing slot is an empty set; an unreadable payload is
    /// discarded and replaced on the next write.
    pub fn open(backend: S, namespace: impl Into<String>) -> Result<Self, StoreError> {
        let mut store = Self {
            backend,
            namespace: namespace.into(),
            ids: Vec::new(),
            lookup: HashSet::new(),
        };
        store.reload()?;
        Ok(store)
    }

    /// Re-read the slot, picking up whatever the last writer stored
    pub fn reload(&mut self) -> Result<(), StoreError> {
        let ids = match self.backend.read(&self.namespace)? {
            None => Vec::new(),
            Some(text) => match serde_json::from_str::<Vec<String>>(&text) {
                Ok(ids) => ids,
                Err(err) => {
                    warn!("Override slot '{}' is corrupt ({}), starting empty", self.namespace, err);
                    Vec::new()
                }
            },
        };

        self.ids.clear();
        self.lookup.clear();
        for id in ids {
            if self.lookup.insert(id.clone()) {
                self.ids.push(id);
            }
        }
        debug!("Override slot '{}' holds {} ids", self.namespace, self.ids.len());
        Ok(())
    }

    /// Flag `id`. Returns `false` without writing when it was already flagged.
    ///
    /// Memory is only updated once the slot write succeeded.
    pub fn mark_damaged(&mut self, id: &str) -> Result<bool, StoreError> {
        if self.lookup.contains(id) {
            debug!("Offer {} already marked damaged", id);
            return Ok(false);
        }
        let mut ids = self.ids.clone();
        ids.push(id.to_string());
        self.persist(&ids)?;

        self.lookup.insert(id.to_string());
        self.ids = ids;
        info!("Marked offer {} as damaged", id);
        Ok(true)
    }

    /// Unflag `id`. Always writes; returns whether it was flagged.
    pub fn restore(&mut self, id: &str) -> Result<bool, StoreError> {
        let ids: Vec<String> = self.ids.iter().filter(|existing| *existing != id).cloned().collect();
        self.persist(&ids)?;

        let was_present = self.lookup.remove(id);
        self.ids = ids;
        if was_present {
            info!("Restored offer {}", id);
        }
        Ok(was_present)
    }

    pub fn is_damaged(&self, id: &str) -> bool {
        self.lookup.contains(id)
    }

    pub fn list(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    fn persist(&mut self, ids: &[String]) -> Result<(), StoreError> {
        let payload = serde_json::to_string(ids)?;
        self.backend.write(&self.namespace, &payload)
    }
}
