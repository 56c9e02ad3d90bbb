use std::collections::HashMap;
use std::path::{Path, PathBuf};

use fieldbook_types::{Constituency, Mandal, Member, Panchayat};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// A record kept in a named collection.
pub trait Entity: Serialize + DeserializeOwned + Clone {
    const COLLECTION: &'static str;
    fn id(&self) -> &str;
}

impl Entity for Constituency {
    const COLLECTION: &'static str = "constituencies";
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Mandal {
    const COLLECTION: &'static str = "mandals";
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Panchayat {
    const COLLECTION: &'static str = "panchayats";
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Member {
    const COLLECTION: &'static str = "members";
    fn id(&self) -> &str {
        &self.id
    }
}

/// Where serialized collections live. One JSON document per collection.
pub trait StateStore {
    fn read(&self, collection: &str) -> Result<Option<String>>;
    fn write(&mut self, collection: &str, json: &str) -> Result<()>;
    fn delete(&mut self, collection: &str) -> Result<()>;
}

/// In-memory adapter, for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl StateStore for MemoryStore {
    fn read(&self, collection: &str) -> Result<Option<String>> {
        Ok(self.collections.get(collection).cloned())
    }

    fn write(&mut self, collection: &str, json: &str) -> Result<()> {
        self.collections
            .insert(collection.to_string(), json.to_string());
        Ok(())
    }

    fn delete(&mut self, collection: &str) -> Result<()> {
        self.collections.remove(collection);
        Ok(())
    }
}

/// Disk adapter: `<dir>/<collection>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        FileStore {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.json"))
    }
}

impl StateStore for FileStore {
    fn read(&self, collection: &str) -> Result<Option<String>> {
        let path = self.path(collection);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn write(&mut self, collection: &str, json: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(collection), json)?;
        Ok(())
    }

    fn delete(&mut self, collection: &str) -> Result<()> {
        let path = self.path(collection);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// An ordered collection of one entity type. Upsert replaces in place by
/// id, so import order is stable across re-imports.
#[derive(Debug, Clone)]
pub struct Repository<T: Entity> {
    items: Vec<T>,
}

impl<T: Entity> Default for Repository<T> {
    fn default() -> Self {
        Repository { items: Vec::new() }
    }
}

impl<T: Entity> Repository<T> {
    #[must_use]
    pub fn new() -> Self {
        Repository::default()
    }

    /// Rehydrate from the adapter; a missing collection is empty.
    pub fn load(store: &dyn StateStore) -> Result<Self> {
        let items = match store.read(T::COLLECTION)? {
            Some(json) => serde_json::from_str(&json)?,
            None => Vec::new(),
        };
        Ok(Repository { items })
    }

    /// Serialize the collection through the adapter.
    pub fn persist(&self, store: &mut dyn StateStore) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.items)?;
        store.write(T::COLLECTION, &json)
    }

    /// Persist, logging failure instead of surfacing it. Memory stays
    /// authoritative.
    pub fn persist_or_log(&self, store: &mut dyn StateStore) {
        if let Err(err) = self.persist(store) {
            tracing::warn!(collection = T::COLLECTION, error = %err, "persist failed");
        }
    }

    /// Insert, or replace the record with the same id in place.
    pub fn upsert(&mut self, item: T) {
        match self.items.iter_mut().find(|i| i.id() == item.id()) {
            Some(slot) => *slot = item,
            None => self.items.push(item),
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id() != id);
        self.items.len() != before
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|i| i.id() == id)
    }

    #[must_use]
    pub fn list(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn find<P: Fn(&T) -> bool>(&self, predicate: P) -> Option<&T> {
        self.items.iter().find(|i| predicate(i))
    }
}
