use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::atomic::atomic_write;
use super::store::{Collection, Operation, Record, Store, StoreError, normalize_collection};

/// Status reported for injected failures
const INJECTED_FAILURE_STATUS: u16 = 503;

/// A document store held in memory, optionally backed by a JSON file laid
/// out like a remote export: `{"tasks": {key: record}, "contacts": …}`.
///
/// Records keep document order on open and creation order afterwards, and
/// the file is written back in that same order.
#[derive(Debug, Default)]
pub struct LocalStore {
    path: Option<PathBuf>,
    collections: HashMap<Collection, IndexMap<String, Value>>,
    next_key: u64,
    failures: usize,
}

impl LocalStore {
    /// A store that lives only as long as this value
    pub fn in_memory() -> Self {
        LocalStore {
            next_key: 1,
            ..Default::default()
        }
    }

    /// Open a file-backed store. A missing file is an empty store; the file
    /// is created on the first write.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let mut store = LocalStore {
            path: Some(path.to_path_buf()),
            next_key: 1,
            ..Default::default()
        };
        if !path.exists() {
            return Ok(store);
        }
        let text = fs::read_to_string(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        if text.trim().is_empty() {
            return Ok(store);
        }
        let mut doc: IndexMap<String, RawCollection> =
            serde_json::from_str(&text).map_err(|source| StoreError::Document {
                path: path.to_path_buf(),
                source,
            })?;
        for collection in Collection::ALL {
            let records = match doc.shift_remove(collection.as_str()) {
                None => Vec::new(),
                Some(RawCollection::Keyed(entries)) => entries
                    .into_iter()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(key, value)| Record { key, value })
                    .collect(),
                Some(RawCollection::Other(value)) => normalize_collection(collection, value)?,
            };
            let entries = store.collections.entry(collection).or_default();
            for r in records {
                entries.insert(r.key, r.value);
            }
        }
        store.next_key = store.max_generated_key() + 1;
        Ok(store)
    }

    /// Make the next `count` operations fail as if the server returned 503
    pub fn fail_next(&mut self, count: usize) {
        self.failures = count;
    }

    /// Number of records in a collection
    pub fn count(&self, collection: Collection) -> usize {
        self.collections.get(&collection).map_or(0, IndexMap::len)
    }

    fn max_generated_key(&self) -> u64 {
        self.collections
            .values()
            .flat_map(|c| c.keys())
            .filter_map(|k| k.strip_prefix("-J"))
            .filter_map(|n| n.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
    }

    fn injected_failure(&mut self, op: Operation, collection: Collection) -> Result<(), StoreError> {
        if self.failures > 0 {
            self.failures -= 1;
            debug!(%op, %collection, "injected store failure");
            return Err(StoreError::Status {
                op,
                collection,
                status: INJECTED_FAILURE_STATUS,
            });
        }
        Ok(())
    }

    fn flush(&self, op: Operation, collection: Collection) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let doc: IndexMap<&str, &IndexMap<String, Value>> = Collection::ALL
            .iter()
            .filter_map(|c| self.collections.get(c).map(|entries| (c.as_str(), entries)))
            .collect();
        let text = serde_json::to_string_pretty(&doc).map_err(|source| StoreError::Decode {
            op,
            collection,
            source,
        })?;
        atomic_write(path, text.as_bytes()).map_err(|source| StoreError::Io {
            op,
            collection,
            source,
        })
    }
}

/// A collection as it appears in the document. Objects are read entry by
/// entry so their order survives; everything else goes through
/// [`normalize_collection`].
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCollection {
    Keyed(IndexMap<String, Value>),
    Other(Value),
}

impl Store for LocalStore {
    fn fetch_all(&mut self, collection: Collection) -> Result<Vec<Record>, StoreError> {
        self.injected_failure(Operation::Fetch, collection)?;
        Ok(self
            .collections
            .get(&collection)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(key, value)| Record {
                        key: key.clone(),
                        value: value.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn create(&mut self, collection: Collection, value: &Value) -> Result<String, StoreError> {
        self.injected_failure(Operation::Create, collection)?;
        let key = format!("-J{:08}", self.next_key);
        self.next_key += 1;
        self.collections
            .entry(collection)
            .or_default()
            .insert(key.clone(), value.clone());
        self.flush(Operation::Create, collection)?;
        Ok(key)
    }

    fn update(
        &mut self,
        collection: Collection,
        key: &str,
        value: &Value,
    ) -> Result<(), StoreError> {
        self.injected_failure(Operation::Update, collection)?;
        self.collections
            .entry(collection)
            .or_default()
            .insert(key.to_string(), value.clone());
        self.flush(Operation::Update, collection)
    }

    fn delete(&mut self, collection: Collection, key: &str) -> Result<(), StoreError> {
        self.injected_failure(Operation::Delete, collection)?;
        if let Some(entries) = self.collections.get_mut(&collection) {
            entries.shift_remove(key);
        }
        self.flush(Operation::Delete, collection)
    }
}
