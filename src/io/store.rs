use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// A top-level collection in the document store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Tasks,
    Contacts,
    Users,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Tasks, Collection::Contacts, Collection::Users];

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Tasks => "tasks",
            Collection::Contacts => "contacts",
            Collection::Users => "users",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The store operation that failed, named in error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Fetch => "fetch",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        })
    }
}

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{op} {collection} failed: server responded with status {status}")]
    Status {
        op: Operation,
        collection: Collection,
        status: u16,
    },
    #[error("{op} {collection} failed: {source}")]
    Transport {
        op: Operation,
        collection: Collection,
        source: reqwest::Error,
    },
    #[error("{op} {collection} failed: invalid JSON: {source}")]
    Decode {
        op: Operation,
        collection: Collection,
        source: serde_json::Error,
    },
    #[error("{op} {collection} failed: expected an array or object, got {found}")]
    UnexpectedShape {
        op: Operation,
        collection: Collection,
        found: &'static str,
    },
    #[error("{op} {collection} failed: response did not contain a record key")]
    MissingKey { op: Operation, collection: Collection },
    #[error("{op} {collection} failed: {source}")]
    Io {
        op: Operation,
        collection: Collection,
        source: std::io::Error,
    },
    #[error("could not read store document {path}: {source}")]
    Open {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse store document {path}: {source}")]
    Document {
        path: std::path::PathBuf,
        source: serde_json::Error,
    },
    #[error("could not build HTTP client: {0}")]
    Client(reqwest::Error),
    #[error("unsupported store URL '{0}' (expected http://, https:// or file://)")]
    UnsupportedUrl(String),
}

impl StoreError {
    /// The operation that failed, if the error came from a store call
    pub fn operation(&self) -> Option<Operation> {
        match self {
            StoreError::Status { op, .. }
            | StoreError::Transport { op, .. }
            | StoreError::Decode { op, .. }
            | StoreError::UnexpectedShape { op, .. }
            | StoreError::MissingKey { op, .. }
            | StoreError::Io { op, .. } => Some(*op),
            StoreError::Open { .. }
            | StoreError::Document { .. }
            | StoreError::Client(_)
            | StoreError::UnsupportedUrl(_) => None,
        }
    }
}

/// One stored entity together with its store key
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub key: String,
    pub value: Value,
}

/// CRUD access to a JSON document store.
///
/// Implementations return whole collections from `fetch_all`, already
/// normalized to a list (see [`normalize_collection`]).
pub trait Store {
    fn fetch_all(&mut self, collection: Collection) -> Result<Vec<Record>, StoreError>;
    /// Append a record, returning the key the store assigned
    fn create(&mut self, collection: Collection, value: &Value) -> Result<String, StoreError>;
    /// Replace the record stored under `key`
    fn update(&mut self, collection: Collection, key: &str, value: &Value)
    -> Result<(), StoreError>;
    fn delete(&mut self, collection: Collection, key: &str) -> Result<(), StoreError>;
}

/// Normalize a collection document into records.
///
/// `null` is an empty collection. Arrays are keyed by index with `null`
/// holes skipped. Objects are keyed by property name in key order, which for
/// push-style keys is creation order.
pub fn normalize_collection(
    collection: Collection,
    doc: Value,
) -> Result<Vec<Record>, StoreError> {
    match doc {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, value)| Record {
                key: i.to_string(),
                value,
            })
            .collect()),
        Value::Object(map) => Ok(map
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(key, value)| Record { key, value })
            .collect()),
        other => Err(StoreError::UnexpectedShape {
            op: Operation::Fetch,
            collection,
            found: json_kind(&other),
        }),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Serde helper for nested lists that the store may hand back as an array,
/// an object of objects, or `null`.
pub fn seq_or_map<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let items: Vec<Value> = match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        other => {
            return Err(serde::de::Error::custom(format!(
                "expected a list, got {}",
                json_kind(&other)
            )));
        }
    };
    items
        .into_iter()
        .filter(|v| !v.is_null())
        .map(|v| serde_json::from_value(v).map_err(serde::de::Error::custom))
        .collect()
}

/// Fetch a collection and decode each record, pairing it with its key.
/// Records that do not decode are skipped with a warning.
pub fn fetch_typed<T: DeserializeOwned>(
    store: &mut dyn Store,
    collection: Collection,
) -> Result<Vec<(String, T)>, StoreError> {
    Ok(store
        .fetch_all(collection)?
        .into_iter()
        .filter_map(|r| match serde_json::from_value(r.value) {
            Ok(v) => Some((r.key, v)),
            Err(e) => {
                warn!(%collection, key = %r.key, error = %e, "skipping undecodable record");
                None
            }
        })
        .collect())
}

/// Serialize an entity for the store
pub fn to_record_value<T: Serialize>(
    op: Operation,
    collection: Collection,
    entity: &T,
) -> Result<Value, StoreError> {
    serde_json::to_value(entity).map_err(|source| StoreError::Decode {
        op,
        collection,
        source,
    })
}
