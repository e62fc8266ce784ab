use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde_json::Value;
use tracing::debug;

use super::store::{Collection, Operation, Record, Store, StoreError, normalize_collection};

/// Blocking client for a REST JSON document store laid out as
/// `{base_url}/{collection}.json` and `{base_url}/{collection}/{key}.json`.
pub struct RemoteStore {
    client: Client,
    base_url: String,
}

impl RemoteStore {
    /// Build a client. `timeout` of `None` lets requests wait indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, StoreError> {
        let mut builder = Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().map_err(StoreError::Client)?;
        Ok(RemoteStore {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn collection_url(&self, collection: Collection) -> String {
        format!("{}/{}.json", self.base_url, collection)
    }

    pub fn record_url(&self, collection: Collection, key: &str) -> String {
        format!("{}/{}/{}.json", self.base_url, collection, key)
    }
}

/// Turn a transport error or non-2xx response into a `StoreError`
fn check(
    op: Operation,
    collection: Collection,
    result: reqwest::Result<Response>,
) -> Result<Response, StoreError> {
    let resp = result.map_err(|source| StoreError::Transport {
        op,
        collection,
        source,
    })?;
    let status = resp.status();
    if !status.is_success() {
        return Err(StoreError::Status {
            op,
            collection,
            status: status.as_u16(),
        });
    }
    Ok(resp)
}

/// Read a response body as JSON. An empty body is `null`.
fn read_json(op: Operation, collection: Collection, resp: Response) -> Result<Value, StoreError> {
    let text = resp.text().map_err(|source| StoreError::Transport {
        op,
        collection,
        source,
    })?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|source| StoreError::Decode {
        op,
        collection,
        source,
    })
}

/// Extract the key from a create response: `{"name": "<key>"}`
pub(crate) fn created_key(collection: Collection, body: &Value) -> Result<String, StoreError> {
    body.get("name")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or(StoreError::MissingKey {
            op: Operation::Create,
            collection,
        })
}

impl Store for RemoteStore {
    fn fetch_all(&mut self, collection: Collection) -> Result<Vec<Record>, StoreError> {
        let url = self.collection_url(collection);
        debug!(%url, "GET collection");
        let resp = check(Operation::Fetch, collection, self.client.get(&url).send())?;
        let doc = read_json(Operation::Fetch, collection, resp)?;
        normalize_collection(collection, doc)
    }

    fn create(&mut self, collection: Collection, value: &Value) -> Result<String, StoreError> {
        let url = self.collection_url(collection);
        debug!(%url, "POST record");
        let resp = check(
            Operation::Create,
            collection,
            self.client.post(&url).json(value).send(),
        )?;
        let body = read_json(Operation::Create, collection, resp)?;
        created_key(collection, &body)
    }

    fn update(
        &mut self,
        collection: Collection,
        key: &str,
        value: &Value,
    ) -> Result<(), StoreError> {
        let url = self.record_url(collection, key);
        debug!(%url, "PUT record");
        check(
            Operation::Update,
            collection,
            self.client.put(&url).json(value).send(),
        )?;
        Ok(())
    }

    fn delete(&mut self, collection: Collection, key: &str) -> Result<(), StoreError> {
        let url = self.record_url(collection, key);
        debug!(%url, "DELETE record");
        check(Operation::Delete, collection, self.client.delete(&url).send())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn urls_strip_trailing_slash() {
        let store = RemoteStore::new("https://join-demo.example.app/", None).unwrap();
        assert_eq!(
            store.collection_url(Collection::Tasks),
            "https://join-demo.example.app/tasks.json"
        );
        assert_eq!(
            store.record_url(Collection::Contacts, "-Nx1"),
            "https://join-demo.example.app/contacts/-Nx1.json"
        );
    }

    #[test]
    fn created_key_reads_name_field() {
        assert_eq!(created_key(Collection::Tasks, &json!({"name": "-Nabc"})).unwrap(), "-Nabc");
        let err = created_key(Collection::Tasks, &json!({})).unwrap_err();
        assert!(matches!(err, StoreError::MissingKey { .. }));
    }
}
