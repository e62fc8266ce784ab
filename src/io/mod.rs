pub mod atomic;
pub mod config_io;
pub mod local;
pub mod remote;
pub mod session;
pub mod store;

use std::path::Path;
use std::time::Duration;

use crate::model::config::StoreConfig;
use local::LocalStore;
use remote::RemoteStore;
use store::{Store, StoreError};

/// Open the store named by a base URL: `http(s)://…` is a remote document
/// store, `file://<path>` a local JSON document.
pub fn open_store(base_url: &str, config: &StoreConfig) -> Result<Box<dyn Store>, StoreError> {
    if let Some(path) = base_url.strip_prefix("file://") {
        tracing::debug!(path, "opening local store");
        return Ok(Box::new(LocalStore::open(Path::new(path))?));
    }
    if base_url.starts_with("http://") || base_url.starts_with("https://") {
        let timeout = config.timeout_secs.map(Duration::from_secs);
        return Ok(Box::new(RemoteStore::new(base_url, timeout)?));
    }
    Err(StoreError::UnsupportedUrl(base_url.to_string()))
}
