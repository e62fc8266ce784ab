use std::fs;
use std::path::{Path, PathBuf};

use crate::io::atomic::atomic_write;
use crate::model::session::SessionUser;

/// File holding the signed-in user inside the data directory
pub const SESSION_FILE: &str = "session.json";

/// Error type for local session storage
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("not signed in (run `join login`, `join signup` or `join guest`)")]
    NotSignedIn,
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

pub fn session_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSION_FILE)
}

/// Read the persisted session. A missing or unreadable record means nobody
/// is signed in.
pub fn read_session(data_dir: &Path) -> Option<SessionUser> {
    let content = fs::read_to_string(session_path(data_dir)).ok()?;
    match serde_json::from_str(&content) {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::warn!("ignoring malformed session record: {e}");
            None
        }
    }
}

/// Like [`read_session`], but signed-out is an error
pub fn require_session(data_dir: &Path) -> Result<SessionUser, SessionError> {
    read_session(data_dir).ok_or(SessionError::NotSignedIn)
}

/// Persist the session, creating the data directory if needed
pub fn write_session(data_dir: &Path, user: &SessionUser) -> Result<(), SessionError> {
    fs::create_dir_all(data_dir).map_err(|source| SessionError::Io {
        path: data_dir.to_path_buf(),
        source,
    })?;
    let path = session_path(data_dir);
    let content = serde_json::to_string_pretty(user)?;
    atomic_write(&path, content.as_bytes()).map_err(|source| SessionError::Io { path, source })
}

/// Remove the persisted session. Already signed out is fine.
pub fn clear_session(data_dir: &Path) -> Result<(), SessionError> {
    let path = session_path(data_dir);
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(SessionError::Io { path, source }),
    }
}
