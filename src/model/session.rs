use serde::{Deserialize, Serialize};

use super::contact::initials;

/// The signed-in user, persisted locally between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub name: String,
    pub email: String,
    /// Guest sessions never write to the remote store
    #[serde(default)]
    pub guest: bool,
}

impl SessionUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        SessionUser {
            name: name.into(),
            email: email.into(),
            guest: false,
        }
    }

    /// A client-only guest identity
    pub fn guest() -> Self {
        SessionUser {
            name: "Guest".into(),
            email: String::new(),
            guest: true,
        }
    }

    pub fn can_write(&self) -> bool {
        !self.guest
    }

    pub fn initials(&self) -> String {
        initials(&self.name)
    }
}

/// A record in the remote `users` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub name: String,
    pub email: String,
}
