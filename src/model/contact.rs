use serde::{Deserialize, Serialize};

use super::config::FALLBACK_COLOR;
use super::task::Assignee;

/// An entry in the contact directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Store key; lives outside the stored record
    #[serde(skip)]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// Badge color, fixed when the contact is created
    #[serde(default = "fallback_color")]
    pub color: String,
}

fn fallback_color() -> String {
    FALLBACK_COLOR.to_string()
}

impl Contact {
    /// Up to two uppercase initials from the first and last word of the name
    pub fn initials(&self) -> String {
        initials(&self.name)
    }

    /// The badge this contact contributes when assigned to a task
    pub fn as_assignee(&self) -> Assignee {
        Assignee {
            name: self.name.clone(),
            color: self.color.clone(),
        }
    }
}

/// Up to two uppercase initials from the first and last word of `name`
pub fn initials(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    let first = words.first().and_then(|w| w.chars().next());
    let last = if words.len() > 1 {
        words.last().and_then(|w| w.chars().next())
    } else {
        None
    };
    first
        .into_iter()
        .chain(last)
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initials_from_names() {
        assert_eq!(initials("Anja Schulz"), "AS");
        assert_eq!(initials("  benedikt  ziegler "), "BZ");
        assert_eq!(initials("Cher"), "C");
        assert_eq!(initials("Anna Maria von Berg"), "AB");
        assert_eq!(initials(""), "");
    }

    #[test]
    fn missing_phone_defaults_to_empty() {
        let c: Contact =
            serde_json::from_str(r##"{"name":"Eva","email":"eva@x.de","color":"#FF7A00"}"##).unwrap();
        assert_eq!(c.phone, "");
        assert!(c.id.is_none());
    }
}
