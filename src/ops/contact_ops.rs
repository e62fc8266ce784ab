use indexmap::IndexMap;
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{info, warn};

use crate::io::store::{Collection, Operation, Store, StoreError, fetch_typed, to_record_value};
use crate::model::config::FALLBACK_COLOR;
use crate::model::contact::Contact;
use crate::model::session::SessionUser;
use crate::ops::validate::{self, ValidationError};

/// Error type for contact operations
#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("contact not found: {0}")]
    NotFound(String),
    #[error("guest sessions cannot modify contacts")]
    Forbidden,
}

/// Raw input of the add-contact form
#[derive(Debug, Clone, Default)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Fields changed by the edit-contact form. The color is never editable.
#[derive(Debug, Clone, Default)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Local mirror of the `contacts` collection plus the details-pane selection.
///
/// Selection is by store key, so inserting or deleting other contacts never
/// moves it onto a different person.
#[derive(Debug, Clone, Default)]
pub struct ContactDirectory {
    pub contacts: Vec<Contact>,
    selected: Option<String>,
}

impl ContactDirectory {
    pub fn new(contacts: Vec<Contact>) -> Self {
        ContactDirectory {
            contacts,
            selected: None,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id.as_deref() == Some(id))
    }

    /// Find a contact by name, ignoring case
    pub fn find_by_name(&self, name: &str) -> Option<&Contact> {
        let name = name.trim().to_lowercase();
        self.contacts.iter().find(|c| c.name.to_lowercase() == name)
    }

    /// The contact shown in the details pane
    pub fn selected(&self) -> Option<&Contact> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    pub fn select(&mut self, id: &str) -> Result<&Contact, ContactError> {
        if self.get(id).is_none() {
            return Err(ContactError::NotFound(id.to_string()));
        }
        self.selected = Some(id.to_string());
        self.get(id).ok_or_else(|| ContactError::NotFound(id.to_string()))
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Replace the local mirror with the store's contact collection.
    /// A selection whose contact disappeared is cleared.
    pub fn load(&mut self, store: &mut dyn Store) -> Result<(), StoreError> {
        let contacts = fetch_contacts(store)?;
        self.replace(contacts);
        Ok(())
    }

    /// Swap in a freshly fetched list, dropping a selection that no longer exists
    pub fn replace(&mut self, contacts: Vec<Contact>) {
        self.contacts = contacts;
        if self.selected().is_none() {
            self.selected = None;
        }
    }

    /// Validate and persist a new contact with a color drawn from `palette`.
    pub fn add_contact(
        &mut self,
        store: &mut dyn Store,
        user: &SessionUser,
        draft: &ContactDraft,
        palette: &[String],
    ) -> Result<Contact, ContactError> {
        ensure_writable(user)?;
        validate_fields(&draft.name, &draft.email, &draft.phone)?;
        let mut contact = Contact {
            id: None,
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            color: pick_color(palette, &mut rand::rng()),
        };
        let value = to_record_value(Operation::Create, Collection::Contacts, &contact)?;
        let key = store.create(Collection::Contacts, &value)?;
        info!(id = %key, name = %contact.name, "contact created");
        contact.id = Some(key);
        self.contacts.push(contact.clone());
        Ok(contact)
    }

    /// Edit a contact in place, keeping its color.
    pub fn edit_contact(
        &mut self,
        store: &mut dyn Store,
        user: &SessionUser,
        id: &str,
        patch: &ContactPatch,
    ) -> Result<Contact, ContactError> {
        ensure_writable(user)?;
        let slot = self
            .contacts
            .iter_mut()
            .find(|c| c.id.as_deref() == Some(id))
            .ok_or_else(|| ContactError::NotFound(id.to_string()))?;
        let mut updated = slot.clone();
        if let Some(name) = &patch.name {
            updated.name = name.trim().to_string();
        }
        if let Some(email) = &patch.email {
            updated.email = email.trim().to_string();
        }
        if let Some(phone) = &patch.phone {
            updated.phone = phone.trim().to_string();
        }
        validate_fields(&updated.name, &updated.email, &updated.phone)?;
        let value = to_record_value(Operation::Update, Collection::Contacts, &updated)?;
        store.update(Collection::Contacts, id, &value)?;
        info!(id, "contact updated");
        *slot = updated.clone();
        Ok(updated)
    }

    /// Delete a contact; clears the selection if it pointed at it.
    pub fn delete_contact(
        &mut self,
        store: &mut dyn Store,
        user: &SessionUser,
        id: &str,
    ) -> Result<Contact, ContactError> {
        ensure_writable(user)?;
        let idx = self
            .contacts
            .iter()
            .position(|c| c.id.as_deref() == Some(id))
            .ok_or_else(|| ContactError::NotFound(id.to_string()))?;
        store.delete(Collection::Contacts, id)?;
        info!(id, "contact deleted");
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        Ok(self.contacts.remove(idx))
    }
}

/// Fetch every contact in store order, with ids filled in from the record keys
pub fn fetch_contacts(store: &mut dyn Store) -> Result<Vec<Contact>, StoreError> {
    Ok(fetch_typed::<Contact>(store, Collection::Contacts)?
        .into_iter()
        .map(|(key, mut contact)| {
            contact.id = Some(key);
            contact
        })
        .collect())
}

/// Sort contacts case-insensitively by name and bucket them by the
/// uppercased first character. Letters appear in sorted order.
pub fn group_by_letter(contacts: &[Contact]) -> IndexMap<String, Vec<&Contact>> {
    let mut sorted: Vec<&Contact> = contacts.iter().collect();
    sorted.sort_by(|a, b| {
        a.name
            .trim()
            .to_lowercase()
            .cmp(&b.name.trim().to_lowercase())
            .then_with(|| a.email.cmp(&b.email))
    });
    let mut groups: IndexMap<String, Vec<&Contact>> = IndexMap::new();
    for contact in sorted {
        groups.entry(letter_of(&contact.name)).or_default().push(contact);
    }
    groups
}

/// Group heading for a name; names without a first character go under `#`
pub fn letter_of(name: &str) -> String {
    match name.trim().chars().next() {
        Some(c) => c.to_uppercase().collect(),
        None => "#".to_string(),
    }
}

/// Draw a badge color from the palette
pub fn pick_color<R: Rng + ?Sized>(palette: &[String], rng: &mut R) -> String {
    palette
        .choose(rng)
        .cloned()
        .unwrap_or_else(|| FALLBACK_COLOR.to_string())
}

fn validate_fields(name: &str, email: &str, phone: &str) -> Result<(), ValidationError> {
    let mut errors = ValidationError::default();
    validate::require(&mut errors, "name", name);
    validate::check_email(&mut errors, email);
    validate::check_phone(&mut errors, phone);
    errors.into_result()
}

fn ensure_writable(user: &SessionUser) -> Result<(), ContactError> {
    if user.can_write() {
        Ok(())
    } else {
        warn!("guest attempted to modify contacts");
        Err(ContactError::Forbidden)
    }
}
