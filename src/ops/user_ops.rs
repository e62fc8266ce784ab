use tracing::info;

use crate::io::store::{Collection, Operation, Store, StoreError, fetch_typed, to_record_value};
use crate::model::session::{SessionUser, UserRecord};
use crate::ops::validate::{self, ValidationError};

/// Error type for sign-up and sign-in
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("an account for {0} already exists")]
    AlreadyRegistered(String),
    #[error("no account found for {0}")]
    UnknownEmail(String),
}

fn find_user(store: &mut dyn Store, email: &str) -> Result<Option<UserRecord>, StoreError> {
    let email = email.trim().to_lowercase();
    Ok(fetch_typed::<UserRecord>(store, Collection::Users)?
        .into_iter()
        .map(|(_, u)| u)
        .find(|u| u.email.to_lowercase() == email))
}

/// Register a user in the `users` collection and return their session.
pub fn sign_up(store: &mut dyn Store, name: &str, email: &str) -> Result<SessionUser, UserError> {
    let mut errors = ValidationError::default();
    validate::require(&mut errors, "name", name);
    validate::check_email(&mut errors, email);
    errors.into_result()?;

    if find_user(store, email)?.is_some() {
        return Err(UserError::AlreadyRegistered(email.trim().to_string()));
    }
    let record = UserRecord {
        name: name.trim().to_string(),
        email: email.trim().to_string(),
    };
    let value = to_record_value(Operation::Create, Collection::Users, &record)?;
    store.create(Collection::Users, &value)?;
    info!(email = %record.email, "user registered");
    Ok(SessionUser::new(record.name, record.email))
}

/// Look up a registered user by email and return their session.
pub fn sign_in(store: &mut dyn Store, email: &str) -> Result<SessionUser, UserError> {
    let mut errors = ValidationError::default();
    validate::check_email(&mut errors, email);
    errors.into_result()?;

    let record = find_user(store, email)?
        .ok_or_else(|| UserError::UnknownEmail(email.trim().to_string()))?;
    Ok(SessionUser::new(record.name, record.email))
}
