use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 /-]{3,}$").unwrap());

/// A single field-level validation message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// One or more invalid form fields. Raised before any store call.
#[derive(Debug, Clone, PartialEq, Eq, Default, thiserror::Error)]
#[error("invalid input ({})", describe(.fields))]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

fn describe(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Message for one field, if it failed
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `Ok(())` if nothing was recorded
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Record an error if `value` is blank
pub fn require(errors: &mut ValidationError, field: &'static str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.push(field, "This field is required");
        false
    } else {
        true
    }
}

/// Parse a `YYYY-MM-DD` date, recording an error for blank or malformed input
pub fn parse_due_date(errors: &mut ValidationError, value: &str) -> Option<NaiveDate> {
    if !require(errors, "dueDate", value) {
        return None;
    }
    match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(_) => {
            errors.push("dueDate", "Use the format YYYY-MM-DD");
            None
        }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE_RE.is_match(value.trim())
}

/// Record an error unless `value` is a well-formed email
pub fn check_email(errors: &mut ValidationError, value: &str) {
    if require(errors, "email", value) && !is_valid_email(value) {
        errors.push("email", "Please enter a valid email address");
    }
}

/// Record an error if a non-blank phone number is malformed
pub fn check_phone(errors: &mut ValidationError, value: &str) {
    if !value.trim().is_empty() && !is_valid_phone(value) {
        errors.push("phone", "Please enter a valid phone number");
    }
}
