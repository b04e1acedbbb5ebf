use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::entities::Credentials;

pub static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s'-]+$").expect("username pattern compiles"));
pub static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9+\-()\sx]+$").expect("phone pattern compiles"));

pub const USERNAME_MESSAGE: &str = "Only english letters, spaces, hyphens and apostrophes allowed";
pub const PHONE_MESSAGE: &str = "Only numbers, phone symbols and extension (x) allowed";

pub fn required_message(field: &str) -> String {
    format!("{field} is required")
}

/// Field name to message. An empty message means the field passed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn has_errors(&self) -> bool {
        self.0.values().any(|message| !message.is_empty())
    }

    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_owned(), message.into());
    }
}

pub fn validate_field(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    pattern: &Regex,
    message: &str,
) -> bool {
    let outcome = if value.is_empty() {
        required_message(field)
    } else if !pattern.is_match(value) {
        message.to_owned()
    } else {
        String::new()
    };

    let valid = outcome.is_empty();
    debug!(field, valid, "validated field");
    errors.insert(field, outcome);
    valid
}

pub fn validate_username(errors: &mut FieldErrors, username: &str) -> bool {
    validate_field(
        errors,
        "username",
        username,
        &USERNAME_PATTERN,
        USERNAME_MESSAGE,
    )
}

pub fn validate_phone(errors: &mut FieldErrors, phone_number: &str) -> bool {
    validate_field(
        errors,
        "phoneNumber",
        phone_number,
        &PHONE_PATTERN,
        PHONE_MESSAGE,
    )
}

/// Checks both login fields, so every message is filled in even when the
/// first one fails.
pub fn validate_credentials(credentials: &Credentials) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    let username_ok = validate_username(&mut errors, &credentials.username);
    let phone_ok = validate_phone(&mut errors, &credentials.phone_number);

    if username_ok && phone_ok {
        Ok(())
    } else {
        Err(errors)
    }
}
