//! Form validation - raw client submissions in, validated domain values out.
//!
//! Forms deserialize leniently (every field defaults to an empty string) so
//! that malformed submissions become field errors instead of request
//! rejections.

mod account;
mod comment;
mod post;
mod profile;

use std::collections::BTreeMap;

use serde::Serialize;

pub use account::{Credentials, LoginForm, Registration, RegistrationForm};
pub use comment::CommentForm;
pub use post::{PostForm, format_pub_date, parse_pub_date};
pub use profile::{ProfileChanges, ProfileForm};

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "__all__";

pub(crate) const REQUIRED: &str = "This field is required.";

/// Error for a select field whose value names no existing record.
pub const INVALID_CHOICE: &str = "Select a valid choice.";

/// Error for a username already held by another account.
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// Field name to error messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    /// Record an error that applies to the whole form.
    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add(NON_FIELD_ERRORS, message);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(value)` when no errors were recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }

    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }
}

/// Trim `value` and record an error when it is empty or longer than `max_len`.
pub(crate) fn required_text(
    errors: &mut FormErrors,
    field: &str,
    value: &str,
    max_len: Option<usize>,
) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    } else {
        check_length(errors, field, value, max_len);
    }
    value.to_string()
}

/// Trim `value`, allowing it to be empty.
pub(crate) fn optional_text(
    errors: &mut FormErrors,
    field: &str,
    value: &str,
    max_len: Option<usize>,
) -> String {
    let value = value.trim();
    check_length(errors, field, value, max_len);
    value.to_string()
}

fn check_length(errors: &mut FormErrors, field: &str, value: &str, max_len: Option<usize>) {
    if let Some(max) = max_len {
        let len = value.chars().count();
        if len > max {
            errors.add(
                field,
                format!("Ensure this value has at most {max} characters (it has {len})."),
            );
        }
    }
}
