use serde::{Deserialize, Serialize};

use super::{FormErrors, optional_text, required_text};
use crate::domain::User;

pub(crate) const USERNAME_MAX_LEN: usize = 150;
const NAME_MAX_LEN: usize = 150;

/// Edit submission for the requester's own profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Validated profile fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileChanges {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl ProfileChanges {
    pub fn apply_to(self, user: &mut User) {
        user.username = self.username;
        user.first_name = self.first_name;
        user.last_name = self.last_name;
        user.email = self.email;
    }
}

impl ProfileForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }

    /// Check field shapes. Username uniqueness is left to the caller.
    pub fn validate(&self) -> Result<ProfileChanges, FormErrors> {
        let mut errors = FormErrors::new();

        let username = validate_username(&mut errors, &self.username);
        let first_name = optional_text(&mut errors, "first_name", &self.first_name, Some(NAME_MAX_LEN));
        let last_name = optional_text(&mut errors, "last_name", &self.last_name, Some(NAME_MAX_LEN));
        let email = validate_email(&mut errors, &self.email);

        errors.into_result(ProfileChanges {
            username,
            first_name,
            last_name,
            email,
        })
    }
}

/// Letters, digits and `@ . + - _`, up to 150 characters.
pub(crate) fn validate_username(errors: &mut FormErrors, raw: &str) -> String {
    let username = required_text(errors, "username", raw, Some(USERNAME_MAX_LEN));
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-');
    if !username.chars().all(allowed) {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
    username
}

/// An optional e-mail address with a plausible `local@domain.tld` shape.
pub(crate) fn validate_email(errors: &mut FormErrors, raw: &str) -> String {
    let email = raw.trim();
    if email.is_empty() {
        return String::new();
    }
    let plausible = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.contains('@')
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
    }) && !email.chars().any(char::is_whitespace);
    if !plausible {
        errors.add("email", "Enter a valid email address.");
    }
    email.to_string()
}
