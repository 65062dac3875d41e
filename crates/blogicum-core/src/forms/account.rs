use serde::{Deserialize, Serialize};

use super::profile::{validate_email, validate_username};
use super::{FormErrors, REQUIRED};

const PASSWORD_MIN_LEN: usize = 8;

/// Sign-up submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password1: String,
    #[serde(skip_serializing)]
    pub password2: String,
}

/// Validated sign-up data. The password is still plain text.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegistrationForm {
    /// Check field shapes. Username uniqueness is left to the caller.
    pub fn validate(&self) -> Result<Registration, FormErrors> {
        let mut errors = FormErrors::new();

        let username = validate_username(&mut errors, &self.username);
        let email = validate_email(&mut errors, &self.email);

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        } else if self.password1.chars().count() < PASSWORD_MIN_LEN {
            errors.add(
                "password1",
                format!("This password is too short. It must contain at least {PASSWORD_MIN_LEN} characters."),
            );
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if self.password1 != self.password2 {
            errors.add("password2", "The two password fields didn't match.");
        }

        errors.into_result(Registration {
            username,
            email,
            password: self.password1.clone(),
        })
    }
}

/// Sign-in submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// Username and password pair to check against stored credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<Credentials, FormErrors> {
        let mut errors = FormErrors::new();
        let username = self.username.trim();
        if username.is_empty() {
            errors.add("username", REQUIRED);
        }
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }
        errors.into_result(Credentials {
            username: username.to_string(),
            password: self.password.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> RegistrationForm {
        RegistrationForm {
            username: "pierre".into(),
            email: String::new(),
            password1: "war-and-peace".into(),
            password2: "war-and-peace".into(),
        }
    }

    #[test]
    fn test_registration_ok() {
        let data = registration().validate().unwrap();
        assert_eq!(data.username, "pierre");
        assert_eq!(data.password, "war-and-peace");
    }

    #[test]
    fn test_registration_password_rules() {
        let short = RegistrationForm {
            password1: "short".into(),
            password2: "short".into(),
            ..registration()
        };
        assert!(short.validate().unwrap_err().get("password1").is_some());

        let mismatch = RegistrationForm {
            password2: "war-and-peas".into(),
            ..registration()
        };
        assert!(mismatch.validate().unwrap_err().get("password2").is_some());
    }

    #[test]
    fn test_passwords_never_serialize() {
        let json = serde_json::to_value(registration()).unwrap();
        assert!(json.get("password1").is_none());

        let login = LoginForm { username: "pierre".into(), password: "secret".into() };
        assert!(serde_json::to_value(login).unwrap().get("password").is_none());
    }

    #[test]
    fn test_login_requires_both_fields() {
        let errors = LoginForm::default().validate().unwrap_err();
        let fields: Vec<_> = errors.fields().collect();
        assert_eq!(fields, vec!["password", "username"]);
    }
}
