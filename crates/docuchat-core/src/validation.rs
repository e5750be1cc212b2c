//! Credential shape checks run before login/signup touch the network.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ActionError;

// Same acceptance as the HTML5 `type=email` check: local part, `@`, dot-separated labels.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern compiles")
});

/// Minimum password length per action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRule {
    /// Login only needs something to send.
    NonEmpty,
    /// Signup requires at least 8 characters.
    MinLength(usize),
}

impl PasswordRule {
    pub const SIGNUP: Self = Self::MinLength(8);

    fn accepts(self, password: &str) -> bool {
        let len = password.chars().count();
        match self {
            Self::NonEmpty => len >= 1,
            Self::MinLength(min) => len >= min,
        }
    }
}

/// Login/signup form values. Missing fields decode as empty and fail validation.
#[derive(Clone, Default, Deserialize, Serialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self, rule: PasswordRule) -> Result<(), ActionError> {
        if !is_email(&self.email) || !rule.accepts(&self.password) {
            return Err(ActionError::InvalidFields);
        }
        Ok(())
    }
}

pub fn is_email(value: &str) -> bool {
    !value.is_empty() && EMAIL_RE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(is_email("reader@example.com"));
        assert!(is_email("first.last+docs@sub.example.co"));
        assert!(is_email("local@host"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "plain", "@example.com", "a@", "a b@example.com", "a@-host.com", "a@@b.com"] {
            assert!(!is_email(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn login_needs_any_password() {
        assert!(Credentials::new("a@b.com", "x").validate(PasswordRule::NonEmpty).is_ok());
        assert!(matches!(
            Credentials::new("a@b.com", "").validate(PasswordRule::NonEmpty),
            Err(ActionError::InvalidFields)
        ));
    }

    #[test]
    fn signup_needs_eight_characters() {
        assert!(Credentials::new("a@b.com", "12345678").validate(PasswordRule::SIGNUP).is_ok());
        assert!(Credentials::new("a@b.com", "1234567").validate(PasswordRule::SIGNUP).is_err());
    }

    #[test]
    fn debug_hides_password() {
        let rendered = format!("{:?}", Credentials::new("a@b.com", "hunter22"));
        assert!(!rendered.contains("hunter22"));
    }
}
