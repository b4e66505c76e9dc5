use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

use regex::Regex;
use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email pattern")
});

#[derive(Debug, Error, PartialEq)]
pub enum EmailError {
    #[error("Email address is not well-formed")]
    Malformed,
}

/// A well-formed email address.
///
/// The address is kept secret-wrapped so it never ends up in logs by
/// accident. Directory indexes use the normalized (case-folded) form.
#[derive(Debug, Clone)]
pub struct Email(Secret<String>);

impl Email {
    /// Case-folded form used for uniqueness keys and index lookups.
    pub fn normalized(&self) -> String {
        self.0.expose_secret().trim().to_lowercase()
    }
}

impl TryFrom<Secret<String>> for Email {
    type Error = EmailError;

    fn try_from(value: Secret<String>) -> Result<Self, Self::Error> {
        if EMAIL_PATTERN.is_match(value.expose_secret().trim()) {
            Ok(Self(value))
        } else {
            Err(EmailError::Malformed)
        }
    }
}

impl AsRef<Secret<String>> for Email {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

impl PartialEq for Email {
    fn eq(&self, other: &Self) -> bool {
        self.0.expose_secret() == other.0.expose_secret()
    }
}

impl Eq for Email {}

impl Hash for Email {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.expose_secret().hash(state);
    }
}
