use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Error, PartialEq)]
pub enum PasswordError {
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,
    #[error("Password must contain an uppercase letter")]
    MissingUppercase,
    #[error("Password must contain a lowercase letter")]
    MissingLowercase,
    #[error("Password must contain a digit")]
    MissingDigit,
}

/// A candidate password that satisfies the complexity policy.
///
/// Only ever handed to the identity provider; the directory never sees it.
#[derive(Debug, Clone)]
pub struct Password(Secret<String>);

impl TryFrom<Secret<String>> for Password {
    type Error = PasswordError;

    fn try_from(value: Secret<String>) -> Result<Self, Self::Error> {
        let raw = value.expose_secret();

        if raw.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(PasswordError::TooShort);
        }
        if !raw.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(PasswordError::MissingUppercase);
        }
        if !raw.chars().any(|c| c.is_ascii_lowercase()) {
            return Err(PasswordError::MissingLowercase);
        }
        if !raw.chars().any(|c| c.is_ascii_digit()) {
            return Err(PasswordError::MissingDigit);
        }

        Ok(Self(value))
    }
}

impl AsRef<Secret<String>> for Password {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.0.expose_secret() == other.0.expose_secret()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Password, PasswordError> {
        Password::try_from(Secret::from(input.to_string()))
    }

    #[test]
    fn test_accepts_compliant_password() {
        assert!(parse("Passw0rd").is_ok());
    }

    #[test]
    fn test_rejects_short_password() {
        assert_eq!(parse("Pw0rd").unwrap_err(), PasswordError::TooShort);
    }

    #[test]
    fn test_rejects_missing_character_classes() {
        assert_eq!(parse("passw0rd").unwrap_err(), PasswordError::MissingUppercase);
        assert_eq!(parse("PASSW0RD").unwrap_err(), PasswordError::MissingLowercase);
        assert_eq!(parse("Password").unwrap_err(), PasswordError::MissingDigit);
    }
}
