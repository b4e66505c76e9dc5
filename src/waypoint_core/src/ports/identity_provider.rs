use async_trait::async_trait;
use secrecy::Secret;
use thiserror::Error;

use crate::domain::{
    email::Email, password::Password, token_set::TokenSet, user_id::UserId, username::Username,
};

// IdentityProvider port trait and errors
#[derive(Debug, Error)]
pub enum IdentityProviderError {
    #[error("Account already exists")]
    AccountAlreadyExists,
    #[error("Account not found")]
    AccountNotFound,
    #[error("Incorrect credentials")]
    IncorrectCredentials,
    #[error("Account is not confirmed")]
    AccountNotConfirmed,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl PartialEq for IdentityProviderError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::AccountAlreadyExists, Self::AccountAlreadyExists) => true,
            (Self::AccountNotFound, Self::AccountNotFound) => true,
            (Self::IncorrectCredentials, Self::IncorrectCredentials) => true,
            (Self::AccountNotConfirmed, Self::AccountNotConfirmed) => true,
            (Self::UnexpectedError(_), Self::UnexpectedError(_)) => true,
            _ => false,
        }
    }
}

/// Capability interface over the external credential system.
///
/// The provider owns passwords and token issuance. It is not trusted for
/// uniqueness: its own username constraint is normalized differently and
/// only acts as a secondary guard behind the directory's reservations.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create the account disabled for login; no credential is set yet.
    async fn create_account(
        &self,
        username: &Username,
        email: &Email,
        user_id: &UserId,
    ) -> Result<(), IdentityProviderError>;

    /// Set the permanent credential, enabling login.
    async fn set_permanent_password(
        &self,
        username: &Username,
        password: &Password,
    ) -> Result<(), IdentityProviderError>;

    /// Remove a half-created account during compensation.
    async fn delete_account(&self, username: &Username) -> Result<(), IdentityProviderError>;

    /// Check a credential pair and issue a token set.
    ///
    /// The candidate is a raw secret, not a [`Password`]: the complexity
    /// policy binds new credentials only, never what a caller may try to
    /// log in with.
    async fn verify_credentials(
        &self,
        email: &Email,
        password: &Secret<String>,
    ) -> Result<TokenSet, IdentityProviderError>;
}
