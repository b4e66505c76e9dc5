use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version,
    password_hash::{PasswordHasher, SaltString, rand_core},
};
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use jsonwebtoken::EncodingKey;
use rand::{Rng, distr::Alphanumeric};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use waypoint_core::{
    Email, IdentityProvider, IdentityProviderError, Password, TokenSet, UserId, Username,
};

const TOKEN_TTL_SECONDS: i64 = 3600;
const REFRESH_TOKEN_LENGTH: usize = 64;

/// Reference identity provider backed by process memory.
///
/// Mirrors the observable behavior of the hosted provider: accounts are
/// keyed by the as-entered username, start disabled with no credential,
/// and can only authenticate once a permanent password has been set.
#[derive(Clone)]
pub struct InMemoryIdentityProvider {
    accounts: Arc<DashMap<String, ProviderAccount>>,
    signing_key: Arc<Secret<String>>,
}

#[derive(Clone)]
struct ProviderAccount {
    email: String,
    user_id: UserId,
    password_hash: Option<Secret<String>>,
    confirmed: bool,
}

impl InMemoryIdentityProvider {
    pub fn new(signing_key: Secret<String>) -> Self {
        Self {
            accounts: Arc::new(DashMap::new()),
            signing_key: Arc::new(signing_key),
        }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    #[tracing::instrument(name = "Creating provider account", skip_all, fields(username = %username))]
    async fn create_account(
        &self,
        username: &Username,
        email: &Email,
        user_id: &UserId,
    ) -> Result<(), IdentityProviderError> {
        match self.accounts.entry(username.as_str().to_string()) {
            Entry::Occupied(_) => Err(IdentityProviderError::AccountAlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(ProviderAccount {
                    email: email.normalized(),
                    user_id: *user_id,
                    password_hash: None,
                    confirmed: true,
                });
                Ok(())
            }
        }
    }

    #[tracing::instrument(name = "Setting permanent credential", skip_all, fields(username = %username))]
    async fn set_permanent_password(
        &self,
        username: &Username,
        password: &Password,
    ) -> Result<(), IdentityProviderError> {
        let password_hash = compute_password_hash(password.clone())
            .await
            .map_err(IdentityProviderError::UnexpectedError)?;

        let mut account = self
            .accounts
            .get_mut(username.as_str())
            .ok_or(IdentityProviderError::AccountNotFound)?;
        account.password_hash = Some(password_hash);
        Ok(())
    }

    #[tracing::instrument(name = "Deleting provider account", skip_all, fields(username = %username))]
    async fn delete_account(&self, username: &Username) -> Result<(), IdentityProviderError> {
        self.accounts
            .remove(username.as_str())
            .map(|_| ())
            .ok_or(IdentityProviderError::AccountNotFound)
    }

    #[tracing::instrument(name = "Verifying credentials", skip_all)]
    async fn verify_credentials(
        &self,
        email: &Email,
        password: &Secret<String>,
    ) -> Result<TokenSet, IdentityProviderError> {
        let normalized = email.normalized();
        let account = self
            .accounts
            .iter()
            .find(|entry| entry.value().email == normalized)
            .map(|entry| entry.value().clone())
            .ok_or(IdentityProviderError::AccountNotFound)?;

        // An account without a credential is still disabled for login.
        let Some(password_hash) = account.password_hash.clone() else {
            return Err(IdentityProviderError::IncorrectCredentials);
        };

        verify_password_hash(password_hash, password.clone())
            .await
            .map_err(|_| IdentityProviderError::IncorrectCredentials)?;

        if !account.confirmed {
            return Err(IdentityProviderError::AccountNotConfirmed);
        }

        issue_token_set(&account, self.signing_key.expose_secret().as_bytes())
            .map_err(|e| IdentityProviderError::UnexpectedError(e.to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    token_use: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    exp: usize,
    iat: usize,
}

fn issue_token_set(
    account: &ProviderAccount,
    secret: &[u8],
) -> Result<TokenSet, jsonwebtoken::errors::Error> {
    let issued_at = Utc::now();
    let expires_at = issued_at + chrono::Duration::seconds(TOKEN_TTL_SECONDS);
    let iat = issued_at.timestamp().max(0) as usize;
    let exp = expires_at.timestamp().max(0) as usize;

    let encoding_key = EncodingKey::from_secret(secret);

    let access_token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &Claims {
            sub: account.user_id.to_string(),
            token_use: "access".to_string(),
            email: None,
            exp,
            iat,
        },
        &encoding_key,
    )?;

    let id_token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &Claims {
            sub: account.user_id.to_string(),
            token_use: "id".to_string(),
            email: Some(account.email.clone()),
            exp,
            iat,
        },
        &encoding_key,
    )?;

    let refresh_token: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LENGTH)
        .map(char::from)
        .collect();

    Ok(TokenSet {
        access_token,
        id_token,
        refresh_token: Some(refresh_token),
    })
}

#[tracing::instrument(name = "Verify password hash", skip_all)]
async fn verify_password_hash(
    expected_password_hash: Secret<String>,
    password_candidate: Secret<String>,
) -> Result<(), String> {
    let current_span: tracing::Span = tracing::Span::current();
    let result = tokio::task::spawn_blocking(move || {
        current_span.in_scope(|| {
            let expected_password_hash: PasswordHash<'_> =
                PasswordHash::new(expected_password_hash.expose_secret())
                    .map_err(|e| e.to_string())?;

            Argon2::new(
                Algorithm::Argon2id,
                Version::V0x13,
                Params::new(15000, 2, 1, None).map_err(|e| e.to_string())?,
            )
            .verify_password(
                password_candidate.expose_secret().as_bytes(),
                &expected_password_hash,
            )
            .map_err(|e| e.to_string())
        })
    })
    .await
    .map_err(|e| e.to_string())?;

    result
}

#[tracing::instrument(name = "Computing password hash", skip_all)]
async fn compute_password_hash(password: Password) -> Result<Secret<String>, String> {
    let current_span: tracing::Span = tracing::Span::current();

    let result = tokio::task::spawn_blocking(move || {
        current_span.in_scope(move || {
            let salt: SaltString = SaltString::generate(rand_core::OsRng);
            let hasher = Argon2::new(
                Algorithm::Argon2id,
                Version::V0x13,
                Params::new(15000, 2, 1, None).map_err(|e| e.to_string())?,
            );
            hasher
                .hash_password(password.as_ref().expose_secret().as_bytes(), &salt)
                .map(|h| Secret::from(h.to_string()))
                .map_err(|e| e.to_string())
        })
    })
    .await
    .map_err(|e| e.to_string())?;

    result
}
