use secrecy::Secret;
use waypoint_core::{
    DirectoryError, Email, IdentityProvider, IdentityProviderError, ProfileDirectory, TokenSet,
    UserProfile,
};

/// Successful authentication: the token set is the authoritative result,
/// the profile is best-effort enrichment.
#[derive(Debug)]
pub struct AuthenticatedSession {
    pub tokens: TokenSet,
    pub profile: Option<UserProfile>,
}

/// Error types for the authenticate use case
#[derive(Debug, thiserror::Error)]
pub enum AuthenticateError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Account is not confirmed")]
    AccountNotConfirmed,
    #[error("Identity provider error: {0}")]
    IdentityProvider(IdentityProviderError),
}

/// Authenticate use case - verifies credentials against the identity
/// provider and enriches the result with the directory profile.
pub struct AuthenticateUseCase<I, D>
where
    I: IdentityProvider,
    D: ProfileDirectory,
{
    identity_provider: I,
    directory: D,
}

impl<I, D> AuthenticateUseCase<I, D>
where
    I: IdentityProvider,
    D: ProfileDirectory,
{
    pub fn new(identity_provider: I, directory: D) -> Self {
        Self {
            identity_provider,
            directory,
        }
    }

    /// Execute the authenticate use case
    ///
    /// # Arguments
    /// * `email` - User's email address
    /// * `password` - The candidate password as entered
    ///
    /// # Returns
    /// The issued token set plus the profile when the directory has one,
    /// or AuthenticateError
    #[tracing::instrument(name = "AuthenticateUseCase::execute", skip_all)]
    pub async fn execute(
        &self,
        email: Email,
        password: Secret<String>,
    ) -> Result<AuthenticatedSession, AuthenticateError> {
        let tokens = self
            .identity_provider
            .verify_credentials(&email, &password)
            .await
            .map_err(|error| match error {
                // Unknown account and bad password are deliberately the
                // same outcome; callers must not learn whether an account
                // exists.
                IdentityProviderError::AccountNotFound
                | IdentityProviderError::IncorrectCredentials => {
                    AuthenticateError::InvalidCredentials
                }
                IdentityProviderError::AccountNotConfirmed => {
                    AuthenticateError::AccountNotConfirmed
                }
                other => AuthenticateError::IdentityProvider(other),
            })?;

        // The token set is authoritative. A directory outage or a missing
        // record must not fail the login; the caller can re-fetch later.
        let profile = match self.directory.get_profile_by_email(&email).await {
            Ok(profile) => Some(profile),
            Err(DirectoryError::NotFound) => None,
            Err(error) => {
                tracing::warn!(%error, "profile lookup failed during login");
                None
            }
        };

        Ok(AuthenticatedSession { tokens, profile })
    }
}
