use waypoint_core::{
    DirectoryError, DisplayName, Email, IdentityProvider, IdentityProviderError, Password,
    ProfileDirectory, UniqueKey, UserId, UserProfile, Username,
};

/// Error types for the register use case
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("Username is already taken")]
    UsernameTaken,
    #[error("Email is already registered")]
    EmailTaken,
    #[error("Identity provider error: {0}")]
    IdentityProvider(IdentityProviderError),
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),
    #[error("Profile write failed for user {user_id}; identity exists, reservations are pending")]
    ProfileWriteFailed { user_id: UserId },
}

/// Register use case - creates the identity and the profile as one logical
/// transaction over two systems that offer none.
///
/// Steps are ordered cheapest-to-undo first: the frequent failure modes
/// (taken username or email) are settled against the directory's
/// reservation index before the identity provider is ever touched.
pub struct RegisterUseCase<I, D>
where
    I: IdentityProvider,
    D: ProfileDirectory,
{
    identity_provider: I,
    directory: D,
}

impl<I, D> RegisterUseCase<I, D>
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

    /// Execute the register use case
    ///
    /// # Arguments
    /// * `email` - Validated email address
    /// * `password` - Validated password
    /// * `username` - Validated handle
    /// * `display_name` - Validated display name
    ///
    /// # Returns
    /// The generated user id on success, or RegisterError
    #[tracing::instrument(
        name = "RegisterUseCase::execute",
        skip_all,
        fields(username = %username)
    )]
    pub async fn execute(
        &self,
        email: Email,
        password: Password,
        username: Username,
        display_name: DisplayName,
    ) -> Result<UserId, RegisterError> {
        // Generated before the first write so every reservation records
        // its owner. Generation itself has no side effects.
        let user_id = UserId::new();
        let username_key = UniqueKey::username(&username);
        let email_key = UniqueKey::email(&email);

        // Reserve the username. Losing the race here costs nothing to
        // undo and never touches the identity provider.
        match self
            .directory
            .put_unique_if_absent(&username_key, &user_id)
            .await
        {
            Ok(()) => {}
            Err(DirectoryError::AlreadyExists) => return Err(RegisterError::UsernameTaken),
            Err(error) => return Err(error.into()),
        }

        match self
            .directory
            .put_unique_if_absent(&email_key, &user_id)
            .await
        {
            Ok(()) => {}
            Err(DirectoryError::AlreadyExists) => {
                self.release_reservations(&user_id, &[&username_key]).await;
                return Err(RegisterError::EmailTaken);
            }
            Err(error) => {
                self.release_reservations(&user_id, &[&username_key]).await;
                return Err(error.into());
            }
        }

        // Create the account disabled, then set the permanent credential.
        // A password-less account is never observable as usable.
        if let Err(error) = self
            .identity_provider
            .create_account(&username, &email, &user_id)
            .await
        {
            self.release_reservations(&user_id, &[&username_key, &email_key])
                .await;
            return Err(RegisterError::IdentityProvider(error));
        }

        if let Err(error) = self
            .identity_provider
            .set_permanent_password(&username, &password)
            .await
        {
            if let Err(delete_error) = self.identity_provider.delete_account(&username).await {
                tracing::error!(
                    %user_id,
                    %delete_error,
                    "failed to delete half-created identity; operator cleanup required"
                );
            }
            self.release_reservations(&user_id, &[&username_key, &email_key])
                .await;
            return Err(RegisterError::IdentityProvider(error));
        }

        let profile = UserProfile::new(user_id, &email, &username, &display_name);
        if let Err(error) = self.directory.put_profile(profile).await {
            // The identity is live, and provider-side deletes are
            // themselves fallible. Leave it in place and flag the
            // reservations so a reconciler can retry the profile write
            // with the same user id.
            tracing::error!(%user_id, %error, "profile write failed after identity creation");
            self.mark_reservations_pending(&user_id, &[&username_key, &email_key])
                .await;
            return Err(RegisterError::ProfileWriteFailed { user_id });
        }

        Ok(user_id)
    }

    async fn release_reservations(&self, user_id: &UserId, keys: &[&UniqueKey]) {
        for key in keys {
            if let Err(error) = self.directory.delete_unique(key).await {
                tracing::error!(
                    %user_id,
                    %key,
                    %error,
                    "failed to release reservation; operator cleanup required"
                );
            }
        }
    }

    async fn mark_reservations_pending(&self, user_id: &UserId, keys: &[&UniqueKey]) {
        for key in keys {
            if let Err(error) = self.directory.mark_pending_profile(key).await {
                tracing::error!(
                    %user_id,
                    %key,
                    %error,
                    "failed to flag reservation as pending-profile; operator cleanup required"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use secrecy::Secret;
    use tokio::sync::RwLock;
    use waypoint_core::{ReservationStatus, TokenSet, UniquenessRecord};

    use super::*;

    #[derive(Default)]
    struct DirectoryState {
        reservations: HashMap<UniqueKey, UniquenessRecord>,
        profiles: HashMap<UserId, UserProfile>,
    }

    #[derive(Clone, Default)]
    struct MockDirectory {
        state: Arc<RwLock<DirectoryState>>,
        fail_put_profile: bool,
    }

    #[async_trait::async_trait]
    impl ProfileDirectory for MockDirectory {
        async fn put_unique_if_absent(
            &self,
            key: &UniqueKey,
            owner: &UserId,
        ) -> Result<(), DirectoryError> {
            let mut state = self.state.write().await;
            if state.reservations.contains_key(key) {
                return Err(DirectoryError::AlreadyExists);
            }
            state
                .reservations
                .insert(key.clone(), UniquenessRecord::claimed(key.clone(), *owner));
            Ok(())
        }

        async fn delete_unique(&self, key: &UniqueKey) -> Result<(), DirectoryError> {
            let mut state = self.state.write().await;
            state
                .reservations
                .remove(key)
                .map(|_| ())
                .ok_or(DirectoryError::NotFound)
        }

        async fn mark_pending_profile(&self, key: &UniqueKey) -> Result<(), DirectoryError> {
            let mut state = self.state.write().await;
            let record = state
                .reservations
                .get_mut(key)
                .ok_or(DirectoryError::NotFound)?;
            record.status = ReservationStatus::PendingProfile;
            Ok(())
        }

        async fn put_profile(&self, profile: UserProfile) -> Result<(), DirectoryError> {
            if self.fail_put_profile {
                return Err(DirectoryError::UnexpectedError("directory down".to_string()));
            }
            let mut state = self.state.write().await;
            state.profiles.insert(profile.user_id, profile);
            Ok(())
        }

        async fn get_profile(&self, user_id: &UserId) -> Result<UserProfile, DirectoryError> {
            let state = self.state.read().await;
            state
                .profiles
                .get(user_id)
                .cloned()
                .ok_or(DirectoryError::NotFound)
        }

        async fn get_profile_by_email(&self, email: &Email) -> Result<UserProfile, DirectoryError> {
            let state = self.state.read().await;
            state
                .profiles
                .values()
                .find(|profile| profile.email == email.normalized())
                .cloned()
                .ok_or(DirectoryError::NotFound)
        }

        async fn get_profile_by_username(
            &self,
            username: &Username,
        ) -> Result<UserProfile, DirectoryError> {
            let state = self.state.read().await;
            state
                .profiles
                .values()
                .find(|profile| profile.username == username.normalized())
                .cloned()
                .ok_or(DirectoryError::NotFound)
        }
    }

    struct MockAccount {
        user_id: UserId,
        has_credential: bool,
    }

    #[derive(Clone, Default)]
    struct MockIdentityProvider {
        accounts: Arc<RwLock<HashMap<String, MockAccount>>>,
        fail_create_account: bool,
        fail_set_password: bool,
    }

    #[async_trait::async_trait]
    impl IdentityProvider for MockIdentityProvider {
        async fn create_account(
            &self,
            username: &Username,
            _email: &Email,
            user_id: &UserId,
        ) -> Result<(), IdentityProviderError> {
            if self.fail_create_account {
                return Err(IdentityProviderError::UnexpectedError(
                    "provider down".to_string(),
                ));
            }
            let mut accounts = self.accounts.write().await;
            if accounts.contains_key(username.as_str()) {
                return Err(IdentityProviderError::AccountAlreadyExists);
            }
            accounts.insert(
                username.as_str().to_string(),
                MockAccount {
                    user_id: *user_id,
                    has_credential: false,
                },
            );
            Ok(())
        }

        async fn set_permanent_password(
            &self,
            username: &Username,
            _password: &Password,
        ) -> Result<(), IdentityProviderError> {
            if self.fail_set_password {
                return Err(IdentityProviderError::UnexpectedError(
                    "provider down".to_string(),
                ));
            }
            let mut accounts = self.accounts.write().await;
            let account = accounts
                .get_mut(username.as_str())
                .ok_or(IdentityProviderError::AccountNotFound)?;
            account.has_credential = true;
            Ok(())
        }

        async fn delete_account(&self, username: &Username) -> Result<(), IdentityProviderError> {
            let mut accounts = self.accounts.write().await;
            accounts
                .remove(username.as_str())
                .map(|_| ())
                .ok_or(IdentityProviderError::AccountNotFound)
        }

        async fn verify_credentials(
            &self,
            _email: &Email,
            _password: &Secret<String>,
        ) -> Result<TokenSet, IdentityProviderError> {
            unimplemented!()
        }
    }

    fn email(raw: &str) -> Email {
        Email::try_from(Secret::from(raw.to_string())).unwrap()
    }

    fn password(raw: &str) -> Password {
        Password::try_from(Secret::from(raw.to_string())).unwrap()
    }

    fn username(raw: &str) -> Username {
        Username::try_from(raw.to_string()).unwrap()
    }

    fn display_name(raw: &str) -> DisplayName {
        DisplayName::try_from(raw.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_register_success() {
        let directory = MockDirectory::default();
        let provider = MockIdentityProvider::default();
        let use_case = RegisterUseCase::new(provider.clone(), directory.clone());

        let user_id = use_case
            .execute(
                email("alice@example.com"),
                password("Passw0rd"),
                username("alice"),
                display_name("Alice A."),
            )
            .await
            .unwrap();

        let state = directory.state.read().await;
        let profile = state.profiles.get(&user_id).unwrap();
        assert_eq!(profile.email, "alice@example.com");
        assert_eq!(profile.username, "alice");

        let username_record = state
            .reservations
            .get(&UniqueKey::Username("alice".to_string()))
            .unwrap();
        assert_eq!(username_record.owner, user_id);
        assert_eq!(username_record.status, ReservationStatus::Claimed);
        assert!(
            state
                .reservations
                .contains_key(&UniqueKey::Email("alice@example.com".to_string()))
        );

        let accounts = provider.accounts.read().await;
        let account = accounts.get("alice").unwrap();
        assert_eq!(account.user_id, user_id);
        assert!(account.has_credential);
    }

    #[tokio::test]
    async fn test_register_username_taken_touches_nothing_else() {
        let directory = MockDirectory::default();
        let other_owner = UserId::new();
        let taken_key = UniqueKey::Username("alice".to_string());
        directory
            .put_unique_if_absent(&taken_key, &other_owner)
            .await
            .unwrap();

        let provider = MockIdentityProvider::default();
        let use_case = RegisterUseCase::new(provider.clone(), directory.clone());

        let result = use_case
            .execute(
                email("alice@example.com"),
                password("Passw0rd"),
                username("alice"),
                display_name("Alice A."),
            )
            .await;

        assert!(matches!(result, Err(RegisterError::UsernameTaken)));

        let state = directory.state.read().await;
        assert_eq!(state.reservations.len(), 1);
        assert_eq!(state.reservations.get(&taken_key).unwrap().owner, other_owner);
        assert!(state.profiles.is_empty());
        assert!(provider.accounts.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_register_email_taken_releases_username_reservation() {
        let directory = MockDirectory::default();
        let other_owner = UserId::new();
        let taken_key = UniqueKey::Email("alice@example.com".to_string());
        directory
            .put_unique_if_absent(&taken_key, &other_owner)
            .await
            .unwrap();

        let provider = MockIdentityProvider::default();
        let use_case = RegisterUseCase::new(provider.clone(), directory.clone());

        let result = use_case
            .execute(
                email("alice@example.com"),
                password("Passw0rd"),
                username("alice"),
                display_name("Alice A."),
            )
            .await;

        assert!(matches!(result, Err(RegisterError::EmailTaken)));

        let state = directory.state.read().await;
        assert_eq!(state.reservations.len(), 1);
        assert!(state.reservations.contains_key(&taken_key));
        assert!(provider.accounts.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_register_account_creation_failure_releases_both_reservations() {
        let directory = MockDirectory::default();
        let provider = MockIdentityProvider {
            fail_create_account: true,
            ..Default::default()
        };
        let use_case = RegisterUseCase::new(provider.clone(), directory.clone());

        let result = use_case
            .execute(
                email("alice@example.com"),
                password("Passw0rd"),
                username("alice"),
                display_name("Alice A."),
            )
            .await;

        assert!(matches!(result, Err(RegisterError::IdentityProvider(_))));

        let state = directory.state.read().await;
        assert!(state.reservations.is_empty());
        assert!(state.profiles.is_empty());
    }

    #[tokio::test]
    async fn test_register_credential_failure_deletes_identity_and_reservations() {
        let directory = MockDirectory::default();
        let provider = MockIdentityProvider {
            fail_set_password: true,
            ..Default::default()
        };
        let use_case = RegisterUseCase::new(provider.clone(), directory.clone());

        let result = use_case
            .execute(
                email("alice@example.com"),
                password("Passw0rd"),
                username("alice"),
                display_name("Alice A."),
            )
            .await;

        assert!(matches!(result, Err(RegisterError::IdentityProvider(_))));

        let state = directory.state.read().await;
        assert!(state.reservations.is_empty());
        assert!(provider.accounts.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_register_profile_write_failure_keeps_identity_and_marks_pending() {
        let directory = MockDirectory {
            fail_put_profile: true,
            ..Default::default()
        };
        let provider = MockIdentityProvider::default();
        let use_case = RegisterUseCase::new(provider.clone(), directory.clone());

        let result = use_case
            .execute(
                email("alice@example.com"),
                password("Passw0rd"),
                username("alice"),
                display_name("Alice A."),
            )
            .await;

        let Err(RegisterError::ProfileWriteFailed { user_id }) = result else {
            panic!("expected ProfileWriteFailed, got {result:?}");
        };

        // The identity survives: deleting it could orphan a different
        // artifact, and re-running the profile write is idempotent.
        let accounts = provider.accounts.read().await;
        let account = accounts.get("alice").unwrap();
        assert_eq!(account.user_id, user_id);
        assert!(account.has_credential);

        let state = directory.state.read().await;
        assert!(state.profiles.is_empty());
        assert_eq!(state.reservations.len(), 2);
        for record in state.reservations.values() {
            assert_eq!(record.owner, user_id);
            assert_eq!(record.status, ReservationStatus::PendingProfile);
        }
    }

    #[tokio::test]
    async fn test_concurrent_registrations_same_username_single_winner() {
        let directory = MockDirectory::default();
        let provider = MockIdentityProvider::default();
        let first = RegisterUseCase::new(provider.clone(), directory.clone());
        let second = RegisterUseCase::new(provider.clone(), directory.clone());

        let (left, right) = tokio::join!(
            first.execute(
                email("alice@example.com"),
                password("Passw0rd"),
                username("alice"),
                display_name("Alice A."),
            ),
            second.execute(
                email("alias@example.com"),
                password("Passw0rd"),
                username("alice"),
                display_name("Alice B."),
            ),
        );

        let outcomes = [left, right];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            outcomes
                .iter()
                .any(|r| matches!(r, Err(RegisterError::UsernameTaken)))
        );

        // The loser leaves nothing behind: one username reservation, one
        // email reservation (the winner's), one profile, one account.
        let state = directory.state.read().await;
        assert_eq!(state.reservations.len(), 2);
        assert_eq!(state.profiles.len(), 1);
        assert_eq!(provider.accounts.read().await.len(), 1);

        let winner_id = *state.profiles.keys().next().unwrap();
        for record in state.reservations.values() {
            assert_eq!(record.owner, winner_id);
        }
    }
}
