use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use waypoint_core::{
    DirectoryError, Email, ProfileDirectory, ReservationStatus, UniqueKey, UniquenessRecord,
    UserId, UserProfile, Username,
};

/// Process-local profile directory.
///
/// The reservation map's entry API decides occupied-vs-vacant under the
/// shard lock, which is exactly the atomic create-if-absent the
/// uniqueness index requires.
#[derive(Clone, Default)]
pub struct InMemoryDirectory {
    reservations: Arc<DashMap<UniqueKey, UniquenessRecord>>,
    profiles: Arc<DashMap<UserId, UserProfile>>,
    email_index: Arc<DashMap<String, UserId>>,
    username_index: Arc<DashMap<String, UserId>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ProfileDirectory for InMemoryDirectory {
    async fn put_unique_if_absent(
        &self,
        key: &UniqueKey,
        owner: &UserId,
    ) -> Result<(), DirectoryError> {
        match self.reservations.entry(key.clone()) {
            Entry::Occupied(_) => Err(DirectoryError::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(UniquenessRecord::claimed(key.clone(), *owner));
                Ok(())
            }
        }
    }

    async fn delete_unique(&self, key: &UniqueKey) -> Result<(), DirectoryError> {
        self.reservations
            .remove(key)
            .map(|_| ())
            .ok_or(DirectoryError::NotFound)
    }

    async fn mark_pending_profile(&self, key: &UniqueKey) -> Result<(), DirectoryError> {
        let mut record = self
            .reservations
            .get_mut(key)
            .ok_or(DirectoryError::NotFound)?;
        record.status = ReservationStatus::PendingProfile;
        Ok(())
    }

    async fn put_profile(&self, profile: UserProfile) -> Result<(), DirectoryError> {
        self.email_index
            .insert(profile.email.clone(), profile.user_id);
        self.username_index
            .insert(profile.username.clone(), profile.user_id);
        self.profiles.insert(profile.user_id, profile);
        Ok(())
    }

    async fn get_profile(&self, user_id: &UserId) -> Result<UserProfile, DirectoryError> {
        self.profiles
            .get(user_id)
            .map(|entry| entry.value().clone())
            .ok_or(DirectoryError::NotFound)
    }

    async fn get_profile_by_email(&self, email: &Email) -> Result<UserProfile, DirectoryError> {
        let user_id = self
            .email_index
            .get(&email.normalized())
            .map(|entry| *entry.value())
            .ok_or(DirectoryError::NotFound)?;
        self.get_profile(&user_id).await
    }

    async fn get_profile_by_username(
        &self,
        username: &Username,
    ) -> Result<UserProfile, DirectoryError> {
        let user_id = self
            .username_index
            .get(&username.normalized())
            .map(|entry| *entry.value())
            .ok_or(DirectoryError::NotFound)?;
        self.get_profile(&user_id).await
    }
}
