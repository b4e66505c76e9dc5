use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    email::Email, profile::UserProfile, unique_key::UniqueKey, user_id::UserId, username::Username,
};

// ProfileDirectory port trait and errors
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Key is already claimed")]
    AlreadyExists,
    #[error("Not found")]
    NotFound,
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl PartialEq for DirectoryError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::AlreadyExists, Self::AlreadyExists) => true,
            (Self::NotFound, Self::NotFound) => true,
            (Self::UnexpectedError(_), Self::UnexpectedError(_)) => true,
            _ => false,
        }
    }
}

/// Capability interface over the profile directory.
///
/// `put_unique_if_absent` must be a single-key atomic conditional write:
/// it either creates the record or observes an existing one, with no
/// intermediate state. A substrate that only offers query-then-write
/// cannot back this port without degrading uniqueness to best-effort.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// Claim a normalized value for `owner`. `AlreadyExists` means the
    /// value is taken, regardless of who owns it.
    async fn put_unique_if_absent(
        &self,
        key: &UniqueKey,
        owner: &UserId,
    ) -> Result<(), DirectoryError>;

    /// Release a reservation during compensation.
    async fn delete_unique(&self, key: &UniqueKey) -> Result<(), DirectoryError>;

    /// Flag a reservation whose profile write failed, so a reconciler can
    /// find it and retry the write.
    async fn mark_pending_profile(&self, key: &UniqueKey) -> Result<(), DirectoryError>;

    /// Write a profile record. Re-writing the same user id must be
    /// idempotent; it is the designed retry path after a failed write.
    async fn put_profile(&self, profile: UserProfile) -> Result<(), DirectoryError>;

    async fn get_profile(&self, user_id: &UserId) -> Result<UserProfile, DirectoryError>;

    async fn get_profile_by_email(&self, email: &Email) -> Result<UserProfile, DirectoryError>;

    async fn get_profile_by_username(
        &self,
        username: &Username,
    ) -> Result<UserProfile, DirectoryError>;
}
