use std::sync::Arc;

use redis::{Commands, Connection};
use tokio::sync::RwLock;
use waypoint_core::{
    DirectoryError, Email, ProfileDirectory, ReservationStatus, UniqueKey, UniquenessRecord,
    UserId, UserProfile, Username,
};

/// Profile directory on Redis.
///
/// Reservations rely on `SET NX` for the atomic create-if-absent;
/// profiles are JSON values with plain index keys alongside.
#[derive(Clone)]
pub struct RedisDirectory {
    conn: Arc<RwLock<Connection>>,
}

impl RedisDirectory {
    pub fn new(conn: Arc<RwLock<Connection>>) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl ProfileDirectory for RedisDirectory {
    #[tracing::instrument(name = "Reserving unique key in Redis", skip_all, fields(key = %key))]
    async fn put_unique_if_absent(
        &self,
        key: &UniqueKey,
        owner: &UserId,
    ) -> Result<(), DirectoryError> {
        let record = UniquenessRecord::claimed(key.clone(), *owner);
        let payload = serde_json::to_string(&record)
            .map_err(|e| DirectoryError::UnexpectedError(e.to_string()))?;

        let mut conn = self.conn.write().await;
        let created: bool = conn
            .set_nx(reservation_key(key), payload)
            .map_err(|e| DirectoryError::UnexpectedError(e.to_string()))?;

        if !created {
            return Err(DirectoryError::AlreadyExists);
        }
        Ok(())
    }

    #[tracing::instrument(name = "Releasing unique key in Redis", skip_all, fields(key = %key))]
    async fn delete_unique(&self, key: &UniqueKey) -> Result<(), DirectoryError> {
        let mut conn = self.conn.write().await;
        let removed: u64 = conn
            .del(reservation_key(key))
            .map_err(|e| DirectoryError::UnexpectedError(e.to_string()))?;

        if removed == 0 {
            return Err(DirectoryError::NotFound);
        }
        Ok(())
    }

    #[tracing::instrument(name = "Flagging reservation as pending", skip_all, fields(key = %key))]
    async fn mark_pending_profile(&self, key: &UniqueKey) -> Result<(), DirectoryError> {
        let storage_key = reservation_key(key);
        let mut conn = self.conn.write().await;

        let payload: Option<String> = conn
            .get(&storage_key)
            .map_err(|e| DirectoryError::UnexpectedError(e.to_string()))?;
        let payload = payload.ok_or(DirectoryError::NotFound)?;

        let mut record: UniquenessRecord = serde_json::from_str(&payload)
            .map_err(|e| DirectoryError::UnexpectedError(e.to_string()))?;
        record.status = ReservationStatus::PendingProfile;

        let payload = serde_json::to_string(&record)
            .map_err(|e| DirectoryError::UnexpectedError(e.to_string()))?;
        let _: () = conn
            .set(&storage_key, payload)
            .map_err(|e| DirectoryError::UnexpectedError(e.to_string()))?;
        Ok(())
    }

    #[tracing::instrument(name = "Writing profile to Redis", skip_all, fields(user_id = %profile.user_id))]
    async fn put_profile(&self, profile: UserProfile) -> Result<(), DirectoryError> {
        let payload = serde_json::to_string(&profile)
            .map_err(|e| DirectoryError::UnexpectedError(e.to_string()))?;
        let user_id = profile.user_id.to_string();

        let mut conn = self.conn.write().await;
        let _: () = conn
            .set(profile_key(&profile.user_id), payload)
            .map_err(|e| DirectoryError::UnexpectedError(e.to_string()))?;
        let _: () = conn
            .set(email_index_key(&profile.email), &user_id)
            .map_err(|e| DirectoryError::UnexpectedError(e.to_string()))?;
        let _: () = conn
            .set(username_index_key(&profile.username), &user_id)
            .map_err(|e| DirectoryError::UnexpectedError(e.to_string()))?;
        Ok(())
    }

    #[tracing::instrument(name = "Reading profile from Redis", skip_all, fields(user_id = %user_id))]
    async fn get_profile(&self, user_id: &UserId) -> Result<UserProfile, DirectoryError> {
        let mut conn = self.conn.write().await;
        read_profile(&mut conn, user_id)
    }

    #[tracing::instrument(name = "Looking up profile by email", skip_all)]
    async fn get_profile_by_email(&self, email: &Email) -> Result<UserProfile, DirectoryError> {
        let mut conn = self.conn.write().await;
        let user_id = resolve_index(&mut conn, email_index_key(&email.normalized()))?;
        read_profile(&mut conn, &user_id)
    }

    #[tracing::instrument(name = "Looking up profile by username", skip_all)]
    async fn get_profile_by_username(
        &self,
        username: &Username,
    ) -> Result<UserProfile, DirectoryError> {
        let mut conn = self.conn.write().await;
        let user_id = resolve_index(&mut conn, username_index_key(&username.normalized()))?;
        read_profile(&mut conn, &user_id)
    }
}

fn resolve_index(conn: &mut Connection, index_key: String) -> Result<UserId, DirectoryError> {
    let user_id: Option<String> = conn
        .get(index_key)
        .map_err(|e| DirectoryError::UnexpectedError(e.to_string()))?;
    let user_id = user_id.ok_or(DirectoryError::NotFound)?;

    uuid::Uuid::parse_str(&user_id)
        .map(UserId::from)
        .map_err(|e| DirectoryError::UnexpectedError(e.to_string()))
}

fn read_profile(conn: &mut Connection, user_id: &UserId) -> Result<UserProfile, DirectoryError> {
    let payload: Option<String> = conn
        .get(profile_key(user_id))
        .map_err(|e| DirectoryError::UnexpectedError(e.to_string()))?;
    let payload = payload.ok_or(DirectoryError::NotFound)?;

    serde_json::from_str(&payload).map_err(|e| DirectoryError::UnexpectedError(e.to_string()))
}

// Key prefixes keep the namespaces apart in a shared instance.
const RESERVATION_KEY_PREFIX: &str = "uniqueness:";
const PROFILE_KEY_PREFIX: &str = "profile:";
const EMAIL_INDEX_KEY_PREFIX: &str = "profile_email:";
const USERNAME_INDEX_KEY_PREFIX: &str = "profile_username:";

fn reservation_key(key: &UniqueKey) -> String {
    format!("{}{}", RESERVATION_KEY_PREFIX, key.storage_key())
}

fn profile_key(user_id: &UserId) -> String {
    format!("{}{}", PROFILE_KEY_PREFIX, user_id)
}

fn email_index_key(normalized_email: &str) -> String {
    format!("{}{}", EMAIL_INDEX_KEY_PREFIX, normalized_email)
}

fn username_index_key(normalized_username: &str) -> String {
    format!("{}{}", USERNAME_INDEX_KEY_PREFIX, normalized_username)
}
