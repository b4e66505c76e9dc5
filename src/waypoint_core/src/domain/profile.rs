use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    display_name::DisplayName, email::Email, user_id::UserId, username::Username,
};

/// Directory-owned profile record, keyed by the generated user id.
///
/// Carries the normalized email and username it is indexed under, so the
/// secondary indexes can be rebuilt from the records alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub bio: String,
    pub photo_url: String,
    pub credits: i64,
    pub created_at: DateTime<Utc>,
    pub follower_count: i64,
    pub following_count: i64,
    pub trip_count: i64,
    pub verified: bool,
}

impl UserProfile {
    /// A fresh profile: counters and credit balance zeroed, unverified.
    pub fn new(
        user_id: UserId,
        email: &Email,
        username: &Username,
        display_name: &DisplayName,
    ) -> Self {
        Self {
            user_id,
            email: email.normalized(),
            username: username.normalized(),
            display_name: display_name.as_str().to_owned(),
            bio: String::new(),
            photo_url: String::new(),
            credits: 0,
            created_at: Utc::now(),
            follower_count: 0,
            following_count: 0,
            trip_count: 0,
            verified: false,
        }
    }
}
