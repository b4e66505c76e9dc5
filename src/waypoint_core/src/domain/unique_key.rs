use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{email::Email, user_id::UserId, username::Username};

/// A normalized value the directory enforces uniqueness for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniqueKey {
    Email(String),
    Username(String),
}

impl UniqueKey {
    pub fn email(email: &Email) -> Self {
        Self::Email(email.normalized())
    }

    pub fn username(username: &Username) -> Self {
        Self::Username(username.normalized())
    }

    /// Prefixed storage key; one namespace per kind.
    pub fn storage_key(&self) -> String {
        match self {
            Self::Email(value) => format!("email#{value}"),
            Self::Username(value) => format!("username#{value}"),
        }
    }
}

impl fmt::Display for UniqueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_key())
    }
}

/// Reservation state of a claimed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Claimed,
    /// The owning identity exists but its profile write has not landed
    /// yet; a reconciler may retry the write with the same user id.
    PendingProfile,
}

/// One record per claimed normalized value.
///
/// Existence alone means the value is taken; the status only matters for
/// reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniquenessRecord {
    pub key: UniqueKey,
    pub owner: UserId,
    pub status: ReservationStatus,
}

impl UniquenessRecord {
    pub fn claimed(key: UniqueKey, owner: UserId) -> Self {
        Self {
            key,
            owner,
            status: ReservationStatus::Claimed,
        }
    }
}
