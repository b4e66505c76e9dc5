pub mod domain;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    display_name::{DisplayName, DisplayNameError},
    email::{Email, EmailError},
    password::{Password, PasswordError},
    profile::UserProfile,
    token_set::TokenSet,
    unique_key::{ReservationStatus, UniqueKey, UniquenessRecord},
    user_id::UserId,
    username::{Username, UsernameError},
};

pub use ports::{
    directory::{DirectoryError, ProfileDirectory},
    identity_provider::{IdentityProvider, IdentityProviderError},
};
