//! # Waypoint - Account Service Library
//!
//! This is a facade crate that re-exports the public APIs of the Waypoint
//! account core: registration and authentication of a user identity
//! across an external identity provider and a profile directory.
//!
//! ## Usage
//!
//! Add to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! waypoint = { path = "../waypoint" }
//! ```
//!
//! ## Structure
//!
//! - **Core domain types**: `Email`, `Password`, `Username`, `UserProfile`, etc.
//! - **Capability traits (ports)**: `IdentityProvider`, `ProfileDirectory`
//! - **Use cases**: `RegisterUseCase`, `AuthenticateUseCase`
//! - **Adapters**: `PostgresDirectory`, `RedisDirectory`, `InMemoryDirectory`,
//!   `HttpIdentityProvider`, `InMemoryIdentityProvider`
//! - **Service**: `AccountService` - the HTTP entry point

// ============================================================================
// Core Domain Types
// ============================================================================

/// Core domain types and value objects
pub mod core {
    pub use waypoint_core::*;
}

// Re-export most commonly used core types at the root level
pub use waypoint_core::{
    DisplayName, DisplayNameError, Email, EmailError, Password, PasswordError, ReservationStatus,
    TokenSet, UniqueKey, UniquenessRecord, UserId, UserProfile, Username, UsernameError,
};

// ============================================================================
// Capability Traits (Ports)
// ============================================================================

/// Port trait definitions
pub mod ports {
    pub use waypoint_core::{
        DirectoryError, IdentityProvider, IdentityProviderError, ProfileDirectory,
    };
}

// Re-export port traits at root level
pub use waypoint_core::{DirectoryError, IdentityProvider, IdentityProviderError, ProfileDirectory};

// ============================================================================
// Use Cases (Application Layer)
// ============================================================================

/// Application use cases
pub mod use_cases {
    pub use waypoint_application::*;
}

// Re-export use cases at root level
pub use waypoint_application::{
    AuthenticateError, AuthenticateUseCase, AuthenticatedSession, RegisterError, RegisterUseCase,
};

// ============================================================================
// Adapters (Infrastructure)
// ============================================================================

/// Infrastructure adapters
pub mod adapters {
    /// Identity provider implementations
    pub mod identity {
        pub use waypoint_adapters::identity::*;
    }

    /// Persistence implementations
    pub mod persistence {
        pub use waypoint_adapters::persistence::*;
    }

    /// Configuration
    pub mod config {
        pub use waypoint_adapters::config::*;
    }
}

// Re-export commonly used adapters at root level
pub use waypoint_adapters::{
    HttpIdentityProvider, InMemoryDirectory, InMemoryIdentityProvider, PostgresDirectory,
    RedisDirectory,
};

// ============================================================================
// Account Service (Main Entry Point)
// ============================================================================

/// Main account service
pub use waypoint_account_service::{AccountService, configure_postgresql, get_redis_client};

// ============================================================================
// Re-export common external dependencies
// ============================================================================

/// Re-export async-trait for implementing port traits
pub use async_trait::async_trait;

/// Re-export secrecy for working with secrets
pub use secrecy::{ExposeSecret, Secret};

pub use http;
