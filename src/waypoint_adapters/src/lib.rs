pub mod config;
pub mod identity;
pub mod persistence;

pub use config::{AllowedOrigins, Settings};
pub use identity::{HttpIdentityProvider, InMemoryIdentityProvider};
pub use persistence::{InMemoryDirectory, PostgresDirectory, RedisDirectory};
