pub mod in_memory_directory;
pub mod postgres_directory;
pub mod redis_directory;

pub use in_memory_directory::InMemoryDirectory;
pub use postgres_directory::PostgresDirectory;
pub use redis_directory::RedisDirectory;
