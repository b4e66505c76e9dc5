pub mod account_service;
pub mod tracing;

pub use account_service::AccountService;

use secrecy::{ExposeSecret, Secret};
use sqlx::{PgPool, postgres::PgPoolOptions};
use waypoint_adapters::PostgresDirectory;

/// Build the PostgreSQL pool and run the directory migrations.
pub async fn configure_postgresql(url: &Secret<String>) -> color_eyre::Result<PgPool> {
    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(url.expose_secret())
        .await?;

    PostgresDirectory::migrate(&pg_pool).await?;

    Ok(pg_pool)
}

/// Open a Redis client for deployments backing the directory with Redis.
pub fn get_redis_client(redis_url: &str) -> redis::RedisResult<redis::Client> {
    redis::Client::open(redis_url)
}
