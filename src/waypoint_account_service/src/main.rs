use std::time::Duration;

use reqwest::Client as HttpClient;
use waypoint_account_service::{AccountService, configure_postgresql, tracing::init_tracing};
use waypoint_adapters::config::{AllowedOrigins, Settings};
use waypoint_adapters::{HttpIdentityProvider, PostgresDirectory};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    color_eyre::install().expect("Failed to install color_eyre");
    init_tracing().expect("Failed to initialize tracing");

    // Load configuration
    let settings = Settings::load()?;

    // Directory on PostgreSQL, migrated on startup
    let pg_pool = configure_postgresql(&settings.directory.postgres_url).await?;
    let directory = PostgresDirectory::new(pg_pool);

    // Identity provider admin API client
    let http_client = HttpClient::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    let identity_provider = HttpIdentityProvider::new(
        settings.identity.base_url.clone(),
        settings.identity.api_token.clone(),
        http_client,
    );

    let allowed_origins = if settings.application.allowed_origins.is_empty() {
        None
    } else {
        Some(AllowedOrigins::try_from(
            settings.application.allowed_origins.as_slice(),
        )?)
    };

    let listener = tokio::net::TcpListener::bind((
        settings.application.host.as_str(),
        settings.application.port,
    ))
    .await?;

    AccountService::new(identity_provider, directory)
        .run_standalone(listener, allowed_origins)
        .await?;

    Ok(())
}
