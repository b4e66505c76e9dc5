use config::{Config, ConfigError, Environment, File};
use http::HeaderValue;
use http::header::InvalidHeaderValue;
use secrecy::Secret;
use serde::Deserialize;

/// Service configuration, layered from an optional file plus environment
/// variables (`WAYPOINT_APPLICATION__PORT=8080` style).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub directory: DirectorySettings,
    pub identity: IdentitySettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectorySettings {
    pub postgres_url: Secret<String>,
    /// Only needed when the directory is backed by Redis.
    #[serde(default)]
    pub redis_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentitySettings {
    pub base_url: String,
    pub api_token: Secret<String>,
}

impl Settings {
    /// Load settings from the file named by `WAYPOINT_CONFIG` (if set)
    /// with `WAYPOINT_`-prefixed environment variables layered on top.
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("application.host", "127.0.0.1")?
            .set_default("application.port", 3000_i64)?;

        if let Ok(path) = std::env::var("WAYPOINT_CONFIG") {
            builder = builder.add_source(File::with_name(&path));
        }

        builder
            .add_source(Environment::with_prefix("WAYPOINT").separator("__"))
            .build()?
            .try_deserialize()
    }
}

/// CORS origins the boundary layer is allowed to answer.
#[derive(Debug, Clone)]
pub struct AllowedOrigins(Vec<HeaderValue>);

impl AllowedOrigins {
    pub fn contains(&self, origin: &HeaderValue) -> bool {
        self.0.contains(origin)
    }
}

impl TryFrom<&[String]> for AllowedOrigins {
    type Error = InvalidHeaderValue;

    fn try_from(origins: &[String]) -> Result<Self, Self::Error> {
        origins
            .iter()
            .map(|origin| HeaderValue::from_str(origin))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}
