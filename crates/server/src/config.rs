//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHELTER_JWT_SECRET` - Token signing secret (min 32 chars, no placeholders)
//!
//! ## Optional
//! - `SHELTER_DATABASE_URL` - SQLite connection string (default: sqlite:data/shelters.db)
//! - `SHELTER_HOST` - Bind address (default: 127.0.0.1)
//! - `SHELTER_PORT` - Listen port (default: 5001)
//! - `GEOCODING_API_KEY` - Geocoding service key; geocoding is skipped when absent
//! - `GEOCODING_BASE_URL` - Geocoding endpoint override (tests, self-hosting)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Default geocoding endpoint (Google-style JSON geocoding API).
const DEFAULT_GEOCODING_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "temp_key",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// SQLite database connection URL
    pub database_url: String,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Token signing secret
    pub jwt_secret: SecretString,
    /// Geocoding collaborator; `None` disables geocoding
    pub geocoding: Option<GeocodingConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Geocoding service configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct GeocodingConfig {
    /// API key for the geocoding service
    pub api_key: SecretString,
    /// Endpoint to send geocode requests to
    pub base_url: String,
}

impl std::fmt::Debug for GeocodingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodingConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the JWT secret fails validation (length, placeholder detection).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url =
            get_env_or_default("SHELTER_DATABASE_URL", "sqlite:data/shelters.db");
        let host = get_env_or_default("SHELTER_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHELTER_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SHELTER_PORT", "5001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHELTER_PORT".to_string(), e.to_string()))?;

        let jwt_secret = get_required_env("SHELTER_JWT_SECRET")?;
        validate_secret(&jwt_secret, "SHELTER_JWT_SECRET")?;

        let geocoding = GeocodingConfig::from_env();
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret: SecretString::from(jwt_secret),
            geocoding,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Build a minimal configuration for tests: in-memory database, no
    /// geocoding, no Sentry.
    #[must_use]
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            jwt_secret: SecretString::from(jwt_secret.to_string()),
            geocoding: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl GeocodingConfig {
    /// Load geocoding configuration, treating an absent or placeholder key
    /// as "geocoding disabled" rather than an error. The original deployment
    /// shipped with literal `YOUR_..._KEY` values; writes must still succeed.
    fn from_env() -> Option<Self> {
        let api_key = get_optional_env("GEOCODING_API_KEY")?;
        if looks_like_placeholder(&api_key) {
            return None;
        }

        let base_url = get_env_or_default("GEOCODING_BASE_URL", DEFAULT_GEOCODING_BASE_URL);

        Some(Self {
            api_key: SecretString::from(api_key),
            base_url,
        })
    }
}

/// Get a required environment variable.
fn get_required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Get an optional environment variable, treating empty values as absent.
fn get_optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Check a value against the placeholder blocklist.
fn looks_like_placeholder(value: &str) -> bool {
    let lower = value.to_lowercase();
    PLACEHOLDER_PATTERNS.iter().any(|p| lower.contains(p))
}

/// Validate a secret: minimum length and no placeholder patterns.
fn validate_secret(value: &str, name: &str) -> Result<(), ConfigError> {
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            name.to_string(),
            format!("must be at least {MIN_JWT_SECRET_LENGTH} characters"),
        ));
    }

    if looks_like_placeholder(value) {
        return Err(ConfigError::InsecureSecret(
            name.to_string(),
            "looks like a placeholder value".to_string(),
        ));
    }

    Ok(())
}
