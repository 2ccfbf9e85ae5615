//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::ExposeSecret;
use sqlx::SqlitePool;

use crate::config::ServerConfig;
use crate::events::EventBroadcaster;
use crate::services::geocode::GeocodeClient;
use crate::services::token::{TOKEN_TTL_SECS, TokenManager};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database pool and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: SqlitePool,
    tokens: TokenManager,
    geocoder: Option<GeocodeClient>,
    events: EventBroadcaster,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The geocoding client exists only when the configuration carries a
    /// usable API key.
    #[must_use]
    pub fn new(config: ServerConfig, pool: SqlitePool) -> Self {
        let tokens = TokenManager::new(
            config.jwt_secret.expose_secret().as_bytes(),
            TOKEN_TTL_SECS,
        );
        let geocoder = config.geocoding.as_ref().map(GeocodeClient::new);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
                geocoder,
                events: EventBroadcaster::new(),
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get a reference to the token manager.
    #[must_use]
    pub fn tokens(&self) -> &TokenManager {
        &self.inner.tokens
    }

    /// Get the geocoding client, if configured.
    #[must_use]
    pub fn geocoder(&self) -> Option<&GeocodeClient> {
        self.inner.geocoder.as_ref()
    }

    /// Get a reference to the event broadcaster.
    #[must_use]
    pub fn events(&self) -> &EventBroadcaster {
        &self.inner.events
    }
}
