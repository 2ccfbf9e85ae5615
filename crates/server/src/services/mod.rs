//! Domain services: authentication, token issuance, geocoding.

pub mod auth;
pub mod geocode;
pub mod token;

pub use auth::{AuthError, AuthService};
pub use geocode::{GeocodeClient, GeocodeError, GeocodedLocation};
pub use token::TokenManager;
