//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shelter_finder_core::{Email, UserId};

/// A registered user (domain type).
///
/// The password hash stays in the repository layer; it never appears on a
/// serializable type.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address, unique case-insensitively.
    pub email: Email,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The fields safe to return from the API.
    #[must_use]
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.as_str().to_string(),
        }
    }
}

/// Public user fields: what registration, login, and the user directory
/// return.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
}
