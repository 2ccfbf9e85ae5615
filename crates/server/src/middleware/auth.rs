//! Authentication middleware and extractors.
//!
//! Provides an extractor that requires a valid bearer token in route
//! handlers and resolves it to a live user record.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::db::users::UserRepository;
use crate::models::User;
use crate::state::AppState;

/// Extractor that requires bearer-token authentication.
///
/// The token's signature and expiry are checked, then the subject is
/// resolved against the users table; tokens for deleted users are rejected
/// even when the signature is still valid.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub User);

/// Error returned when authentication fails.
pub enum AuthRejection {
    /// No `Authorization: Bearer` header present.
    NoToken,
    /// Signature or expiry validation failed.
    TokenFailed,
    /// Token was valid but the user no longer exists.
    UserGone,
    /// The user lookup itself failed.
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NoToken => (
                StatusCode::UNAUTHORIZED,
                "Not authorized, no token provided",
            ),
            Self::TokenFailed => (StatusCode::UNAUTHORIZED, "Not authorized, token failed"),
            Self::UserGone => (StatusCode::UNAUTHORIZED, "Not authorized, user not found"),
            Self::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthRejection::NoToken)?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthRejection::NoToken)?;

        let claims = state
            .tokens()
            .validate(token)
            .map_err(|e| {
                tracing::debug!(error = %e, "token validation failed");
                AuthRejection::TokenFailed
            })?;

        let user_id = claims.user_id().ok_or(AuthRejection::TokenFailed)?;

        let user = UserRepository::new(state.pool())
            .get_by_id(user_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "user lookup during auth failed");
                AuthRejection::Internal
            })?
            .ok_or(AuthRejection::UserGone)?;

        Ok(Self(user))
    }
}
