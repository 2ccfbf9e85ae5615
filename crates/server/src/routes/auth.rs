//! Authentication route handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{PublicUser, User};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Login request body. Fields are optional so missing values get the
/// friendly message rather than a deserialization error.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Token plus public user fields, returned by login and registration.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Authenticate and issue a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let (Some(email), Some(password)) = (non_empty(body.email), non_empty(body.password)) else {
        return Err(AppError::BadRequest(
            "Please provide email and password".to_string(),
        ));
    };

    let user = AuthService::new(state.pool()).login(&email, &password).await?;
    let token = issue_token(&state, &user)?;

    Ok(Json(AuthResponse {
        token,
        user: user.public(),
    }))
}

/// Return the authenticated user's public fields.
pub async fn current_user(RequireAuth(user): RequireAuth) -> Json<PublicUser> {
    Json(user.public())
}

/// Sign a token for a freshly authenticated user.
pub(crate) fn issue_token(state: &AppState, user: &User) -> Result<String> {
    state
        .tokens()
        .issue(user.id)
        .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
}

/// Treat blank strings as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
