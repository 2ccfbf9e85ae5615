//! User registration, bookmarks, and directory handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::json;

use crate::db::shelters::ShelterRepository;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::events::ShelterEvent;
use crate::middleware::RequireAuth;
use crate::models::{PublicUser, Shelter};
use crate::routes::auth::{AuthResponse, issue_token, non_empty};
use crate::routes::shelters::parse_shelter_id;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Register a new user and issue a bearer token.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let (Some(name), Some(email), Some(password)) = (
        non_empty(body.name),
        non_empty(body.email),
        body.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::BadRequest("Please enter all fields".to_string()));
    };

    let user = AuthService::new(state.pool())
        .register(&name, &email, &password)
        .await?;
    let token = issue_token(&state, &user)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.public(),
        }),
    ))
}

/// Bookmark a shelter for the authenticated user.
///
/// The shelter must exist; success publishes a best-effort broadcast event
/// carrying the shelter's name.
pub async fn add_bookmark(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(shelter_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let shelter_id = parse_shelter_id(&shelter_id)
        .ok_or_else(|| AppError::NotFound("Shelter not found".to_string()))?;

    let shelter = ShelterRepository::new(state.pool())
        .get(shelter_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shelter not found".to_string()))?;

    UserRepository::new(state.pool())
        .add_bookmark(user.id, shelter_id)
        .await?;

    state.events().publish(ShelterEvent::ShelterBookmarked {
        shelter_name: shelter.name,
    });

    Ok(Json(json!({ "message": "Shelter bookmarked successfully" })))
}

/// Remove a shelter from the authenticated user's bookmarks.
///
/// Unconditional: removing a shelter that was never bookmarked (or whose id
/// doesn't parse) is a silent success.
pub async fn remove_bookmark(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(shelter_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    if let Some(shelter_id) = parse_shelter_id(&shelter_id) {
        UserRepository::new(state.pool())
            .remove_bookmark(user.id, shelter_id)
            .await?;
    }

    Ok(Json(json!({ "message": "Bookmark removed successfully" })))
}

/// List the authenticated user's bookmarked shelters, fully resolved.
pub async fn list_bookmarks(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Shelter>>> {
    let shelters = UserRepository::new(state.pool())
        .bookmarked_shelters(user.id)
        .await?;

    Ok(Json(shelters))
}

/// Name and email of every user, for the members page.
pub async fn all_users(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Result<Json<Vec<PublicUser>>> {
    let users = UserRepository::new(state.pool()).list_public().await?;
    Ok(Json(users))
}
