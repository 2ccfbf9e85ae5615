//! HTTP route handlers.
//!
//! # Route Structure (all under `/api`)
//!
//! ```text
//! # Shelters
//! GET    /shelters                       - Catalog listing with filters
//! POST   /shelters                       - Create shelter
//! GET    /shelters/{id}                  - Shelter detail
//! PUT    /shelters/{id}                  - Update shelter
//! DELETE /shelters/{id}                  - Delete shelter
//!
//! # Auth
//! POST   /auth/login                     - Login, returns bearer token
//! GET    /auth/user                      - Current user (requires token)
//!
//! # Users
//! POST   /users/register                 - Register, returns bearer token
//! GET    /users/bookmarks                - Resolved bookmarked shelters (token)
//! POST   /users/bookmarks/{shelterId}    - Bookmark a shelter (token)
//! DELETE /users/bookmarks/{shelterId}    - Remove a bookmark (token)
//! GET    /users/all                      - User directory (token)
//!
//! # Events
//! GET    /events                         - WebSocket event stream
//! ```

pub mod auth;
pub mod events;
pub mod shelters;
pub mod users;

use axum::{
    Json, Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use crate::state::AppState;

/// Create the `/api` router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(shelter_routes())
        .merge(auth_routes())
        .merge(user_routes())
        .route("/events", get(events::events_ws))
        .fallback(api_not_found)
}

/// Create the shelter resource router.
fn shelter_routes() -> Router<AppState> {
    Router::new()
        .route("/shelters", get(shelters::list).post(shelters::create))
        .route(
            "/shelters/{id}",
            get(shelters::get_one)
                .put(shelters::update)
                .delete(shelters::delete_one),
        )
}

/// Create the auth router.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/user", get(auth::current_user))
}

/// Create the user/bookmark router.
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(users::register))
        .route("/users/bookmarks", get(users::list_bookmarks))
        .route(
            "/users/bookmarks/{shelter_id}",
            post(users::add_bookmark).delete(users::remove_bookmark),
        )
        .route("/users/all", get(users::all_users))
}

/// JSON 404 for unmatched API paths; everything else falls through to the
/// static site.
async fn api_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "API route not found" })),
    )
}
