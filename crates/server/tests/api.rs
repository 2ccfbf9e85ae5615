//! End-to-end API tests over an in-memory database.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use shelter_finder_core::GeoPoint;
use shelter_finder_server::config::ServerConfig;
use shelter_finder_server::db::shelters::ShelterRepository;
use shelter_finder_server::models::{ContactInfo, NewShelter, ShelterLocation};
use shelter_finder_server::state::AppState;
use shelter_finder_server::{db, routes};

const TEST_SECRET: &str = "kJ8vQ2xH5mN9pL4wR7tY3uB6eA1cD0fG";

async fn test_app() -> (Router, AppState) {
    let pool = db::open_in_memory().await.unwrap();
    db::run_migrations(&pool).await.unwrap();

    let state = AppState::new(ServerConfig::for_tests(TEST_SECRET), pool);
    let app = Router::new()
        .nest("/api", routes::api_routes())
        .with_state(state.clone());

    (app, state)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::delete(uri).body(Body::empty()).unwrap()
}

fn get_authed(uri: &str, token: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn json_request_authed(method: &str, uri: &str, token: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn register(app: &Router, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            "POST",
            "/api/users/register",
            &json!({ "name": name, "email": email, "password": password }),
        ),
    )
    .await
}

async fn create_shelter(app: &Router, body: &Value) -> (StatusCode, Value) {
    send(app, json_request("POST", "/api/shelters", body)).await
}

async fn seed_located_shelter(state: &AppState, name: &str, lng: f64, lat: f64) {
    ShelterRepository::new(state.pool())
        .create(&NewShelter {
            name: name.to_string(),
            address: format!("{name} address"),
            contact_info: ContactInfo::default(),
            services: vec![],
            capacity: None,
            operating_hours: None,
            eligibility: None,
            notes: None,
            location: Some(ShelterLocation {
                point: GeoPoint::new(lng, lat).unwrap(),
                formatted_address: None,
            }),
        })
        .await
        .unwrap();
}

// === Registration and login ===

#[tokio::test]
async fn register_then_login_returns_token() {
    let (app, _state) = test_app().await;

    let (status, body) = register(&app, "A", "a@x.com", "secret1").await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["name"], "A");
    assert_eq!(body["user"]["email"], "a@x.com");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            &json!({ "email": "a@x.com", "password": "secret1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn login_failures_are_uniform() {
    let (app, _state) = test_app().await;
    register(&app, "A", "a@x.com", "secret1").await;

    let (wrong_status, wrong_body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            &json!({ "email": "a@x.com", "password": "nope!!!" }),
        ),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            &json!({ "email": "b@x.com", "password": "secret1" }),
        ),
    )
    .await;

    // Wrong password and unknown account are indistinguishable.
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body["message"], unknown_body["message"]);
    assert_eq!(wrong_body["message"], "Invalid credentials");
}

#[tokio::test]
async fn login_requires_both_fields() {
    let (app, _state) = test_app().await;

    let (status, body) = send(
        &app,
        json_request("POST", "/api/auth/login", &json!({ "email": "a@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide email and password");
}

#[tokio::test]
async fn register_rejects_missing_fields_and_short_passwords() {
    let (app, _state) = test_app().await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/users/register",
            &json!({ "email": "a@x.com", "password": "secret1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please enter all fields");

    let (status, body) = register(&app, "A", "a@x.com", "five5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Password must be at least 6 characters");
}

#[tokio::test]
async fn duplicate_registration_is_rejected_case_insensitively() {
    let (app, _state) = test_app().await;

    let (status, _) = register(&app, "A", "a@x.com", "secret1").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = register(&app, "A2", "A@X.COM", "secret2").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "User already exists with this email");
}

#[tokio::test]
async fn current_user_requires_valid_token() {
    let (app, _state) = test_app().await;
    let (_, body) = register(&app, "A", "a@x.com", "secret1").await;
    let token = body["token"].as_str().unwrap();

    let (status, body) = send(&app, get_authed("/api/auth/user", token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "a@x.com");

    let (status, _) = send(&app, get("/api/auth/user")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get_authed("/api/auth/user", "garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_for_deleted_user_is_rejected() {
    let (app, state) = test_app().await;
    let (_, body) = register(&app, "A", "a@x.com", "secret1").await;
    let token = body["token"].as_str().unwrap().to_string();
    let user_id = body["user"]["id"].as_i64().unwrap();

    sqlx::query("DELETE FROM users WHERE id = ?1")
        .bind(user_id)
        .execute(state.pool())
        .await
        .unwrap();

    // The signature is still valid; the missing user is what fails.
    let (status, body) = send(&app, get_authed("/api/auth/user", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized, user not found");
}

// === Shelter CRUD ===

#[tokio::test]
async fn create_and_fetch_shelter() {
    let (app, _state) = test_app().await;

    let (status, created) = create_shelter(
        &app,
        &json!({
            "name": "Harbor House",
            "address": "1 Pier Rd",
            "contactInfo": { "phone": "555-0100" },
            "services": ["Food", "Beds"],
            "capacity": 40,
            "operatingHours": "24/7"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Harbor House");
    assert_eq!(created["address"], "1 Pier Rd");
    // Geocoding is unconfigured in tests; the write still succeeds.
    assert_eq!(created["location"], Value::Null);

    let id = created["id"].as_i64().unwrap();
    let (status, fetched) = send(&app, get(&format!("/api/shelters/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["services"], json!(["Food", "Beds"]));
    assert_eq!(fetched["contactInfo"]["phone"], "555-0100");
}

#[tokio::test]
async fn create_surfaces_field_level_validation_errors() {
    let (app, _state) = test_app().await;

    let (status, body) = create_shelter(&app, &json!({ "capacity": -2 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation error");
    assert_eq!(body["errors"]["name"], "Shelter name is required.");
    assert_eq!(body["errors"]["address"], "Address is required.");
    assert_eq!(body["errors"]["capacity"], "Capacity must be non-negative.");
}

#[tokio::test]
async fn update_replaces_fields() {
    let (app, _state) = test_app().await;

    let (_, created) = create_shelter(
        &app,
        &json!({ "name": "Harbor House", "address": "1 Pier Rd" }),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/shelters/{id}"),
            &json!({ "name": "Harbor House", "address": "1 Pier Rd", "capacity": 25 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["capacity"], 25);
}

#[tokio::test]
async fn missing_and_malformed_ids() {
    let (app, _state) = test_app().await;

    // Read with a malformed id looks like not-found.
    let (status, _) = send(&app, get("/api/shelters/not-an-id")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Missing record is not-found, not a server fault.
    let (status, _) = send(&app, delete("/api/shelters/9999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Delete distinguishes the malformed-id case.
    let (status, body) = send(&app, delete("/api/shelters/not-an-id")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid shelter ID format.");
}

#[tokio::test]
async fn delete_removes_the_record() {
    let (app, _state) = test_app().await;

    let (_, created) =
        create_shelter(&app, &json!({ "name": "Temp", "address": "2 Gone St" })).await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(&app, delete(&format!("/api/shelters/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Shelter removed successfully.");

    let (status, _) = send(&app, get(&format!("/api/shelters/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// === Search and filters ===

#[tokio::test]
async fn text_search_matches_name_address_and_notes() {
    let (app, _state) = test_app().await;

    create_shelter(&app, &json!({ "name": "Harbor House", "address": "1 Pier Rd" })).await;
    create_shelter(
        &app,
        &json!({ "name": "Maple Lodge", "address": "5 Elm St", "notes": "near the harbor" }),
    )
    .await;
    create_shelter(&app, &json!({ "name": "Cedar Hall", "address": "3 Oak Ave" })).await;

    let (status, body) = send(&app, get("/api/shelters?search=HARBOR")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Harbor House", "Maple Lodge"]);
}

#[tokio::test]
async fn service_filter_requires_every_tag() {
    let (app, _state) = test_app().await;

    create_shelter(
        &app,
        &json!({ "name": "Full Service", "address": "1 A St", "services": ["Food", "Beds", "Medical"] }),
    )
    .await;
    create_shelter(
        &app,
        &json!({ "name": "Food Only", "address": "2 B St", "services": ["Food"] }),
    )
    .await;

    let (_, body) = send(&app, get("/api/shelters?services=Food,Medical")).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Full Service"]);
}

#[tokio::test]
async fn proximity_filter_limits_and_orders_results() {
    let (app, state) = test_app().await;

    seed_located_shelter(&state, "Two Km North", 0.0, 0.018).await;
    seed_located_shelter(&state, "One Km North", 0.0, 0.009).await;
    seed_located_shelter(&state, "Far Away", 0.0, 1.0).await;

    let (status, body) = send(&app, get("/api/shelters?near=0,0&radius=5000")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["One Km North", "Two Km North"]);
}

#[tokio::test]
async fn invalid_coordinates_degrade_to_unfiltered_listing() {
    let (app, state) = test_app().await;

    seed_located_shelter(&state, "Somewhere", 10.0, 10.0).await;

    let (status, body) = send(&app, get("/api/shelters?near=banana,split")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

// === Bookmarks ===

#[tokio::test]
async fn bookmarks_require_authentication() {
    let (app, _state) = test_app().await;

    let (status, body) = send(&app, get("/api/users/bookmarks")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized, no token provided");
}

#[tokio::test]
async fn bookmark_add_list_remove_round_trip() {
    let (app, _state) = test_app().await;
    let (_, auth) = register(&app, "A", "a@x.com", "secret1").await;
    let token = auth["token"].as_str().unwrap();

    let (_, created) =
        create_shelter(&app, &json!({ "name": "Harbor House", "address": "1 Pier Rd" })).await;
    let shelter_id = created["id"].as_i64().unwrap();

    // Add twice: idempotent.
    for _ in 0..2 {
        let (status, _) = send(
            &app,
            json_request_authed(
                "POST",
                &format!("/api/users/bookmarks/{shelter_id}"),
                token,
                &json!({}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, get_authed("/api/users/bookmarks", token)).await;
    assert_eq!(status, StatusCode::OK);
    let bookmarks = body.as_array().unwrap();
    assert_eq!(bookmarks.len(), 1);
    assert_eq!(bookmarks[0]["name"], "Harbor House");

    let (status, _) = send(
        &app,
        json_request_authed(
            "DELETE",
            &format!("/api/users/bookmarks/{shelter_id}"),
            token,
            &json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, get_authed("/api/users/bookmarks", token)).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn removing_a_never_bookmarked_shelter_is_a_no_op() {
    let (app, _state) = test_app().await;
    let (_, auth) = register(&app, "A", "a@x.com", "secret1").await;
    let token = auth["token"].as_str().unwrap();

    let (status, body) = send(
        &app,
        json_request_authed("DELETE", "/api/users/bookmarks/12345", token, &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Bookmark removed successfully");
}

#[tokio::test]
async fn bookmarking_a_missing_shelter_is_not_found() {
    let (app, _state) = test_app().await;
    let (_, auth) = register(&app, "A", "a@x.com", "secret1").await;
    let token = auth["token"].as_str().unwrap();

    let (status, _) = send(
        &app,
        json_request_authed("POST", "/api/users/bookmarks/12345", token, &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bookmark_add_publishes_an_event() {
    let (app, state) = test_app().await;
    let (_, auth) = register(&app, "A", "a@x.com", "secret1").await;
    let token = auth["token"].as_str().unwrap();

    let (_, created) =
        create_shelter(&app, &json!({ "name": "Harbor House", "address": "1 Pier Rd" })).await;
    let shelter_id = created["id"].as_i64().unwrap();

    let mut events = state.events().subscribe();

    let (status, _) = send(
        &app,
        json_request_authed(
            "POST",
            &format!("/api/users/bookmarks/{shelter_id}"),
            token,
            &json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let event = events.recv().await.unwrap();
    assert_eq!(
        serde_json::to_value(&event).unwrap(),
        json!({ "event": "shelter_bookmarked", "shelterName": "Harbor House" })
    );
}

// === User directory ===

#[tokio::test]
async fn user_directory_lists_name_and_email_only() {
    let (app, _state) = test_app().await;
    let (_, auth) = register(&app, "Bea", "bea@x.com", "secret1").await;
    register(&app, "Ada", "ada@x.com", "secret1").await;
    let token = auth["token"].as_str().unwrap();

    let (status, body) = send(&app, get_authed("/api/users/all", token)).await;
    assert_eq!(status, StatusCode::OK);

    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["name"], "Ada");
    for user in users {
        let object = user.as_object().unwrap();
        assert_eq!(object.len(), 3);
        for key in ["id", "name", "email"] {
            assert!(object.contains_key(key), "missing {key}");
        }
    }
}

// === Front door ===

#[tokio::test]
async fn unmatched_api_paths_get_a_json_404() {
    let (app, _state) = test_app().await;

    let (status, body) = send(&app, get("/api/definitely/not/here")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "API route not found");
}
