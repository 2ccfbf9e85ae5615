//! Shelter resource handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::json;

use shelter_finder_core::ShelterId;

use crate::db::RepositoryError;
use crate::db::shelters::ShelterRepository;
use crate::error::{AppError, Result};
use crate::models::{ContactInfo, NewShelter, Shelter, ShelterLocation};
use crate::search;
use crate::state::AppState;

/// Query parameters for the catalog listing.
///
/// `radius` stays a string so an unparsable value degrades to the default
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ShelterListQuery {
    pub search: Option<String>,
    pub services: Option<String>,
    pub near: Option<String>,
    pub radius: Option<String>,
}

/// Write payload for create and update. Everything is optional at the serde
/// level; required fields are enforced by [`validate_payload`] so missing
/// values produce field messages rather than a deserialization error.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShelterPayload {
    pub name: Option<String>,
    pub address: Option<String>,
    pub contact_info: Option<ContactInfo>,
    pub services: Option<Vec<String>>,
    pub capacity: Option<i64>,
    pub operating_hours: Option<String>,
    pub eligibility: Option<String>,
    pub notes: Option<String>,
}

/// List shelters with optional text, service-tag, and proximity filters.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ShelterListQuery>,
) -> Result<Json<Vec<Shelter>>> {
    let mut shelters = ShelterRepository::new(state.pool())
        .list(query.search.as_deref())
        .await?;

    if let Some(raw) = query.services.as_deref() {
        let required = search::parse_services(raw);
        if !required.is_empty() {
            shelters.retain(|s| search::matches_all_services(&s.services, &required));
        }
    }

    if let Some(near) = query.near.as_deref() {
        match search::parse_near(near) {
            Some(center) => {
                let radius = search::parse_radius(query.radius.as_deref());
                shelters = search::filter_within_radius(shelters, &center, radius);
            }
            None => {
                tracing::warn!(near, "invalid coordinates for proximity query");
            }
        }
    }

    Ok(Json(shelters))
}

/// Get a single shelter by ID.
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Shelter>> {
    let id = parse_shelter_id(&id)
        .ok_or_else(|| AppError::NotFound("Shelter not found (invalid ID format).".to_string()))?;

    let shelter = ShelterRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shelter not found.".to_string()))?;

    Ok(Json(shelter))
}

/// Create a new shelter, geocoding its address on a best-effort basis.
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ShelterPayload>,
) -> Result<(StatusCode, Json<Shelter>)> {
    let mut new = validate_payload(payload)?;
    new.location = geocode_address(&state, &new.address).await;

    let shelter = ShelterRepository::new(state.pool()).create(&new).await?;

    Ok((StatusCode::CREATED, Json(shelter)))
}

/// Update a shelter, re-geocoding only when the address text changed.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ShelterPayload>,
) -> Result<Json<Shelter>> {
    let id = parse_shelter_id(&id)
        .ok_or_else(|| AppError::NotFound("Shelter not found (invalid ID format).".to_string()))?;

    let repo = ShelterRepository::new(state.pool());
    let existing = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Shelter not found.".to_string()))?;

    let mut new = validate_payload(payload)?;
    new.location = if new.address == existing.address {
        // Unchanged address keeps whatever coordinates we already have.
        existing.location
    } else {
        geocode_address(&state, &new.address).await
    };

    let shelter = repo.update(id, &new).await.map_err(|e| match e {
        RepositoryError::NotFound => AppError::NotFound("Shelter not found.".to_string()),
        other => AppError::Database(other),
    })?;

    Ok(Json(shelter))
}

/// Delete a shelter.
pub async fn delete_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let id = parse_shelter_id(&id)
        .ok_or_else(|| AppError::BadRequest("Invalid shelter ID format.".to_string()))?;

    let deleted = ShelterRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("Shelter not found.".to_string()));
    }

    Ok(Json(json!({ "message": "Shelter removed successfully." })))
}

/// Parse a path segment into a [`ShelterId`].
pub(crate) fn parse_shelter_id(raw: &str) -> Option<ShelterId> {
    raw.parse::<i64>().ok().map(ShelterId::new)
}

/// Validate a write payload, collecting field-level messages.
fn validate_payload(payload: ShelterPayload) -> Result<NewShelter> {
    let mut errors: Vec<(String, String)> = Vec::new();

    let name = payload.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        errors.push(("name".to_string(), "Shelter name is required.".to_string()));
    }

    let address = payload.address.as_deref().map(str::trim).unwrap_or_default();
    if address.is_empty() {
        errors.push(("address".to_string(), "Address is required.".to_string()));
    }

    if let Some(capacity) = payload.capacity
        && capacity < 0
    {
        errors.push((
            "capacity".to_string(),
            "Capacity must be non-negative.".to_string(),
        ));
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let contact_info = payload.contact_info.map_or_else(ContactInfo::default, |c| ContactInfo {
        phone: trimmed(c.phone),
        email: trimmed(c.email),
        website: trimmed(c.website),
    });

    Ok(NewShelter {
        name: name.to_string(),
        address: address.to_string(),
        contact_info,
        services: payload
            .services
            .unwrap_or_default()
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        capacity: payload.capacity,
        operating_hours: trimmed(payload.operating_hours),
        eligibility: trimmed(payload.eligibility),
        notes: trimmed(payload.notes),
        location: None,
    })
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve an address through the geocoding collaborator, degrading to "no
/// location" on any failure so the write itself always proceeds.
async fn geocode_address(state: &AppState, address: &str) -> Option<ShelterLocation> {
    let Some(geocoder) = state.geocoder() else {
        tracing::debug!("geocoding not configured; storing shelter without coordinates");
        return None;
    };

    match geocoder.geocode(address).await {
        Ok(Some(location)) => Some(ShelterLocation {
            point: location.point,
            formatted_address: Some(location.formatted_address),
        }),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(error = %e, "geocoding request failed; storing shelter without coordinates");
            None
        }
    }
}
