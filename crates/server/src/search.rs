//! Catalog search filters.
//!
//! Free-text search runs in SQL (`db::shelters::ShelterRepository::list`);
//! the service-tag and proximity filters here run over the fetched rows.
//! Proximity is a haversine post-filter because SQLite has no geospatial
//! index; the catalog is small enough that this is the whole story.

use shelter_finder_core::GeoPoint;

use crate::models::Shelter;

/// Default proximity radius in meters (10 km).
pub const DEFAULT_RADIUS_METERS: f64 = 10_000.0;

/// Parse a `lng,lat` query parameter.
///
/// Returns `None` for anything unparsable or out of range; callers degrade
/// to the unfiltered listing.
#[must_use]
pub fn parse_near(near: &str) -> Option<GeoPoint> {
    let (lng, lat) = near.split_once(',')?;
    let lng: f64 = lng.trim().parse().ok()?;
    let lat: f64 = lat.trim().parse().ok()?;
    GeoPoint::new(lng, lat).ok()
}

/// Parse a radius parameter in meters, falling back to the default for
/// missing, unparsable, or non-positive values.
#[must_use]
pub fn parse_radius(radius: Option<&str>) -> f64 {
    radius
        .and_then(|r| r.trim().parse::<f64>().ok())
        .filter(|r| r.is_finite() && *r > 0.0)
        .unwrap_or(DEFAULT_RADIUS_METERS)
}

/// Parse a comma-separated service-tag list, dropping empty entries.
#[must_use]
pub fn parse_services(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// True when the shelter offers every required service tag.
#[must_use]
pub fn matches_all_services(offered: &[String], required: &[String]) -> bool {
    required.iter().all(|r| offered.iter().any(|o| o == r))
}

/// Keep only shelters with a location inside the radius, nearest first.
///
/// Shelters without coordinates never match a proximity query.
#[must_use]
pub fn filter_within_radius(
    shelters: Vec<Shelter>,
    center: &GeoPoint,
    radius_meters: f64,
) -> Vec<Shelter> {
    let mut with_distance: Vec<(f64, Shelter)> = shelters
        .into_iter()
        .filter_map(|shelter| {
            let point = shelter.location.as_ref().map(|l| l.point)?;
            let distance = center.distance_meters(&point);
            (distance <= radius_meters).then_some((distance, shelter))
        })
        .collect();

    with_distance.sort_by(|a, b| a.0.total_cmp(&b.0));
    with_distance.into_iter().map(|(_, s)| s).collect()
}
