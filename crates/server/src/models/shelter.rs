//! Shelter domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shelter_finder_core::{GeoPoint, ShelterId};

/// Contact details for a shelter. All fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
}

impl ContactInfo {
    /// True when no contact field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.phone.is_none() && self.email.is_none() && self.website.is_none()
    }
}

/// A geocoded shelter location: coordinates plus the address string the
/// geocoder resolved them from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelterLocation {
    #[serde(flatten)]
    pub point: GeoPoint,
    pub formatted_address: Option<String>,
}

/// A cataloged shelter as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shelter {
    pub id: ShelterId,
    pub name: String,
    pub address: String,
    pub contact_info: ContactInfo,
    pub services: Vec<String>,
    pub capacity: Option<i64>,
    pub operating_hours: Option<String>,
    pub eligibility: Option<String>,
    pub notes: Option<String>,
    /// Absent when geocoding failed or is unconfigured.
    pub location: Option<ShelterLocation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for a shelter write (create or full update).
#[derive(Debug, Clone)]
pub struct NewShelter {
    pub name: String,
    pub address: String,
    pub contact_info: ContactInfo,
    pub services: Vec<String>,
    pub capacity: Option<i64>,
    pub operating_hours: Option<String>,
    pub eligibility: Option<String>,
    pub notes: Option<String>,
    pub location: Option<ShelterLocation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shelter_serializes_camel_case() {
        let shelter = Shelter {
            id: ShelterId::new(1),
            name: "Harbor House".to_string(),
            address: "1 Pier Rd".to_string(),
            contact_info: ContactInfo::default(),
            services: vec!["Beds".to_string()],
            capacity: Some(40),
            operating_hours: Some("24/7".to_string()),
            eligibility: None,
            notes: None,
            location: Some(ShelterLocation {
                point: GeoPoint::new(-122.4, 37.8).unwrap(),
                formatted_address: Some("1 Pier Rd, San Francisco, CA".to_string()),
            }),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&shelter).unwrap();
        assert_eq!(json["contactInfo"]["phone"], serde_json::Value::Null);
        assert_eq!(json["operatingHours"], "24/7");
        assert_eq!(json["location"]["longitude"], -122.4);
        assert_eq!(
            json["location"]["formattedAddress"],
            "1 Pier Rd, San Francisco, CA"
        );
    }

    #[test]
    fn contact_info_is_empty() {
        assert!(ContactInfo::default().is_empty());
        let with_phone = ContactInfo {
            phone: Some("555-0100".to_string()),
            ..ContactInfo::default()
        };
        assert!(!with_phone.is_empty());
    }
}
