//! Shelter repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use shelter_finder_core::{GeoPoint, ShelterId};

use super::RepositoryError;
use crate::models::{ContactInfo, NewShelter, Shelter, ShelterLocation};

/// Raw `shelters` table row.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ShelterRow {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub services: String,
    pub capacity: Option<i64>,
    pub operating_hours: Option<String>,
    pub eligibility: Option<String>,
    pub notes: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub formatted_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Convert a table row into the domain type.
///
/// The `services` column holds a JSON array; coordinates are a nullable
/// longitude/latitude pair that must both be present to form a location.
pub(crate) fn row_to_shelter(row: ShelterRow) -> Result<Shelter, RepositoryError> {
    let services: Vec<String> = serde_json::from_str(&row.services).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid services JSON in database: {e}"))
    })?;

    let location = match (row.longitude, row.latitude) {
        (Some(lng), Some(lat)) => {
            let point = GeoPoint::new(lng, lat).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid coordinates in database: {e}"))
            })?;
            Some(ShelterLocation {
                point,
                formatted_address: row.formatted_address,
            })
        }
        _ => None,
    };

    Ok(Shelter {
        id: ShelterId::new(row.id),
        name: row.name,
        address: row.address,
        contact_info: ContactInfo {
            phone: row.phone,
            email: row.email,
            website: row.website,
        },
        services,
        capacity: row.capacity,
        operating_hours: row.operating_hours,
        eligibility: row.eligibility,
        notes: row.notes,
        location,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Repository for shelter database operations.
pub struct ShelterRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ShelterRepository<'a> {
    /// Create a new shelter repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List shelters ordered by name, optionally filtered by a
    /// case-insensitive substring across name, address, and notes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Shelter>, RepositoryError> {
        let rows: Vec<ShelterRow> = match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(q) => {
                let pattern = format!("%{q}%");
                sqlx::query_as(
                    "SELECT * FROM shelters \
                     WHERE name LIKE ?1 OR address LIKE ?1 OR notes LIKE ?1 \
                     ORDER BY name COLLATE NOCASE",
                )
                .bind(pattern)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as("SELECT * FROM shelters ORDER BY name COLLATE NOCASE")
                    .fetch_all(self.pool)
                    .await?
            }
        };

        rows.into_iter().map(row_to_shelter).collect()
    }

    /// Get a shelter by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ShelterId) -> Result<Option<Shelter>, RepositoryError> {
        let row: Option<ShelterRow> = sqlx::query_as("SELECT * FROM shelters WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(row_to_shelter).transpose()
    }

    /// Insert a new shelter and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewShelter) -> Result<Shelter, RepositoryError> {
        let now = Utc::now();
        let services = encode_services(&new.services)?;

        let result = sqlx::query(
            "INSERT INTO shelters \
             (name, address, phone, email, website, services, capacity, \
              operating_hours, eligibility, notes, longitude, latitude, \
              formatted_address, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        )
        .bind(&new.name)
        .bind(&new.address)
        .bind(&new.contact_info.phone)
        .bind(&new.contact_info.email)
        .bind(&new.contact_info.website)
        .bind(services)
        .bind(new.capacity)
        .bind(&new.operating_hours)
        .bind(&new.eligibility)
        .bind(&new.notes)
        .bind(new.location.as_ref().map(|l| l.point.longitude()))
        .bind(new.location.as_ref().map(|l| l.point.latitude()))
        .bind(
            new.location
                .as_ref()
                .and_then(|l| l.formatted_address.as_deref()),
        )
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        let id = ShelterId::new(result.last_insert_rowid());
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Replace a shelter's fields and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the shelter doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ShelterId,
        new: &NewShelter,
    ) -> Result<Shelter, RepositoryError> {
        let now = Utc::now();
        let services = encode_services(&new.services)?;

        let result = sqlx::query(
            "UPDATE shelters SET \
             name = ?1, address = ?2, phone = ?3, email = ?4, website = ?5, \
             services = ?6, capacity = ?7, operating_hours = ?8, \
             eligibility = ?9, notes = ?10, longitude = ?11, latitude = ?12, \
             formatted_address = ?13, updated_at = ?14 \
             WHERE id = ?15",
        )
        .bind(&new.name)
        .bind(&new.address)
        .bind(&new.contact_info.phone)
        .bind(&new.contact_info.email)
        .bind(&new.contact_info.website)
        .bind(services)
        .bind(new.capacity)
        .bind(&new.operating_hours)
        .bind(&new.eligibility)
        .bind(&new.notes)
        .bind(new.location.as_ref().map(|l| l.point.longitude()))
        .bind(new.location.as_ref().map(|l| l.point.latitude()))
        .bind(
            new.location
                .as_ref()
                .and_then(|l| l.formatted_address.as_deref()),
        )
        .bind(now)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a shelter.
    ///
    /// # Returns
    ///
    /// Returns `true` if the shelter was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ShelterId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shelters WHERE id = ?1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn encode_services(services: &[String]) -> Result<String, RepositoryError> {
    serde_json::to_string(services)
        .map_err(|e| RepositoryError::DataCorruption(format!("failed to encode services: {e}")))
}
