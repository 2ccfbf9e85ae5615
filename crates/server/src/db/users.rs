//! User and bookmark repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use shelter_finder_core::{Email, ShelterId, UserId};

use super::RepositoryError;
use super::shelters::{ShelterRow, row_to_shelter};
use crate::models::{PublicUser, Shelter, User};

/// Raw `users` table row.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Name/email projection for the user directory.
#[derive(Debug, sqlx::FromRow)]
struct DirectoryRow {
    id: i64,
    name: String,
    email: String,
}

fn row_to_user(row: UserRow) -> Result<User, RepositoryError> {
    let email = Email::parse(&row.email).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
    })?;

    Ok(User {
        id: UserId::new(row.id),
        name: row.name,
        email,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user with a hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO users (name, email, password_hash, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(name)
        .bind(email.as_str())
        .bind(password_hash)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        let id = UserId::new(result.last_insert_rowid());
        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(row_to_user).transpose()
    }

    /// Get a user and their password hash by email.
    ///
    /// Returns `None` if no user has this email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = ?1")
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let hash = row.password_hash.clone();
        Ok(Some((row_to_user(row)?, hash)))
    }

    /// List every user's public fields, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_public(&self) -> Result<Vec<PublicUser>, RepositoryError> {
        let rows: Vec<DirectoryRow> =
            sqlx::query_as("SELECT id, name, email FROM users ORDER BY name COLLATE NOCASE")
                .fetch_all(self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|r| PublicUser {
                id: UserId::new(r.id),
                name: r.name,
                email: r.email,
            })
            .collect())
    }

    /// Add a shelter to a user's bookmark set. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_bookmark(
        &self,
        user_id: UserId,
        shelter_id: ShelterId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT OR IGNORE INTO bookmarks (user_id, shelter_id, created_at) \
             VALUES (?1, ?2, ?3)",
        )
        .bind(user_id)
        .bind(shelter_id)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Remove a shelter from a user's bookmark set. Removing an absent
    /// element is a silent success.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_bookmark(
        &self,
        user_id: UserId,
        shelter_id: ShelterId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM bookmarks WHERE user_id = ?1 AND shelter_id = ?2")
            .bind(user_id)
            .bind(shelter_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Resolve a user's bookmarked shelters to full records, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn bookmarked_shelters(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Shelter>, RepositoryError> {
        let rows: Vec<ShelterRow> = sqlx::query_as(
            "SELECT s.* FROM shelters s \
             JOIN bookmarks b ON b.shelter_id = s.id \
             WHERE b.user_id = ?1 \
             ORDER BY s.name COLLATE NOCASE",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(row_to_shelter).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::shelters::ShelterRepository;
    use crate::db::{open_in_memory, run_migrations};
    use crate::models::{ContactInfo, NewShelter};

    async fn test_pool() -> SqlitePool {
        let pool = open_in_memory().await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    async fn seed_shelter(pool: &SqlitePool, name: &str) -> Shelter {
        ShelterRepository::new(pool)
            .create(&NewShelter {
                name: name.to_string(),
                address: "1 Main St".to_string(),
                contact_info: ContactInfo::default(),
                services: vec![],
                capacity: None,
                operating_hours: None,
                eligibility: None,
                notes: None,
                location: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_and_get_user() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        let user = repo
            .create("Alice", &email("alice@example.com"), "hash123")
            .await
            .unwrap();

        let fetched = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Alice");
        assert_eq!(fetched.email.as_str(), "alice@example.com");
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        repo.create("Alice", &email("alice@example.com"), "hash1")
            .await
            .unwrap();
        // Email normalization means a different-cased duplicate hits the
        // same unique index.
        let err = repo
            .create("Also Alice", &email("ALICE@EXAMPLE.COM"), "hash2")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn get_with_password_returns_hash() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        repo.create("Alice", &email("alice@example.com"), "hash123")
            .await
            .unwrap();

        let (user, hash) = repo
            .get_with_password(&email("alice@example.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.name, "Alice");
        assert_eq!(hash, "hash123");

        assert!(repo
            .get_with_password(&email("bob@example.com"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn list_public_omits_everything_but_name_and_email() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        repo.create("Bea", &email("bea@example.com"), "h").await.unwrap();
        repo.create("Ada", &email("ada@example.com"), "h").await.unwrap();

        let users = repo.list_public().await.unwrap();
        let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["Ada", "Bea"]);
    }

    #[tokio::test]
    async fn bookmark_add_is_idempotent() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);
        let shelter = seed_shelter(&pool, "Harbor House").await;

        let user = repo
            .create("Alice", &email("alice@example.com"), "h")
            .await
            .unwrap();

        repo.add_bookmark(user.id, shelter.id).await.unwrap();
        repo.add_bookmark(user.id, shelter.id).await.unwrap();

        let bookmarks = repo.bookmarked_shelters(user.id).await.unwrap();
        assert_eq!(bookmarks.len(), 1);
        assert_eq!(bookmarks.first().unwrap().name, "Harbor House");
    }

    #[tokio::test]
    async fn bookmark_remove_absent_is_a_no_op() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);
        let shelter = seed_shelter(&pool, "Harbor House").await;

        let user = repo
            .create("Alice", &email("alice@example.com"), "h")
            .await
            .unwrap();

        // Never bookmarked; removal must still succeed.
        repo.remove_bookmark(user.id, shelter.id).await.unwrap();
        assert!(repo.bookmarked_shelters(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bookmarks_resolve_to_full_shelters() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);
        let a = seed_shelter(&pool, "Maple Lodge").await;
        let b = seed_shelter(&pool, "Cedar Hall").await;

        let user = repo
            .create("Alice", &email("alice@example.com"), "h")
            .await
            .unwrap();
        repo.add_bookmark(user.id, a.id).await.unwrap();
        repo.add_bookmark(user.id, b.id).await.unwrap();

        let names: Vec<String> = repo
            .bookmarked_shelters(user.id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["Cedar Hall", "Maple Lodge"]);
    }
}
