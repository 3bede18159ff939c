use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::core::recommender::{ProfileStore, StoreError};
use crate::models::{Preference, Profile};

/// PostgreSQL-backed profile repository
///
/// Read-only collaborator for this service: profiles, preferences,
/// interests, and image references are owned and written elsewhere. The
/// schema is normalized, so every read joins out from `users`/`profiles`.
pub struct PostgresProfileStore {
    pool: PgPool,
}

impl PostgresProfileStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }

    fn profile_from_row(row: &sqlx::postgres::PgRow) -> Profile {
        Profile {
            id: row.get("id"),
            name: row.get("name"),
            age: row.get("age"),
            gender: row.get("gender"),
            city: row.get("city"),
            country: row.get("country"),
        }
    }
}

#[async_trait]
impl ProfileStore for PostgresProfileStore {
    async fn get_profile(&self, id: Uuid) -> Result<Profile, StoreError> {
        let query = r#"
            SELECT u.id, u.name, p.age, g.name AS gender, a.city, a.country
            FROM users u
            JOIN profiles p ON p.user_id = u.id
            JOIN user_genders ug ON ug.profile_id = p.id
            JOIN genders g ON g.id = ug.gender_id
            JOIN addresses a ON a.profile_id = p.id
            WHERE u.id = $1
        "#;

        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("profile not found for user {}", id)))?;

        Ok(Self::profile_from_row(&row))
    }

    async fn get_preference(&self, id: Uuid) -> Result<Preference, StoreError> {
        let query = r#"
            SELECT pr.min_age, pr.max_age, pr.gender_id, pr.desired_city
            FROM preferences pr
            JOIN profiles p ON pr.profile_id = p.id
            WHERE p.user_id = $1
        "#;

        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                StoreError::NotFound(format!("preference not found for user {}", id))
            })?;

        Ok(Preference {
            min_age: row.get("min_age"),
            max_age: row.get("max_age"),
            gender_id: row.get("gender_id"),
            desired_city: row.get("desired_city"),
        })
    }

    async fn get_interests(&self, id: Uuid) -> Result<Vec<String>, StoreError> {
        let query = r#"
            SELECT i.interest
            FROM interests i
            JOIN user_interests ui ON ui.interest_id = i.id
            JOIN profiles p ON ui.profile_id = p.id
            WHERE p.user_id = $1
        "#;

        let rows = sqlx::query(query).bind(id).fetch_all(&self.pool).await?;

        Ok(rows.iter().map(|row| row.get("interest")).collect())
    }

    async fn get_images(&self, id: Uuid) -> Result<Vec<String>, StoreError> {
        let query = r#"
            SELECT img.file_name
            FROM images img
            JOIN profiles p ON img.profile_id = p.id
            WHERE p.user_id = $1
        "#;

        let rows = sqlx::query(query).bind(id).fetch_all(&self.pool).await?;

        Ok(rows.iter().map(|row| row.get("file_name")).collect())
    }

    async fn fetch_candidates(
        &self,
        min_age: i32,
        max_age: i32,
        gender_id: i32,
        exclude_id: Uuid,
    ) -> Result<Vec<Profile>, StoreError> {
        // Age bounds are strict on both sides. City mutuality is evaluated
        // later against each candidate's stated preference, not here.
        let query = r#"
            SELECT u.id, u.name, p.age, g.name AS gender, a.city, a.country
            FROM users u
            JOIN profiles p ON p.user_id = u.id
            JOIN user_genders ug ON ug.profile_id = p.id
            JOIN genders g ON g.id = ug.gender_id
            JOIN addresses a ON a.profile_id = p.id
            WHERE p.age > $1 AND p.age < $2 AND g.id = $3 AND u.id != $4
        "#;

        let rows = sqlx::query(query)
            .bind(min_age)
            .bind(max_age)
            .bind(gender_id)
            .bind(exclude_id)
            .fetch_all(&self.pool)
            .await?;

        let profiles: Vec<Profile> = rows.iter().map(Self::profile_from_row).collect();

        tracing::debug!(
            "fetched {} candidates (age {}..{}, gender {})",
            profiles.len(),
            min_age,
            max_age,
            gender_id
        );

        Ok(profiles)
    }
}
