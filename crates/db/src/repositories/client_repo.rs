//! Repository for the `clients` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::client::{Client, CreateClient, UpdateClient};

const COLUMNS: &str = "id, salon_id, user_id, first_name, last_name, email, phone, \
                       date_of_birth, notes, created_at, updated_at";

/// Provides CRUD operations for clients, always scoped to a salon.
pub struct ClientRepo;

impl ClientRepo {
    pub async fn create(pool: &PgPool, input: &CreateClient) -> Result<Client, sqlx::Error> {
        let query = format!(
            "INSERT INTO clients (salon_id, first_name, last_name, email, phone, date_of_birth, notes)
             VALUES ($1, $2, COALESCE($3, ''), $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(input.salon_id)
            .bind(input.first_name.trim())
            .bind(input.last_name.as_deref().map(str::trim))
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.date_of_birth)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        salon_id: DbId,
        id: DbId,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE salon_id = $1 AND id = $2");
        sqlx::query_as::<_, Client>(&query)
            .bind(salon_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a salon's clients by name. `search` matches name, email or phone.
    pub async fn list_by_salon(
        pool: &PgPool,
        salon_id: DbId,
        search: Option<&str>,
    ) -> Result<Vec<Client>, sqlx::Error> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));
        let query = format!(
            "SELECT {COLUMNS} FROM clients
             WHERE salon_id = $1
               AND ($2::text IS NULL
                    OR (first_name || ' ' || last_name) ILIKE $2
                    OR email ILIKE $2
                    OR phone ILIKE $2)
             ORDER BY last_name ASC, first_name ASC, id ASC"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(salon_id)
            .bind(pattern)
            .fetch_all(pool)
            .await
    }

    /// Update a client. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        salon_id: DbId,
        id: DbId,
        input: &UpdateClient,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!(
            "UPDATE clients SET
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                email = COALESCE($5, email),
                phone = COALESCE($6, phone),
                date_of_birth = COALESCE($7, date_of_birth),
                notes = COALESCE($8, notes)
             WHERE salon_id = $1 AND id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(salon_id)
            .bind(id)
            .bind(input.first_name.as_deref().map(str::trim))
            .bind(input.last_name.as_deref().map(str::trim))
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.date_of_birth)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Link a client record to a portal user.
    pub async fn link_user(
        pool: &PgPool,
        salon_id: DbId,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!(
            "UPDATE clients SET user_id = $3
             WHERE salon_id = $1 AND id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(salon_id)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a client. Assignments, submissions, appointments and photo rows cascade.
    pub async fn delete(pool: &PgPool, salon_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM clients WHERE salon_id = $1 AND id = $2")
            .bind(salon_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
