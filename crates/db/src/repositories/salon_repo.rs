//! Repository for the `salons` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::salon::{CreateSalon, Salon, UpdateSalon};

const COLUMNS: &str = "id, owner_id, name, phone, email, address, created_at, updated_at";

/// Provides CRUD operations for salons.
pub struct SalonRepo;

impl SalonRepo {
    pub async fn create(pool: &PgPool, input: &CreateSalon) -> Result<Salon, sqlx::Error> {
        let query = format!(
            "INSERT INTO salons (owner_id, name, phone, email, address)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Salon>(&query)
            .bind(input.owner_id)
            .bind(input.name.trim())
            .bind(&input.phone)
            .bind(&input.email)
            .bind(&input.address)
            .fetch_one(pool)
            .await
    }

    /// Find a salon by id regardless of owner. Ownership is checked by the caller.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Salon>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM salons WHERE id = $1");
        sqlx::query_as::<_, Salon>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List an owner's salons, oldest first.
    pub async fn list_by_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<Salon>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM salons WHERE owner_id = $1 ORDER BY created_at ASC, id ASC");
        sqlx::query_as::<_, Salon>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Update a salon. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSalon,
    ) -> Result<Option<Salon>, sqlx::Error> {
        let query = format!(
            "UPDATE salons SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                email = COALESCE($4, email),
                address = COALESCE($5, address)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Salon>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.phone)
            .bind(&input.email)
            .bind(&input.address)
            .fetch_optional(pool)
            .await
    }

    /// Delete a salon and, through cascades, everything it owns.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM salons WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
