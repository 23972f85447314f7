//! Repository for the `forms` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::form::{CreateForm, Form, UpdateForm};

const COLUMNS: &str = "id, salon_id, name, description, fields, is_active, created_at, updated_at";

/// Provides CRUD operations for forms, always scoped to a salon.
pub struct FormRepo;

impl FormRepo {
    /// Insert a new form. `fields` defaults to an empty array, `is_active` to `true`.
    pub async fn create(pool: &PgPool, input: &CreateForm) -> Result<Form, sqlx::Error> {
        let query = format!(
            "INSERT INTO forms (salon_id, name, description, fields, is_active)
             VALUES ($1, $2, $3, COALESCE($4, '[]'::jsonb), COALESCE($5, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Form>(&query)
            .bind(input.salon_id)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(&input.fields)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        salon_id: DbId,
        id: DbId,
    ) -> Result<Option<Form>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM forms WHERE salon_id = $1 AND id = $2");
        sqlx::query_as::<_, Form>(&query)
            .bind(salon_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an active form by id without a salon scope.
    ///
    /// Used by the public endpoint, where the form id itself is the key.
    pub async fn find_active_by_id(pool: &PgPool, id: DbId) -> Result<Option<Form>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM forms WHERE id = $1 AND is_active = true");
        sqlx::query_as::<_, Form>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a salon's forms by name, active ones only unless `include_inactive`.
    pub async fn list_by_salon(
        pool: &PgPool,
        salon_id: DbId,
        include_inactive: bool,
    ) -> Result<Vec<Form>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM forms
             WHERE salon_id = $1 AND ($2 OR is_active = true)
             ORDER BY name ASC, id ASC"
        );
        sqlx::query_as::<_, Form>(&query)
            .bind(salon_id)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Update a form. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        salon_id: DbId,
        id: DbId,
        input: &UpdateForm,
    ) -> Result<Option<Form>, sqlx::Error> {
        let query = format!(
            "UPDATE forms SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                fields = COALESCE($5, fields),
                is_active = COALESCE($6, is_active)
             WHERE salon_id = $1 AND id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Form>(&query)
            .bind(salon_id)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(&input.fields)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, salon_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM forms WHERE salon_id = $1 AND id = $2")
            .bind(salon_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether any submission references the form. Such a form is locked.
    pub async fn has_submissions(pool: &PgPool, form_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM submissions WHERE form_id = $1)",
        )
        .bind(form_id)
        .fetch_one(pool)
        .await
    }

    /// The subset of `ids` that are forms of `salon_id`.
    pub async fn find_ids_in_salon(
        pool: &PgPool,
        salon_id: DbId,
        ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM forms WHERE salon_id = $1 AND id = ANY($2) ORDER BY id",
        )
        .bind(salon_id)
        .bind(ids)
        .fetch_all(pool)
        .await
    }
}
