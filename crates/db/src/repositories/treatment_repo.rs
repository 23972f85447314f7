//! Repository for the `treatments` and `treatment_forms` tables.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::form::Form;
use crate::models::treatment::{CreateTreatment, Treatment, UpdateTreatment};

const COLUMNS: &str = "id, salon_id, name, description, duration_minutes, price_cents, \
                       is_active, created_at, updated_at";

/// Default duration applied when a treatment is created without one.
pub const DEFAULT_DURATION_MINUTES: i32 = 60;

/// Provides CRUD operations for treatments and their required form sets.
pub struct TreatmentRepo;

impl TreatmentRepo {
    pub async fn create(pool: &PgPool, input: &CreateTreatment) -> Result<Treatment, sqlx::Error> {
        let query = format!(
            "INSERT INTO treatments (salon_id, name, description, duration_minutes, price_cents, is_active)
             VALUES ($1, $2, $3, COALESCE($4, $7), $5, COALESCE($6, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Treatment>(&query)
            .bind(input.salon_id)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(input.duration_minutes)
            .bind(input.price_cents)
            .bind(input.is_active)
            .bind(DEFAULT_DURATION_MINUTES)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        salon_id: DbId,
        id: DbId,
    ) -> Result<Option<Treatment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM treatments WHERE salon_id = $1 AND id = $2");
        sqlx::query_as::<_, Treatment>(&query)
            .bind(salon_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_salon(
        pool: &PgPool,
        salon_id: DbId,
        include_inactive: bool,
    ) -> Result<Vec<Treatment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM treatments
             WHERE salon_id = $1 AND ($2 OR is_active = true)
             ORDER BY name ASC, id ASC"
        );
        sqlx::query_as::<_, Treatment>(&query)
            .bind(salon_id)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Update a treatment. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        salon_id: DbId,
        id: DbId,
        input: &UpdateTreatment,
    ) -> Result<Option<Treatment>, sqlx::Error> {
        let query = format!(
            "UPDATE treatments SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                duration_minutes = COALESCE($5, duration_minutes),
                price_cents = COALESCE($6, price_cents),
                is_active = COALESCE($7, is_active)
             WHERE salon_id = $1 AND id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Treatment>(&query)
            .bind(salon_id)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.duration_minutes)
            .bind(input.price_cents)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a treatment. Appointments keep their row with `treatment_id` cleared.
    pub async fn delete(pool: &PgPool, salon_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM treatments WHERE salon_id = $1 AND id = $2")
            .bind(salon_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Required forms
    // -----------------------------------------------------------------------

    /// All forms linked to a treatment, active or not.
    pub async fn list_forms(pool: &PgPool, treatment_id: DbId) -> Result<Vec<Form>, sqlx::Error> {
        sqlx::query_as::<_, Form>(
            "SELECT f.id, f.salon_id, f.name, f.description, f.fields, f.is_active,
                    f.created_at, f.updated_at
             FROM forms f
             JOIN treatment_forms tf ON tf.form_id = f.id
             WHERE tf.treatment_id = $1
             ORDER BY f.name ASC, f.id ASC",
        )
        .bind(treatment_id)
        .fetch_all(pool)
        .await
    }

    /// Ids of the active forms a treatment requires.
    pub async fn required_active_form_ids(
        pool: &PgPool,
        treatment_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT tf.form_id
             FROM treatment_forms tf
             JOIN forms f ON f.id = tf.form_id
             WHERE tf.treatment_id = $1 AND f.is_active = true
             ORDER BY tf.form_id",
        )
        .bind(treatment_id)
        .fetch_all(pool)
        .await
    }

    /// Ids of the treatments that require a form.
    pub async fn ids_requiring_form(
        pool: &PgPool,
        form_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT treatment_id FROM treatment_forms WHERE form_id = $1 ORDER BY treatment_id",
        )
        .bind(form_id)
        .fetch_all(pool)
        .await
    }

    /// Replace a treatment's required form set atomically.
    pub async fn set_forms(
        pool: &PgPool,
        treatment_id: DbId,
        form_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        Self::set_forms_inner(&mut tx, treatment_id, form_ids).await?;
        tx.commit().await
    }

    async fn set_forms_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        treatment_id: DbId,
        form_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM treatment_forms WHERE treatment_id = $1")
            .bind(treatment_id)
            .execute(&mut **tx)
            .await?;

        if !form_ids.is_empty() {
            sqlx::query(
                "INSERT INTO treatment_forms (treatment_id, form_id)
                 SELECT $1, UNNEST($2::bigint[])
                 ON CONFLICT DO NOTHING",
            )
            .bind(treatment_id)
            .bind(form_ids)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}
