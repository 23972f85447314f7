//! Repository for the `visit_photos` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::visit_photo::{CreateVisitPhoto, VisitPhoto};

const COLUMNS: &str = "id, salon_id, appointment_id, file_path, content_type, file_size_bytes, \
                       caption, created_at";

pub struct VisitPhotoRepo;

impl VisitPhotoRepo {
    pub async fn create(pool: &PgPool, input: &CreateVisitPhoto) -> Result<VisitPhoto, sqlx::Error> {
        let query = format!(
            "INSERT INTO visit_photos
                (salon_id, appointment_id, file_path, content_type, file_size_bytes, caption)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VisitPhoto>(&query)
            .bind(input.salon_id)
            .bind(input.appointment_id)
            .bind(&input.file_path)
            .bind(&input.content_type)
            .bind(input.file_size_bytes)
            .bind(&input.caption)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        salon_id: DbId,
        appointment_id: DbId,
        id: DbId,
    ) -> Result<Option<VisitPhoto>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM visit_photos
             WHERE salon_id = $1 AND appointment_id = $2 AND id = $3"
        );
        sqlx::query_as::<_, VisitPhoto>(&query)
            .bind(salon_id)
            .bind(appointment_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_appointment(
        pool: &PgPool,
        salon_id: DbId,
        appointment_id: DbId,
    ) -> Result<Vec<VisitPhoto>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM visit_photos
             WHERE salon_id = $1 AND appointment_id = $2
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, VisitPhoto>(&query)
            .bind(salon_id)
            .bind(appointment_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a photo row, returning it so the caller can remove the file.
    pub async fn delete(
        pool: &PgPool,
        salon_id: DbId,
        appointment_id: DbId,
        id: DbId,
    ) -> Result<Option<VisitPhoto>, sqlx::Error> {
        let query = format!(
            "DELETE FROM visit_photos
             WHERE salon_id = $1 AND appointment_id = $2 AND id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VisitPhoto>(&query)
            .bind(salon_id)
            .bind(appointment_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
