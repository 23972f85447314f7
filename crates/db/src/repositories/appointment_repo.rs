//! Repository for the `appointments` table.
//!
//! Status writes from the synchronizer go through
//! [`AppointmentRepo::compare_and_set_status`], which only applies when the
//! row still holds the status that was read.

use atelier_core::appointment_status::{STATUS_CANCELLED, STATUS_COMPLETED};
use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::appointment::{
    Appointment, AppointmentFilter, AppointmentSummary, CreateAppointment, UpdateAppointment,
};

const COLUMNS: &str = "id, salon_id, client_id, treatment_id, starts_at, duration_minutes, \
                       status, notes, created_at, updated_at";

const SUMMARY_SELECT: &str = "\
    SELECT a.id, a.salon_id, s.name AS salon_name, a.client_id, \
           TRIM(c.first_name || ' ' || c.last_name) AS client_name, \
           a.treatment_id, t.name AS treatment_name, a.starts_at, a.duration_minutes, \
           a.status, a.notes \
    FROM appointments a \
    JOIN salons s ON s.id = a.salon_id \
    JOIN clients c ON c.id = a.client_id \
    LEFT JOIN treatments t ON t.id = a.treatment_id";

/// Provides CRUD operations and status writes for appointments.
pub struct AppointmentRepo;

impl AppointmentRepo {
    /// Insert an appointment with an already derived status and duration.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAppointment,
        duration_minutes: i32,
        status: &str,
    ) -> Result<Appointment, sqlx::Error> {
        let query = format!(
            "INSERT INTO appointments
                (salon_id, client_id, treatment_id, starts_at, duration_minutes, status, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Appointment>(&query)
            .bind(input.salon_id)
            .bind(input.client_id)
            .bind(input.treatment_id)
            .bind(input.starts_at)
            .bind(duration_minutes)
            .bind(status)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        salon_id: DbId,
        id: DbId,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM appointments WHERE salon_id = $1 AND id = $2");
        sqlx::query_as::<_, Appointment>(&query)
            .bind(salon_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an appointment without a salon scope. Only the synchronizer uses this.
    pub async fn find_by_id_unscoped(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM appointments WHERE id = $1");
        sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A salon's appointments in start order, narrowed by `filter`.
    ///
    /// A status filter also lets every open row through, since its stored
    /// status may be stale; callers re-apply the filter after syncing.
    pub async fn list_by_salon(
        pool: &PgPool,
        salon_id: DbId,
        filter: &AppointmentFilter,
    ) -> Result<Vec<AppointmentSummary>, sqlx::Error> {
        let query = format!(
            "{SUMMARY_SELECT}
             WHERE a.salon_id = $1
               AND ($2::timestamptz IS NULL OR a.starts_at >= $2)
               AND ($3::timestamptz IS NULL OR a.starts_at < $3)
               AND ($4::text IS NULL OR a.status = $4 OR a.status NOT IN ($6, $7))
               AND ($5::bigint IS NULL OR a.client_id = $5)
             ORDER BY a.starts_at ASC, a.id ASC"
        );
        sqlx::query_as::<_, AppointmentSummary>(&query)
            .bind(salon_id)
            .bind(filter.from)
            .bind(filter.to)
            .bind(&filter.status)
            .bind(filter.client_id)
            .bind(STATUS_COMPLETED)
            .bind(STATUS_CANCELLED)
            .fetch_all(pool)
            .await
    }

    /// A client's appointments, newest first.
    pub async fn list_by_client(
        pool: &PgPool,
        salon_id: DbId,
        client_id: DbId,
    ) -> Result<Vec<AppointmentSummary>, sqlx::Error> {
        let query = format!(
            "{SUMMARY_SELECT}
             WHERE a.salon_id = $1 AND a.client_id = $2
             ORDER BY a.starts_at DESC, a.id DESC"
        );
        sqlx::query_as::<_, AppointmentSummary>(&query)
            .bind(salon_id)
            .bind(client_id)
            .fetch_all(pool)
            .await
    }

    /// Appointments of every client record linked to a portal user, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<AppointmentSummary>, sqlx::Error> {
        let query = format!(
            "{SUMMARY_SELECT}
             WHERE c.user_id = $1
             ORDER BY a.starts_at DESC, a.id DESC"
        );
        sqlx::query_as::<_, AppointmentSummary>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update an appointment. Only non-`None` fields in `input` are applied,
    /// except that `clear_treatment` sets the treatment to NULL.
    pub async fn update(
        pool: &PgPool,
        salon_id: DbId,
        id: DbId,
        input: &UpdateAppointment,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        let query = format!(
            "UPDATE appointments SET
                treatment_id = CASE WHEN $8 THEN NULL ELSE COALESCE($3, treatment_id) END,
                starts_at = COALESCE($4, starts_at),
                duration_minutes = COALESCE($5, duration_minutes),
                status = COALESCE($6, status),
                notes = COALESCE($7, notes)
             WHERE salon_id = $1 AND id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Appointment>(&query)
            .bind(salon_id)
            .bind(id)
            .bind(input.treatment_id)
            .bind(input.starts_at)
            .bind(input.duration_minutes)
            .bind(&input.status)
            .bind(&input.notes)
            .bind(input.clear_treatment)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, salon_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM appointments WHERE salon_id = $1 AND id = $2")
            .bind(salon_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The subset of `ids` that are appointments of `salon_id`.
    pub async fn find_ids_in_salon(
        pool: &PgPool,
        salon_id: DbId,
        ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM appointments WHERE salon_id = $1 AND id = ANY($2) ORDER BY id",
        )
        .bind(salon_id)
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    /// Write `target` only if the row still has status `observed`.
    ///
    /// Returns `true` when the row was updated.
    pub async fn compare_and_set_status(
        pool: &PgPool,
        id: DbId,
        observed: &str,
        target: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE appointments SET status = $3 WHERE id = $1 AND status = $2",
        )
        .bind(id)
        .bind(observed)
        .bind(target)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Ids of every appointment of a client, terminal or not.
    pub async fn ids_for_client(
        pool: &PgPool,
        salon_id: DbId,
        client_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM appointments WHERE salon_id = $1 AND client_id = $2 ORDER BY id",
        )
        .bind(salon_id)
        .bind(client_id)
        .fetch_all(pool)
        .await
    }

    /// Ids of a client's future appointments that are not terminal.
    pub async fn upcoming_open_ids_for_client(
        pool: &PgPool,
        client_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM appointments
             WHERE client_id = $1 AND starts_at >= NOW() AND status NOT IN ($2, $3)
             ORDER BY starts_at",
        )
        .bind(client_id)
        .bind(STATUS_COMPLETED)
        .bind(STATUS_CANCELLED)
        .fetch_all(pool)
        .await
    }

    /// Ids of future, non-terminal appointments booked for any of `treatment_ids`.
    pub async fn upcoming_open_ids_for_treatments(
        pool: &PgPool,
        treatment_ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        if treatment_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM appointments
             WHERE treatment_id = ANY($1) AND starts_at >= NOW() AND status NOT IN ($2, $3)
             ORDER BY starts_at",
        )
        .bind(treatment_ids)
        .bind(STATUS_COMPLETED)
        .bind(STATUS_CANCELLED)
        .fetch_all(pool)
        .await
    }
}
