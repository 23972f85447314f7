//! Appointment status synchronizer.
//!
//! Re-derives an appointment's status from the active forms its treatment
//! requires and the submissions its client has made, then persists the result
//! with a compare-and-set write. Terminal statuses are never touched.
//!
//! The fan-out helpers are best effort: failures are logged at `warn` and
//! swallowed so a consistency pass never fails the action that triggered it.

use atelier_core::appointment_status::{derive_status, AppointmentStatus};
use atelier_core::types::DbId;
use atelier_db::repositories::{AppointmentRepo, SubmissionRepo, TreatmentRepo};
use futures::future::join_all;
use serde::Serialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// Result of synchronizing one appointment.
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub appointment_id: DbId,
    pub status: AppointmentStatus,
}

/// Synchronize one appointment and return its resulting status.
///
/// Returns `Ok(None)` if the appointment does not exist. When another writer
/// changes the status between the read and the write, the write is skipped
/// and the status that writer left is returned.
pub async fn sync_appointment_status(
    pool: &PgPool,
    appointment_id: DbId,
) -> AppResult<Option<AppointmentStatus>> {
    let Some(appointment) = AppointmentRepo::find_by_id_unscoped(pool, appointment_id).await?
    else {
        return Ok(None);
    };

    let current = parse_status(&appointment.status)?;
    if current.is_terminal() {
        return Ok(Some(current));
    }

    let required = match appointment.treatment_id {
        Some(treatment_id) => TreatmentRepo::required_active_form_ids(pool, treatment_id).await?,
        None => Vec::new(),
    };
    let submitted =
        SubmissionRepo::submitted_form_ids(pool, appointment.client_id, &required).await?;

    let target = derive_status(current, &required, &submitted);
    if target == current {
        return Ok(Some(current));
    }

    let applied = AppointmentRepo::compare_and_set_status(
        pool,
        appointment_id,
        current.as_str(),
        target.as_str(),
    )
    .await?;

    if applied {
        tracing::debug!(
            appointment_id,
            from = %current,
            to = %target,
            "Appointment status synchronized",
        );
        return Ok(Some(target));
    }

    // Lost the race: report whatever the concurrent writer left.
    match AppointmentRepo::find_by_id_unscoped(pool, appointment_id).await? {
        Some(row) => parse_status(&row.status).map(Some),
        None => Ok(None),
    }
}

/// Synchronize many appointments concurrently.
///
/// Order is not preserved. Missing appointments are skipped and per-item
/// failures are logged, never returned.
pub async fn sync_many(pool: &PgPool, appointment_ids: &[DbId]) -> Vec<SyncOutcome> {
    let results = join_all(appointment_ids.iter().map(|&appointment_id| async move {
        (
            appointment_id,
            sync_appointment_status(pool, appointment_id).await,
        )
    }))
    .await;

    results
        .into_iter()
        .filter_map(|(appointment_id, result)| match result {
            Ok(Some(status)) => Some(SyncOutcome {
                appointment_id,
                status,
            }),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(appointment_id, error = %e, "Appointment status sync failed");
                None
            }
        })
        .collect()
}

/// Re-sync every upcoming, non-terminal appointment of a client.
pub async fn sync_client_appointments(pool: &PgPool, client_id: DbId) {
    match AppointmentRepo::upcoming_open_ids_for_client(pool, client_id).await {
        Ok(ids) => {
            sync_many(pool, &ids).await;
        }
        Err(e) => {
            tracing::warn!(client_id, error = %e, "Failed to load client appointments for sync");
        }
    }
}

/// Re-sync upcoming, non-terminal appointments booked for the given treatments.
pub async fn sync_treatment_appointments(pool: &PgPool, treatment_ids: &[DbId]) {
    match AppointmentRepo::upcoming_open_ids_for_treatments(pool, treatment_ids).await {
        Ok(ids) => {
            sync_many(pool, &ids).await;
        }
        Err(e) => {
            tracing::warn!(?treatment_ids, error = %e, "Failed to load treatment appointments for sync");
        }
    }
}

/// Re-sync upcoming appointments of every treatment that requires `form_id`.
pub async fn sync_form_dependents(pool: &PgPool, form_id: DbId) {
    match TreatmentRepo::ids_requiring_form(pool, form_id).await {
        Ok(treatment_ids) => sync_treatment_appointments(pool, &treatment_ids).await,
        Err(e) => {
            tracing::warn!(form_id, error = %e, "Failed to load treatments requiring form");
        }
    }
}

fn parse_status(value: &str) -> AppResult<AppointmentStatus> {
    AppointmentStatus::from_str_value(value).map_err(AppError::InternalError)
}
