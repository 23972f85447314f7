//! Handlers for appointments, nested under `/salons/{salon_id}/appointments`.
//!
//! Every read path runs the status synchronizer over open appointments
//! before answering; every write is followed by a best-effort sync.

use std::collections::HashMap;

use atelier_core::appointment_status::{
    initial_status, validate_appointment_status, AppointmentStatus,
};
use atelier_core::error::CoreError;
use atelier_core::types::DbId;
use atelier_db::models::appointment::{
    Appointment, AppointmentFilter, AppointmentSummary, CreateAppointment, UpdateAppointment,
};
use atelier_db::repositories::treatment_repo::DEFAULT_DURATION_MINUTES;
use atelier_db::repositories::{AppointmentRepo, TreatmentRepo};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::client::ensure_client_exists;
use crate::handlers::treatment::ensure_treatment_exists;
use crate::handlers::visit_photo::remove_appointment_photos;
use crate::middleware::rbac::RequireOwner;
use crate::middleware::tenant::authorize_salon;
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;
use crate::status_sync::{self, SyncOutcome};

/// Request body for `POST /appointments/sync`.
#[derive(Debug, Deserialize)]
pub struct BatchSyncRequest {
    pub appointment_ids: Vec<DbId>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Verify that an appointment exists in the salon, returning the row.
pub(crate) async fn ensure_appointment_exists(
    pool: &sqlx::PgPool,
    salon_id: DbId,
    id: DbId,
) -> AppResult<Appointment> {
    AppointmentRepo::find_by_id(pool, salon_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Appointment",
            id,
        }))
}

/// Synchronize the open rows of a listing and patch their statuses in place.
pub(crate) async fn sync_summaries(pool: &sqlx::PgPool, rows: &mut [AppointmentSummary]) {
    let open: Vec<DbId> = rows
        .iter()
        .filter(|row| !is_terminal(&row.status))
        .map(|row| row.id)
        .collect();
    if open.is_empty() {
        return;
    }

    let synced: HashMap<DbId, &'static str> = status_sync::sync_many(pool, &open)
        .await
        .into_iter()
        .map(|outcome| (outcome.appointment_id, outcome.status.as_str()))
        .collect();

    for row in rows.iter_mut() {
        if let Some(status) = synced.get(&row.id) {
            row.status = (*status).to_string();
        }
    }
}

/// Best-effort sync of a single appointment, patching the row on success.
async fn sync_row(pool: &sqlx::PgPool, appointment: &mut Appointment) {
    match status_sync::sync_appointment_status(pool, appointment.id).await {
        Ok(Some(status)) => appointment.status = status.as_str().to_string(),
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(appointment_id = appointment.id, error = %e, "Appointment status sync failed");
        }
    }
}

fn is_terminal(status: &str) -> bool {
    AppointmentStatus::from_str_value(status)
        .map(|s| s.is_terminal())
        .unwrap_or(false)
}

fn validate_status(status: &str) -> AppResult<()> {
    validate_appointment_status(status).map_err(|msg| AppError::Core(CoreError::Validation(msg)))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/salons/{salon_id}/appointments?from=&to=&status=&client_id=
pub async fn list(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path(salon_id): Path<DbId>,
    Query(filter): Query<AppointmentFilter>,
) -> AppResult<Json<DataResponse<Vec<AppointmentSummary>>>> {
    if let Some(ref status) = filter.status {
        validate_status(status)?;
    }
    authorize_salon(&state.pool, &user, salon_id).await?;

    let mut appointments = AppointmentRepo::list_by_salon(&state.pool, salon_id, &filter).await?;
    sync_summaries(&state.pool, &mut appointments).await;

    // A sync may have moved rows out of the requested status.
    if let Some(ref status) = filter.status {
        appointments.retain(|row| &row.status == status);
    }

    Ok(Json(DataResponse { data: appointments }))
}

/// POST /api/v1/salons/{salon_id}/appointments
///
/// The initial status depends on whether the treatment requires any active
/// form; a sync then accounts for forms the client already submitted.
pub async fn create(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path(salon_id): Path<DbId>,
    Json(mut input): Json<CreateAppointment>,
) -> AppResult<Created<Appointment>> {
    input.validate()?;
    authorize_salon(&state.pool, &user, salon_id).await?;
    ensure_client_exists(&state.pool, salon_id, input.client_id).await?;
    input.salon_id = salon_id;

    let (duration, required_count) = match input.treatment_id {
        Some(treatment_id) => {
            let treatment = ensure_treatment_exists(&state.pool, salon_id, treatment_id).await?;
            let required =
                TreatmentRepo::required_active_form_ids(&state.pool, treatment_id).await?;
            (
                input.duration_minutes.unwrap_or(treatment.duration_minutes),
                required.len(),
            )
        }
        None => (
            input.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES),
            0,
        ),
    };

    let status = initial_status(required_count);
    let mut appointment =
        AppointmentRepo::create(&state.pool, &input, duration, status.as_str()).await?;

    tracing::info!(
        salon_id,
        appointment_id = appointment.id,
        client_id = appointment.client_id,
        status = %status,
        "Appointment created",
    );

    sync_row(&state.pool, &mut appointment).await;
    Ok(created(appointment))
}

/// GET /api/v1/salons/{salon_id}/appointments/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Appointment>>> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    let mut appointment = ensure_appointment_exists(&state.pool, salon_id, id).await?;
    if !is_terminal(&appointment.status) {
        sync_row(&state.pool, &mut appointment).await;
    }
    Ok(Json(DataResponse { data: appointment }))
}

/// PUT /api/v1/salons/{salon_id}/appointments/{id}
///
/// Time, treatment, duration, notes or status may change; `clear_treatment`
/// drops the treatment. A sync follows, which leaves terminal statuses alone.
pub async fn update(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateAppointment>,
) -> AppResult<Json<DataResponse<Appointment>>> {
    input.validate()?;
    if let Some(ref status) = input.status {
        validate_status(status)?;
    }
    if input.clear_treatment && input.treatment_id.is_some() {
        return Err(AppError::Core(CoreError::Validation(
            "treatment_id and clear_treatment cannot be combined".into(),
        )));
    }
    authorize_salon(&state.pool, &user, salon_id).await?;
    if let Some(treatment_id) = input.treatment_id {
        ensure_treatment_exists(&state.pool, salon_id, treatment_id).await?;
    }

    let mut appointment = AppointmentRepo::update(&state.pool, salon_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Appointment",
            id,
        }))?;

    sync_row(&state.pool, &mut appointment).await;
    Ok(Json(DataResponse { data: appointment }))
}

/// DELETE /api/v1/salons/{salon_id}/appointments/{id}
///
/// Photo rows cascade; their files are removed afterwards.
pub async fn delete(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    if !AppointmentRepo::delete(&state.pool, salon_id, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Appointment",
            id,
        }));
    }
    remove_appointment_photos(&state, salon_id, &[id]).await;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/salons/{salon_id}/appointments/{id}/sync
///
/// Explicit single sync. Unlike the implicit ones, failures are returned.
pub async fn sync_one(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<SyncOutcome>>> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    ensure_appointment_exists(&state.pool, salon_id, id).await?;

    let status = status_sync::sync_appointment_status(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Appointment",
            id,
        }))?;

    Ok(Json(DataResponse {
        data: SyncOutcome {
            appointment_id: id,
            status,
        },
    }))
}

/// POST /api/v1/salons/{salon_id}/appointments/sync
///
/// Batch sync. Ids outside the salon are ignored; per-item failures are
/// logged and left out of the result.
pub async fn sync_batch(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path(salon_id): Path<DbId>,
    Json(input): Json<BatchSyncRequest>,
) -> AppResult<Json<DataResponse<Vec<SyncOutcome>>>> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    let ids = AppointmentRepo::find_ids_in_salon(&state.pool, salon_id, &input.appointment_ids)
        .await?;
    let outcomes = status_sync::sync_many(&state.pool, &ids).await;
    Ok(Json(DataResponse { data: outcomes }))
}
