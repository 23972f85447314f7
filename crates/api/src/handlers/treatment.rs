//! Handlers for treatments, nested under `/salons/{salon_id}/treatments`.

use atelier_core::error::CoreError;
use atelier_core::types::DbId;
use atelier_db::models::form::Form;
use atelier_db::models::treatment::{
    CreateTreatment, SetTreatmentForms, Treatment, UpdateTreatment,
};
use atelier_db::repositories::{AppointmentRepo, FormRepo, TreatmentRepo};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireOwner;
use crate::middleware::tenant::authorize_salon;
use crate::query::IncludeInactiveParams;
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;
use crate::status_sync;

/// Verify that a treatment exists in the salon, returning the row.
pub(crate) async fn ensure_treatment_exists(
    pool: &sqlx::PgPool,
    salon_id: DbId,
    id: DbId,
) -> AppResult<Treatment> {
    TreatmentRepo::find_by_id(pool, salon_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Treatment",
            id,
        }))
}

/// GET /api/v1/salons/{salon_id}/treatments?include_inactive=
pub async fn list(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path(salon_id): Path<DbId>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<Treatment>>>> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    let treatments =
        TreatmentRepo::list_by_salon(&state.pool, salon_id, params.include_inactive).await?;
    Ok(Json(DataResponse { data: treatments }))
}

/// POST /api/v1/salons/{salon_id}/treatments
pub async fn create(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path(salon_id): Path<DbId>,
    Json(mut input): Json<CreateTreatment>,
) -> AppResult<Created<Treatment>> {
    input.validate()?;
    authorize_salon(&state.pool, &user, salon_id).await?;
    input.salon_id = salon_id;
    let treatment = TreatmentRepo::create(&state.pool, &input).await?;
    Ok(created(treatment))
}

/// GET /api/v1/salons/{salon_id}/treatments/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Treatment>>> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    let treatment = ensure_treatment_exists(&state.pool, salon_id, id).await?;
    Ok(Json(DataResponse { data: treatment }))
}

/// PUT /api/v1/salons/{salon_id}/treatments/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateTreatment>,
) -> AppResult<Json<DataResponse<Treatment>>> {
    input.validate()?;
    authorize_salon(&state.pool, &user, salon_id).await?;
    let treatment = TreatmentRepo::update(&state.pool, salon_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Treatment",
            id,
        }))?;
    Ok(Json(DataResponse { data: treatment }))
}

/// DELETE /api/v1/salons/{salon_id}/treatments/{id}
///
/// Booked appointments keep their row without a treatment and are re-synced.
pub async fn delete(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    ensure_treatment_exists(&state.pool, salon_id, id).await?;

    let affected = AppointmentRepo::upcoming_open_ids_for_treatments(&state.pool, &[id]).await?;
    TreatmentRepo::delete(&state.pool, salon_id, id).await?;
    status_sync::sync_many(&state.pool, &affected).await;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/salons/{salon_id}/treatments/{id}/forms
///
/// All linked forms, including inactive ones that no longer count as required.
pub async fn list_forms(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Vec<Form>>>> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    ensure_treatment_exists(&state.pool, salon_id, id).await?;
    let forms = TreatmentRepo::list_forms(&state.pool, id).await?;
    Ok(Json(DataResponse { data: forms }))
}

/// PUT /api/v1/salons/{salon_id}/treatments/{id}/forms
///
/// Replace the required form set, then re-sync the treatment's upcoming
/// appointments.
pub async fn set_forms(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<SetTreatmentForms>,
) -> AppResult<Json<DataResponse<Vec<Form>>>> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    ensure_treatment_exists(&state.pool, salon_id, id).await?;

    let mut requested = input.form_ids.clone();
    requested.sort_unstable();
    requested.dedup();

    let owned = FormRepo::find_ids_in_salon(&state.pool, salon_id, &requested).await?;
    let unknown: Vec<String> = requested
        .iter()
        .filter(|form_id| !owned.contains(form_id))
        .map(|form_id| form_id.to_string())
        .collect();
    if !unknown.is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown form ids for this salon: {}",
            unknown.join(", ")
        ))));
    }

    TreatmentRepo::set_forms(&state.pool, id, &requested).await?;
    tracing::info!(salon_id, treatment_id = id, form_count = requested.len(), "Required forms replaced");

    status_sync::sync_treatment_appointments(&state.pool, &[id]).await;

    let forms = TreatmentRepo::list_forms(&state.pool, id).await?;
    Ok(Json(DataResponse { data: forms }))
}
