//! Handlers for submissions.
//!
//! Staff-side listing and filling live under
//! `/salons/{salon_id}/clients/{id}/submissions`; single submissions under
//! `/salons/{salon_id}/submissions/{id}`.

use atelier_core::error::CoreError;
use atelier_core::form_schema::{parse_fields, validate_answers};
use atelier_core::types::DbId;
use atelier_db::models::form::Form;
use atelier_db::models::submission::{CreateSubmission, Submission, SubmissionSummary};
use atelier_db::repositories::{ClientFormRepo, SubmissionRepo};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::client::ensure_client_exists;
use crate::handlers::form::ensure_form_exists;
use crate::middleware::rbac::RequireOwner;
use crate::middleware::tenant::authorize_salon;
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;
use crate::status_sync;

/// Request body for a staff fill.
#[derive(Debug, Deserialize)]
pub struct StaffFillRequest {
    pub form_id: DbId,
    pub answers: serde_json::Value,
}

/// Check answers against a form's required fields.
pub(crate) fn check_answers(
    form: &Form,
    answers: &serde_json::Value,
) -> AppResult<serde_json::Value> {
    let fields = parse_fields(&form.fields).map_err(|e| {
        AppError::InternalError(format!("Stored schema of form {} is invalid: {e}", form.id))
    })?;
    validate_answers(&fields, answers)
        .map(serde_json::Value::Object)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))
}

/// GET /api/v1/salons/{salon_id}/clients/{id}/submissions
pub async fn list_by_client(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, client_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Vec<SubmissionSummary>>>> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    ensure_client_exists(&state.pool, salon_id, client_id).await?;
    let rows = SubmissionRepo::list_by_client(&state.pool, salon_id, client_id).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// POST /api/v1/salons/{salon_id}/clients/{id}/submissions
///
/// Record a submission on the client's behalf, without an assignment. The
/// client's upcoming appointments are re-synced afterwards.
pub async fn staff_fill(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, client_id)): Path<(DbId, DbId)>,
    Json(input): Json<StaffFillRequest>,
) -> AppResult<Created<Submission>> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    ensure_client_exists(&state.pool, salon_id, client_id).await?;
    let form = ensure_form_exists(&state.pool, salon_id, input.form_id).await?;

    if !form.is_active {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Form {} is inactive",
            form.id
        ))));
    }

    let answers = check_answers(&form, &input.answers)?;
    let submission = SubmissionRepo::create(
        &state.pool,
        &CreateSubmission {
            salon_id,
            form_id: form.id,
            client_id: Some(client_id),
            client_form_id: None,
            answers,
        },
    )
    .await?;

    tracing::info!(
        salon_id,
        client_id,
        form_id = form.id,
        submission_id = submission.id,
        "Staff recorded submission",
    );

    status_sync::sync_client_appointments(&state.pool, client_id).await;
    Ok(created(submission))
}

/// GET /api/v1/salons/{salon_id}/submissions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Submission>>> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    let submission = SubmissionRepo::find_by_id(&state.pool, salon_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Submission",
            id,
        }))?;
    Ok(Json(DataResponse { data: submission }))
}

/// DELETE /api/v1/salons/{salon_id}/submissions/{id}
///
/// Deletes the submission, then its assignment, then re-syncs the client's
/// appointments. Only the first step can fail the request.
pub async fn delete(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    let removed = SubmissionRepo::delete(&state.pool, salon_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Submission",
            id,
        }))?;

    if let Some(client_form_id) = removed.client_form_id {
        if let Err(e) = ClientFormRepo::delete(&state.pool, salon_id, client_form_id).await {
            tracing::warn!(
                submission_id = id,
                client_form_id,
                error = %e,
                "Failed to delete assignment of removed submission",
            );
        }
    }

    if let Some(client_id) = removed.client_id {
        status_sync::sync_client_appointments(&state.pool, client_id).await;
    }

    Ok(StatusCode::NO_CONTENT)
}
