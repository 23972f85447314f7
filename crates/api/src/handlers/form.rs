//! Handlers for forms, nested under `/salons/{salon_id}/forms`.
//!
//! A form whose schema has been answered at least once is locked: its
//! `fields` can no longer change and it cannot be deleted, only deactivated.

use atelier_core::error::CoreError;
use atelier_core::form_schema::{parse_fields, render_widgets, validate_fields, Widget};
use atelier_core::types::DbId;
use atelier_db::models::form::{CreateForm, Form, UpdateForm};
use atelier_db::models::submission::SubmissionSummary;
use atelier_db::repositories::{FormRepo, SubmissionRepo, TreatmentRepo};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireOwner;
use crate::middleware::tenant::authorize_salon;
use crate::query::IncludeInactiveParams;
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;
use crate::status_sync;

const MAX_NAME_LENGTH: usize = 200;

/// Rendered widget list for a form.
#[derive(Debug, Serialize)]
pub struct FormWidgets {
    pub form_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub widgets: Vec<Widget>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Verify that a form exists in the salon, returning the row.
pub(crate) async fn ensure_form_exists(
    pool: &sqlx::PgPool,
    salon_id: DbId,
    id: DbId,
) -> AppResult<Form> {
    FormRepo::find_by_id(pool, salon_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Form", id }))
}

/// Render a stored form's widgets.
pub(crate) fn widgets_for(form: &Form) -> AppResult<Vec<Widget>> {
    let fields = parse_fields(&form.fields).map_err(|e| {
        AppError::InternalError(format!("Stored schema of form {} is invalid: {e}", form.id))
    })?;
    Ok(render_widgets(&fields))
}

fn validate_name(name: &str) -> AppResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::Core(CoreError::Validation(format!(
            "name must be between 1 and {MAX_NAME_LENGTH} characters"
        ))));
    }
    Ok(())
}

fn validate_schema(fields: &serde_json::Value) -> AppResult<()> {
    validate_fields(fields)
        .map(|_| ())
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/salons/{salon_id}/forms?include_inactive=
pub async fn list(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path(salon_id): Path<DbId>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<Form>>>> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    let forms = FormRepo::list_by_salon(&state.pool, salon_id, params.include_inactive).await?;
    Ok(Json(DataResponse { data: forms }))
}

/// POST /api/v1/salons/{salon_id}/forms
pub async fn create(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path(salon_id): Path<DbId>,
    Json(mut input): Json<CreateForm>,
) -> AppResult<Created<Form>> {
    validate_name(&input.name)?;
    if let Some(ref fields) = input.fields {
        validate_schema(fields)?;
    }
    authorize_salon(&state.pool, &user, salon_id).await?;
    input.salon_id = salon_id;

    let form = FormRepo::create(&state.pool, &input).await?;
    tracing::info!(salon_id, form_id = form.id, "Form created");
    Ok(created(form))
}

/// GET /api/v1/salons/{salon_id}/forms/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Form>>> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    let form = ensure_form_exists(&state.pool, salon_id, id).await?;
    Ok(Json(DataResponse { data: form }))
}

/// PUT /api/v1/salons/{salon_id}/forms/{id}
///
/// Returns 409 when `fields` would change on a form that already has
/// submissions. Toggling `is_active` re-syncs dependent appointments.
pub async fn update(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateForm>,
) -> AppResult<Json<DataResponse<Form>>> {
    if let Some(ref name) = input.name {
        validate_name(name)?;
    }
    if let Some(ref fields) = input.fields {
        validate_schema(fields)?;
    }
    authorize_salon(&state.pool, &user, salon_id).await?;
    let existing = ensure_form_exists(&state.pool, salon_id, id).await?;

    let fields_changed = input
        .fields
        .as_ref()
        .is_some_and(|fields| *fields != existing.fields);
    if fields_changed && FormRepo::has_submissions(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "Form fields cannot be changed once the form has submissions".into(),
        )));
    }

    let form = FormRepo::update(&state.pool, salon_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Form", id }))?;

    if form.is_active != existing.is_active {
        tracing::info!(salon_id, form_id = id, is_active = form.is_active, "Form activation changed");
        status_sync::sync_form_dependents(&state.pool, id).await;
    }

    Ok(Json(DataResponse { data: form }))
}

/// DELETE /api/v1/salons/{salon_id}/forms/{id}
///
/// Returns 409 if the form has submissions. Treatments that required the
/// form are re-synced afterwards.
pub async fn delete(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    ensure_form_exists(&state.pool, salon_id, id).await?;

    if FormRepo::has_submissions(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "Form has submissions and cannot be deleted; deactivate it instead".into(),
        )));
    }

    let dependent_treatments = TreatmentRepo::ids_requiring_form(&state.pool, id).await?;
    FormRepo::delete(&state.pool, salon_id, id).await?;
    status_sync::sync_treatment_appointments(&state.pool, &dependent_treatments).await;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/salons/{salon_id}/forms/{id}/widgets
pub async fn widgets(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<FormWidgets>>> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    let form = ensure_form_exists(&state.pool, salon_id, id).await?;
    let widgets = widgets_for(&form)?;
    Ok(Json(DataResponse {
        data: FormWidgets {
            form_id: form.id,
            name: form.name,
            description: form.description,
            widgets,
        },
    }))
}

/// GET /api/v1/salons/{salon_id}/forms/{id}/submissions
///
/// Includes public submissions that have no client.
pub async fn list_submissions(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Vec<SubmissionSummary>>>> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    ensure_form_exists(&state.pool, salon_id, id).await?;
    let submissions = SubmissionRepo::list_by_form(&state.pool, salon_id, id).await?;
    Ok(Json(DataResponse { data: submissions }))
}
