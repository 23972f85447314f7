//! Handlers for client-form assignments.
//!
//! Assignments are listed and created under
//! `/salons/{salon_id}/clients/{id}/forms` and deleted through
//! `/salons/{salon_id}/client-forms/{id}`.

use atelier_core::error::CoreError;
use atelier_core::form_delivery::{generate_form_token, public_form_url};
use atelier_core::types::DbId;
use atelier_db::models::client_form::{AssignForm, ClientForm, ClientFormSummary, CreateClientForm};
use atelier_db::repositories::ClientFormRepo;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::client::ensure_client_exists;
use crate::handlers::form::ensure_form_exists;
use crate::middleware::rbac::RequireOwner;
use crate::middleware::tenant::authorize_salon;
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;

/// A newly issued assignment with its public link.
#[derive(Debug, Serialize)]
pub struct IssuedAssignment {
    #[serde(flatten)]
    pub assignment: ClientForm,
    pub link: String,
}

/// A listed assignment with its public link.
#[derive(Debug, Serialize)]
pub struct AssignmentView {
    #[serde(flatten)]
    pub assignment: ClientFormSummary,
    pub link: String,
}

/// Attach public links to listed assignments.
pub(crate) fn with_links(base_url: &str, rows: Vec<ClientFormSummary>) -> Vec<AssignmentView> {
    rows.into_iter()
        .map(|assignment| AssignmentView {
            link: public_form_url(base_url, &assignment.token),
            assignment,
        })
        .collect()
}

/// GET /api/v1/salons/{salon_id}/clients/{id}/forms
pub async fn list_by_client(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, client_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Vec<AssignmentView>>>> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    ensure_client_exists(&state.pool, salon_id, client_id).await?;
    let rows = ClientFormRepo::list_by_client(&state.pool, salon_id, client_id).await?;
    Ok(Json(DataResponse {
        data: with_links(&state.config.public_base_url, rows),
    }))
}

/// POST /api/v1/salons/{salon_id}/clients/{id}/forms
///
/// Assign an active form of the same salon and return the token link.
pub async fn assign(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, client_id)): Path<(DbId, DbId)>,
    Json(input): Json<AssignForm>,
) -> AppResult<Created<IssuedAssignment>> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    ensure_client_exists(&state.pool, salon_id, client_id).await?;
    let form = ensure_form_exists(&state.pool, salon_id, input.form_id).await?;

    if !form.is_active {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Form {} is inactive and cannot be assigned",
            form.id
        ))));
    }

    let assignment = ClientFormRepo::create(
        &state.pool,
        &CreateClientForm {
            salon_id,
            client_id,
            form_id: form.id,
            token: generate_form_token(),
        },
    )
    .await?;

    tracing::info!(
        salon_id,
        client_id,
        form_id = form.id,
        client_form_id = assignment.id,
        "Form assigned to client",
    );

    let link = public_form_url(&state.config.public_base_url, &assignment.token);
    Ok(created(IssuedAssignment { assignment, link }))
}

/// DELETE /api/v1/salons/{salon_id}/client-forms/{id}
///
/// Any submission made through the assignment is kept.
pub async fn delete(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    if ClientFormRepo::delete(&state.pool, salon_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "ClientForm",
            id,
        }))
    }
}
