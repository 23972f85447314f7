//! Public form delivery under `/f/{key}`.
//!
//! A key is either an assignment token or a numeric form id. Tokens win when
//! both readings are possible. No authentication: the token is the credential.

use atelier_core::error::CoreError;
use atelier_core::form_delivery::{
    looks_like_token, normalize_filled_by, parse_form_id, ClientFormStatus,
};
use atelier_core::form_schema::Widget;
use atelier_core::types::{DbId, Timestamp};
use atelier_db::models::client_form::ClientForm;
use atelier_db::models::form::Form;
use atelier_db::models::submission::CreateSubmission;
use atelier_db::repositories::{ClientFormRepo, FormRepo, SalonRepo, SubmissionRepo};
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::handlers::form::widgets_for;
use crate::handlers::submission::check_answers;
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;
use crate::status_sync;

/// What a public key resolved to.
enum PublicTarget {
    Assignment { client_form: ClientForm, form: Form },
    Form(Form),
}

impl PublicTarget {
    fn form(&self) -> &Form {
        match self {
            Self::Assignment { form, .. } | Self::Form(form) => form,
        }
    }

    fn assignment(&self) -> Option<&ClientForm> {
        match self {
            Self::Assignment { client_form, .. } => Some(client_form),
            Self::Form(_) => None,
        }
    }
}

/// Renderable view of a public form.
#[derive(Debug, Serialize)]
pub struct PublicFormView {
    pub key: String,
    pub form_id: DbId,
    pub salon_name: String,
    pub name: String,
    pub description: Option<String>,
    pub widgets: Vec<Widget>,
    /// `pending` or `completed` for token keys, absent for public forms.
    pub assignment_status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PublicSubmitRequest {
    pub answers: serde_json::Value,
    pub filled_by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PublicSubmitResponse {
    pub submission_id: DbId,
    pub success_path: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessView {
    pub form_name: String,
    pub salon_name: String,
    pub completed: bool,
    pub filled_at: Option<Timestamp>,
}

fn key_not_found(key: &str) -> AppError {
    AppError::NotFound(format!("No form available at '{key}'"))
}

async fn resolve_key(pool: &PgPool, key: &str) -> AppResult<PublicTarget> {
    if looks_like_token(key) {
        if let Some(client_form) = ClientFormRepo::find_by_token(pool, key).await? {
            let form = FormRepo::find_by_id(pool, client_form.salon_id, client_form.form_id)
                .await?
                .filter(|f| f.is_active)
                .ok_or_else(|| key_not_found(key))?;
            return Ok(PublicTarget::Assignment { client_form, form });
        }
    }

    let form_id = parse_form_id(key).ok_or_else(|| key_not_found(key))?;
    let form = FormRepo::find_active_by_id(pool, form_id)
        .await?
        .ok_or_else(|| key_not_found(key))?;
    Ok(PublicTarget::Form(form))
}

async fn salon_name(pool: &PgPool, salon_id: DbId) -> AppResult<String> {
    let salon = SalonRepo::find_by_id(pool, salon_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Salon",
            id: salon_id,
        }))?;
    Ok(salon.name)
}

fn is_completed(client_form: &ClientForm) -> bool {
    ClientFormStatus::from_str_value(&client_form.status)
        .map(|s| s == ClientFormStatus::Completed)
        .unwrap_or(false)
}

/// GET /f/{key}
pub async fn show(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<DataResponse<PublicFormView>>> {
    let target = resolve_key(&state.pool, &key).await?;
    let form = target.form();
    let widgets = widgets_for(form)?;
    let view = PublicFormView {
        form_id: form.id,
        salon_name: salon_name(&state.pool, form.salon_id).await?,
        name: form.name.clone(),
        description: form.description.clone(),
        widgets,
        assignment_status: target.assignment().map(|cf| cf.status.clone()),
        key,
    };
    Ok(Json(DataResponse { data: view }))
}

/// POST /f/{key}
///
/// Token keys complete the assignment and insert the submission in one
/// transaction, then re-sync the client's appointments. Form-id keys record
/// an anonymous submission.
pub async fn submit(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(input): Json<PublicSubmitRequest>,
) -> AppResult<Created<PublicSubmitResponse>> {
    let target = resolve_key(&state.pool, &key).await?;
    let answers = check_answers(target.form(), &input.answers)?;

    let submission = match &target {
        PublicTarget::Assignment { client_form, .. } => {
            if is_completed(client_form) {
                return Err(AppError::Core(CoreError::Conflict(
                    "This form has already been submitted".into(),
                )));
            }
            let filled_by = normalize_filled_by(input.filled_by.as_deref())
                .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

            let (completed, submission) = ClientFormRepo::complete_with_submission(
                &state.pool,
                &client_form.token,
                &filled_by,
                &answers,
            )
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Conflict(
                    "This form has already been submitted".into(),
                ))
            })?;

            tracing::info!(
                client_form_id = completed.id,
                submission_id = submission.id,
                "Assigned form completed",
            );
            status_sync::sync_client_appointments(&state.pool, completed.client_id).await;
            submission
        }
        PublicTarget::Form(form) => {
            let input = CreateSubmission {
                salon_id: form.salon_id,
                form_id: form.id,
                client_id: None,
                client_form_id: None,
                answers,
            };
            let submission = SubmissionRepo::create(&state.pool, &input).await?;
            tracing::info!(form_id = form.id, submission_id = submission.id, "Public form submitted");
            submission
        }
    };

    Ok(created(PublicSubmitResponse {
        submission_id: submission.id,
        success_path: format!("/f/{key}/success"),
    }))
}

/// GET /f/{key}/success
pub async fn success(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<DataResponse<SuccessView>>> {
    let target = resolve_key(&state.pool, &key).await?;
    let form = target.form();
    let (completed, filled_at) = match target.assignment() {
        Some(cf) => (is_completed(cf), cf.filled_at),
        None => (true, None),
    };
    Ok(Json(DataResponse {
        data: SuccessView {
            form_name: form.name.clone(),
            salon_name: salon_name(&state.pool, form.salon_id).await?,
            completed,
            filled_at,
        },
    }))
}
