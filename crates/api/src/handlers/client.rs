//! Handlers for clients, nested under `/salons/{salon_id}/clients`.

use atelier_core::error::CoreError;
use atelier_core::roles::Role;
use atelier_core::types::DbId;
use atelier_db::models::appointment::AppointmentSummary;
use atelier_db::models::client::{Client, CreateClient, UpdateClient};
use atelier_db::models::user::CreateUser;
use atelier_db::repositories::{AppointmentRepo, ClientRepo, UserRepo};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::{check_new_password, hash_password};
use crate::error::{AppError, AppResult};
use crate::handlers::appointment::sync_summaries;
use crate::handlers::visit_photo::remove_appointment_photos;
use crate::middleware::rbac::RequireOwner;
use crate::middleware::tenant::authorize_salon;
use crate::query::SearchParams;
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;

/// Request body for `POST /clients/{id}/portal-access`.
#[derive(Debug, Deserialize, Validate)]
pub struct PortalAccessRequest {
    #[validate(email)]
    pub email: String,
    /// Initial password for a new portal account. Ignored when the email
    /// already belongs to a portal user.
    pub password: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Verify that a client exists in the salon, returning the row.
pub(crate) async fn ensure_client_exists(
    pool: &sqlx::PgPool,
    salon_id: DbId,
    id: DbId,
) -> AppResult<Client> {
    ClientRepo::find_by_id(pool, salon_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Client",
            id,
        }))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/salons/{salon_id}/clients?search=
pub async fn list(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path(salon_id): Path<DbId>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<Vec<Client>>>> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    let clients =
        ClientRepo::list_by_salon(&state.pool, salon_id, params.search.as_deref()).await?;
    Ok(Json(DataResponse { data: clients }))
}

/// POST /api/v1/salons/{salon_id}/clients
pub async fn create(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path(salon_id): Path<DbId>,
    Json(mut input): Json<CreateClient>,
) -> AppResult<Created<Client>> {
    input.validate()?;
    authorize_salon(&state.pool, &user, salon_id).await?;
    input.salon_id = salon_id;
    let client = ClientRepo::create(&state.pool, &input).await?;
    Ok(created(client))
}

/// GET /api/v1/salons/{salon_id}/clients/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Client>>> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    let client = ensure_client_exists(&state.pool, salon_id, id).await?;
    Ok(Json(DataResponse { data: client }))
}

/// PUT /api/v1/salons/{salon_id}/clients/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateClient>,
) -> AppResult<Json<DataResponse<Client>>> {
    input.validate()?;
    authorize_salon(&state.pool, &user, salon_id).await?;
    let client = ClientRepo::update(&state.pool, salon_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Client",
            id,
        }))?;
    Ok(Json(DataResponse { data: client }))
}

/// DELETE /api/v1/salons/{salon_id}/clients/{id}
///
/// Assignments, submissions, appointments and photo rows cascade. The photo
/// files of the client's appointments are removed afterwards.
pub async fn delete(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    let appointment_ids = AppointmentRepo::ids_for_client(&state.pool, salon_id, id).await?;
    if !ClientRepo::delete(&state.pool, salon_id, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Client",
            id,
        }));
    }
    remove_appointment_photos(&state, salon_id, &appointment_ids).await;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/salons/{salon_id}/clients/{id}/portal-access
///
/// Link the client to a portal identity, creating a `client` user when the
/// email is not registered yet. A person may be a client of several salons
/// through one identity.
pub async fn grant_portal_access(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<PortalAccessRequest>,
) -> AppResult<Json<DataResponse<Client>>> {
    input.validate()?;
    authorize_salon(&state.pool, &user, salon_id).await?;
    let client = ensure_client_exists(&state.pool, salon_id, id).await?;

    if client.user_id.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Client already has portal access".into(),
        )));
    }

    let portal_user = match UserRepo::find_by_email(&state.pool, &input.email).await? {
        Some(existing) if existing.role == Role::Client.as_str() => existing,
        Some(_) => {
            return Err(AppError::Core(CoreError::Conflict(
                "Email belongs to a non-client account".into(),
            )));
        }
        None => {
            let password = input.password.as_deref().ok_or_else(|| {
                AppError::Core(CoreError::Validation(
                    "password is required for a new portal account".into(),
                ))
            })?;
            check_new_password(password)?;
            let password_hash = hash_password(password)?;
            UserRepo::create(
                &state.pool,
                &CreateUser {
                    email: input.email.clone(),
                    password_hash,
                    role: Role::Client.as_str().to_string(),
                },
            )
            .await?
        }
    };

    let client = ClientRepo::link_user(&state.pool, salon_id, id, portal_user.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Client",
            id,
        }))?;

    tracing::info!(salon_id, client_id = id, user_id = portal_user.id, "Portal access granted");
    Ok(Json(DataResponse { data: client }))
}

/// GET /api/v1/salons/{salon_id}/clients/{id}/appointments
///
/// Newest first; open appointments are synchronized before answering.
pub async fn list_appointments(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Vec<AppointmentSummary>>>> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    ensure_client_exists(&state.pool, salon_id, id).await?;
    let mut appointments = AppointmentRepo::list_by_client(&state.pool, salon_id, id).await?;
    sync_summaries(&state.pool, &mut appointments).await;
    Ok(Json(DataResponse { data: appointments }))
}
