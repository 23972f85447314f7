//! Handlers for the `/salons` resource.

use atelier_core::types::DbId;
use atelier_core::visit_photo::salon_prefix;
use atelier_db::models::salon::{CreateSalon, Salon, UpdateSalon};
use atelier_db::repositories::SalonRepo;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::rbac::RequireOwner;
use crate::middleware::tenant::authorize_salon;
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;
use crate::storage;

/// POST /api/v1/salons
pub async fn create(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Json(mut input): Json<CreateSalon>,
) -> AppResult<Created<Salon>> {
    input.validate()?;
    input.owner_id = user.user_id;
    let salon = SalonRepo::create(&state.pool, &input).await?;
    tracing::info!(salon_id = salon.id, owner_id = user.user_id, "Salon created");
    Ok(created(salon))
}

/// GET /api/v1/salons
pub async fn list(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
) -> AppResult<Json<DataResponse<Vec<Salon>>>> {
    let salons = SalonRepo::list_by_owner(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: salons }))
}

/// GET /api/v1/salons/{salon_id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path(salon_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Salon>>> {
    let salon = authorize_salon(&state.pool, &user, salon_id).await?;
    Ok(Json(DataResponse { data: salon }))
}

/// PUT /api/v1/salons/{salon_id}
pub async fn update(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path(salon_id): Path<DbId>,
    Json(input): Json<UpdateSalon>,
) -> AppResult<Json<DataResponse<Salon>>> {
    input.validate()?;
    let current = authorize_salon(&state.pool, &user, salon_id).await?;
    let salon = SalonRepo::update(&state.pool, salon_id, &input)
        .await?
        .unwrap_or(current);
    Ok(Json(DataResponse { data: salon }))
}

/// DELETE /api/v1/salons/{salon_id}
///
/// Removes the salon and everything it owns, then its photo directory (best
/// effort).
pub async fn delete(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path(salon_id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    SalonRepo::delete(&state.pool, salon_id).await?;

    if let Err(e) = storage::remove_tree(state.storage_root(), &salon_prefix(salon_id)).await
    {
        tracing::warn!(salon_id, error = %e, "Failed to remove salon photo directory");
    }
    tracing::info!(salon_id, owner_id = user.user_id, "Salon deleted");
    Ok(StatusCode::NO_CONTENT)
}
