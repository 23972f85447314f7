//! Handlers for visit photos, nested under
//! `/salons/{salon_id}/appointments/{id}/photos`.
//!
//! Files are written to the local store first and the row second; deletes go
//! the other way round.

use atelier_core::error::CoreError;
use atelier_core::types::DbId;
use atelier_core::visit_photo::{
    appointment_prefix, content_type_for, storage_path, validate_extension, validate_size,
    MAX_CAPTION_LENGTH,
};
use atelier_db::models::visit_photo::{CreateVisitPhoto, VisitPhoto};
use atelier_db::repositories::VisitPhotoRepo;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::handlers::appointment::ensure_appointment_exists;
use crate::middleware::rbac::RequireOwner;
use crate::middleware::tenant::authorize_salon;
use crate::response::{created, Created, DataResponse};
use crate::state::AppState;
use crate::storage;

/// Remove the photo directories of deleted appointments (best effort).
///
/// The rows are gone by cascade; only the files are left to clean up.
pub(crate) async fn remove_appointment_photos(
    state: &AppState,
    salon_id: DbId,
    appointment_ids: &[DbId],
) {
    for &appointment_id in appointment_ids {
        let prefix = appointment_prefix(salon_id, appointment_id);
        if let Err(e) = storage::remove_tree(state.storage_root(), &prefix).await {
            tracing::warn!(salon_id, appointment_id, error = %e, "Failed to remove appointment photo directory");
        }
    }
}

/// GET /api/v1/salons/{salon_id}/appointments/{id}/photos
pub async fn list(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, appointment_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Vec<VisitPhoto>>>> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    ensure_appointment_exists(&state.pool, salon_id, appointment_id).await?;
    let photos =
        VisitPhotoRepo::list_by_appointment(&state.pool, salon_id, appointment_id).await?;
    Ok(Json(DataResponse { data: photos }))
}

/// POST /api/v1/salons/{salon_id}/appointments/{id}/photos
///
/// Multipart upload with a `file` part and an optional `caption` part.
pub async fn upload(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, appointment_id)): Path<(DbId, DbId)>,
    mut multipart: Multipart,
) -> AppResult<Created<VisitPhoto>> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    ensure_appointment_exists(&state.pool, salon_id, appointment_id).await?;

    let mut file_data: Option<(String, Vec<u8>)> = None;
    let mut caption: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file_data = Some((filename, data.to_vec()));
            }
            "caption" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                let text = text.trim();
                if !text.is_empty() {
                    caption = Some(text.to_string());
                }
            }
            _ => {}
        }
    }

    let (filename, data) =
        file_data.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;

    let ext = validate_extension(&filename).map_err(AppError::BadRequest)?;
    validate_size(data.len(), state.config.max_photo_bytes).map_err(AppError::BadRequest)?;
    if caption
        .as_ref()
        .is_some_and(|c| c.chars().count() > MAX_CAPTION_LENGTH)
    {
        return Err(AppError::Core(CoreError::Validation(format!(
            "caption exceeds maximum length of {MAX_CAPTION_LENGTH}"
        ))));
    }

    let file_id = Uuid::now_v7().simple().to_string();
    let relative = storage_path(salon_id, appointment_id, &file_id, &ext);
    storage::write_object(state.storage_root(), &relative, &data).await?;

    let input = CreateVisitPhoto {
        salon_id,
        appointment_id,
        file_path: relative.clone(),
        content_type: content_type_for(&ext).to_string(),
        file_size_bytes: data.len() as i64,
        caption,
    };

    let photo = match VisitPhotoRepo::create(&state.pool, &input).await {
        Ok(photo) => photo,
        Err(e) => {
            if let Err(io) = storage::remove_object(state.storage_root(), &relative).await {
                tracing::warn!(path = %relative, error = %io, "Failed to remove orphaned photo file");
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        salon_id,
        appointment_id,
        photo_id = photo.id,
        size = photo.file_size_bytes,
        "Visit photo uploaded",
    );
    Ok(created(photo))
}

/// GET /api/v1/salons/{salon_id}/appointments/{id}/photos/{photo_id}
///
/// Returns the raw image bytes with the stored content type.
pub async fn download(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, appointment_id, photo_id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<Response> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    let photo = VisitPhotoRepo::find_by_id(&state.pool, salon_id, appointment_id, photo_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "VisitPhoto",
            id: photo_id,
        }))?;

    let bytes = storage::read_object(state.storage_root(), &photo.file_path).await?;

    Ok(([(header::CONTENT_TYPE, photo.content_type)], bytes).into_response())
}

/// DELETE /api/v1/salons/{salon_id}/appointments/{id}/photos/{photo_id}
pub async fn delete(
    State(state): State<AppState>,
    RequireOwner(user): RequireOwner,
    Path((salon_id, appointment_id, photo_id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<StatusCode> {
    authorize_salon(&state.pool, &user, salon_id).await?;
    let photo = VisitPhotoRepo::delete(&state.pool, salon_id, appointment_id, photo_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "VisitPhoto",
            id: photo_id,
        }))?;

    if let Err(e) = storage::remove_object(state.storage_root(), &photo.file_path).await {
        tracing::warn!(photo_id, path = %photo.file_path, error = %e, "Failed to remove photo file");
    }

    Ok(StatusCode::NO_CONTENT)
}
