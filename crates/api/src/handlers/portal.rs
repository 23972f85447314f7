//! Client portal: read-only views for users with the `client` role.
//!
//! A portal user may be linked to client records in several salons; every
//! listing spans all of them.

use atelier_db::models::appointment::AppointmentSummary;
use atelier_db::models::submission::SubmissionSummary;
use atelier_db::repositories::{AppointmentRepo, ClientFormRepo, SubmissionRepo};
use axum::extract::State;
use axum::Json;

use crate::error::AppResult;
use crate::handlers::appointment::sync_summaries;
use crate::handlers::client_form::{with_links, AssignmentView};
use crate::middleware::rbac::RequireClient;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/portal/appointments
pub async fn appointments(
    State(state): State<AppState>,
    RequireClient(user): RequireClient,
) -> AppResult<Json<DataResponse<Vec<AppointmentSummary>>>> {
    let mut rows = AppointmentRepo::list_for_user(&state.pool, user.user_id).await?;
    sync_summaries(&state.pool, &mut rows).await;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/portal/forms
///
/// Pending assignments only, each with its public link.
pub async fn forms(
    State(state): State<AppState>,
    RequireClient(user): RequireClient,
) -> AppResult<Json<DataResponse<Vec<AssignmentView>>>> {
    let rows = ClientFormRepo::list_pending_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse {
        data: with_links(&state.config.public_base_url, rows),
    }))
}

/// GET /api/v1/portal/submissions
pub async fn submissions(
    State(state): State<AppState>,
    RequireClient(user): RequireClient,
) -> AppResult<Json<DataResponse<Vec<SubmissionSummary>>>> {
    let rows = SubmissionRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: rows }))
}
