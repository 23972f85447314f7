//! Salon (tenant) ownership checks.
//!
//! Every `/salons/{salon_id}/...` handler calls [`authorize_salon`] before
//! touching salon-owned rows. Repositories then scope every query by the
//! returned salon's id.

use atelier_core::error::CoreError;
use atelier_core::types::DbId;
use atelier_db::models::salon::Salon;
use atelier_db::repositories::SalonRepo;

use super::auth::AuthUser;
use crate::error::{AppError, AppResult};

/// Load a salon and verify the caller owns it.
///
/// Missing salons yield 404, salons of another owner 403.
pub async fn authorize_salon(
    pool: &sqlx::PgPool,
    user: &AuthUser,
    salon_id: DbId,
) -> AppResult<Salon> {
    let salon = SalonRepo::find_by_id(pool, salon_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Salon",
            id: salon_id,
        }))?;

    if salon.owner_id != user.user_id {
        tracing::warn!(salon_id, user_id = user.user_id, "Salon access denied");
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have access to this salon".into(),
        )));
    }

    Ok(salon)
}
