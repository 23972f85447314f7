//! Salon (tenant) model and DTOs.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `salons` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Salon {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a salon. `owner_id` is taken from the caller, not the body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSalon {
    #[serde(default)]
    pub owner_id: DbId,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
}

/// DTO for updating a salon. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateSalon {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
}
