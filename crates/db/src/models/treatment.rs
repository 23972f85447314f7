//! Treatment (bookable service) model and DTOs.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `treatments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Treatment {
    pub id: DbId,
    pub salon_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub price_cents: Option<i32>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a treatment.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTreatment {
    #[serde(default)]
    pub salon_id: DbId,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    /// Defaults to 60.
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: Option<i32>,
    #[validate(range(min = 0))]
    pub price_cents: Option<i32>,
    pub is_active: Option<bool>,
}

/// DTO for updating a treatment. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTreatment {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: Option<i32>,
    #[validate(range(min = 0))]
    pub price_cents: Option<i32>,
    pub is_active: Option<bool>,
}

/// Request body replacing a treatment's required form set.
#[derive(Debug, Clone, Deserialize)]
pub struct SetTreatmentForms {
    pub form_ids: Vec<DbId>,
}
