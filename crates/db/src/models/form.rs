//! Form (questionnaire schema) model and DTOs.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `forms` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Form {
    pub id: DbId,
    pub salon_id: DbId,
    pub name: String,
    pub description: Option<String>,
    /// Ordered field descriptors; see `atelier_core::form_schema`.
    pub fields: serde_json::Value,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a form.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateForm {
    #[serde(default)]
    pub salon_id: DbId,
    pub name: String,
    pub description: Option<String>,
    /// Defaults to an empty field list.
    pub fields: Option<serde_json::Value>,
    /// Defaults to `true`.
    pub is_active: Option<bool>,
}

/// DTO for updating a form. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub fields: Option<serde_json::Value>,
    pub is_active: Option<bool>,
}
