//! Client-form assignment model and DTOs.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `client_forms` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClientForm {
    pub id: DbId,
    pub salon_id: DbId,
    pub client_id: DbId,
    pub form_id: DbId,
    pub token: String,
    /// `pending` or `completed`.
    pub status: String,
    pub filled_at: Option<Timestamp>,
    pub filled_by: Option<String>,
    pub created_at: Timestamp,
}

/// An assignment joined with its form and salon names, for listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClientFormSummary {
    pub id: DbId,
    pub salon_id: DbId,
    pub salon_name: String,
    pub client_id: DbId,
    pub form_id: DbId,
    pub form_name: String,
    pub token: String,
    pub status: String,
    pub filled_at: Option<Timestamp>,
    pub filled_by: Option<String>,
    pub created_at: Timestamp,
}

/// Request body for assigning a form to a client.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignForm {
    pub form_id: DbId,
}

/// DTO for inserting an assignment.
#[derive(Debug, Clone)]
pub struct CreateClientForm {
    pub salon_id: DbId,
    pub client_id: DbId,
    pub form_id: DbId,
    pub token: String,
}
