//! Submission (answered form) model and DTOs.

use atelier_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `submissions` table. Rows are never updated.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Submission {
    pub id: DbId,
    pub salon_id: DbId,
    pub form_id: DbId,
    pub client_id: Option<DbId>,
    pub client_form_id: Option<DbId>,
    pub answers: serde_json::Value,
    pub created_at: Timestamp,
}

/// A submission joined with its form name, for listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubmissionSummary {
    pub id: DbId,
    pub salon_id: DbId,
    pub form_id: DbId,
    pub form_name: String,
    pub client_id: Option<DbId>,
    pub client_form_id: Option<DbId>,
    pub answers: serde_json::Value,
    pub created_at: Timestamp,
}

/// DTO for inserting a submission.
#[derive(Debug, Clone)]
pub struct CreateSubmission {
    pub salon_id: DbId,
    pub form_id: DbId,
    pub client_id: Option<DbId>,
    pub client_form_id: Option<DbId>,
    pub answers: serde_json::Value,
}
