//! Visit photo metadata model.

use atelier_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `visit_photos` table. The file itself lives on disk.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VisitPhoto {
    pub id: DbId,
    pub salon_id: DbId,
    pub appointment_id: DbId,
    /// Path relative to the storage root.
    pub file_path: String,
    pub content_type: String,
    pub file_size_bytes: i64,
    pub caption: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for inserting a photo row.
#[derive(Debug, Clone)]
pub struct CreateVisitPhoto {
    pub salon_id: DbId,
    pub appointment_id: DbId,
    pub file_path: String,
    pub content_type: String,
    pub file_size_bytes: i64,
    pub caption: Option<String>,
}
