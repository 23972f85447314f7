//! Appointment model and DTOs.

use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `appointments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Appointment {
    pub id: DbId,
    pub salon_id: DbId,
    pub client_id: DbId,
    pub treatment_id: Option<DbId>,
    pub starts_at: Timestamp,
    pub duration_minutes: i32,
    /// One of `scheduled`, `pending_forms`, `completed`, `cancelled`.
    pub status: String,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an appointment.
///
/// `status` is not accepted here; it is derived from the treatment's
/// required forms.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAppointment {
    #[serde(default)]
    pub salon_id: DbId,
    pub client_id: DbId,
    pub treatment_id: Option<DbId>,
    pub starts_at: Timestamp,
    /// Defaults to the treatment's duration, or 60 without a treatment.
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
}

/// DTO for updating an appointment. All fields are optional.
///
/// An absent `treatment_id` keeps the current treatment; `clear_treatment`
/// removes it.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAppointment {
    pub treatment_id: Option<DbId>,
    #[serde(default)]
    pub clear_treatment: bool,
    pub starts_at: Option<Timestamp>,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: Option<i32>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Filters for listing a salon's appointments.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentFilter {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub status: Option<String>,
    pub client_id: Option<DbId>,
}

/// An appointment joined with client, treatment and salon names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AppointmentSummary {
    pub id: DbId,
    pub salon_id: DbId,
    pub salon_name: String,
    pub client_id: DbId,
    pub client_name: String,
    pub treatment_id: Option<DbId>,
    pub treatment_name: Option<String>,
    pub starts_at: Timestamp,
    pub duration_minutes: i32,
    pub status: String,
    pub notes: Option<String>,
}
