//! Appointment lifecycle status and its derivation from form coverage.
//!
//! An appointment that is not terminal is `pending_forms` while its client is
//! missing a submission for at least one active form the treatment requires,
//! and `scheduled` otherwise. The database does not enforce this; the API
//! layer re-derives it with [`derive_status`] after submission events and on
//! read paths.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const STATUS_SCHEDULED: &str = "scheduled";
pub const STATUS_PENDING_FORMS: &str = "pending_forms";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_CANCELLED: &str = "cancelled";

/// All valid appointment status strings.
pub const VALID_APPOINTMENT_STATUSES: &[&str] = &[
    STATUS_SCHEDULED,
    STATUS_PENDING_FORMS,
    STATUS_COMPLETED,
    STATUS_CANCELLED,
];

// ---------------------------------------------------------------------------
// Enum
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    PendingForms,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            STATUS_SCHEDULED => Ok(Self::Scheduled),
            STATUS_PENDING_FORMS => Ok(Self::PendingForms),
            STATUS_COMPLETED => Ok(Self::Completed),
            STATUS_CANCELLED => Ok(Self::Cancelled),
            _ => Err(format!(
                "Invalid appointment status '{s}'. Must be one of: {}",
                VALID_APPOINTMENT_STATUSES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => STATUS_SCHEDULED,
            Self::PendingForms => STATUS_PENDING_FORMS,
            Self::Completed => STATUS_COMPLETED,
            Self::Cancelled => STATUS_CANCELLED,
        }
    }

    /// Terminal statuses are never overwritten by synchronization.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Status to use when inserting a new appointment.
///
/// Only looks at whether the treatment requires any active form; coverage by
/// existing submissions is picked up by the first synchronization.
pub fn initial_status(required_form_count: usize) -> AppointmentStatus {
    if required_form_count == 0 {
        AppointmentStatus::Scheduled
    } else {
        AppointmentStatus::PendingForms
    }
}

/// Form ids from `required` that have no entry in `submitted`.
///
/// Order follows `required`; duplicates in either slice are ignored.
pub fn missing_form_ids(required: &[DbId], submitted: &[DbId]) -> Vec<DbId> {
    let submitted: HashSet<DbId> = submitted.iter().copied().collect();
    let mut seen = HashSet::new();
    required
        .iter()
        .copied()
        .filter(|id| !submitted.contains(id) && seen.insert(*id))
        .collect()
}

/// Compute the status an appointment should have.
///
/// `required` must already be restricted to active forms. Terminal statuses
/// are returned unchanged regardless of coverage.
pub fn derive_status(
    current: AppointmentStatus,
    required: &[DbId],
    submitted: &[DbId],
) -> AppointmentStatus {
    if current.is_terminal() {
        return current;
    }
    if missing_form_ids(required, submitted).is_empty() {
        AppointmentStatus::Scheduled
    } else {
        AppointmentStatus::PendingForms
    }
}

/// Validate a status string supplied by a caller.
pub fn validate_appointment_status(status: &str) -> Result<(), String> {
    AppointmentStatus::from_str_value(status).map(|_| ())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
