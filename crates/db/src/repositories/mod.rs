//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Salon-owned rows are always
//! queried with their `salon_id`, so an id belonging to another tenant
//! behaves exactly like a missing row.

pub mod appointment_repo;
pub mod client_form_repo;
pub mod client_repo;
pub mod form_repo;
pub mod salon_repo;
pub mod session_repo;
pub mod submission_repo;
pub mod treatment_repo;
pub mod user_repo;
pub mod visit_photo_repo;

pub use appointment_repo::AppointmentRepo;
pub use client_form_repo::ClientFormRepo;
pub use client_repo::ClientRepo;
pub use form_repo::FormRepo;
pub use salon_repo::SalonRepo;
pub use session_repo::SessionRepo;
pub use submission_repo::SubmissionRepo;
pub use treatment_repo::TreatmentRepo;
pub use user_repo::UserRepo;
pub use visit_photo_repo::VisitPhotoRepo;
