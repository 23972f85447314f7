//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod appointment;
pub mod client;
pub mod client_form;
pub mod form;
pub mod salon;
pub mod session;
pub mod submission;
pub mod treatment;
pub mod user;
pub mod visit_photo;
