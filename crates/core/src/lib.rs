//! Domain logic for the Atelier salon service.
//!
//! This crate has no database or HTTP dependencies. Everything here operates
//! on values handed in by the repository or handler layers, which keeps the
//! business rules (appointment status derivation, form schemas, token
//! issuance) testable in isolation.

pub mod appointment_status;
pub mod error;
pub mod form_delivery;
pub mod form_schema;
pub mod hashing;
pub mod roles;
pub mod types;
pub mod visit_photo;
