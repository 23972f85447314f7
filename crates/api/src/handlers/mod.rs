//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers under `/salons/{salon_id}` first call
//! [`authorize_salon`](crate::middleware::tenant::authorize_salon), then
//! delegate to the salon-scoped repositories in `atelier_db` and map errors
//! via [`AppError`](crate::error::AppError).

pub mod appointment;
pub mod auth;
pub mod client;
pub mod client_form;
pub mod form;
pub mod portal;
pub mod public_form;
pub mod salon;
pub mod submission;
pub mod treatment;
pub mod visit_photo;
