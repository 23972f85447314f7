//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireOwner`] -- Requires the `owner` role.
//! - [`rbac::RequireClient`] -- Requires the `client` role.
//! - [`tenant::authorize_salon`] -- Resolves a salon and checks the caller owns it.

pub mod auth;
pub mod rbac;
pub mod tenant;
