//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Query parameters for list endpoints that support an `include_inactive` flag.
///
/// Used by forms and treatments, which are deactivated rather than deleted
/// once in use.
#[derive(Debug, Deserialize)]
pub struct IncludeInactiveParams {
    #[serde(default)]
    pub include_inactive: bool,
}

/// `?search=` filter for client listings.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}
