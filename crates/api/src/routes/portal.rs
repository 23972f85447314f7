//! Route definitions for the client portal.

use axum::routing::get;
use axum::Router;

use crate::handlers::portal;
use crate::state::AppState;

/// Routes mounted at `/portal`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/appointments", get(portal::appointments))
        .route("/forms", get(portal::forms))
        .route("/submissions", get(portal::submissions))
}
