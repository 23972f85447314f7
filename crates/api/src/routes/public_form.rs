//! Public form delivery, mounted at the root next to `/health`.

use axum::routing::get;
use axum::Router;

use crate::handlers::public_form;
use crate::state::AppState;

/// ```text
/// GET  /f/{key}          -> show
/// POST /f/{key}          -> submit
/// GET  /f/{key}/success  -> success
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/f/{key}", get(public_form::show).post(public_form::submit))
        .route("/f/{key}/success", get(public_form::success))
}
