//! Route definitions for the `/salons` resource.
//!
//! Every salon-owned resource is nested under `/salons/{salon_id}/...`.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{
    appointment, client, client_form, form, salon, submission, treatment, visit_photo,
};
use crate::state::AppState;

/// Room for multipart framing and the caption on top of the photo itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Routes mounted at `/salons`.
///
/// ```text
/// GET    /                                          -> list
/// POST   /                                          -> create
/// GET    /{salon_id}                                -> get_by_id
/// PUT    /{salon_id}                                -> update
/// DELETE /{salon_id}                                -> delete
/// ```
///
/// See [`crate::routes::api_routes`] for the nested resources.
pub fn router(max_photo_bytes: usize) -> Router<AppState> {
    let client_routes = Router::new()
        .route("/", get(client::list).post(client::create))
        .route(
            "/{id}",
            get(client::get_by_id)
                .put(client::update)
                .delete(client::delete),
        )
        .route("/{id}/portal-access", post(client::grant_portal_access))
        .route(
            "/{id}/forms",
            get(client_form::list_by_client).post(client_form::assign),
        )
        .route(
            "/{id}/submissions",
            get(submission::list_by_client).post(submission::staff_fill),
        )
        .route("/{id}/appointments", get(client::list_appointments));

    let form_routes = Router::new()
        .route("/", get(form::list).post(form::create))
        .route(
            "/{id}",
            get(form::get_by_id).put(form::update).delete(form::delete),
        )
        .route("/{id}/widgets", get(form::widgets))
        .route("/{id}/submissions", get(form::list_submissions));

    let treatment_routes = Router::new()
        .route("/", get(treatment::list).post(treatment::create))
        .route(
            "/{id}",
            get(treatment::get_by_id)
                .put(treatment::update)
                .delete(treatment::delete),
        )
        .route(
            "/{id}/forms",
            get(treatment::list_forms).put(treatment::set_forms),
        );

    let appointment_routes = Router::new()
        .route("/", get(appointment::list).post(appointment::create))
        .route("/sync", post(appointment::sync_batch))
        .route(
            "/{id}",
            get(appointment::get_by_id)
                .put(appointment::update)
                .delete(appointment::delete),
        )
        .route("/{id}/sync", post(appointment::sync_one))
        .route(
            "/{id}/photos",
            get(visit_photo::list).post(visit_photo::upload).layer(
                DefaultBodyLimit::max(max_photo_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES)),
            ),
        )
        .route(
            "/{id}/photos/{photo_id}",
            get(visit_photo::download).delete(visit_photo::delete),
        );

    Router::new()
        .route("/", get(salon::list).post(salon::create))
        .route(
            "/{salon_id}",
            get(salon::get_by_id)
                .put(salon::update)
                .delete(salon::delete),
        )
        .nest("/{salon_id}/clients", client_routes)
        .route("/{salon_id}/client-forms/{id}", delete(client_form::delete))
        .nest("/{salon_id}/forms", form_routes)
        .route(
            "/{salon_id}/submissions/{id}",
            get(submission::get_by_id).delete(submission::delete),
        )
        .nest("/{salon_id}/treatments", treatment_routes)
        .nest("/{salon_id}/appointments", appointment_routes)
}
