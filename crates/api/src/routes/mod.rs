pub mod auth;
pub mod health;
pub mod portal;
pub mod public_form;
pub mod salon;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register owner + first salon (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
/// /auth/me                                         current user
///
/// /salons                                          list, create (owner)
/// /salons/{salon_id}                               get, update, delete
/// /salons/{salon_id}/clients                       list (?search=), create
/// /salons/{salon_id}/clients/{id}                  get, update, delete
/// /salons/{salon_id}/clients/{id}/portal-access    link a portal login (POST)
/// /salons/{salon_id}/clients/{id}/forms            list, assign
/// /salons/{salon_id}/clients/{id}/submissions      list, staff fill
/// /salons/{salon_id}/clients/{id}/appointments     list (synced)
/// /salons/{salon_id}/client-forms/{id}             delete
/// /salons/{salon_id}/forms                         list (?include_inactive=), create
/// /salons/{salon_id}/forms/{id}                    get, update, delete
/// /salons/{salon_id}/forms/{id}/widgets            rendered widgets
/// /salons/{salon_id}/forms/{id}/submissions        list
/// /salons/{salon_id}/submissions/{id}              get, delete
/// /salons/{salon_id}/treatments                    list (?include_inactive=), create
/// /salons/{salon_id}/treatments/{id}               get, update, delete
/// /salons/{salon_id}/treatments/{id}/forms         list, replace
/// /salons/{salon_id}/appointments                  list (filters, synced), create
/// /salons/{salon_id}/appointments/sync             batch sync (POST)
/// /salons/{salon_id}/appointments/{id}             get, update, delete
/// /salons/{salon_id}/appointments/{id}/sync        sync one (POST)
/// /salons/{salon_id}/appointments/{id}/photos      list, upload (multipart)
/// /salons/{salon_id}/appointments/{id}/photos/{photo_id}  download, delete
///
/// /portal/appointments                             own appointments (client role)
/// /portal/forms                                    own pending assignments
/// /portal/submissions                              own submissions
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        // Authentication routes (register, login, refresh, logout, me).
        .nest("/auth", auth::router())
        // Salon-scoped resources.
        .nest("/salons", salon::router(config.max_photo_bytes))
        // Client portal.
        .nest("/portal", portal::router())
}
