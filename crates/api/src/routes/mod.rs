pub mod health;
pub mod sessions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /sessions                  create, list
/// /sessions/{id}             status, update, destroy
/// /sessions/{id}/touch       touch
///
/// /session                   login, status, update, logout (cookie)
/// /session/touch             touch (cookie)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/sessions", sessions::router())
        .nest("/session", sessions::current_router())
}
