//! Route definitions for the `/sessions` and `/session` resources.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{current_session, sessions};
use crate::state::AppState;

/// Routes addressed by explicit session id, mounted at `/sessions`.
///
/// ```text
/// POST   /              -> create
/// GET    /              -> list
/// GET    /{id}          -> status (refreshes)
/// PATCH  /{id}          -> update
/// DELETE /{id}          -> destroy
/// POST   /{id}/touch    -> touch
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(sessions::create).get(sessions::list))
        .route(
            "/{id}",
            get(sessions::status)
                .patch(sessions::update)
                .delete(sessions::destroy),
        )
        .route("/{id}/touch", post(sessions::touch))
}

/// Routes for the caller's own session (cookie), mounted at `/session`.
///
/// ```text
/// POST   /        -> login
/// GET    /        -> status (refreshes)
/// PATCH  /        -> update
/// DELETE /        -> logout
/// POST   /touch   -> touch
/// ```
pub fn current_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(current_session::login)
                .get(current_session::status)
                .patch(current_session::update)
                .delete(current_session::logout),
        )
        .route("/touch", post(current_session::touch))
}
