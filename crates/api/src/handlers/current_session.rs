//! Handlers for the `/session` resource: the caller's own session, identified
//! by the session cookie instead of an explicit id.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use sessiond_core::error::CoreError;

use crate::error::{AppError, AppResult};
use crate::extract::{
    removal_cookie, session_cookie, session_id_from_cookie, AppJson, ClientOrigin,
};
use crate::handlers::sessions::{
    end_session, session_status, start_session, touch_session, update_session,
    CreateSessionRequest, LogoutResponse, SessionView, TouchResponse, UpdateSessionRequest,
};
use crate::response::DataResponse;
use crate::state::AppState;

/// Session id from the cookie, or `SessionNotFound` when there is none.
fn require_session_id(state: &AppState, jar: &CookieJar) -> AppResult<String> {
    session_id_from_cookie(jar, &state.config).ok_or_else(|| {
        AppError::Core(CoreError::SessionNotFound { id: String::new() })
    })
}

/// POST /api/v1/session
///
/// Start a session bound to a cookie. Rejected with 409 while the cookie
/// still names an active session; a cookie naming an expired session is
/// simply replaced.
pub async fn login(
    State(state): State<AppState>,
    origin: ClientOrigin,
    jar: CookieJar,
    AppJson(input): AppJson<CreateSessionRequest>,
) -> AppResult<(StatusCode, CookieJar, Json<DataResponse<SessionView>>)> {
    let active = session_id_from_cookie(&jar, &state.config);
    let record = start_session(&state, &origin, input, active.as_deref())?;
    let jar = jar.add(session_cookie(&state.config, record.id.clone()));
    let view = SessionView::at(
        record,
        state.sessions.now(),
        state.config.display_timezone,
    );
    Ok((StatusCode::CREATED, jar, Json(DataResponse { data: view })))
}

/// GET /api/v1/session
pub async fn status(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<Json<DataResponse<SessionView>>> {
    let id = require_session_id(&state, &jar)?;
    let view = session_status(&state, &id)?;
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/session/touch
pub async fn touch(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<Json<DataResponse<TouchResponse>>> {
    let id = require_session_id(&state, &jar)?;
    let ack = touch_session(&state, &id)?;
    Ok(Json(DataResponse { data: ack }))
}

/// PATCH /api/v1/session
pub async fn update(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(input): AppJson<UpdateSessionRequest>,
) -> AppResult<Json<DataResponse<SessionView>>> {
    let id = require_session_id(&state, &jar)?;
    let view = update_session(&state, &id, input)?;
    Ok(Json(DataResponse { data: view }))
}

/// DELETE /api/v1/session
///
/// Logout. The cookie is cleared whether or not the session was still
/// active, so a stale cookie does not linger after a 404.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<DataResponse<LogoutResponse>>), (CookieJar, AppError)> {
    let cleared = jar.clone().remove(removal_cookie(&state.config));

    let result = require_session_id(&state, &jar).and_then(|id| end_session(&state, &id));
    match result {
        Ok(ack) => Ok((cleared, Json(DataResponse { data: ack }))),
        Err(e) => Err((cleared, e)),
    }
}
