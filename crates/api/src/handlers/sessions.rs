//! Handlers for the `/sessions` resource, addressed by explicit session id.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use sessiond_core::display::format_timestamp;
use sessiond_core::network::{normalize_client_mac, resolve_client_address};
use sessiond_core::session::{NewSession, SessionRecord, SessionSnapshot, SessionUpdate};
use sessiond_core::types::Timestamp;

use crate::error::AppResult;
use crate::extract::{session_cookie, AppJson, ClientOrigin};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for starting a session.
///
/// Every field is optional at the serde level; required fields are checked
/// by the store so that a missing field yields a `VALIDATION_ERROR`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateSessionRequest {
    #[serde(alias = "fullName")]
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub nickname: Option<String>,
    #[serde(alias = "macAddress")]
    pub mac_address: Option<String>,
}

/// Request body for a partial identity update.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateSessionRequest {
    #[serde(alias = "fullName")]
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub nickname: Option<String>,
}

impl From<UpdateSessionRequest> for SessionUpdate {
    fn from(input: UpdateSessionRequest) -> Self {
        Self {
            full_name: input.full_name,
            email: input.email,
            nickname: input.nickname,
        }
    }
}

/// A session as reported to clients, timestamps rendered in the display zone.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub full_name: String,
    pub email: String,
    pub nickname: String,
    pub client_ip: String,
    pub client_mac: String,
    pub server_ip: String,
    pub server_mac: String,
    pub created_at: String,
    pub last_accessed_at: String,
    /// Time since the session started, e.g. `1 hour, 1 minute, 1 second`.
    pub age: String,
    /// Time since the previous access.
    pub idle: String,
    pub age_ms: i64,
    pub idle_ms: i64,
}

impl SessionView {
    pub fn from_snapshot(snapshot: &SessionSnapshot, tz: Tz) -> Self {
        let record = &snapshot.record;
        Self {
            session_id: record.id.clone(),
            full_name: record.full_name.clone(),
            email: record.email.clone(),
            nickname: record.nickname.clone(),
            client_ip: record.client_ip.clone(),
            client_mac: record.client_mac.clone(),
            server_ip: record.server_ip.clone(),
            server_mac: record.server_mac.clone(),
            created_at: format_timestamp(record.created_at, tz),
            last_accessed_at: format_timestamp(record.last_accessed_at, tz),
            age: snapshot.age.to_string(),
            idle: snapshot.idle.to_string(),
            age_ms: snapshot.age.total_ms,
            idle_ms: snapshot.idle.total_ms,
        }
    }

    /// View of a record as of `now`.
    pub fn at(record: SessionRecord, now: Timestamp, tz: Tz) -> Self {
        Self::from_snapshot(&SessionSnapshot::observe(record, now), tz)
    }
}

/// Acknowledgement for a touch.
#[derive(Debug, Serialize)]
pub struct TouchResponse {
    pub session_id: String,
    pub last_accessed_at: String,
}

/// Acknowledgement for a logout.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub session_id: String,
    pub ended: bool,
}

// ---------------------------------------------------------------------------
// Shared operations (used by both identification surfaces)
// ---------------------------------------------------------------------------

/// Resolve client network hints and start a session.
///
/// When `active` names a live session the call fails with a conflict.
pub(crate) fn start_session(
    state: &AppState,
    origin: &ClientOrigin,
    input: CreateSessionRequest,
    active: Option<&str>,
) -> AppResult<SessionRecord> {
    let client_ip = resolve_client_address(
        origin.forwarded_for.as_deref(),
        origin.peer.map(|addr| addr.ip()),
        state.sessions.server_info(),
    );
    let client_mac = normalize_client_mac(
        input
            .mac_address
            .as_deref()
            .or(origin.mac_header.as_deref()),
    );

    let record = state.sessions.create_unless_active(
        active,
        NewSession {
            full_name: input.full_name,
            email: input.email,
            nickname: input.nickname,
            client_ip,
            client_mac,
        },
    )?;

    tracing::info!(
        session_id = %record.id,
        client_ip = %record.client_ip,
        "Session started"
    );
    Ok(record)
}

pub(crate) fn session_status(state: &AppState, id: &str) -> AppResult<SessionView> {
    let snapshot = state.sessions.status(id)?;
    Ok(SessionView::from_snapshot(
        &snapshot,
        state.config.display_timezone,
    ))
}

pub(crate) fn touch_session(state: &AppState, id: &str) -> AppResult<TouchResponse> {
    let last_accessed_at = state.sessions.touch(id)?;
    tracing::debug!(session_id = %id, "Session touched");
    Ok(TouchResponse {
        session_id: id.to_string(),
        last_accessed_at: format_timestamp(last_accessed_at, state.config.display_timezone),
    })
}

pub(crate) fn update_session(
    state: &AppState,
    id: &str,
    input: UpdateSessionRequest,
) -> AppResult<SessionView> {
    let record = state.sessions.update(id, input.into())?;
    tracing::info!(session_id = %id, "Session updated");
    Ok(SessionView::at(
        record,
        state.sessions.now(),
        state.config.display_timezone,
    ))
}

pub(crate) fn end_session(state: &AppState, id: &str) -> AppResult<LogoutResponse> {
    let record = state.sessions.destroy(id)?;
    tracing::info!(session_id = %record.id, "Session ended");
    Ok(LogoutResponse {
        session_id: record.id,
        ended: true,
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/sessions
///
/// Start a session. Returns 201 with the stored record and also sets the
/// session cookie so the cookie surface can pick it up.
pub async fn create(
    State(state): State<AppState>,
    origin: ClientOrigin,
    jar: CookieJar,
    AppJson(input): AppJson<CreateSessionRequest>,
) -> AppResult<(StatusCode, CookieJar, Json<DataResponse<SessionView>>)> {
    let record = start_session(&state, &origin, input, None)?;
    let jar = jar.add(session_cookie(&state.config, record.id.clone()));
    let view = SessionView::at(
        record,
        state.sessions.now(),
        state.config.display_timezone,
    );
    Ok((StatusCode::CREATED, jar, Json(DataResponse { data: view })))
}

/// GET /api/v1/sessions
///
/// Snapshot of every active session. Never refreshes any of them.
pub async fn list(State(state): State<AppState>) -> Json<DataResponse<Vec<SessionView>>> {
    let tz = state.config.display_timezone;
    let views = state
        .sessions
        .list()
        .iter()
        .map(|snapshot| SessionView::from_snapshot(snapshot, tz))
        .collect();
    Json(DataResponse { data: views })
}

/// GET /api/v1/sessions/{id}
///
/// Session status. Refreshes the session's last access.
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<SessionView>>> {
    let view = session_status(&state, &id)?;
    Ok(Json(DataResponse { data: view }))
}

/// POST /api/v1/sessions/{id}/touch
pub async fn touch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<TouchResponse>>> {
    let ack = touch_session(&state, &id)?;
    Ok(Json(DataResponse { data: ack }))
}

/// PATCH /api/v1/sessions/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(input): AppJson<UpdateSessionRequest>,
) -> AppResult<Json<DataResponse<SessionView>>> {
    let view = update_session(&state, &id, input)?;
    Ok(Json(DataResponse { data: view }))
}

/// DELETE /api/v1/sessions/{id}
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<LogoutResponse>>> {
    let ack = end_session(&state, &id)?;
    Ok(Json(DataResponse { data: ack }))
}
