use std::sync::Arc;

use sessiond_core::store::SessionStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (cookie settings, display zone).
    pub config: Arc<ServerConfig>,
    /// The single session store shared with the reaper task.
    pub sessions: Arc<SessionStore>,
}
