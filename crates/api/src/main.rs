use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sessiond_api::background::session_reaper::{self, SessionReaper};
use sessiond_api::config::ServerConfig;
use sessiond_api::network::resolve_server_network_info;
use sessiond_api::router::build_app_router;
use sessiond_api::state::AppState;
use sessiond_core::clock::SystemClock;
use sessiond_core::store::SessionStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sessiond_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    tracing::info!(
        host = %config.host,
        port = %config.port,
        idle_timeout_secs = config.session_idle_timeout_secs,
        sweep_interval_secs = config.session_sweep_interval_secs,
        timezone = %config.display_timezone,
        "Loaded server configuration"
    );

    // --- Session store ---
    let server_info = resolve_server_network_info();
    let sessions = Arc::new(SessionStore::new(server_info, Arc::new(SystemClock)));

    // --- Reaper ---
    let reaper_cancel = CancellationToken::new();
    let reaper_handle = session_reaper::spawn(
        SessionReaper::from_config(Arc::clone(&sessions), &config),
        reaper_cancel.clone(),
    );

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        sessions: Arc::clone(&sessions),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    // ConnectInfo gives handlers the peer address for client origin.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    reaper_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), reaper_handle).await;
    tracing::info!(
        dropped_sessions = sessions.len(),
        "Session reaper stopped"
    );

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
