#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

use sessiond_api::config::ServerConfig;
use sessiond_api::router::build_app_router;
use sessiond_api::state::AppState;
use sessiond_core::clock::ManualClock;
use sessiond_core::network::ServerNetworkInfo;
use sessiond_core::store::SessionStore;

pub const SERVER_IP: &str = "192.168.50.10";
pub const SERVER_MAC: &str = "aa:bb:cc:dd:ee:ff";

/// Build a test `ServerConfig` with safe defaults.
///
/// Timestamps render in UTC so assertions do not depend on zone rules.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        display_timezone: chrono_tz::UTC,
        ..ServerConfig::default()
    }
}

/// Everything a test needs: the router plus direct handles on the store and
/// the clock behind it.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<SessionStore>,
    pub clock: Arc<ManualClock>,
    pub config: ServerConfig,
}

impl TestApp {
    /// A fresh router built with the production middleware stack over an
    /// isolated store whose clock starts at 2024-01-15 12:00:00 UTC.
    pub fn new() -> Self {
        let config = test_config();
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap(),
        ));
        let store = Arc::new(SessionStore::new(
            ServerNetworkInfo::new(SERVER_IP, SERVER_MAC),
            clock.clone(),
        ));
        let state = AppState {
            config: Arc::new(config.clone()),
            sessions: Arc::clone(&store),
        };
        let router = build_app_router(state, &config);
        Self {
            router,
            store,
            clock,
            config,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(request(Method::GET, uri, None, None)).await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response<Body> {
        self.send(request(Method::POST, uri, Some(body), None)).await
    }

    pub async fn post_empty(&self, uri: &str) -> Response<Body> {
        self.send(request(Method::POST, uri, None, None)).await
    }

    pub async fn patch_json(&self, uri: &str, body: serde_json::Value) -> Response<Body> {
        self.send(request(Method::PATCH, uri, Some(body), None)).await
    }

    pub async fn delete(&self, uri: &str) -> Response<Body> {
        self.send(request(Method::DELETE, uri, None, None)).await
    }

    /// Send a request carrying `cookie` as the `Cookie` header.
    pub async fn with_cookie(
        &self,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
        cookie: &str,
    ) -> Response<Body> {
        self.send(request(method, uri, body, Some(cookie))).await
    }

    /// Create a session through the explicit-id surface and return its id.
    pub async fn login(&self, email: &str, nickname: &str) -> String {
        let response = self
            .post_json(
                "/api/v1/sessions",
                serde_json::json!({ "email": email, "nickname": nickname }),
            )
            .await;
        assert_eq!(response.status(), axum::http::StatusCode::CREATED);
        let json = body_json(response).await;
        json["data"]["session_id"].as_str().unwrap().to_string()
    }
}

/// Build a request with an optional JSON body and optional cookie header.
pub fn request(
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    cookie: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// The `name=value` pair from the response's `Set-Cookie` header for `name`.
pub fn set_cookie_pair(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .find(|pair| pair.starts_with(&format!("{name}=")))
        .map(str::to_string)
}
