//! Request extractors for JSON bodies, client origin and cookie-based
//! session identity.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequest, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::config::ServerConfig;
use crate::error::AppError;

/// Header clients may use to report their hardware address.
pub const CLIENT_MAC_HEADER: &str = "x-client-mac";

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// `axum::Json` whose rejections are reported as [`AppError::BadRequest`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Raw network hints about the caller, gathered from the request.
///
/// Never rejects: every field is optional and resolved later against the
/// server's own address.
#[derive(Debug, Clone, Default)]
pub struct ClientOrigin {
    pub forwarded_for: Option<String>,
    pub peer: Option<SocketAddr>,
    pub mac_header: Option<String>,
}

impl<S> FromRequestParts<S> for ClientOrigin
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // ConnectInfo is only present when served via
        // `into_make_service_with_connect_info`.
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(Self {
            forwarded_for: header_str(&parts.headers, FORWARDED_FOR_HEADER),
            peer,
            mac_header: header_str(&parts.headers, CLIENT_MAC_HEADER),
        })
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Session id carried by the configured cookie, if any.
pub fn session_id_from_cookie(jar: &CookieJar, config: &ServerConfig) -> Option<String> {
    jar.get(&config.session_cookie_name)
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|id| !id.is_empty())
}

/// Build the cookie that binds a browser to `session_id`.
pub fn session_cookie(config: &ServerConfig, session_id: String) -> Cookie<'static> {
    Cookie::build((config.session_cookie_name.clone(), session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(
            i64::try_from(config.session_cookie_max_age_secs).unwrap_or(i64::MAX),
        ))
        .build()
}

/// Cookie used to clear the session cookie on logout.
pub fn removal_cookie(config: &ServerConfig) -> Cookie<'static> {
    Cookie::build((config.session_cookie_name.clone(), ""))
        .path("/")
        .build()
}
