//! Network metadata attached to sessions.
//!
//! Host discovery itself lives in the API crate; this module only holds the
//! value types, fallback sentinels and the pure client-origin rules.

use std::net::IpAddr;

use serde::Serialize;

/// Fallback server address when no non-loopback IPv4 interface is found.
pub const FALLBACK_SERVER_IP: &str = "0.0.0.0";

/// Fallback server hardware address.
pub const FALLBACK_SERVER_MAC: &str = "00:00:00:00:00:00";

/// Placeholder for client values the caller did not supply.
pub const UNKNOWN: &str = "unknown";

/// Address and hardware id of this host, resolved once per process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerNetworkInfo {
    pub ip: String,
    pub mac: String,
}

impl ServerNetworkInfo {
    pub fn new(ip: impl Into<String>, mac: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            mac: mac.into(),
        }
    }

    /// The sentinel pair used when host discovery fails.
    pub fn fallback() -> Self {
        Self::new(FALLBACK_SERVER_IP, FALLBACK_SERVER_MAC)
    }
}

impl Default for ServerNetworkInfo {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Determine the client's address for a new session.
///
/// Precedence: first entry of `X-Forwarded-For`, then the socket peer.
/// IPv4-mapped IPv6 addresses are unwrapped, and loopback or unspecified
/// addresses are replaced with the server's own address, since a client on
/// this host is reachable under that address.
pub fn resolve_client_address(
    forwarded_for: Option<&str>,
    peer: Option<IpAddr>,
    server: &ServerNetworkInfo,
) -> String {
    let forwarded = forwarded_for
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let candidate = match forwarded {
        Some(raw) => match raw.parse::<IpAddr>() {
            Ok(ip) => Some(ip),
            // Non-IP tokens (e.g. obfuscated identifiers) are kept verbatim.
            Err(_) => return raw.to_string(),
        },
        None => peer,
    };

    let Some(ip) = candidate.map(unmap_ipv4) else {
        return UNKNOWN.to_string();
    };

    if ip.is_loopback() || ip.is_unspecified() {
        server.ip.clone()
    } else {
        ip.to_string()
    }
}

fn unmap_ipv4(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6
            .to_ipv4_mapped()
            .map(IpAddr::V4)
            .unwrap_or(IpAddr::V6(v6)),
        v4 => v4,
    }
}

/// Normalize a caller-supplied hardware id, defaulting to [`UNKNOWN`].
pub fn normalize_client_mac(supplied: Option<&str>) -> String {
    supplied
        .map(str::trim)
        .filter(|mac| !mac.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN.to_string())
}
