//! Discovery of this host's network identity.
//!
//! Runs once at startup. Failures never abort the process: they are logged
//! and the sentinel values from [`ServerNetworkInfo::fallback`] are used.

use std::net::IpAddr;

use sessiond_core::network::{ServerNetworkInfo, FALLBACK_SERVER_MAC};

#[derive(Debug, thiserror::Error)]
pub enum NetworkInfoError {
    #[error("failed to enumerate network interfaces: {0}")]
    Interfaces(#[from] local_ip_address::Error),

    #[error("no non-loopback IPv4 interface found")]
    NoIpv4Interface,

    #[error("failed to read hardware address of '{interface}': {source}")]
    HardwareAddress {
        interface: String,
        source: mac_address::MacAddressError,
    },

    #[error("interface '{0}' has no hardware address")]
    NoHardwareAddress(String),
}

/// Resolve the first non-loopback IPv4 address and the hardware address of
/// the same interface, degrading to sentinels on failure.
pub fn resolve_server_network_info() -> ServerNetworkInfo {
    let (interface, ip) = match first_external_ipv4() {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(error = %e, "Server network info unavailable, using fallback");
            return ServerNetworkInfo::fallback();
        }
    };

    let mac = match hardware_address(&interface) {
        Ok(mac) => mac,
        Err(e) => {
            tracing::warn!(error = %e, "Server hardware address unavailable, using fallback");
            FALLBACK_SERVER_MAC.to_string()
        }
    };

    tracing::info!(%interface, %ip, %mac, "Resolved server network info");
    ServerNetworkInfo::new(ip.to_string(), mac)
}

fn first_external_ipv4() -> Result<(String, IpAddr), NetworkInfoError> {
    pick_external_ipv4(local_ip_address::list_afinet_netifas()?)
}

/// First interface carrying a routable IPv4 address, in enumeration order.
fn pick_external_ipv4(
    interfaces: Vec<(String, IpAddr)>,
) -> Result<(String, IpAddr), NetworkInfoError> {
    interfaces
        .into_iter()
        .find(|(_, ip)| ip.is_ipv4() && !ip.is_loopback() && !ip.is_unspecified())
        .ok_or(NetworkInfoError::NoIpv4Interface)
}

fn hardware_address(interface: &str) -> Result<String, NetworkInfoError> {
    mac_address::mac_address_by_name(interface)
        .map_err(|source| NetworkInfoError::HardwareAddress {
            interface: interface.to_string(),
            source,
        })?
        .map(|mac| mac.to_string().to_lowercase())
        .ok_or_else(|| NetworkInfoError::NoHardwareAddress(interface.to_string()))
}
