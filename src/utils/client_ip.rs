//! Client IP resolution.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// Resolves the client address of a request.
///
/// With `behind_proxy` the first valid address of `X-Forwarded-For`, then
/// `X-Real-IP`, wins; otherwise (or if neither parses) the socket peer is used.
/// Forwarding headers are ignored entirely when not behind a proxy, since any
/// client can set them.
pub fn resolve_client_ip(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    behind_proxy: bool,
) -> Option<IpAddr> {
    if behind_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok());

        if let Some(ip) = forwarded {
            return Some(ip);
        }

        let real_ip = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<IpAddr>().ok());

        if let Some(ip) = real_ip {
            return Some(ip);
        }
    }

    peer.map(|addr| addr.ip())
}
