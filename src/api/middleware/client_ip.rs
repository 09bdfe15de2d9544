//! Client IP resolution middleware and extractor.

use axum::{
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::{Extensions, request::Parts},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::utils::client_ip::resolve_client_ip;

/// Client address resolved once per request.
///
/// `None` when neither forwarding headers nor the socket peer are available
/// (for example in tests that skip `ConnectInfo`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub Option<IpAddr>);

impl ClientIp {
    /// Key used by the limiters. Requests without an address share one bucket.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ClientIp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ip) => write!(f, "{}", ip),
            None => f.write_str("unknown"),
        }
    }
}

/// Whether forwarding headers are trusted.
#[derive(Debug, Clone, Copy)]
pub struct ClientIpConfig {
    pub behind_proxy: bool,
}

fn peer_addr(extensions: &Extensions) -> Option<SocketAddr> {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr)
}

/// Resolves the client IP and stores it in request extensions for every
/// later layer and handler.
pub async fn layer(
    State(config): State<ClientIpConfig>,
    mut req: Request,
    next: Next,
) -> Response {
    let peer = peer_addr(req.extensions());
    let ip = resolve_client_ip(req.headers(), peer, config.behind_proxy);
    req.extensions_mut().insert(ClientIp(ip));
    next.run(req).await
}

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ip) = parts.extensions.get::<ClientIp>() {
            return Ok(*ip);
        }
        // Layer not installed: fall back to the socket peer only
        Ok(ClientIp(peer_addr(&parts.extensions).map(|addr| addr.ip())))
    }
}
