//! `ClientOrigin` extractor: the caller's network address and user agent.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::request::Parts;

/// Where a request came from, as recorded in audit entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientOrigin {
    /// First `X-Forwarded-For` hop, else `X-Real-IP`, else the peer address.
    pub ip_address: Option<String>,
    /// `User-Agent` header.
    pub user_agent: Option<String>,
}

impl ClientOrigin {
    /// Resolve the origin from request parts.
    pub fn from_parts(parts: &Parts) -> Self {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Self {
            ip_address: forwarded_ip(&parts.headers).or(peer),
            user_agent: header_text(&parts.headers, "user-agent"),
        }
    }
}

impl<S> FromRequestParts<S> for ClientOrigin
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    header_text(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next().map(|hop| hop.trim().to_string()))
        .filter(|hop| !hop.is_empty())
        .or_else(|| header_text(headers, "x-real-ip"))
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/api/portal/shipment");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        parts
            .extensions
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 50000))));
        parts
    }

    #[test]
    fn test_forwarded_first_hop_wins() {
        let origin = ClientOrigin::from_parts(&parts(&[
            ("x-forwarded-for", "203.0.113.9, 10.0.0.1"),
            ("x-real-ip", "198.51.100.1"),
        ]));
        assert_eq!(origin.ip_address.as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn test_real_ip_then_peer() {
        let origin = ClientOrigin::from_parts(&parts(&[("x-real-ip", "198.51.100.1")]));
        assert_eq!(origin.ip_address.as_deref(), Some("198.51.100.1"));

        let origin = ClientOrigin::from_parts(&parts(&[("user-agent", "broker-sync/2.1")]));
        assert_eq!(origin.ip_address.as_deref(), Some("127.0.0.1"));
        assert_eq!(origin.user_agent.as_deref(), Some("broker-sync/2.1"));
    }
}
