//! Client identification utilities
//!
//! Request metadata recorded in login history and audit logs.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{HeaderMap, header, request::Parts};

/// Longest User-Agent kept; anything beyond is truncated.
pub const MAX_USER_AGENT_LEN: usize = 512;

/// Where the client address is taken from.
///
/// Installed as a request extension by the server. Without one the extractor
/// uses the socket peer and ignores `X-Forwarded-For`, which any client can set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClientIpSource {
    #[default]
    Peer,
    /// Behind one trusted reverse proxy: the right-most `X-Forwarded-For` hop
    /// is the address that proxy saw.
    ForwardedFor,
}

impl ClientIpSource {
    pub fn from_trust(trust_forwarded_for: bool) -> Self {
        if trust_forwarded_for {
            Self::ForwardedFor
        } else {
            Self::Peer
        }
    }
}

/// Network origin and client string of the current request.
///
/// Works as an extractor. The peer address comes from `ConnectInfo` when the
/// server was started with connect info and is `None` otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip: Option<IpAddr>,
    pub user_agent: String,
}

impl ClientInfo {
    pub fn new(ip: Option<IpAddr>, user_agent: impl Into<String>) -> Self {
        Self {
            ip,
            user_agent: user_agent.into(),
        }
    }

    pub fn from_headers(
        headers: &HeaderMap,
        direct_ip: Option<IpAddr>,
        source: ClientIpSource,
    ) -> Self {
        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|ua| ua.chars().take(MAX_USER_AGENT_LEN).collect())
            .unwrap_or_default();

        Self {
            ip: extract_client_ip(headers, direct_ip, source),
            user_agent,
        }
    }

    /// IP as string (for database storage)
    pub fn ip_string(&self) -> Option<String> {
        self.ip.map(|ip| ip.to_string())
    }

    /// Throttle bucket for anonymous callers.
    pub fn rate_limit_key(&self) -> String {
        self.ip_string().unwrap_or_else(|| "unknown".to_string())
    }
}

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let direct_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        let source = parts
            .extensions
            .get::<ClientIpSource>()
            .copied()
            .unwrap_or_default();
        Ok(Self::from_headers(&parts.headers, direct_ip, source))
    }
}

/// Client IP per `source`, falling back to the direct peer.
pub fn extract_client_ip(
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
    source: ClientIpSource,
) -> Option<IpAddr> {
    match source {
        ClientIpSource::Peer => direct_ip,
        ClientIpSource::ForwardedFor => last_forwarded_hop(headers).or(direct_ip),
    }
}

fn last_forwarded_hop(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|xff| xff.split(','))
        .last()
        .and_then(|hop| hop.trim().parse::<IpAddr>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 Test Browser"),
        );

        let info = ClientInfo::from_headers(&headers, None, ClientIpSource::Peer);
        assert_eq!(info.user_agent, "Mozilla/5.0 Test Browser");
        assert_eq!(info.ip, None);
        assert_eq!(info.rate_limit_key(), "unknown");
    }

    #[test]
    fn test_missing_user_agent_is_empty() {
        let info = ClientInfo::from_headers(&HeaderMap::new(), None, ClientIpSource::Peer);
        assert!(info.user_agent.is_empty());
    }

    fn spoofed_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("6.6.6.6, 203.0.113.9"),
        );
        headers
    }

    #[test]
    fn test_forwarded_for_ignored_by_default() {
        let direct: IpAddr = "127.0.0.1".parse().unwrap();
        let ip = extract_client_ip(&spoofed_headers(), Some(direct), ClientIpSource::default());
        assert_eq!(ip, Some(direct));
    }

    #[test]
    fn test_trusted_proxy_uses_rightmost_hop() {
        let direct: IpAddr = "127.0.0.1".parse().unwrap();
        let ip = extract_client_ip(&spoofed_headers(), Some(direct), ClientIpSource::ForwardedFor);
        assert_eq!(ip, Some("203.0.113.9".parse().unwrap()));

        let mut headers = spoofed_headers();
        headers.append("x-forwarded-for", HeaderValue::from_static("198.51.100.4"));
        let ip = extract_client_ip(&headers, Some(direct), ClientIpSource::ForwardedFor);
        assert_eq!(ip, Some("198.51.100.4".parse().unwrap()));
    }

    #[test]
    fn test_unparseable_hop_falls_back_to_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("1.2.3.4, garbage"));
        let direct: IpAddr = "127.0.0.1".parse().unwrap();
        let ip = extract_client_ip(&headers, Some(direct), ClientIpSource::ForwardedFor);
        assert_eq!(ip, Some(direct));
        assert_eq!(
            extract_client_ip(&HeaderMap::new(), Some(direct), ClientIpSource::ForwardedFor),
            Some(direct)
        );
    }

    #[tokio::test]
    async fn test_extractor_reads_connect_info() {
        let mut request = axum::http::Request::new(());
        let addr: SocketAddr = "10.1.2.3:4000".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));
        let (mut parts, _) = request.into_parts();

        let info = ClientInfo::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(info.ip_string().as_deref(), Some("10.1.2.3"));
    }

    #[tokio::test]
    async fn test_extractor_honors_source_extension() {
        let addr: SocketAddr = "10.1.2.3:4000".parse().unwrap();
        let build = |source: Option<ClientIpSource>| {
            let mut request = axum::http::Request::new(());
            *request.headers_mut() = spoofed_headers();
            request.extensions_mut().insert(ConnectInfo(addr));
            if let Some(source) = source {
                request.extensions_mut().insert(source);
            }
            request.into_parts().0
        };

        let info = ClientInfo::from_request_parts(&mut build(None), &()).await.unwrap();
        assert_eq!(info.ip_string().as_deref(), Some("10.1.2.3"));

        let info = ClientInfo::from_request_parts(&mut build(Some(ClientIpSource::ForwardedFor)), &())
            .await
            .unwrap();
        assert_eq!(info.ip_string().as_deref(), Some("203.0.113.9"));
    }
}
