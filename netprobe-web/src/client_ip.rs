//! Client address and user-agent helpers.

use std::net::SocketAddr;

use actix_web::http::header::{HeaderMap, USER_AGENT};

/// Used when the peer address is unknown (e.g. in-process test requests).
const FALLBACK_IP: &str = "127.0.0.1";

/// Proxy headers consulted in order when `trust_proxy` is on.
const PROXY_HEADERS: [&str; 3] = ["cf-connecting-ip", "x-forwarded-for", "x-real-ip"];

/// Best-effort address of the requesting client.
///
/// Proxy headers are only honoured when `trust_proxy` is set; otherwise a
/// client could pick its own rate-limit key. `X-Forwarded-For` contributes its
/// first entry. IPv6 zone suffixes (`%eth0`) are removed.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    let from_proxy = trust_proxy
        .then(|| {
            PROXY_HEADERS.iter().find_map(|name| {
                let value = headers.get(*name)?.to_str().ok()?;
                let first = value.split(',').next()?.trim();
                (!first.is_empty()).then(|| first.to_string())
            })
        })
        .flatten();

    let ip = from_proxy
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| FALLBACK_IP.to_string());
    strip_zone(&ip).to_string()
}

fn strip_zone(ip: &str) -> &str {
    ip.split('%').next().unwrap_or(ip)
}

/// User agent header, or an empty string.
pub fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Command line HTTP clients get plain-text answers.
pub fn is_cli_user_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    ["curl", "wget", "httpie"].iter().any(|tool| ua.contains(tool))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use actix_web::http::header::{HeaderName, HeaderValue};

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        map
    }

    fn peer() -> Option<SocketAddr> {
        Some("203.0.113.9:51000".parse().unwrap())
    }

    #[test]
    fn test_peer_address_without_proxy_trust() {
        let map = headers(&[("x-forwarded-for", "198.51.100.1")]);
        assert_eq!(client_ip(&map, peer(), false), "203.0.113.9");
    }

    #[test]
    fn test_proxy_header_order() {
        let map = headers(&[
            ("x-real-ip", "198.51.100.3"),
            ("x-forwarded-for", "198.51.100.2, 10.0.0.1"),
            ("cf-connecting-ip", "198.51.100.1"),
        ]);
        assert_eq!(client_ip(&map, peer(), true), "198.51.100.1");

        let map = headers(&[
            ("x-real-ip", "198.51.100.3"),
            ("x-forwarded-for", "198.51.100.2, 10.0.0.1"),
        ]);
        assert_eq!(client_ip(&map, peer(), true), "198.51.100.2");

        let map = headers(&[("x-real-ip", "198.51.100.3")]);
        assert_eq!(client_ip(&map, peer(), true), "198.51.100.3");

        assert_eq!(client_ip(&HeaderMap::new(), peer(), true), "203.0.113.9");
    }

    #[test]
    fn test_zone_suffix_stripped() {
        let map = headers(&[("x-forwarded-for", "fe80::1%eth0")]);
        assert_eq!(client_ip(&map, None, true), "fe80::1");
    }

    #[test]
    fn test_fallback_without_peer() {
        assert_eq!(client_ip(&HeaderMap::new(), None, false), FALLBACK_IP);
    }

    #[test]
    fn test_cli_user_agents() {
        assert!(is_cli_user_agent("curl/8.4.0"));
        assert!(is_cli_user_agent("Wget/1.21.4"));
        assert!(is_cli_user_agent("HTTPie/3.2.2"));
        assert!(!is_cli_user_agent("Mozilla/5.0 (X11; Linux x86_64)"));
        assert!(!is_cli_user_agent(""));
    }
}
