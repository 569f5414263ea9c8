//! Caller identification for per-client throttling

use axum::http::HeaderMap;
use std::net::IpAddr;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Address of the calling client
///
/// The socket peer is the client unless it is one of `trusted_proxies`. For
/// a trusted peer, `X-Forwarded-For` is read right to left and the first hop
/// that is not itself a trusted proxy wins. A hop that does not parse ends
/// the walk and the peer address is used.
pub fn extract_client_ip(
    headers: &HeaderMap,
    peer: Option<IpAddr>,
    trusted_proxies: &[IpAddr],
) -> Option<IpAddr> {
    let peer = peer?;
    if !trusted_proxies.contains(&peer) {
        return Some(peer);
    }

    let hops: Vec<&str> = headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .collect();

    for hop in hops.iter().rev() {
        match hop.parse::<IpAddr>() {
            Ok(ip) if trusted_proxies.contains(&ip) => continue,
            Ok(ip) => return Some(ip),
            Err(_) => break,
        }
    }
    Some(peer)
}

/// Rate-limit key for a client, `"unknown"` when no address is available
pub fn client_key(headers: &HeaderMap, peer: Option<IpAddr>, trusted_proxies: &[IpAddr]) -> String {
    extract_client_ip(headers, peer, trusted_proxies)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn forwarded(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_untrusted_peer_ignores_forwarded_for() {
        let headers = forwarded("192.168.1.1");
        let peer = ip("203.0.113.9");

        assert_eq!(extract_client_ip(&headers, Some(peer), &[]), Some(peer));
        assert_eq!(
            extract_client_ip(&headers, Some(peer), &[ip("10.0.0.1")]),
            Some(peer)
        );
    }

    #[test]
    fn test_trusted_proxy_uses_nearest_untrusted_hop() {
        let proxies = [ip("10.0.0.1"), ip("10.0.0.2")];
        // Client-supplied first entry is never consulted
        let headers = forwarded("1.2.3.4, 198.51.100.7, 10.0.0.2");

        assert_eq!(
            extract_client_ip(&headers, Some(ip("10.0.0.1")), &proxies),
            Some(ip("198.51.100.7"))
        );
    }

    #[test]
    fn test_trusted_proxy_without_header_or_garbage() {
        let proxy = ip("10.0.0.1");

        assert_eq!(
            extract_client_ip(&HeaderMap::new(), Some(proxy), &[proxy]),
            Some(proxy)
        );
        assert_eq!(
            extract_client_ip(&forwarded("not-an-ip"), Some(proxy), &[proxy]),
            Some(proxy)
        );
    }

    #[test]
    fn test_client_key_unknown() {
        assert_eq!(client_key(&forwarded("192.168.1.1"), None, &[]), "unknown");
    }
}
