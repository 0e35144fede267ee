//! Request metadata extraction from HTTP headers.
//!
//! `X-Forwarded-*` headers are only honoured when the service is configured
//! as running behind a trusted reverse proxy (`BEHIND_PROXY`).

use crate::AppError;
use axum::http::{HeaderMap, header};
use serde_json::json;
use std::net::SocketAddr;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_FORWARDED_HOST: &str = "x-forwarded-host";
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
const X_REAL_IP: &str = "x-real-ip";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Builds the base URL the client used to reach the service, with a trailing slash.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if:
/// - The `Host` header is missing
/// - The header value contains invalid UTF-8
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert(header::HOST, "s.example.com:8080".parse().unwrap());
///
/// let base = request_base_url(&headers, false).unwrap();
/// assert_eq!(base, "http://s.example.com:8080/");
/// ```
pub fn request_base_url(headers: &HeaderMap, behind_proxy: bool) -> Result<String, AppError> {
    let forwarded_host = behind_proxy
        .then(|| header_str(headers, X_FORWARDED_HOST))
        .flatten();

    let host = match forwarded_host {
        Some(host) => host,
        None => headers
            .get(header::HOST)
            .ok_or_else(|| AppError::bad_request("Missing Host header", json!({})))?
            .to_str()
            .map_err(|_| AppError::bad_request("Invalid Host header", json!({})))?,
    };

    let scheme = behind_proxy
        .then(|| header_str(headers, X_FORWARDED_PROTO))
        .flatten()
        .filter(|proto| proto.eq_ignore_ascii_case("https"))
        .map_or("http", |_| "https");

    Ok(format!("{}://{}/", scheme, host))
}

/// Best-effort client network address.
///
/// Behind a proxy the first `X-Forwarded-For` entry wins, then `X-Real-IP`;
/// otherwise, or when neither is present, the socket peer address is used.
pub fn client_address(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> String {
    if behind_proxy {
        let forwarded = header_str(headers, X_FORWARDED_FOR)
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if let Some(ip) = forwarded.or_else(|| header_str(headers, X_REAL_IP)) {
            return ip.to_string();
        }
    }

    peer.ip().to_string()
}
