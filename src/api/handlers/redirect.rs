//! Handler for short URL redirect.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect},
};
use std::net::SocketAddr;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::location::redirect_location;
use crate::utils::request::client_address;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// Delegates to [`crate::application::services::RedirectService::resolve`]:
/// cache lookup, store lookup on miss, cache repopulation, click enqueue.
/// Cache and analytics failures never change the response. The stored URL
/// is percent-encoded where a header value cannot carry it.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
/// Returns 500 Internal Server Error if the store lookup fails.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<impl IntoResponse, AppError> {
    let client = client_address(&headers, addr, state.behind_proxy);

    let resolution = state.redirect_service.resolve(&code, Some(client)).await?;

    debug!(
        short_code = %code,
        source = ?resolution.source,
        degraded = resolution.degraded.len(),
        "redirect resolved"
    );

    Ok(Redirect::temporary(&redirect_location(
        &resolution.original_url,
    )))
}
