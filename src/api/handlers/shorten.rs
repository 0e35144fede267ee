//! Handler for link shortening endpoint.

use axum::{Json, extract::State, http::HeaderMap};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::request::request_base_url;

/// Creates a short URL for a long URL.
///
/// # Endpoint
///
/// `POST /shorten`
///
/// # Request Body
///
/// ```json
/// { "original_url": "https://example.com" }
/// ```
///
/// # Response
///
/// ```json
/// { "short_url": "http://localhost:3000/aB3xY9z" }
/// ```
///
/// The prefix is `BASE_URL` when configured, otherwise the scheme and host
/// the request arrived on.
///
/// # Errors
///
/// Returns 400 Bad Request if `original_url` is empty or the Host header is missing.
/// Returns 500 Internal Server Error if the store write fails.
pub async fn shorten_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    payload.validate()?;

    let base_url = match &state.base_url {
        Some(base_url) => base_url.clone(),
        None => request_base_url(&headers, state.behind_proxy)?,
    };

    let shortened = state
        .link_service
        .shorten(&payload.original_url, &base_url)
        .await?;

    tracing::info!(short_code = %shortened.link.short_code, "short URL created");

    Ok(Json(ShortenResponse {
        short_url: shortened.short_url,
    }))
}
