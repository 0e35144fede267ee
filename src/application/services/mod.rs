//! Business logic services for the application layer.

pub mod link_service;
pub mod redirect_service;

pub use link_service::{LinkService, ShortenPolicy, ShortenedLink};
pub use redirect_service::{RedirectService, RedirectSettings, Resolution, ResolutionSource};

use std::future::Future;
use std::time::Duration;

use serde_json::json;

use crate::error::AppError;

/// Runs a Persistence Store call under the store deadline.
///
/// The store is on the critical path, so an expired deadline is an
/// [`AppError::Internal`] rather than a soft failure.
pub(crate) async fn with_store_deadline<T, F>(limit: Duration, call: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(timeout_ms = limit.as_millis() as u64, "store call timed out");
            Err(AppError::internal(
                "Database error",
                json!({ "reason": "timeout" }),
            ))
        }
    }
}
