//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: Database reachable (cache or analytics may still be degraded)
/// - **503 Service Unavailable**: Database unreachable
///
/// # Components Checked
///
/// 1. **Database**: `SELECT 1` within the store deadline
/// 2. **Cache**: Redis PING within the dependency deadline (always ok when
///    caching is disabled)
/// 3. **Analytics**: MongoDB ping within the dependency deadline (always ok
///    when analytics is disabled)
/// 4. **Click Queue**: Checks if channel is open and reports free capacity
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database":    { "status": "ok", "message": "Connected, 42 links" },
///     "cache":       { "status": "ok", "message": "redis connected" },
///     "analytics":   { "status": "ok", "message": "mongodb connected" },
///     "click_queue": { "status": "ok", "message": "Capacity: 10000" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let database = check_database(&state).await;
    let cache = check_cache(&state).await;
    let analytics = check_analytics(&state).await;
    let click_queue = check_click_queue(&state);

    let database_ok = database.is_ok();
    let all_healthy = database_ok && cache.is_ok() && analytics.is_ok() && click_queue.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database,
            cache,
            analytics,
            click_queue,
        },
    };

    if database_ok {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Checks database connectivity and reports the number of stored links.
async fn check_database(state: &AppState) -> CheckStatus {
    if let Err(e) = state.link_service.health_check().await {
        return CheckStatus::error(format!("Database error: {}", e));
    }

    match state.link_service.count_links().await {
        Ok(count) => CheckStatus::ok(format!("Connected, {} links", count)),
        Err(_) => CheckStatus::ok("Connected"),
    }
}

/// Checks cache connectivity via PING command.
async fn check_cache(state: &AppState) -> CheckStatus {
    let backend = state.cache.backend();

    ping_status(backend, state, state.cache.health_check()).await
}

/// Checks the analytics store via ping.
async fn check_analytics(state: &AppState) -> CheckStatus {
    let backend = state.analytics.backend();

    ping_status(backend, state, state.analytics.health_check()).await
}

/// A ping that misses the dependency deadline counts as failed.
async fn ping_status(
    backend: &str,
    state: &AppState,
    ping: impl Future<Output = bool>,
) -> CheckStatus {
    match tokio::time::timeout(state.dependency_timeout, ping).await {
        Ok(true) => CheckStatus::ok(format!("{} connected", backend)),
        Ok(false) => CheckStatus::error(format!("{} connection failed", backend)),
        Err(_) => CheckStatus::error(format!(
            "{} timed out after {}ms",
            backend,
            state.dependency_timeout.as_millis()
        )),
    }
}

/// Checks if the click tracking queue is operational.
fn check_click_queue(state: &AppState) -> CheckStatus {
    if state.click_sender.is_closed() {
        CheckStatus::error("Click queue is closed")
    } else {
        CheckStatus::ok(format!("Capacity: {}", state.click_sender.capacity()))
    }
}
