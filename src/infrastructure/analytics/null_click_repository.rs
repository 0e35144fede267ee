//! No-op analytics sink.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::{AnalyticsError, ClickRepository};

/// Accepts and discards every click.
///
/// Used when `MONGO_URL` is unset or MongoDB is unreachable at startup.
pub struct NullClickRepository;

impl NullClickRepository {
    pub fn new() -> Self {
        debug!("Using NullClickRepository (analytics disabled)");
        Self
    }
}

impl Default for NullClickRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClickRepository for NullClickRepository {
    async fn record(&self, _event: ClickEvent) -> Result<(), AnalyticsError> {
        Ok(())
    }

    async fn count_by_code(&self, _short_code: &str) -> Result<u64, AnalyticsError> {
        Ok(0)
    }

    async fn count_all(&self) -> Result<u64, AnalyticsError> {
        Ok(0)
    }

    fn backend(&self) -> &'static str {
        "disabled"
    }

    async fn health_check(&self) -> bool {
        true
    }
}
