//! Repository trait for the redirect analytics log.

use crate::domain::best_effort::DependencyError;
use crate::domain::click_event::ClickEvent;
use async_trait::async_trait;

/// Failure to talk to the analytics store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("analytics store error: {0}")]
pub struct AnalyticsError(pub String);

impl From<AnalyticsError> for DependencyError {
    fn from(e: AnalyticsError) -> Self {
        DependencyError::analytics(e.0)
    }
}

/// Append-only sink for [`ClickEvent`]s.
///
/// Events are stored independently of links; nothing checks that the code
/// still exists.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Appends one click event.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if the analytics store rejects the write or
    /// is unreachable.
    async fn record(&self, event: ClickEvent) -> Result<(), AnalyticsError>;

    /// Counts recorded clicks for a short code.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if the analytics store is unreachable.
    async fn count_by_code(&self, short_code: &str) -> Result<u64, AnalyticsError>;

    /// Counts all recorded clicks.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if the analytics store is unreachable.
    async fn count_all(&self) -> Result<u64, AnalyticsError>;

    /// Checks if the analytics backend is healthy.
    async fn health_check(&self) -> bool;

    /// Short backend name for health reports.
    fn backend(&self) -> &'static str;
}
