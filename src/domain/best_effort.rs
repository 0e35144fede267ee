//! Outcome type for calls to optional dependencies.
//!
//! The cache and the analytics sink may be down without the redirect path
//! failing. Their calls return [`BestEffort`] instead of `Result`, so a soft
//! failure cannot be `?`-propagated into an [`crate::AppError`] by accident.

use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Optional collaborators whose failures are tolerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dependency {
    Cache,
    Analytics,
}

impl Dependency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Analytics => "analytics",
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cache or analytics failure. Always non-fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DependencyError {
    #[error("{dependency} unavailable: {message}")]
    Unavailable {
        dependency: Dependency,
        message: String,
    },
    #[error("{dependency} call timed out after {timeout_ms}ms")]
    Timeout {
        dependency: Dependency,
        timeout_ms: u64,
    },
}

impl DependencyError {
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Unavailable {
            dependency: Dependency::Cache,
            message: message.into(),
        }
    }

    pub fn analytics(message: impl Into<String>) -> Self {
        Self::Unavailable {
            dependency: Dependency::Analytics,
            message: message.into(),
        }
    }

    pub fn dependency(&self) -> Dependency {
        match self {
            Self::Unavailable { dependency, .. } | Self::Timeout { dependency, .. } => *dependency,
        }
    }
}

/// Result of a best-effort step: either it completed, or the dependency was
/// degraded and the caller carries on without it.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BestEffort<T> {
    Done(T),
    Degraded(DependencyError),
}

impl<T> BestEffort<T> {
    /// Logs and counts a soft failure for `stage`, then hands the outcome back.
    pub fn observe(self, stage: &'static str) -> Self {
        if let Self::Degraded(e) = &self {
            tracing::warn!(stage, dependency = %e.dependency(), error = %e, "best-effort step degraded");
            metrics::counter!(
                "tinylink_dependency_failures_total",
                "dependency" => e.dependency().as_str(),
                "stage" => stage
            )
            .increment(1);
        }
        self
    }
}

impl<T, E: Into<DependencyError>> From<Result<T, E>> for BestEffort<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Done(value),
            Err(e) => Self::Degraded(e.into()),
        }
    }
}

/// Runs a dependency call under its own deadline.
///
/// An expired deadline is reported as [`DependencyError::Timeout`]; the
/// in-flight call is dropped.
pub async fn within<T, E, F>(dependency: Dependency, limit: Duration, call: F) -> BestEffort<T>
where
    F: Future<Output = Result<T, E>>,
    E: Into<DependencyError>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.into(),
        Err(_) => BestEffort::Degraded(DependencyError::Timeout {
            dependency,
            timeout_ms: limit.as_millis() as u64,
        }),
    }
}
