//! Click event model for asynchronous click tracking.

use chrono::{DateTime, Utc};

/// A single redirect served for a short code.
///
/// Passed from the redirect service to the background worker via a channel,
/// which keeps analytics writes off the redirect path.
///
/// # Usage Flow
///
/// 1. Created by [`crate::application::services::RedirectService`] on a cache or store hit
/// 2. Sent to channel (non-blocking)
/// 3. Processed by [`crate::domain::click_worker::run_click_worker`]
/// 4. Appended to the analytics store
///
/// Events are never mutated after creation and carry no reference to the
/// link row itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub short_code: String,
    pub timestamp: DateTime<Utc>,
    pub client_address: Option<String>,
}

impl ClickEvent {
    /// Creates a click event stamped with the current UTC time.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let event = ClickEvent::new("aB3xY9z", Some("192.168.1.1".to_string()));
    /// ```
    pub fn new(short_code: impl Into<String>, client_address: Option<String>) -> Self {
        Self::at(short_code, client_address, Utc::now())
    }

    /// Creates a click event with an explicit timestamp.
    pub fn at(
        short_code: impl Into<String>,
        client_address: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            short_code: short_code.into(),
            timestamp,
            client_address,
        }
    }
}
