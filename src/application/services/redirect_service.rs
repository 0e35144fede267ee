//! Cache-aside redirect resolution.
//!
//! [`RedirectService::resolve`] runs four stages in order, each exposed as
//! its own method:
//!
//! 1. [`lookup_cache`](RedirectService::lookup_cache) - cache lookup, soft-fails to a miss
//! 2. [`lookup_store`](RedirectService::lookup_store) - authoritative lookup, fatal on error
//! 3. [`repopulate_cache`](RedirectService::repopulate_cache) - write-back with TTL, soft
//! 4. [`record_click`](RedirectService::record_click) - enqueue analytics, soft
//!
//! A cache hit skips stages 2 and 3. Only the store stage can fail the
//! request; everything else ends up in [`Resolution::degraded`].

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

use super::with_store_deadline;
use crate::domain::best_effort::{BestEffort, Dependency, DependencyError, within};
use crate::domain::click_event::ClickEvent;
use crate::domain::entities::ShortLink;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::is_well_formed;

/// Tunables for [`RedirectService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedirectSettings {
    /// Expiration of repopulated cache entries.
    pub cache_ttl_seconds: u64,
    /// Deadline for each cache call.
    pub dependency_timeout: Duration,
    /// Deadline for each store call.
    pub store_timeout: Duration,
}

impl Default for RedirectSettings {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: 3600,
            dependency_timeout: Duration::from_millis(500),
            store_timeout: Duration::from_secs(5),
        }
    }
}

/// Where the URL of a [`Resolution`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Cache,
    Store,
}

/// Successful redirect lookup.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub original_url: String,
    pub source: ResolutionSource,
    /// Soft failures hit along the way, in stage order.
    pub degraded: Vec<DependencyError>,
}

/// Resolves short codes for redirection.
pub struct RedirectService<L: LinkRepository> {
    link_repository: Arc<L>,
    cache: Arc<dyn CacheService>,
    click_sender: mpsc::Sender<ClickEvent>,
    settings: RedirectSettings,
}

impl<L: LinkRepository> RedirectService<L> {
    /// Creates a new redirect service.
    pub fn new(
        link_repository: Arc<L>,
        cache: Arc<dyn CacheService>,
        click_sender: mpsc::Sender<ClickEvent>,
        settings: RedirectSettings,
    ) -> Self {
        Self {
            link_repository,
            cache,
            click_sender,
            settings,
        }
    }

    /// Resolves `short_code` to its original URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code was never issued; no click is
    /// recorded. Returns [`AppError::Internal`] if the store fails.
    pub async fn resolve(
        &self,
        short_code: &str,
        client_address: Option<String>,
    ) -> Result<Resolution, AppError> {
        if !is_well_formed(short_code) {
            return Err(not_found(short_code));
        }

        let mut degraded = Vec::new();

        match self.lookup_cache(short_code).await {
            BestEffort::Done(Some(original_url)) => {
                metrics::counter!("tinylink_cache_hits_total").increment(1);
                collect(&mut degraded, self.record_click(short_code, client_address));

                return Ok(Resolution {
                    original_url,
                    source: ResolutionSource::Cache,
                    degraded,
                });
            }
            BestEffort::Done(None) => {
                metrics::counter!("tinylink_cache_misses_total").increment(1);
            }
            BestEffort::Degraded(e) => degraded.push(e),
        }

        let link = self.lookup_store(short_code).await?;

        collect(&mut degraded, self.repopulate_cache(&link).await);
        collect(&mut degraded, self.record_click(short_code, client_address));

        Ok(Resolution {
            original_url: link.original_url,
            source: ResolutionSource::Store,
            degraded,
        })
    }

    /// Stage 1: looks the code up in the cache.
    ///
    /// `Done(None)` is a miss; `Degraded` means the cache could not answer and
    /// the caller should treat it as a miss.
    pub async fn lookup_cache(&self, short_code: &str) -> BestEffort<Option<String>> {
        within(
            Dependency::Cache,
            self.settings.dependency_timeout,
            self.cache.get_url(short_code),
        )
        .await
        .observe("cache_lookup")
    }

    /// Stage 2: looks the code up in the Persistence Store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no such code exists.
    /// Returns [`AppError::Internal`] on store failure or deadline expiry.
    pub async fn lookup_store(&self, short_code: &str) -> Result<ShortLink, AppError> {
        debug!(short_code, "not in cache, checking database");

        with_store_deadline(
            self.settings.store_timeout,
            self.link_repository.find_by_code(short_code),
        )
        .await?
        .ok_or_else(|| not_found(short_code))
    }

    /// Stage 3: writes the mapping back into the cache with the configured TTL.
    pub async fn repopulate_cache(&self, link: &ShortLink) -> BestEffort<()> {
        within(
            Dependency::Cache,
            self.settings.dependency_timeout,
            self.cache.set_url(
                &link.short_code,
                &link.original_url,
                Some(self.settings.cache_ttl_seconds),
            ),
        )
        .await
        .observe("cache_repopulate")
    }

    /// Stage 4: enqueues a click event for the background worker.
    ///
    /// Never waits: a full or closed queue drops the event.
    pub fn record_click(&self, short_code: &str, client_address: Option<String>) -> BestEffort<()> {
        let event = ClickEvent::new(short_code, client_address);

        let outcome = match self.click_sender.try_send(event) {
            Ok(()) => BestEffort::Done(()),
            Err(TrySendError::Full(_)) => {
                BestEffort::Degraded(DependencyError::analytics("click queue is full"))
            }
            Err(TrySendError::Closed(_)) => {
                BestEffort::Degraded(DependencyError::analytics("click queue is closed"))
            }
        };

        outcome.observe("record_click")
    }
}

fn not_found(short_code: &str) -> AppError {
    AppError::not_found("Short URL not found", json!({ "code": short_code }))
}

fn collect(degraded: &mut Vec<DependencyError>, outcome: BestEffort<()>) {
    if let BestEffort::Degraded(e) = outcome {
        degraded.push(e);
    }
}
