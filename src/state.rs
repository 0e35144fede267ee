//! Shared application state injected into every handler.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio::sync::mpsc;

use crate::application::services::{LinkService, RedirectService, RedirectSettings, ShortenPolicy};
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::ClickRepository;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::persistence::PgLinkRepository;

/// Service-level settings derived from [`crate::config::Config`].
#[derive(Debug, Clone, Default)]
pub struct AppSettings {
    pub shorten: ShortenPolicy,
    pub redirect: RedirectSettings,
    /// Fixed short URL prefix. When `None` it is derived from each request.
    pub base_url: Option<String>,
    /// Trust `X-Forwarded-*` headers for client address and base URL.
    pub behind_proxy: bool,
}

/// Long-lived clients and services, cloned cheaply per request.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService<PgLinkRepository>>,
    pub redirect_service: Arc<RedirectService<PgLinkRepository>>,
    pub cache: Arc<dyn CacheService>,
    pub analytics: Arc<dyn ClickRepository>,
    pub click_sender: mpsc::Sender<ClickEvent>,
    pub base_url: Option<String>,
    pub behind_proxy: bool,
    /// Deadline for each cache and analytics health ping.
    pub dependency_timeout: Duration,
}

impl AppState {
    /// Wires the services around one pool, one cache client and one click queue.
    pub fn new(
        pool: Arc<PgPool>,
        cache: Arc<dyn CacheService>,
        analytics: Arc<dyn ClickRepository>,
        click_sender: mpsc::Sender<ClickEvent>,
        settings: AppSettings,
    ) -> Self {
        let link_repository = Arc::new(PgLinkRepository::new(pool));
        let dependency_timeout = settings.redirect.dependency_timeout;

        let link_service = Arc::new(LinkService::new(
            link_repository.clone(),
            settings.shorten,
            settings.redirect.store_timeout,
        ));
        let redirect_service = Arc::new(RedirectService::new(
            link_repository,
            cache.clone(),
            click_sender.clone(),
            settings.redirect,
        ));

        Self {
            link_service,
            redirect_service,
            cache,
            analytics,
            click_sender,
            base_url: settings.base_url,
            behind_proxy: settings.behind_proxy,
            dependency_timeout,
        }
    }
}
