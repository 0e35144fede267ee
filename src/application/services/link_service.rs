//! Link creation and lookup service.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, warn};

use super::with_store_deadline;
use crate::domain::entities::{NewLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{DEFAULT_CODE_LENGTH, generate_code};

/// Code generation policy for [`LinkService::shorten`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortenPolicy {
    /// Length of generated codes.
    pub code_length: usize,
    /// Total insert attempts when the generated code collides. `1` means
    /// no retry: the first conflict fails the request.
    pub max_attempts: usize,
}

impl Default for ShortenPolicy {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            max_attempts: 3,
        }
    }
}

/// A freshly created link together with its public URL.
#[derive(Debug, Clone)]
pub struct ShortenedLink {
    pub link: ShortLink,
    pub short_url: String,
}

/// Service for creating and retrieving shortened links.
pub struct LinkService<L: LinkRepository> {
    link_repository: Arc<L>,
    policy: ShortenPolicy,
    store_timeout: Duration,
}

impl<L: LinkRepository> LinkService<L> {
    /// Creates a new link service.
    pub fn new(link_repository: Arc<L>, policy: ShortenPolicy, store_timeout: Duration) -> Self {
        Self {
            link_repository,
            policy,
            store_timeout,
        }
    }

    /// Creates a short link and returns `base_url + code`.
    ///
    /// # Code Generation
    ///
    /// A fresh code is generated per attempt and inserted directly; the
    /// store's unique constraint is the only collision check. On
    /// [`AppError::Conflict`] a new code is tried, up to
    /// [`ShortenPolicy::max_attempts`] inserts in total.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `original_url` is empty.
    /// Returns [`AppError::Internal`] if every attempt collided or the store failed.
    pub async fn shorten(
        &self,
        original_url: &str,
        base_url: &str,
    ) -> Result<ShortenedLink, AppError> {
        if original_url.is_empty() {
            return Err(AppError::bad_request(
                "original_url must not be empty",
                json!({ "field": "original_url" }),
            ));
        }

        let attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=attempts {
            let code = generate_code(self.policy.code_length);
            let new_link = NewLink::new(code, original_url);

            match with_store_deadline(self.store_timeout, self.link_repository.create(new_link))
                .await
            {
                Ok(link) => {
                    debug!(short_code = %link.short_code, attempt, "short link created");
                    let short_url = Self::short_url(base_url, &link.short_code);
                    return Ok(ShortenedLink { link, short_url });
                }
                Err(AppError::Conflict { .. }) => {
                    warn!(attempt, attempts, "generated short code collided");
                    metrics::counter!("tinylink_code_collisions_total").increment(1);
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(
            "Failed to generate unique code",
            json!({ "reason": "Too many collisions", "attempts": attempts }),
        ))
    }

    /// Retrieves a link by its short code straight from the store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the code.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn get_link(&self, short_code: &str) -> Result<ShortLink, AppError> {
        with_store_deadline(
            self.store_timeout,
            self.link_repository.find_by_code(short_code),
        )
        .await?
        .ok_or_else(|| AppError::not_found("Short URL not found", json!({ "code": short_code })))
    }

    /// Verifies that the store answers within the deadline.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the store is unreachable.
    pub async fn health_check(&self) -> Result<(), AppError> {
        with_store_deadline(self.store_timeout, self.link_repository.ping()).await
    }

    /// Counts stored links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn count_links(&self) -> Result<i64, AppError> {
        with_store_deadline(self.store_timeout, self.link_repository.count()).await
    }

    /// Joins a base URL and a code, inserting a `/` if the base lacks one.
    pub fn short_url(base_url: &str, short_code: &str) -> String {
        if base_url.ends_with('/') {
            format!("{}{}", base_url, short_code)
        } else {
            format!("{}/{}", base_url, short_code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use chrono::Utc;
    use std::sync::Mutex;

    fn stored(new_link: &NewLink) -> ShortLink {
        ShortLink::new(
            1,
            new_link.short_code.clone(),
            new_link.original_url.clone(),
            Utc::now(),
        )
    }

    fn service(repo: MockLinkRepository, max_attempts: usize) -> LinkService<MockLinkRepository> {
        LinkService::new(
            Arc::new(repo),
            ShortenPolicy {
                code_length: DEFAULT_CODE_LENGTH,
                max_attempts,
            },
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn test_shorten_success() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create()
            .withf(|new_link| {
                new_link.original_url == "https://example.com"
                    && new_link.short_code.len() == 7
                    && new_link.short_code.bytes().all(|b| b.is_ascii_alphanumeric())
            })
            .times(1)
            .returning(|new_link| Ok(stored(&new_link)));

        let result = service(repo, 3)
            .shorten("https://example.com", "http://localhost:3000/")
            .await
            .unwrap();

        assert_eq!(result.link.original_url, "https://example.com");
        assert_eq!(
            result.short_url,
            format!("http://localhost:3000/{}", result.link.short_code)
        );
    }

    #[tokio::test]
    async fn test_shorten_accepts_any_non_empty_string() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create()
            .times(1)
            .returning(|new_link| Ok(stored(&new_link)));

        let result = service(repo, 1).shorten("not a url", "http://s/").await;

        assert_eq!(result.unwrap().link.original_url, "not a url");
    }

    #[tokio::test]
    async fn test_shorten_retries_on_conflict() {
        let codes = Arc::new(Mutex::new(Vec::new()));
        let seen = codes.clone();

        let mut repo = MockLinkRepository::new();
        repo.expect_create().times(2).returning(move |new_link| {
            let mut seen = seen.lock().unwrap();
            seen.push(new_link.short_code.clone());
            if seen.len() == 1 {
                Err(AppError::conflict("Unique constraint violation", json!({})))
            } else {
                Ok(stored(&new_link))
            }
        });

        let result = service(repo, 3)
            .shorten("https://example.com", "http://s/")
            .await
            .unwrap();

        let codes = codes.lock().unwrap();
        assert_eq!(codes.len(), 2);
        assert_eq!(result.link.short_code, codes[1]);
    }

    #[tokio::test]
    async fn test_shorten_gives_up_after_max_attempts() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create()
            .times(3)
            .returning(|_| Err(AppError::conflict("Unique constraint violation", json!({}))));

        let result = service(repo, 3).shorten("https://example.com", "http://s/").await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_shorten_one_shot_policy() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create()
            .times(1)
            .returning(|_| Err(AppError::conflict("Unique constraint violation", json!({}))));

        let result = service(repo, 1).shorten("https://example.com", "http://s/").await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_shorten_store_error_is_not_retried() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let result = service(repo, 5).shorten("https://example.com", "http://s/").await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_shorten_rejects_empty_url() {
        let mut repo = MockLinkRepository::new();
        repo.expect_create().times(0);

        let result = service(repo, 3).shorten("", "http://s/").await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_get_link_not_found() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code()
            .withf(|code| code == "missing")
            .times(1)
            .returning(|_| Ok(None));

        let result = service(repo, 3).get_link("missing").await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[test]
    fn test_short_url_joins_with_slash() {
        assert_eq!(
            LinkService::<MockLinkRepository>::short_url("https://s.example.com", "abc1234"),
            "https://s.example.com/abc1234"
        );
        assert_eq!(
            LinkService::<MockLinkRepository>::short_url("https://s.example.com/", "abc1234"),
            "https://s.example.com/abc1234"
        );
    }
}
