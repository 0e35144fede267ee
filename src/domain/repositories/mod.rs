//! Repository trait definitions for the domain layer.
//!
//! These traits abstract the two stores the service talks to. Concrete
//! implementations live in `crate::infrastructure`; mock implementations are
//! generated via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Authoritative short code storage (Persistence Store)
//! - [`ClickRepository`] - Append-only redirect log (Analytics Sink)
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod click_repository;
pub mod link_repository;

pub use click_repository::{AnalyticsError, ClickRepository};
pub use link_repository::LinkRepository;

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
