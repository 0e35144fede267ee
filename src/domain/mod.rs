//! Domain layer containing business entities and contracts.
//!
//! Nothing here depends on a concrete storage or transport; infrastructure
//! adapters implement the traits in [`repositories`] and the application
//! services compose them.
//!
//! # Architecture
//!
//! - [`entities`] - Short link data structures
//! - [`repositories`] - Persistence Store and Analytics Sink contracts
//! - [`click_event`] - Redirect analytics event
//! - [`click_worker`] - Background analytics writer
//! - [`best_effort`] - Outcome type for optional dependencies
//!
//! # Click Processing Flow
//!
//! 1. The redirect service resolves a short code
//! 2. A [`click_event::ClickEvent`] is enqueued on a bounded channel
//! 3. [`click_worker::run_click_worker`] persists it with retry
//! 4. The event lands in the analytics store via [`repositories::ClickRepository`]

pub mod best_effort;
pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
