//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence, caching and analytics.
//!
//! # Modules
//!
//! - [`analytics`] - MongoDB click log (and a no-op fallback)
//! - [`cache`] - Caching abstractions (Redis and no-op implementations)
//! - [`persistence`] - PostgreSQL repository implementations

pub mod analytics;
pub mod cache;
pub mod persistence;
