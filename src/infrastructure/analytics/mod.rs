//! Analytics Sink implementations.
//!
//! - [`MongoClickRepository`] - MongoDB `clicks` collection
//! - [`NullClickRepository`] - Discards events when analytics is disabled

mod mongo_click_repository;
mod null_click_repository;

pub use mongo_click_repository::{ClickDocument, MongoClickRepository};
pub use null_click_repository::NullClickRepository;
