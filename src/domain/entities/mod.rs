//! Core domain entities.
//!
//! Entities follow the "New Type" pattern with a separate struct for creation:
//! [`NewLink`] is what the shortening service inserts, [`ShortLink`] is what
//! the store hands back.

pub mod link;

pub use link::{NewLink, ShortLink};
