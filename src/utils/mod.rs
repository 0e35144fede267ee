//! Utility functions for code generation and request handling.
//!
//! - [`code_generator`] - Short code generation and shape checks
//! - [`location`] - `Location` header encoding for redirects
//! - [`request`] - Base URL and client address extraction from HTTP headers

pub mod code_generator;
pub mod location;
pub mod request;
