//! Route configuration for the feed API.

pub mod feed_routes;

pub use feed_routes::{API_PREFIX, create_routes};
