//! HTTP request handlers for the feed API.
//!
//! - [`sources`] - list, create, read, update and delete sources
//! - [`posts`] - the same for posts, plus like and bookmark toggles
//! - [`health`] - health check endpoint

pub mod health;
pub mod posts;
pub mod sources;

pub use health::health_handler;
pub use posts::{
    bookmark_post_handler, create_post_handler, delete_post_handler, like_post_handler,
    list_posts_handler, read_post_handler, unbookmark_post_handler, unlike_post_handler,
    update_post_handler,
};
pub use sources::{
    create_source_handler, delete_source_handler, list_sources_handler, read_source_handler,
    update_source_handler,
};
