//! Axum extractors for the feed API.
//!
//! - [`AuthenticatedUser`] - resolves the bearer token to the calling user
//! - [`ListRequest`] - query pairs and base URL of a list request

mod auth;
mod list_params;

pub use auth::AuthenticatedUser;
pub use list_params::{ListRequest, PageLimits, parse_list_query};
