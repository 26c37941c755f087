//! Response building for list endpoints.
//!
//! - [`headers`] - `X-Pagination-*` and `Link` headers

pub mod headers;

pub use headers::{ListHeaders, PageLink, page_url};
