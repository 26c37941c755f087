//! List-request extractor and query-parameter parser.
//!
//! [`ListRequest`] keeps the raw query pairs in the order they appear in
//! the URL, together with the scheme, host and path needed to rebuild page
//! links. [`parse_list_query`] turns those pairs into a [`ListQuery`]:
//!
//! - `page`: decimal; non-positive or non-numeric becomes `1`
//! - `page_size`: decimal; non-positive or non-numeric becomes the default,
//!   larger values are capped at the maximum
//! - `sort`: comma-separated `[+|-]field` tokens, unsortable fields dropped
//! - `search`: free text, ignored when empty
//! - `filter__`, `exact__`, `lt__`, `lte__`, `gt__`, `gte__` prefixed keys:
//!   one filter clause each, unfilterable fields dropped
//!
//! When a scalar key repeats, the last occurrence wins. Filters keep their
//! query-string order. Nothing here rejects a request.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{HeaderMap, header, request::Parts},
};
use feedkeeper_persistence::schema::EntityCapabilities;
use feedkeeper_persistence::types::{
    FilterClause, FilterOperator, ListQuery, PageRequest, SortClause,
};
use tracing::trace;

use crate::config::ServerConfig;

/// Header carrying the original scheme when running behind a proxy.
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Default and maximum page sizes applied while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Page size used when the request has no usable `page_size`.
    pub default_page_size: u64,
    /// Largest page size a request may ask for.
    pub max_page_size: u64,
}

impl PageLimits {
    /// Creates limits, keeping the default within the maximum.
    pub fn new(default_page_size: u64, max_page_size: u64) -> Self {
        let max_page_size = max_page_size.max(1);
        Self {
            default_page_size: default_page_size.clamp(1, max_page_size),
            max_page_size,
        }
    }

    /// Limits from the server configuration.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.default_page_size, config.max_page_size)
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self::new(20, 1000)
    }
}

/// The attributes of a list request the query shaper consumes.
#[derive(Debug, Clone)]
pub struct ListRequest {
    params: Vec<(String, String)>,
    base_url: String,
}

impl ListRequest {
    /// Creates a list request from decoded query pairs and the URL of the
    /// listed resource without its query string.
    pub fn new(params: Vec<(String, String)>, base_url: impl Into<String>) -> Self {
        Self {
            params,
            base_url: base_url.into(),
        }
    }

    /// Parses a raw query string.
    pub fn from_query(query: Option<&str>, base_url: impl Into<String>) -> Self {
        let params = query
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();
        Self::new(params, base_url)
    }

    /// Decoded query pairs in URL order.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// `scheme://host/path` of the request.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Parses the pairs against an entity's capabilities.
    pub fn to_query(&self, caps: &EntityCapabilities, limits: PageLimits) -> ListQuery {
        parse_list_query(&self.params, caps, limits)
    }
}

/// Rebuilds `scheme://host/path` from request parts.
///
/// Nested routers see a URI stripped of their mount prefix, so the path
/// comes from [`OriginalUri`] when the router recorded it.
fn base_url(parts: &Parts) -> String {
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map(|original| &original.0)
        .unwrap_or(&parts.uri);
    let scheme = uri
        .scheme_str()
        .map(str::to_string)
        .or_else(|| header_str(&parts.headers, X_FORWARDED_PROTO))
        .unwrap_or_else(|| "http".to_string());
    let host = uri
        .authority()
        .map(|a| a.to_string())
        .or_else(|| header_str(&parts.headers, header::HOST.as_str()))
        .unwrap_or_else(|| "localhost".to_string());
    format!("{}://{}{}", scheme, host, uri.path())
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').next().unwrap_or(v).trim().to_string())
        .filter(|v| !v.is_empty())
}

impl<S> FromRequestParts<S> for ListRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ListRequest::from_query(parts.uri.query(), base_url(parts)))
    }
}

fn parse_page(raw: &str) -> u64 {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|&page| page >= 1)
        .unwrap_or(1)
}

fn parse_page_size(raw: &str, limits: PageLimits) -> u64 {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => limits.default_page_size,
        Ok(size) => size.min(limits.max_page_size),
    }
}

/// Splits query pairs into filter, sort, search and page clauses.
pub fn parse_list_query(
    params: &[(String, String)],
    caps: &EntityCapabilities,
    limits: PageLimits,
) -> ListQuery {
    let mut page = 1;
    let mut page_size = limits.default_page_size;
    let mut sort = None;
    let mut search = None;
    let mut filters = Vec::new();

    for (key, value) in params {
        match key.as_str() {
            "page" => page = parse_page(value),
            "page_size" => page_size = parse_page_size(value, limits),
            "sort" => sort = Some(value.as_str()),
            "search" => search = Some(value.as_str()),
            _ => match FilterOperator::split_key(key) {
                Some((operator, path)) if caps.allows_filter(path) => {
                    filters.push(FilterClause::new(operator, path, value.as_str()));
                }
                Some((_, path)) => trace!(path, "Dropping non-filterable field"),
                None => {}
            },
        }
    }

    let mut query = ListQuery::for_page(PageRequest::new(page, page_size));
    query.filters = filters;

    for token in sort.unwrap_or_default().split(',') {
        match SortClause::parse(token) {
            Some(clause) if caps.allows_sort(&clause.path) => query.sorts.push(clause),
            Some(clause) => trace!(path = %clause.path, "Dropping non-sortable field"),
            None => {}
        }
    }

    match search {
        Some(text) => query.with_search(text),
        None => query,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedkeeper_persistence::schema::CapabilityRegistry;
    use feedkeeper_persistence::types::{Source, SortDirection};

    fn pairs(query: &str) -> Vec<(String, String)> {
        ListRequest::from_query(Some(query), "http://test/").params
    }

    fn parse(query: &str) -> ListQuery {
        let registry = CapabilityRegistry::feed().unwrap();
        parse_list_query(&pairs(query), &registry.of::<Source>(), PageLimits::default())
    }

    #[test]
    fn test_defaults() {
        let query = parse("");
        assert_eq!(query.page, PageRequest::new(1, 20));
        assert!(query.filters.is_empty());
        assert!(query.sorts.is_empty());
        assert!(query.search.is_none());
    }

    #[test]
    fn test_page_clamping() {
        assert_eq!(parse("page=0").page.page(), 1);
        assert_eq!(parse("page=-3").page.page(), 1);
        assert_eq!(parse("page=abc").page.page(), 1);
        assert_eq!(parse("page=9999").page.page(), 9999);
    }

    #[test]
    fn test_page_size_default_and_cap() {
        assert_eq!(parse("page_size=x").page.page_size(), 20);
        assert_eq!(parse("page_size=0").page.page_size(), 20);
        assert_eq!(parse("page_size=5").page.page_size(), 5);
        assert_eq!(parse("page_size=50000").page.page_size(), 1000);
    }

    #[test]
    fn test_last_scalar_wins() {
        let query = parse("page=2&page=3&search=a&search=b");
        assert_eq!(query.page.page(), 3);
        assert_eq!(query.search.as_deref(), Some("b"));
    }

    #[test]
    fn test_sort_tokens() {
        let query = parse("sort=-created_at,+name,feed_url,interval");
        assert_eq!(
            query.sorts,
            vec![
                SortClause::desc("created_at"),
                SortClause::asc("name"),
                SortClause::asc("interval"),
            ]
        );
    }

    #[test]
    fn test_encoded_plus_sort() {
        let query = parse("sort=%2Bname");
        assert_eq!(query.sorts[0].direction, SortDirection::Asc);
        // A literal `+` decodes to a space, which is trimmed.
        let query = parse("sort=+name");
        assert_eq!(query.sorts, vec![SortClause::asc("name")]);
    }

    #[test]
    fn test_filters_in_order_and_gated() {
        let query = parse("exact__name=b&filter__name=a&lt__interval=9&exact__unlisted_field=x");
        assert_eq!(
            query.filters,
            vec![
                FilterClause::new(FilterOperator::Equals, "name", "b"),
                FilterClause::new(FilterOperator::ContainsCI, "name", "a"),
                FilterClause::new(FilterOperator::Lt, "interval", "9"),
            ]
        );
    }

    #[test]
    fn test_empty_search_is_absent() {
        assert!(parse("search=").search.is_none());
    }

    #[test]
    fn test_capability_less_entity() {
        let caps = EntityCapabilities::empty();
        let query = parse_list_query(
            &pairs("filter__email=a&sort=email&search=x&page=2"),
            &caps,
            PageLimits::default(),
        );
        assert!(query.filters.is_empty());
        assert!(query.sorts.is_empty());
        assert_eq!(query.page.page(), 2);
    }

    #[test]
    fn test_limits_keep_default_within_max() {
        let limits = PageLimits::new(50, 10);
        assert_eq!(limits.default_page_size, 10);
        assert_eq!(PageLimits::new(0, 0).max_page_size, 1);
    }

    async fn extract(request: axum::http::Request<()>) -> ListRequest {
        let (mut parts, ()) = request.into_parts();
        let Ok(request) = ListRequest::from_request_parts(&mut parts, &()).await;
        request
    }

    #[tokio::test]
    async fn test_base_url_keeps_nest_prefix() {
        let original: axum::http::Uri = "/api/v1/feed/source/?page=2".parse().unwrap();
        let request = axum::http::Request::builder()
            .uri("/source/?page=2")
            .header(header::HOST, "feeds.example")
            .extension(OriginalUri(original))
            .body(())
            .unwrap();

        let list = extract(request).await;

        assert_eq!(list.base_url(), "http://feeds.example/api/v1/feed/source/");
        assert_eq!(list.params(), &[("page".to_string(), "2".to_string())]);
    }

    #[tokio::test]
    async fn test_base_url_without_original_uri() {
        let request = axum::http::Request::builder()
            .uri("/source/")
            .header(X_FORWARDED_PROTO, "https, http")
            .body(())
            .unwrap();

        let list = extract(request).await;

        assert_eq!(list.base_url(), "https://localhost/source/");
    }
}
