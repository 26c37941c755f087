//! Pagination response headers.
//!
//! A list response carries its paging state and the entity's capability
//! sets in `X-Pagination-*` headers, plus a `Link` header with `first`,
//! `prev`, `self`, `next` and `last` relations.

use feedkeeper_persistence::schema::EntityCapabilities;
use feedkeeper_persistence::types::PageResult;
use http::{HeaderMap, HeaderName, HeaderValue, header};

use crate::extractors::ListRequest;

/// Records matching the query across all pages.
pub const TOTAL_COUNT: HeaderName = HeaderName::from_static("x-pagination-total-count");
/// Number of the last page, never less than 1.
pub const PAGE_COUNT: HeaderName = HeaderName::from_static("x-pagination-page-count");
/// Requested page, even past the last one.
pub const CURRENT_PAGE: HeaderName = HeaderName::from_static("x-pagination-current-page");
/// Effective page size.
pub const PER_PAGE: HeaderName = HeaderName::from_static("x-pagination-per-page");
/// Sortable field paths, comma-separated in declaration order.
pub const SORTABLE_FIELDS: HeaderName = HeaderName::from_static("x-pagination-sortable-fields");
/// Filterable field paths.
pub const FILTERABLE_FIELDS: HeaderName =
    HeaderName::from_static("x-pagination-filterable-fields");
/// Searchable field paths.
pub const SEARCHABLE_FIELDS: HeaderName =
    HeaderName::from_static("x-pagination-searchable-fields");

/// One `Link` header entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    /// Relation name.
    pub rel: &'static str,
    /// Target URL.
    pub url: String,
}

/// Headers describing one page of a list response.
#[derive(Debug, Clone)]
pub struct ListHeaders {
    total_count: u64,
    page_count: u64,
    current_page: u64,
    per_page: u64,
    sortable: String,
    filterable: String,
    searchable: String,
    links: Vec<PageLink>,
}

impl ListHeaders {
    /// Builds the headers for `result`, linking pages relative to `request`.
    pub fn new<T>(
        result: &PageResult<T>,
        caps: &EntityCapabilities,
        request: &ListRequest,
    ) -> Self {
        let last_page = result.last_page();
        let link = |rel, page| PageLink {
            rel,
            url: page_url(request.base_url(), request.params(), page),
        };

        let mut links = vec![link("first", 1)];
        if let Some(prev) = result.prev_page() {
            links.push(link("prev", prev));
        }
        links.push(link("self", result.current_page));
        if let Some(next) = result.next_page() {
            links.push(link("next", next));
        }
        links.push(link("last", last_page));

        Self {
            total_count: result.total_count,
            page_count: last_page,
            current_page: result.current_page,
            per_page: result.page_size,
            sortable: caps.sortable().join(","),
            filterable: caps.filterable().join(","),
            searchable: caps.searchable().join(","),
            links,
        }
    }

    /// The `Link` entries in emission order.
    pub fn links(&self) -> &[PageLink] {
        &self.links
    }

    /// Renders the `Link` header value.
    pub fn link_header(&self) -> String {
        self.links
            .iter()
            .map(|link| format!("<{}>; rel={}", link.url, link.rel))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Converts to a HeaderMap.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(TOTAL_COUNT, HeaderValue::from(self.total_count));
        headers.insert(PAGE_COUNT, HeaderValue::from(self.page_count));
        headers.insert(CURRENT_PAGE, HeaderValue::from(self.current_page));
        headers.insert(PER_PAGE, HeaderValue::from(self.per_page));

        for (name, value) in [
            (SORTABLE_FIELDS, &self.sortable),
            (FILTERABLE_FIELDS, &self.filterable),
            (SEARCHABLE_FIELDS, &self.searchable),
        ] {
            if let Ok(value) = HeaderValue::from_str(value) {
                headers.insert(name, value);
            }
        }

        // Link targets are percent-encoded, so the value is always visible ASCII
        if let Ok(value) = HeaderValue::from_str(&self.link_header()) {
            headers.insert(header::LINK, value);
        }

        headers
    }
}

/// URL-encodes a query component, leaving `/` readable.
fn encode_component(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes())
        .collect::<String>()
        .replace("%2F", "/")
}

/// Percent-encodes every byte of `base_url` outside visible ASCII.
fn encode_base(base_url: &str) -> String {
    let mut out = String::with_capacity(base_url.len());
    for byte in base_url.bytes() {
        if byte.is_ascii_graphic() {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

/// Rebuilds the request URL with `page` set to `page`.
///
/// Other parameters keep their order and values. The first `page` pair is
/// replaced in place and any later ones removed; without one, `page` is
/// appended.
pub fn page_url(base_url: &str, params: &[(String, String)], page: u64) -> String {
    let page = page.to_string();
    let mut pairs: Vec<(&str, &str)> = Vec::with_capacity(params.len() + 1);
    let mut replaced = false;

    for (key, value) in params {
        if key == "page" {
            if !replaced {
                pairs.push(("page", &page));
                replaced = true;
            }
        } else {
            pairs.push((key, value));
        }
    }
    if !replaced {
        pairs.push(("page", &page));
    }

    let query = pairs
        .iter()
        .map(|(key, value)| format!("{}={}", encode_component(key), encode_component(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", encode_base(base_url), query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedkeeper_persistence::schema::CapabilityRegistry;
    use feedkeeper_persistence::types::{PageRequest, Source};

    const BASE: &str = "http://localhost/api/v1/feed/source/";

    fn request(query: &str) -> ListRequest {
        ListRequest::from_query(Some(query), BASE)
    }

    fn headers(query: &str, page: u64, page_size: u64, total: u64) -> ListHeaders {
        headers_for(&request(query), page, page_size, total)
    }

    fn headers_for(req: &ListRequest, page: u64, page_size: u64, total: u64) -> ListHeaders {
        let registry = CapabilityRegistry::feed().unwrap();
        let result: PageResult<()> =
            PageResult::new(PageRequest::new(page, page_size), total, Vec::new());
        ListHeaders::new(&result, &registry.of::<Source>(), req)
    }

    fn rels(headers: &ListHeaders) -> Vec<&'static str> {
        headers.links().iter().map(|l| l.rel).collect()
    }

    #[test]
    fn test_page_url_replaces_page_in_place() {
        let req = request("filter__name=e&page=2&page_size=1&page=7");
        assert_eq!(
            page_url(req.base_url(), req.params(), 1),
            format!("{}?filter__name=e&page=1&page_size=1", BASE)
        );
    }

    #[test]
    fn test_page_url_appends_page() {
        let req = request("sort=-name");
        assert_eq!(
            page_url(req.base_url(), req.params(), 3),
            format!("{}?sort=-name&page=3", BASE)
        );
        assert_eq!(page_url(BASE, &[], 1), format!("{}?page=1", BASE));
    }

    #[test]
    fn test_page_url_keeps_slash() {
        let req = request("filter__feed_url=https%3A%2F%2Fa.example%2Frss&search=a+b");
        assert_eq!(
            page_url(req.base_url(), req.params(), 1),
            format!(
                "{}?filter__feed_url=https%3A//a.example/rss&search=a+b&page=1",
                BASE
            )
        );
    }

    #[test]
    fn test_non_ascii_base_is_encoded() {
        let req = ListRequest::from_query(Some("page=2"), "http://bücher.example/a b/");
        let h = headers_for(&req, 2, 1, 3);
        assert_eq!(h.links()[0].url, "http://b%C3%BCcher.example/a%20b/?page=1");
        let map = h.to_header_map();
        assert!(map[&header::LINK].to_str().unwrap().contains("rel=next"));
    }

    #[test]
    fn test_middle_page_links() {
        let h = headers("page=2&page_size=1", 2, 1, 3);
        assert_eq!(rels(&h), vec!["first", "prev", "self", "next", "last"]);
        assert!(h.links()[4].url.ends_with("page=3&page_size=1"));
    }

    #[test]
    fn test_single_page_links() {
        let h = headers("", 1, 20, 3);
        assert_eq!(rels(&h), vec!["first", "self", "last"]);
        assert_eq!(
            h.link_header(),
            format!(
                "<{0}?page=1>; rel=first, <{0}?page=1>; rel=self, <{0}?page=1>; rel=last",
                BASE
            )
        );
    }

    #[test]
    fn test_over_paging_headers() {
        let h = headers("page=9999&page_size=10", 9999, 10, 3);
        let map = h.to_header_map();
        assert_eq!(map[&TOTAL_COUNT], "3");
        assert_eq!(map[&PAGE_COUNT], "1");
        assert_eq!(map[&CURRENT_PAGE], "9999");
        assert_eq!(map[&PER_PAGE], "10");
        assert_eq!(rels(&h), vec!["first", "prev", "self", "last"]);
        assert!(h.links()[1].url.contains("page=9998"));
    }

    #[test]
    fn test_capability_headers_in_declaration_order() {
        let map = headers("", 1, 20, 0).to_header_map();
        assert_eq!(map[&SORTABLE_FIELDS], "id,name,created_at,last_polled,interval");
        assert_eq!(
            map[&FILTERABLE_FIELDS],
            "name,site_url,feed_url,live,interval,status_code,user.email"
        );
        assert_eq!(map[&SEARCHABLE_FIELDS], "name,description,site_url");
        assert_eq!(map[&PAGE_COUNT], "1");
    }
}
