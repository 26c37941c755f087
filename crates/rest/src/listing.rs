//! The list dispatcher.
//!
//! Every list endpoint runs the same pipeline over an owner-scoped base
//! collection: parse the query pairs against the entity's capabilities,
//! compose the clauses onto the collection, load one page, and attach the
//! pagination headers. Authorization is the caller's job; the base
//! collection is already restricted to what the caller may see.
//!
//! Query parameters never cause an error here. Only storage failures
//! propagate.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use feedkeeper_persistence::core::Collection;
use feedkeeper_persistence::query::{compose, paginate};
use feedkeeper_persistence::schema::EntityCapabilities;
use serde::Serialize;
use tracing::debug;

use crate::error::RestResult;
use crate::extractors::{ListRequest, PageLimits};
use crate::responses::ListHeaders;

/// One page of records with its headers.
#[derive(Debug)]
pub struct ListPage<T> {
    /// Records on the page, in collection order.
    pub items: Vec<T>,
    /// Pagination and capability headers.
    pub headers: ListHeaders,
}

impl<T: Serialize> IntoResponse for ListPage<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.headers.to_header_map(), Json(self.items)).into_response()
    }
}

/// Lists `base` as shaped by `request`.
pub async fn list_records<C: Collection>(
    base: &C,
    caps: &EntityCapabilities,
    request: &ListRequest,
    limits: PageLimits,
) -> RestResult<ListPage<C::Record>> {
    let query = request.to_query(caps, limits);
    debug!(
        filters = query.filters.len(),
        sorts = query.sorts.len(),
        search = query.search.is_some(),
        page = query.page.page(),
        page_size = query.page.page_size(),
        "Shaping list query"
    );

    let composed = compose(base, &query, caps);
    let result = paginate(&composed, query.page).await?;
    let headers = ListHeaders::new(&result, caps, request);

    Ok(ListPage {
        items: result.items,
        headers,
    })
}
