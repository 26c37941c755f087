//! Source handlers.
//!
//! All operations act on the caller's own sources. A source owned by
//! someone else behaves exactly like one that does not exist.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use feedkeeper_persistence::core::FeedStorage;
use feedkeeper_persistence::types::{Source, SourceDraft};
use tracing::{debug, info};

use crate::error::RestResult;
use crate::extractors::{AuthenticatedUser, ListRequest, PageLimits};
use crate::listing::{ListPage, list_records};
use crate::state::AppState;

/// Lists the caller's sources.
///
/// # HTTP Request
///
/// `GET /api/v1/feed/source/?page=&page_size=&sort=&search=&filter__name=`
///
/// # Response
///
/// - `200 OK` - JSON array of sources with `X-Pagination-*` and `Link` headers
pub async fn list_sources_handler<S>(
    State(state): State<AppState<S>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    request: ListRequest,
) -> RestResult<ListPage<Source>>
where
    S: FeedStorage,
{
    debug!(user_id = owner.id, params = ?request.params(), "Listing sources");

    let base = state.storage().sources(&owner).await?;
    let caps = state.registry().of::<Source>();
    list_records(&base, &caps, &request, PageLimits::from_config(state.config())).await
}

/// Creates a source owned by the caller.
///
/// # Response
///
/// - `201 Created` - the stored source
/// - `400 Bad Request` - malformed body or missing `feed_url`
pub async fn create_source_handler<S>(
    State(state): State<AppState<S>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    payload: Result<Json<SourceDraft>, JsonRejection>,
) -> RestResult<Response>
where
    S: FeedStorage,
{
    let Json(draft) = payload?;
    let source = state.storage().create_source(&owner, draft).await?;
    info!(user_id = owner.id, source_id = source.id, "Created source");

    Ok((StatusCode::CREATED, Json(source)).into_response())
}

/// Reads one of the caller's sources.
pub async fn read_source_handler<S>(
    State(state): State<AppState<S>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path(id): Path<i64>,
) -> RestResult<Json<Source>>
where
    S: FeedStorage,
{
    debug!(user_id = owner.id, source_id = id, "Reading source");
    Ok(Json(state.storage().read_source(&owner, id).await?))
}

/// Replaces the editable fields of one of the caller's sources.
pub async fn update_source_handler<S>(
    State(state): State<AppState<S>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path(id): Path<i64>,
    payload: Result<Json<SourceDraft>, JsonRejection>,
) -> RestResult<Json<Source>>
where
    S: FeedStorage,
{
    let Json(draft) = payload?;
    let source = state.storage().update_source(&owner, id, draft).await?;
    debug!(user_id = owner.id, source_id = id, "Updated source");

    Ok(Json(source))
}

/// Deletes one of the caller's sources along with its posts.
///
/// # Response
///
/// - `204 No Content`
/// - `404 Not Found` - no such source for this caller
pub async fn delete_source_handler<S>(
    State(state): State<AppState<S>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path(id): Path<i64>,
) -> RestResult<StatusCode>
where
    S: FeedStorage,
{
    state.storage().delete_source(&owner, id).await?;
    info!(user_id = owner.id, source_id = id, "Deleted source");

    Ok(StatusCode::NO_CONTENT)
}
