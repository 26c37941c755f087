//! Post handlers.
//!
//! Posts are addressed through their source, `/source/{id}/post/{post_id}/`.
//! The source must belong to the caller and the post must belong to the
//! source; anything else is a 404.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use feedkeeper_persistence::core::FeedStorage;
use feedkeeper_persistence::types::{Post, PostDraft, PostMark, User};
use tracing::{debug, info};

use crate::error::RestResult;
use crate::extractors::{AuthenticatedUser, ListRequest, PageLimits};
use crate::listing::{ListPage, list_records};
use crate::state::AppState;

/// Lists the posts of one of the caller's sources.
///
/// # HTTP Request
///
/// `GET /api/v1/feed/source/{id}/post/?page=&page_size=&sort=&search=`
///
/// # Response
///
/// - `200 OK` - JSON array of posts with `X-Pagination-*` and `Link` headers
/// - `404 Not Found` - the source is not the caller's
pub async fn list_posts_handler<S>(
    State(state): State<AppState<S>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path(source_id): Path<i64>,
    request: ListRequest,
) -> RestResult<ListPage<Post>>
where
    S: FeedStorage,
{
    debug!(user_id = owner.id, source_id, params = ?request.params(), "Listing posts");

    let base = state.storage().posts(&owner, source_id).await?;
    let caps = state.registry().of::<Post>();
    list_records(&base, &caps, &request, PageLimits::from_config(state.config())).await
}

/// Creates a post under one of the caller's sources.
///
/// # Response
///
/// - `201 Created` - the stored post
pub async fn create_post_handler<S>(
    State(state): State<AppState<S>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path(source_id): Path<i64>,
    payload: Result<Json<PostDraft>, JsonRejection>,
) -> RestResult<Response>
where
    S: FeedStorage,
{
    let Json(draft) = payload?;
    let post = state.storage().create_post(&owner, source_id, draft).await?;
    info!(user_id = owner.id, source_id, post_id = post.id, "Created post");

    Ok((StatusCode::CREATED, Json(post)).into_response())
}

/// Reads one post of one of the caller's sources.
pub async fn read_post_handler<S>(
    State(state): State<AppState<S>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path((source_id, post_id)): Path<(i64, i64)>,
) -> RestResult<Json<Post>>
where
    S: FeedStorage,
{
    debug!(user_id = owner.id, source_id, post_id, "Reading post");
    Ok(Json(
        state.storage().read_post(&owner, source_id, post_id).await?,
    ))
}

/// Replaces the editable fields of a post. `uuid` and `found` are kept.
pub async fn update_post_handler<S>(
    State(state): State<AppState<S>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path((source_id, post_id)): Path<(i64, i64)>,
    payload: Result<Json<PostDraft>, JsonRejection>,
) -> RestResult<Json<Post>>
where
    S: FeedStorage,
{
    let Json(draft) = payload?;
    let post = state
        .storage()
        .update_post(&owner, source_id, post_id, draft)
        .await?;
    debug!(user_id = owner.id, source_id, post_id, "Updated post");

    Ok(Json(post))
}

/// Deletes a post.
pub async fn delete_post_handler<S>(
    State(state): State<AppState<S>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path((source_id, post_id)): Path<(i64, i64)>,
) -> RestResult<StatusCode>
where
    S: FeedStorage,
{
    state
        .storage()
        .delete_post(&owner, source_id, post_id)
        .await?;
    info!(user_id = owner.id, source_id, post_id, "Deleted post");

    Ok(StatusCode::NO_CONTENT)
}

async fn set_mark<S>(
    state: &AppState<S>,
    owner: &User,
    (source_id, post_id): (i64, i64),
    mark: PostMark,
    value: bool,
) -> RestResult<StatusCode>
where
    S: FeedStorage,
{
    state
        .storage()
        .mark_post(owner, source_id, post_id, mark, value)
        .await?;
    debug!(
        user_id = owner.id,
        source_id,
        post_id,
        mark = mark.field(),
        value,
        "Marked post"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// `PATCH .../favorite/` sets `is_liked`.
pub async fn like_post_handler<S>(
    State(state): State<AppState<S>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path(ids): Path<(i64, i64)>,
) -> RestResult<StatusCode>
where
    S: FeedStorage,
{
    set_mark(&state, &owner, ids, PostMark::Like, true).await
}

/// `DELETE .../favorite/` clears `is_liked`.
pub async fn unlike_post_handler<S>(
    State(state): State<AppState<S>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path(ids): Path<(i64, i64)>,
) -> RestResult<StatusCode>
where
    S: FeedStorage,
{
    set_mark(&state, &owner, ids, PostMark::Like, false).await
}

/// `PATCH .../bookmark/` sets `is_bookmarked`.
pub async fn bookmark_post_handler<S>(
    State(state): State<AppState<S>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path(ids): Path<(i64, i64)>,
) -> RestResult<StatusCode>
where
    S: FeedStorage,
{
    set_mark(&state, &owner, ids, PostMark::Bookmark, true).await
}

/// `DELETE .../bookmark/` clears `is_bookmarked`.
pub async fn unbookmark_post_handler<S>(
    State(state): State<AppState<S>>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path(ids): Path<(i64, i64)>,
) -> RestResult<StatusCode>
where
    S: FeedStorage,
{
    set_mark(&state, &owner, ids, PostMark::Bookmark, false).await
}
