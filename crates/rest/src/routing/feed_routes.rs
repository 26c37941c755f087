//! Feed route configuration.

use axum::{
    Router,
    routing::{MethodRouter, get, patch},
};
use feedkeeper_persistence::core::FeedStorage;

use crate::handlers;
use crate::state::AppState;

/// Prefix of every feed route.
pub const API_PREFIX: &str = "/api/v1/feed";

/// Registers `path` with and without its trailing slash.
fn both<S>(
    router: Router<AppState<S>>,
    path: &str,
    method_router: MethodRouter<AppState<S>>,
) -> Router<AppState<S>>
where
    S: FeedStorage,
{
    let bare = path.trim_end_matches('/');
    router
        .route(path, method_router.clone())
        .route(bare, method_router)
}

/// Creates all feed API routes.
///
/// # Routes
///
/// - `GET /health` - Health check
///
/// Under `/api/v1/feed`, each also reachable without the trailing slash:
///
/// - `GET|POST /source/` - List or create sources
/// - `GET|PUT|DELETE /source/{id}/` - Read, update or delete a source
/// - `GET|POST /source/{id}/post/` - List or create posts
/// - `GET|PUT|DELETE /source/{id}/post/{post_id}/` - Read, update or delete a post
/// - `PATCH|DELETE /source/{id}/post/{post_id}/favorite/` - Like or unlike
/// - `PATCH|DELETE /source/{id}/post/{post_id}/bookmark/` - Bookmark or unbookmark
pub fn create_routes<S>(state: AppState<S>) -> Router
where
    S: FeedStorage,
{
    let mut feed = Router::new();
    feed = both(
        feed,
        "/source/",
        get(handlers::list_sources_handler::<S>).post(handlers::create_source_handler::<S>),
    );
    feed = both(
        feed,
        "/source/{id}/",
        get(handlers::read_source_handler::<S>)
            .put(handlers::update_source_handler::<S>)
            .delete(handlers::delete_source_handler::<S>),
    );
    feed = both(
        feed,
        "/source/{id}/post/",
        get(handlers::list_posts_handler::<S>).post(handlers::create_post_handler::<S>),
    );
    feed = both(
        feed,
        "/source/{id}/post/{post_id}/",
        get(handlers::read_post_handler::<S>)
            .put(handlers::update_post_handler::<S>)
            .delete(handlers::delete_post_handler::<S>),
    );
    feed = both(
        feed,
        "/source/{id}/post/{post_id}/favorite/",
        patch(handlers::like_post_handler::<S>).delete(handlers::unlike_post_handler::<S>),
    );
    feed = both(
        feed,
        "/source/{id}/post/{post_id}/bookmark/",
        patch(handlers::bookmark_post_handler::<S>).delete(handlers::unbookmark_post_handler::<S>),
    );

    Router::new()
        .route("/health", get(handlers::health_handler::<S>))
        .nest(API_PREFIX, feed)
        .with_state(state)
}
