//! Shared fixtures for backend integration tests.

#![allow(dead_code, unused_macros)]

use chrono::{DateTime, TimeZone, Utc};

use feedkeeper_persistence::backends::sqlite::SqliteBackend;
use feedkeeper_persistence::core::{Entity, FeedStorage};
use feedkeeper_persistence::query::{compose, paginate};
use feedkeeper_persistence::schema::CapabilityRegistry;
use feedkeeper_persistence::types::{
    ListQuery, PageResult, Post, PostDraft, Source, SourceDraft, User, UserDraft,
};

/// Instantiates each generic scenario `async fn name<S: FeedStorage>(&S)`
/// once per backend.
macro_rules! backend_tests {
    ($($name:ident),* $(,)?) => {
        mod memory {
            use feedkeeper_persistence::backends::memory::MemoryBackend;
            $(
                #[tokio::test]
                async fn $name() {
                    super::$name(&MemoryBackend::new()).await;
                }
            )*
        }

        mod sqlite {
            $(
                #[tokio::test]
                async fn $name() {
                    super::$name(&super::common::sqlite_backend()).await;
                }
            )*
        }
    };
}

/// A fresh in-memory SQLite backend with the schema applied.
pub fn sqlite_backend() -> SqliteBackend {
    let backend = SqliteBackend::in_memory().expect("Failed to create SQLite backend");
    backend.init_schema().expect("Failed to initialize schema");
    backend
}

pub async fn create_owner<S: FeedStorage>(storage: &S, email: &str) -> User {
    storage
        .create_user(UserDraft::with_email(email))
        .await
        .expect("create user")
}

/// Creates one source per name, in order.
pub async fn seed_sources<S: FeedStorage>(
    storage: &S,
    owner: &User,
    names: &[&str],
) -> Vec<Source> {
    let mut out = Vec::new();
    for name in names {
        let feed_url = format!("https://{}.example/feed", name.to_lowercase());
        let draft = SourceDraft::new(*name, feed_url);
        out.push(storage.create_source(owner, draft).await.expect("create source"));
    }
    out
}

pub fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, 12, 0, 0).unwrap()
}

/// Creates posts as `(title, created day)` pairs, in order.
pub async fn seed_posts<S: FeedStorage>(
    storage: &S,
    owner: &User,
    source: &Source,
    posts: &[(&str, u32)],
) -> Vec<Post> {
    let mut out = Vec::new();
    for (title, d) in posts {
        let draft = PostDraft::new(*title, format!("body of {}", title)).created_at(day(*d));
        out.push(
            storage
                .create_post(owner, source.id, draft)
                .await
                .expect("create post"),
        );
    }
    out
}

pub async fn list_sources<S: FeedStorage>(
    storage: &S,
    owner: &User,
    query: &ListQuery,
) -> PageResult<Source> {
    let registry = CapabilityRegistry::feed().expect("registry");
    let base = storage.sources(owner).await.expect("sources");
    let refined = compose(&base, query, &registry.of::<Source>());
    paginate(&refined, query.page).await.expect("paginate")
}

pub async fn list_posts<S: FeedStorage>(
    storage: &S,
    owner: &User,
    source_id: i64,
    query: &ListQuery,
) -> PageResult<Post> {
    let registry = CapabilityRegistry::feed().expect("registry");
    let base = storage.posts(owner, source_id).await.expect("posts");
    let refined = compose(&base, query, &registry.of::<Post>());
    paginate(&refined, query.page).await.expect("paginate")
}

pub fn names(page: &PageResult<Source>) -> Vec<String> {
    page.items
        .iter()
        .map(|s| s.name.clone().unwrap_or_default())
        .collect()
}

pub fn titles(page: &PageResult<Post>) -> Vec<String> {
    page.items.iter().map(|p| p.title.clone()).collect()
}

pub fn ids<E: Entity>(items: &[E]) -> Vec<i64> {
    items.iter().map(Entity::id).collect()
}
