//! Core feed storage trait.
//!
//! This module defines the [`FeedStorage`] trait, which provides account
//! lookup, source and post CRUD, and the owner-scoped base collections that
//! list endpoints refine. Every operation on sources and posts takes the
//! owning [`User`] so that a caller can never see or change another user's
//! records.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::types::{Post, PostDraft, PostMark, Source, SourceDraft, User, UserDraft};

use super::collection::Collection;

/// Storage for users, sources and posts.
///
/// # Ownership
///
/// Sources belong to exactly one user and posts belong to exactly one
/// source. Reads and writes that name a record owned by someone else fail
/// with `StorageError::Resource(NotFound)`, exactly as if the record did not
/// exist.
///
/// # Collections
///
/// [`FeedStorage::sources`] and [`FeedStorage::posts`] return base
/// collections already scoped to the owner. The list dispatcher refines them
/// with the caller's filters, search and sorts and never adds authorization
/// predicates of its own.
///
/// # Example
///
/// ```ignore
/// use feedkeeper_persistence::core::{Collection, FeedStorage};
///
/// async fn example<S: FeedStorage>(storage: &S) -> StorageResult<()> {
///     let user = storage.create_user(UserDraft::with_email("john@snow.com")).await?;
///     let source = storage
///         .create_source(&user, SourceDraft::new("Tech", "https://tech.example/rss"))
///         .await?;
///     storage
///         .create_post(&user, source.id, PostDraft::new("Hello", "First post"))
///         .await?;
///
///     let posts = storage.posts(&user, source.id).await?;
///     assert_eq!(posts.count().await?, 1);
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait FeedStorage: Send + Sync + 'static {
    /// Owner-scoped source collection.
    type Sources: Collection<Record = Source> + 'static;

    /// Source-scoped post collection.
    type Posts: Collection<Record = Post> + 'static;

    /// Returns a human-readable name for this storage backend.
    fn backend_name(&self) -> &'static str;

    /// Registers an account.
    ///
    /// # Errors
    ///
    /// * `StorageError::Validation` - if neither email nor cellphone is given
    async fn create_user(&self, draft: UserDraft) -> StorageResult<User>;

    /// Issues a new bearer token for a user.
    ///
    /// # Errors
    ///
    /// * `StorageError::Resource(NotFound)` - if the user does not exist
    async fn issue_token(&self, user_id: i64) -> StorageResult<String>;

    /// Resolves a bearer token to its active user.
    ///
    /// Returns `Ok(None)` for unknown tokens and inactive users.
    async fn user_for_token(&self, token: &str) -> StorageResult<Option<User>>;

    /// Returns the sources owned by `owner`.
    async fn sources(&self, owner: &User) -> StorageResult<Self::Sources>;

    /// Creates a source owned by `owner`.
    ///
    /// # Errors
    ///
    /// * `StorageError::Validation` - if the draft has no feed URL
    async fn create_source(&self, owner: &User, draft: SourceDraft) -> StorageResult<Source>;

    /// Reads one of `owner`'s sources.
    async fn read_source(&self, owner: &User, id: i64) -> StorageResult<Source>;

    /// Replaces the editable fields of one of `owner`'s sources.
    async fn update_source(
        &self,
        owner: &User,
        id: i64,
        draft: SourceDraft,
    ) -> StorageResult<Source>;

    /// Deletes a source together with its posts.
    async fn delete_source(&self, owner: &User, id: i64) -> StorageResult<()>;

    /// Returns the posts of one of `owner`'s sources.
    ///
    /// # Errors
    ///
    /// * `StorageError::Resource(NotFound)` - if the source is not `owner`'s
    async fn posts(&self, owner: &User, source_id: i64) -> StorageResult<Self::Posts>;

    /// Creates a post under one of `owner`'s sources.
    async fn create_post(
        &self,
        owner: &User,
        source_id: i64,
        draft: PostDraft,
    ) -> StorageResult<Post>;

    /// Reads a post of one of `owner`'s sources.
    async fn read_post(&self, owner: &User, source_id: i64, post_id: i64) -> StorageResult<Post>;

    /// Replaces the editable fields of a post.
    async fn update_post(
        &self,
        owner: &User,
        source_id: i64,
        post_id: i64,
        draft: PostDraft,
    ) -> StorageResult<Post>;

    /// Deletes a post.
    async fn delete_post(&self, owner: &User, source_id: i64, post_id: i64) -> StorageResult<()>;

    /// Sets or clears a like/bookmark flag on a post.
    async fn mark_post(
        &self,
        owner: &User,
        source_id: i64,
        post_id: i64,
        mark: PostMark,
        value: bool,
    ) -> StorageResult<()>;
}
