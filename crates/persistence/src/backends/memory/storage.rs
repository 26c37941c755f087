//! FeedStorage implementation for the in-memory backend.

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::core::FeedStorage;
use crate::error::{ResourceError, StorageResult};
use crate::types::{Post, PostDraft, PostMark, Source, SourceDraft, User, UserDraft};

use super::{MemoryBackend, MemoryCollection};

#[async_trait]
impl FeedStorage for MemoryBackend {
    type Sources = MemoryCollection<Source>;
    type Posts = MemoryCollection<Post>;

    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create_user(&self, draft: UserDraft) -> StorageResult<User> {
        draft.validate()?;
        let mut state = self.state.write();
        state.last_user_id += 1;
        let user = User::from_draft(state.last_user_id, draft, Utc::now());
        state.users.insert(user.id, user.clone());
        debug!(user_id = user.id, "Created user");
        Ok(user)
    }

    async fn issue_token(&self, user_id: i64) -> StorageResult<String> {
        let mut state = self.state.write();
        if !state.users.contains_key(&user_id) {
            return Err(ResourceError::not_found("User", user_id).into());
        }
        let token = Uuid::new_v4().simple().to_string();
        state.tokens.insert(token.clone(), user_id);
        Ok(token)
    }

    async fn user_for_token(&self, token: &str) -> StorageResult<Option<User>> {
        let state = self.state.read();
        Ok(state
            .tokens
            .get(token)
            .and_then(|id| state.users.get(id))
            .filter(|u| u.is_active)
            .cloned())
    }

    async fn sources(&self, owner: &User) -> StorageResult<Self::Sources> {
        let state = self.state.read();
        let owned = state
            .sources
            .values()
            .filter(|s| s.user.id == owner.id)
            .cloned()
            .collect();
        Ok(MemoryCollection::new(owned))
    }

    async fn create_source(&self, owner: &User, draft: SourceDraft) -> StorageResult<Source> {
        draft.validate()?;
        let mut state = self.state.write();
        state.last_source_id += 1;
        let source = Source::from_draft(state.last_source_id, owner.clone(), draft, Utc::now());
        state.sources.insert(source.id, source.clone());
        debug!(source_id = source.id, user_id = owner.id, "Created source");
        Ok(source)
    }

    async fn read_source(&self, owner: &User, id: i64) -> StorageResult<Source> {
        self.state
            .read()
            .owned_source(owner.id, id)
            .cloned()
            .ok_or_else(|| ResourceError::not_found("Source", id).into())
    }

    async fn update_source(
        &self,
        owner: &User,
        id: i64,
        draft: SourceDraft,
    ) -> StorageResult<Source> {
        draft.validate()?;
        let mut state = self.state.write();
        let source = state
            .sources
            .get_mut(&id)
            .filter(|s| s.user.id == owner.id)
            .ok_or_else(|| ResourceError::not_found("Source", id))?;
        source.apply(draft);
        Ok(source.clone())
    }

    async fn delete_source(&self, owner: &User, id: i64) -> StorageResult<()> {
        let mut state = self.state.write();
        if state.owned_source(owner.id, id).is_none() {
            return Err(ResourceError::not_found("Source", id).into());
        }
        state.sources.remove(&id);
        state.posts.retain(|_, p| p.source.id != id);
        debug!(source_id = id, "Deleted source and its posts");
        Ok(())
    }

    async fn posts(&self, owner: &User, source_id: i64) -> StorageResult<Self::Posts> {
        let state = self.state.read();
        let source = state
            .owned_source(owner.id, source_id)
            .ok_or_else(|| ResourceError::not_found("Source", source_id))?;
        let posts = state
            .posts
            .values()
            .filter(|p| p.source.id == source_id)
            .map(|p| Post {
                source: source.clone(),
                ..p.clone()
            })
            .collect();
        Ok(MemoryCollection::new(posts))
    }

    async fn create_post(
        &self,
        owner: &User,
        source_id: i64,
        draft: PostDraft,
    ) -> StorageResult<Post> {
        draft.validate()?;
        let mut state = self.state.write();
        let source = state
            .owned_source(owner.id, source_id)
            .cloned()
            .ok_or_else(|| ResourceError::not_found("Source", source_id))?;
        state.last_post_id += 1;
        let post = Post::from_draft(state.last_post_id, source, draft, Utc::now());
        state.posts.insert(post.id, post.clone());
        debug!(post_id = post.id, source_id, "Created post");
        Ok(post)
    }

    async fn read_post(&self, owner: &User, source_id: i64, post_id: i64) -> StorageResult<Post> {
        self.state
            .read()
            .owned_post(owner.id, source_id, post_id)
            .ok_or_else(|| ResourceError::not_found("Post", post_id).into())
    }

    async fn update_post(
        &self,
        owner: &User,
        source_id: i64,
        post_id: i64,
        draft: PostDraft,
    ) -> StorageResult<Post> {
        draft.validate()?;
        let mut state = self.state.write();
        let mut post = state
            .owned_post(owner.id, source_id, post_id)
            .ok_or_else(|| ResourceError::not_found("Post", post_id))?;
        post.apply(draft);
        state.posts.insert(post_id, post.clone());
        Ok(post)
    }

    async fn delete_post(&self, owner: &User, source_id: i64, post_id: i64) -> StorageResult<()> {
        let mut state = self.state.write();
        if state.owned_post(owner.id, source_id, post_id).is_none() {
            return Err(ResourceError::not_found("Post", post_id).into());
        }
        state.posts.remove(&post_id);
        Ok(())
    }

    async fn mark_post(
        &self,
        owner: &User,
        source_id: i64,
        post_id: i64,
        mark: PostMark,
        value: bool,
    ) -> StorageResult<()> {
        let mut state = self.state.write();
        let mut post = state
            .owned_post(owner.id, source_id, post_id)
            .ok_or_else(|| ResourceError::not_found("Post", post_id))?;
        post.mark(mark, value);
        state.posts.insert(post_id, post);
        debug!(post_id, flag = mark.field(), value, "Marked post");
        Ok(())
    }
}
