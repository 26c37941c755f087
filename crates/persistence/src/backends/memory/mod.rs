//! In-memory backend.
//!
//! Keeps every table behind one `parking_lot::RwLock`. Collections take an
//! owner-scoped snapshot and evaluate predicates and orderings in process,
//! which makes this backend the reference for how list queries behave.

mod collection;
mod storage;

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use crate::types::{Post, Source, User};

pub use collection::MemoryCollection;

/// In-memory storage for users, sources and posts.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeMap<i64, User>,
    tokens: HashMap<String, i64>,
    sources: BTreeMap<i64, Source>,
    posts: BTreeMap<i64, Post>,
    last_user_id: i64,
    last_source_id: i64,
    last_post_id: i64,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sources across all owners.
    pub fn source_count(&self) -> usize {
        self.state.read().sources.len()
    }

    /// Number of stored posts across all sources.
    pub fn post_count(&self) -> usize {
        self.state.read().posts.len()
    }
}

impl MemoryState {
    /// Returns the source if it exists and belongs to `owner_id`.
    fn owned_source(&self, owner_id: i64, source_id: i64) -> Option<&Source> {
        self.sources
            .get(&source_id)
            .filter(|s| s.user.id == owner_id)
    }

    /// Returns the post if it belongs to the given owned source.
    fn owned_post(&self, owner_id: i64, source_id: i64, post_id: i64) -> Option<Post> {
        let source = self.owned_source(owner_id, source_id)?;
        self.posts
            .get(&post_id)
            .filter(|p| p.source.id == source_id)
            .map(|p| Post {
                source: source.clone(),
                ..p.clone()
            })
    }
}
