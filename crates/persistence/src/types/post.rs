//! Feed post records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::Entity;
use crate::error::ValidationError;
use crate::schema::{EntitySchema, FieldDescriptor};
use crate::types::FieldValue;

use super::source::{SOURCE_SCHEMA, Source};

/// Descriptor tree of [`Post`].
pub static POST_SCHEMA: EntitySchema = EntitySchema {
    name: "Post",
    table: "posts",
    fields: &[
        FieldDescriptor::integer("id"),
        FieldDescriptor::reference("source", "source_id", &SOURCE_SCHEMA),
        FieldDescriptor::text("title"),
        FieldDescriptor::text("body"),
        FieldDescriptor::text("link"),
        FieldDescriptor::timestamp("found"),
        FieldDescriptor::timestamp("created"),
        FieldDescriptor::text("uuid"),
        FieldDescriptor::text("author"),
        FieldDescriptor::text("image_url"),
        FieldDescriptor::boolean("is_liked"),
        FieldDescriptor::boolean("is_bookmarked"),
        FieldDescriptor::timestamp("created_at"),
    ],
};

/// An entry of a feed source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: i64,
    /// The source the post belongs to, embedded in full.
    pub source: Source,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
    /// When the post was first stored.
    pub found: DateTime<Utc>,
    /// Publication time reported by the feed.
    pub created: DateTime<Utc>,
    pub uuid: String,
    pub author: Option<String>,
    pub image_url: Option<String>,
    pub is_liked: Option<bool>,
    pub is_bookmarked: Option<bool>,
    pub created_at: DateTime<Utc>,
}

/// A per-post flag the owner can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostMark {
    Like,
    Bookmark,
}

impl PostMark {
    /// Column and field name of the flag.
    pub fn field(&self) -> &'static str {
        match self {
            PostMark::Like => "is_liked",
            PostMark::Bookmark => "is_bookmarked",
        }
    }
}

impl Post {
    /// Builds a new post from a validated draft.
    ///
    /// `created` falls back to `now` and a fresh v4 UUID is assigned.
    pub fn from_draft(id: i64, source: Source, draft: PostDraft, now: DateTime<Utc>) -> Self {
        let mut post = Self {
            id,
            source,
            title: String::new(),
            body: String::new(),
            link: None,
            found: now,
            created: draft.created.unwrap_or(now),
            uuid: Uuid::new_v4().to_string(),
            author: None,
            image_url: None,
            is_liked: None,
            is_bookmarked: None,
            created_at: now,
        };
        post.apply(draft);
        post
    }

    /// Overwrites the editable fields. `created` is only replaced when the
    /// draft carries one.
    pub fn apply(&mut self, draft: PostDraft) {
        self.title = draft.title;
        self.body = draft.body;
        self.link = draft.link;
        self.author = draft.author;
        self.image_url = draft.image_url;
        self.is_liked = draft.is_liked;
        self.is_bookmarked = draft.is_bookmarked;
        if let Some(created) = draft.created {
            self.created = created;
        }
    }

    /// Sets a flag.
    pub fn mark(&mut self, mark: PostMark, value: bool) {
        match mark {
            PostMark::Like => self.is_liked = Some(value),
            PostMark::Bookmark => self.is_bookmarked = Some(value),
        }
    }
}

impl Entity for Post {
    fn schema() -> &'static EntitySchema {
        &POST_SCHEMA
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn filterable_fields() -> &'static [&'static str] {
        &[
            "title",
            "author",
            "link",
            "is_liked",
            "is_bookmarked",
            "created",
            "source.name",
        ]
    }

    fn sortable_fields() -> &'static [&'static str] {
        &["id", "created", "found", "title", "author"]
    }

    fn searchable_fields() -> &'static [&'static str] {
        &["title", "body", "author"]
    }

    fn field_value(&self, path: &str) -> FieldValue {
        if let Some(rest) = path.strip_prefix("source.") {
            return self.source.field_value(rest);
        }
        match path {
            "id" => self.id.into(),
            "source" => self.source.id.into(),
            "title" => self.title.clone().into(),
            "body" => self.body.clone().into(),
            "link" => self.link.clone().into(),
            "found" => self.found.into(),
            "created" => self.created.into(),
            "uuid" => self.uuid.clone().into(),
            "author" => self.author.clone().into(),
            "image_url" => self.image_url.clone().into(),
            "is_liked" => self.is_liked.into(),
            "is_bookmarked" => self.is_bookmarked.into(),
            "created_at" => self.created_at.into(),
            _ => FieldValue::Null,
        }
    }
}

/// Fields a client supplies when creating or replacing a post.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub link: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub author: Option<String>,
    pub image_url: Option<String>,
    pub is_liked: Option<bool>,
    pub is_bookmarked: Option<bool>,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn created_at(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.body.trim().is_empty() {
            return Err(ValidationError::MissingRequiredField {
                field: "body".to_string(),
            });
        }
        Ok(())
    }
}
