//! Feed source records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::Entity;
use crate::error::ValidationError;
use crate::schema::{EntitySchema, FieldDescriptor};
use crate::types::FieldValue;

use super::user::{USER_SCHEMA, User};

/// Default polling interval, in minutes.
pub const DEFAULT_INTERVAL: i64 = 400;

/// Descriptor tree of [`Source`].
pub static SOURCE_SCHEMA: EntitySchema = EntitySchema {
    name: "Source",
    table: "sources",
    fields: &[
        FieldDescriptor::integer("id"),
        FieldDescriptor::reference("user", "user_id", &USER_SCHEMA),
        FieldDescriptor::text("name"),
        FieldDescriptor::text("site_url"),
        FieldDescriptor::text("feed_url"),
        FieldDescriptor::text("image_url"),
        FieldDescriptor::text("description"),
        FieldDescriptor::timestamp("last_polled"),
        FieldDescriptor::timestamp("due_poll"),
        FieldDescriptor::text("last_modified"),
        FieldDescriptor::text("last_result"),
        FieldDescriptor::integer("interval"),
        FieldDescriptor::timestamp("last_success"),
        FieldDescriptor::timestamp("last_change"),
        FieldDescriptor::boolean("live"),
        FieldDescriptor::integer("status_code"),
        FieldDescriptor::text("last_302_url"),
        FieldDescriptor::timestamp("last_302_start"),
        FieldDescriptor::integer("max_index"),
        FieldDescriptor::integer("num_subs"),
        FieldDescriptor::boolean("is_cloud_flare"),
        FieldDescriptor::timestamp("created_at"),
    ],
};

/// A feed that its owner follows, with the poller's bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Source {
    pub id: i64,
    /// The owner, serialized as a profile.
    pub user: User,
    pub name: Option<String>,
    pub site_url: Option<String>,
    pub feed_url: String,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub last_polled: Option<DateTime<Utc>>,
    pub due_poll: DateTime<Utc>,
    /// Opaque `Last-Modified` value echoed back to the feed server.
    pub last_modified: Option<String>,
    pub last_result: Option<String>,
    pub interval: i64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_change: Option<DateTime<Utc>>,
    pub live: bool,
    pub status_code: i64,
    pub last_302_url: Option<String>,
    pub last_302_start: Option<DateTime<Utc>>,
    pub max_index: i64,
    pub num_subs: i64,
    pub is_cloud_flare: bool,
    pub created_at: DateTime<Utc>,
}

/// Initial `due_poll`, far in the past so new sources are polled first.
pub fn initial_due_poll() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(1900, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

impl Source {
    /// Builds a new source owned by `user` from a validated draft.
    pub fn from_draft(id: i64, user: User, draft: SourceDraft, created_at: DateTime<Utc>) -> Self {
        let mut source = Self {
            id,
            user,
            name: None,
            site_url: None,
            feed_url: String::new(),
            image_url: None,
            description: None,
            last_polled: None,
            due_poll: initial_due_poll(),
            last_modified: None,
            last_result: None,
            interval: DEFAULT_INTERVAL,
            last_success: None,
            last_change: None,
            live: true,
            status_code: 0,
            last_302_url: None,
            last_302_start: None,
            max_index: 0,
            num_subs: 1,
            is_cloud_flare: false,
            created_at,
        };
        source.apply(draft);
        source
    }

    /// Overwrites the editable fields. Absent bookkeeping values are kept.
    pub fn apply(&mut self, draft: SourceDraft) {
        self.name = draft.name;
        self.site_url = draft.site_url;
        self.feed_url = draft.feed_url;
        self.image_url = draft.image_url;
        self.description = draft.description;
        if draft.last_polled.is_some() {
            self.last_polled = draft.last_polled;
        }
        if let Some(interval) = draft.interval {
            self.interval = interval;
        }
        if let Some(live) = draft.live {
            self.live = live;
        }
        if let Some(status_code) = draft.status_code {
            self.status_code = status_code;
        }
        if let Some(is_cloud_flare) = draft.is_cloud_flare {
            self.is_cloud_flare = is_cloud_flare;
        }
    }

    /// The site URL, or the feed URL when the site is unknown.
    pub fn best_link(&self) -> &str {
        match self.site_url.as_deref() {
            Some(site) if !site.is_empty() => site,
            _ => &self.feed_url,
        }
    }

    /// The name, or [`Source::best_link`] when unnamed.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.best_link(),
        }
    }
}

impl Entity for Source {
    fn schema() -> &'static EntitySchema {
        &SOURCE_SCHEMA
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn filterable_fields() -> &'static [&'static str] {
        &[
            "name",
            "site_url",
            "feed_url",
            "live",
            "interval",
            "status_code",
            "user.email",
        ]
    }

    fn sortable_fields() -> &'static [&'static str] {
        &["id", "name", "created_at", "last_polled", "interval"]
    }

    fn searchable_fields() -> &'static [&'static str] {
        &["name", "description", "site_url"]
    }

    fn field_value(&self, path: &str) -> FieldValue {
        if let Some(rest) = path.strip_prefix("user.") {
            return self.user.field_value(rest);
        }
        match path {
            "id" => self.id.into(),
            "user" => self.user.id.into(),
            "name" => self.name.clone().into(),
            "site_url" => self.site_url.clone().into(),
            "feed_url" => self.feed_url.clone().into(),
            "image_url" => self.image_url.clone().into(),
            "description" => self.description.clone().into(),
            "last_polled" => self.last_polled.into(),
            "due_poll" => self.due_poll.into(),
            "last_modified" => self.last_modified.clone().into(),
            "last_result" => self.last_result.clone().into(),
            "interval" => self.interval.into(),
            "last_success" => self.last_success.into(),
            "last_change" => self.last_change.into(),
            "live" => self.live.into(),
            "status_code" => self.status_code.into(),
            "last_302_url" => self.last_302_url.clone().into(),
            "last_302_start" => self.last_302_start.into(),
            "max_index" => self.max_index.into(),
            "num_subs" => self.num_subs.into(),
            "is_cloud_flare" => self.is_cloud_flare.into(),
            "created_at" => self.created_at.into(),
            _ => FieldValue::Null,
        }
    }
}

/// Fields a client supplies when creating or replacing a source.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceDraft {
    pub name: Option<String>,
    pub site_url: Option<String>,
    #[serde(default)]
    pub feed_url: String,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub last_polled: Option<DateTime<Utc>>,
    pub interval: Option<i64>,
    pub live: Option<bool>,
    pub status_code: Option<i64>,
    pub is_cloud_flare: Option<bool>,
}

impl SourceDraft {
    /// A draft with a name and feed URL.
    pub fn new(name: impl Into<String>, feed_url: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            feed_url: feed_url.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.feed_url.trim().is_empty() {
            return Err(ValidationError::MissingRequiredField {
                field: "feed_url".to_string(),
            });
        }
        if matches!(self.interval, Some(i) if i < 0) {
            return Err(ValidationError::InvalidField {
                field: "interval".to_string(),
                message: "must not be negative".to_string(),
            });
        }
        if matches!(self.status_code, Some(c) if c < 0) {
            return Err(ValidationError::InvalidField {
                field: "status_code".to_string(),
                message: "must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserDraft;

    fn owner() -> User {
        User::from_draft(1, UserDraft::with_email("owner@example.com"), Utc::now())
    }

    fn sample(id: i64) -> Source {
        Source::from_draft(id, owner(), SourceDraft::new("A", "https://a/rss"), Utc::now())
    }

    #[test]
    fn test_defaults() {
        let draft = SourceDraft::new("Tech", "https://t.example/rss");
        let source = Source::from_draft(1, owner(), draft, Utc::now());
        assert_eq!(source.interval, DEFAULT_INTERVAL);
        assert!(source.live);
        assert_eq!(source.num_subs, 1);
        assert_eq!(source.due_poll.to_rfc3339(), "1900-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_best_link_and_display_name() {
        let mut draft = SourceDraft::new("", "https://feed.example/rss");
        let source = Source::from_draft(1, owner(), draft.clone(), Utc::now());
        assert_eq!(source.best_link(), "https://feed.example/rss");
        assert_eq!(source.display_name(), "https://feed.example/rss");

        draft.site_url = Some("https://example.com".to_string());
        draft.name = Some("Example".to_string());
        let source = Source::from_draft(1, owner(), draft, Utc::now());
        assert_eq!(source.best_link(), "https://example.com");
        assert_eq!(source.display_name(), "Example");
    }

    #[test]
    fn test_apply_keeps_bookkeeping() {
        let mut source = sample(1);
        source.status_code = 304;
        let mut draft = SourceDraft::new("B", "https://b/rss");
        draft.interval = Some(60);
        source.apply(draft);
        assert_eq!(source.name.as_deref(), Some("B"));
        assert_eq!(source.interval, 60);
        assert_eq!(source.status_code, 304);
    }

    #[test]
    fn test_field_value_through_owner() {
        let source = sample(5);
        assert_eq!(source.field_value("user.email"), FieldValue::from("owner@example.com"));
        assert_eq!(source.field_value("user"), FieldValue::Integer(1));
        assert_eq!(source.field_value("site_url"), FieldValue::Null);
    }

    #[test]
    fn test_draft_validation() {
        assert!(SourceDraft::default().validate().is_err());
        let mut draft = SourceDraft::new("A", "https://a/rss");
        assert!(draft.validate().is_ok());
        draft.interval = Some(-1);
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_serializes_owner_profile() {
        let source = sample(5);
        let json = serde_json::to_value(&source).unwrap();
        assert_eq!(json["user"]["email"], "owner@example.com");
        assert!(json["user"].get("id").is_none());
        assert_eq!(json["feed_url"], "https://a/rss");
    }
}
