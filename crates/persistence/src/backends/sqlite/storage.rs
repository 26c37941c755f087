//! FeedStorage implementation for SQLite.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;
use uuid::Uuid;

use crate::core::FeedStorage;
use crate::error::{BackendError, ResourceError, StorageError, StorageResult};
use crate::query::Predicate;
use crate::types::{
    Post, PostDraft, PostMark, Source, SourceDraft, User, UserDraft, format_timestamp,
};

use super::SqliteBackend;
use super::collection::{SqliteCollection, SqliteRecord};

fn internal_error(message: String) -> StorageError {
    StorageError::Backend(BackendError::Internal {
        backend_name: "sqlite".to_string(),
        message,
        source: None,
    })
}

/// The current time at the precision timestamps are stored with.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

const USER_COLUMNS: &str =
    "u.id, u.email, u.first_name, u.last_name, u.cellphone, u.is_active, u.created_at";

const SOURCE_COLUMNS: &str = "s.id, s.name, s.site_url, s.feed_url, s.image_url, \
     s.description, s.last_polled, s.due_poll, s.last_modified, s.last_result, s.interval, \
     s.last_success, s.last_change, s.live, s.status_code, s.last_302_url, s.last_302_start, \
     s.max_index, s.num_subs, s.is_cloud_flare, s.created_at";
const SOURCE_WIDTH: usize = 21;

const POST_COLUMNS: &str = "p.id, p.title, p.body, p.link, p.found, p.created, p.uuid, \
     p.author, p.image_url, p.is_liked, p.is_bookmarked, p.created_at";
const POST_WIDTH: usize = 12;

fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn optional_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(_) => timestamp(row, idx).map(Some),
        None => Ok(None),
    }
}

fn user_from_row(row: &Row<'_>, at: usize) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(at)?,
        email: row.get(at + 1)?,
        first_name: row.get(at + 2)?,
        last_name: row.get(at + 3)?,
        cellphone: row.get(at + 4)?,
        is_active: row.get(at + 5)?,
        created_at: timestamp(row, at + 6)?,
    })
}

/// Reads [`SOURCE_COLUMNS`] at `at` followed by [`USER_COLUMNS`].
fn source_from_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Source> {
    Ok(Source {
        id: row.get(at)?,
        name: row.get(at + 1)?,
        site_url: row.get(at + 2)?,
        feed_url: row.get(at + 3)?,
        image_url: row.get(at + 4)?,
        description: row.get(at + 5)?,
        last_polled: optional_timestamp(row, at + 6)?,
        due_poll: timestamp(row, at + 7)?,
        last_modified: row.get(at + 8)?,
        last_result: row.get(at + 9)?,
        interval: row.get(at + 10)?,
        last_success: optional_timestamp(row, at + 11)?,
        last_change: optional_timestamp(row, at + 12)?,
        live: row.get(at + 13)?,
        status_code: row.get(at + 14)?,
        last_302_url: row.get(at + 15)?,
        last_302_start: optional_timestamp(row, at + 16)?,
        max_index: row.get(at + 17)?,
        num_subs: row.get(at + 18)?,
        is_cloud_flare: row.get(at + 19)?,
        created_at: timestamp(row, at + 20)?,
        user: user_from_row(row, at + SOURCE_WIDTH)?,
    })
}

/// Reads [`POST_COLUMNS`] followed by a full source row.
fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        link: row.get(3)?,
        found: timestamp(row, 4)?,
        created: timestamp(row, 5)?,
        uuid: row.get(6)?,
        author: row.get(7)?,
        image_url: row.get(8)?,
        is_liked: row.get(9)?,
        is_bookmarked: row.get(10)?,
        created_at: timestamp(row, 11)?,
        source: source_from_row(row, POST_WIDTH)?,
    })
}

fn placeholders(n: usize) -> String {
    (1..=n).map(|i| format!("?{}", i)).collect::<Vec<_>>().join(", ")
}

/// Loads rows by id and returns them in the order of `ids`.
fn load_ordered<T>(
    conn: &Connection,
    sql: &str,
    ids: &[i64],
    id_of: impl Fn(&T) -> i64,
    map: impl Fn(&Row<'_>) -> rusqlite::Result<T>,
) -> StorageResult<Vec<T>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| internal_error(format!("Failed to prepare load: {}", e)))?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(ids.iter()), |row| map(row))
        .map_err(|e| internal_error(format!("Failed to load rows: {}", e)))?;

    let mut by_id: HashMap<i64, T> = HashMap::with_capacity(ids.len());
    for row in rows {
        let record = row.map_err(|e| internal_error(format!("Failed to read row: {}", e)))?;
        by_id.insert(id_of(&record), record);
    }
    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}

impl SqliteRecord for Source {
    fn load(conn: &Connection, ids: &[i64]) -> StorageResult<Vec<Self>> {
        let sql = format!(
            "SELECT {}, {} FROM sources s JOIN users u ON u.id = s.user_id WHERE s.id IN ({})",
            SOURCE_COLUMNS,
            USER_COLUMNS,
            placeholders(ids.len())
        );
        load_ordered(conn, &sql, ids, |s: &Source| s.id, |row| source_from_row(row, 0))
    }
}

impl SqliteRecord for Post {
    fn load(conn: &Connection, ids: &[i64]) -> StorageResult<Vec<Self>> {
        let sql = format!(
            "SELECT {}, {}, {} FROM posts p \
             JOIN sources s ON s.id = p.source_id \
             JOIN users u ON u.id = s.user_id \
             WHERE p.id IN ({})",
            POST_COLUMNS,
            SOURCE_COLUMNS,
            USER_COLUMNS,
            placeholders(ids.len())
        );
        load_ordered(conn, &sql, ids, |p: &Post| p.id, post_from_row)
    }
}

impl SqliteBackend {
    fn load_source(&self, conn: &Connection, owner: &User, id: i64) -> StorageResult<Source> {
        Source::load(conn, &[id])?
            .into_iter()
            .find(|s| s.user.id == owner.id)
            .ok_or_else(|| ResourceError::not_found("Source", id).into())
    }

    fn load_post(
        &self,
        conn: &Connection,
        owner: &User,
        source_id: i64,
        post_id: i64,
    ) -> StorageResult<Post> {
        Post::load(conn, &[post_id])?
            .into_iter()
            .find(|p| p.source.id == source_id && p.source.user.id == owner.id)
            .ok_or_else(|| ResourceError::not_found("Post", post_id).into())
    }

    fn write_post(&self, conn: &Connection, post: &Post) -> StorageResult<()> {
        conn.execute(
            "UPDATE posts SET title = ?1, body = ?2, link = ?3, created = ?4, author = ?5,
                image_url = ?6, is_liked = ?7, is_bookmarked = ?8
             WHERE id = ?9",
            params![
                post.title,
                post.body,
                post.link,
                format_timestamp(&post.created),
                post.author,
                post.image_url,
                post.is_liked,
                post.is_bookmarked,
                post.id
            ],
        )
        .map_err(|e| internal_error(format!("Failed to update post: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl FeedStorage for SqliteBackend {
    type Sources = SqliteCollection<Source>;
    type Posts = SqliteCollection<Post>;

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn create_user(&self, draft: UserDraft) -> StorageResult<User> {
        draft.validate()?;
        let conn = self.get_connection()?;
        let now = now();

        conn.execute(
            "INSERT INTO users (email, first_name, last_name, cellphone, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5)",
            params![
                draft.email,
                draft.first_name,
                draft.last_name,
                draft.cellphone,
                format_timestamp(&now)
            ],
        )
        .map_err(|e| internal_error(format!("Failed to insert user: {}", e)))?;

        let user = User::from_draft(conn.last_insert_rowid(), draft, now);
        debug!(user_id = user.id, "Created user");
        Ok(user)
    }

    async fn issue_token(&self, user_id: i64) -> StorageResult<String> {
        let conn = self.get_connection()?;
        let exists = conn
            .query_row("SELECT 1 FROM users WHERE id = ?1", [user_id], |_| Ok(()))
            .optional()
            .map_err(|e| internal_error(format!("Failed to look up user: {}", e)))?
            .is_some();
        if !exists {
            return Err(ResourceError::not_found("User", user_id).into());
        }

        let token = Uuid::new_v4().simple().to_string();
        conn.execute(
            "INSERT INTO auth_tokens (token, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![token, user_id, format_timestamp(&now())],
        )
        .map_err(|e| internal_error(format!("Failed to insert token: {}", e)))?;
        Ok(token)
    }

    async fn user_for_token(&self, token: &str) -> StorageResult<Option<User>> {
        let conn = self.get_connection()?;
        let sql = format!(
            "SELECT {} FROM auth_tokens t JOIN users u ON u.id = t.user_id
             WHERE t.token = ?1 AND u.is_active = 1",
            USER_COLUMNS
        );
        conn.query_row(&sql, [token], |row| user_from_row(row, 0))
            .optional()
            .map_err(|e| internal_error(format!("Failed to resolve token: {}", e)))
    }

    async fn sources(&self, owner: &User) -> StorageResult<Self::Sources> {
        Ok(SqliteCollection::scoped(
            self.pool.clone(),
            vec![Predicate::equals("user", owner.id)],
        ))
    }

    async fn create_source(&self, owner: &User, draft: SourceDraft) -> StorageResult<Source> {
        draft.validate()?;
        let conn = self.get_connection()?;
        let source = Source::from_draft(0, owner.clone(), draft, now());

        conn.execute(
            "INSERT INTO sources (user_id, name, site_url, feed_url, image_url, description,
                last_polled, due_poll, interval, live, status_code, max_index, num_subs,
                is_cloud_flare, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                owner.id,
                source.name,
                source.site_url,
                source.feed_url,
                source.image_url,
                source.description,
                source.last_polled.as_ref().map(format_timestamp),
                format_timestamp(&source.due_poll),
                source.interval,
                source.live,
                source.status_code,
                source.max_index,
                source.num_subs,
                source.is_cloud_flare,
                format_timestamp(&source.created_at)
            ],
        )
        .map_err(|e| internal_error(format!("Failed to insert source: {}", e)))?;

        let source = Source {
            id: conn.last_insert_rowid(),
            ..source
        };
        debug!(source_id = source.id, user_id = owner.id, "Created source");
        Ok(source)
    }

    async fn read_source(&self, owner: &User, id: i64) -> StorageResult<Source> {
        let conn = self.get_connection()?;
        self.load_source(&conn, owner, id)
    }

    async fn update_source(
        &self,
        owner: &User,
        id: i64,
        draft: SourceDraft,
    ) -> StorageResult<Source> {
        draft.validate()?;
        let conn = self.get_connection()?;
        let mut source = self.load_source(&conn, owner, id)?;
        source.apply(draft);

        conn.execute(
            "UPDATE sources SET name = ?1, site_url = ?2, feed_url = ?3, image_url = ?4,
                description = ?5, last_polled = ?6, interval = ?7, live = ?8,
                status_code = ?9, is_cloud_flare = ?10
             WHERE id = ?11",
            params![
                source.name,
                source.site_url,
                source.feed_url,
                source.image_url,
                source.description,
                source.last_polled.as_ref().map(format_timestamp),
                source.interval,
                source.live,
                source.status_code,
                source.is_cloud_flare,
                source.id
            ],
        )
        .map_err(|e| internal_error(format!("Failed to update source: {}", e)))?;

        Ok(source)
    }

    async fn delete_source(&self, owner: &User, id: i64) -> StorageResult<()> {
        let mut conn = self.get_connection()?;
        self.load_source(&conn, owner, id)?;

        let tx = conn
            .transaction()
            .map_err(|e| internal_error(format!("Failed to begin transaction: {}", e)))?;
        tx.execute("DELETE FROM posts WHERE source_id = ?1", [id])
            .map_err(|e| internal_error(format!("Failed to delete posts: {}", e)))?;
        tx.execute("DELETE FROM sources WHERE id = ?1", [id])
            .map_err(|e| internal_error(format!("Failed to delete source: {}", e)))?;
        tx.commit()
            .map_err(|e| internal_error(format!("Failed to commit delete: {}", e)))?;

        debug!(source_id = id, "Deleted source and its posts");
        Ok(())
    }

    async fn posts(&self, owner: &User, source_id: i64) -> StorageResult<Self::Posts> {
        let conn = self.get_connection()?;
        self.load_source(&conn, owner, source_id)?;
        Ok(SqliteCollection::scoped(
            self.pool.clone(),
            vec![
                Predicate::equals("source", source_id),
                Predicate::equals("source.user", owner.id),
            ],
        ))
    }

    async fn create_post(
        &self,
        owner: &User,
        source_id: i64,
        draft: PostDraft,
    ) -> StorageResult<Post> {
        draft.validate()?;
        let conn = self.get_connection()?;
        let source = self.load_source(&conn, owner, source_id)?;
        let post = Post::from_draft(0, source, draft, now());

        conn.execute(
            "INSERT INTO posts (source_id, title, body, link, found, created, uuid, author,
                image_url, is_liked, is_bookmarked, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                source_id,
                post.title,
                post.body,
                post.link,
                format_timestamp(&post.found),
                format_timestamp(&post.created),
                post.uuid,
                post.author,
                post.image_url,
                post.is_liked,
                post.is_bookmarked,
                format_timestamp(&post.created_at)
            ],
        )
        .map_err(|e| internal_error(format!("Failed to insert post: {}", e)))?;

        let post = Post {
            id: conn.last_insert_rowid(),
            ..post
        };
        debug!(post_id = post.id, source_id, "Created post");
        Ok(post)
    }

    async fn read_post(&self, owner: &User, source_id: i64, post_id: i64) -> StorageResult<Post> {
        let conn = self.get_connection()?;
        self.load_post(&conn, owner, source_id, post_id)
    }

    async fn update_post(
        &self,
        owner: &User,
        source_id: i64,
        post_id: i64,
        draft: PostDraft,
    ) -> StorageResult<Post> {
        draft.validate()?;
        let conn = self.get_connection()?;
        let mut post = self.load_post(&conn, owner, source_id, post_id)?;
        post.apply(draft);
        self.write_post(&conn, &post)?;
        Ok(post)
    }

    async fn delete_post(&self, owner: &User, source_id: i64, post_id: i64) -> StorageResult<()> {
        let conn = self.get_connection()?;
        self.load_post(&conn, owner, source_id, post_id)?;
        conn.execute("DELETE FROM posts WHERE id = ?1", [post_id])
            .map_err(|e| internal_error(format!("Failed to delete post: {}", e)))?;
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
        let conn = self.get_connection()?;
        let mut post = self.load_post(&conn, owner, source_id, post_id)?;
        post.mark(mark, value);
        self.write_post(&conn, &post)?;
        debug!(post_id, flag = mark.field(), value, "Marked post");
        Ok(())
    }
}
