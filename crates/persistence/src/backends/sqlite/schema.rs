//! SQLite schema definitions and migrations.

use rusqlite::Connection;

use crate::error::{BackendError, StorageError, StorageResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 2;

/// Initialize the database schema.
pub fn initialize_schema(conn: &Connection) -> StorageResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        // Fresh database - create base schema then run all migrations
        create_schema_v1(conn)?;
        set_schema_version(conn, 1)?;
        migrate_schema(conn, 1)?;
    } else if current_version < SCHEMA_VERSION {
        migrate_schema(conn, current_version)?;
    }

    Ok(())
}

fn migration_error(message: String) -> StorageError {
    StorageError::Backend(BackendError::MigrationError { message })
}

/// Get the current schema version.
fn get_schema_version(conn: &Connection) -> StorageResult<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        )",
        [],
    )
    .map_err(|e| migration_error(format!("Failed to create schema_version table: {}", e)))?;

    let version: Option<i32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .ok();

    Ok(version.unwrap_or(0))
}

/// Set the schema version.
fn set_schema_version(conn: &Connection, version: i32) -> StorageResult<()> {
    conn.execute("DELETE FROM schema_version", [])
        .map_err(|e| migration_error(format!("Failed to clear schema_version: {}", e)))?;

    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])
        .map_err(|e| migration_error(format!("Failed to set schema_version: {}", e)))?;

    Ok(())
}

/// Create the initial schema (version 1).
fn create_schema_v1(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT,
            first_name TEXT NOT NULL DEFAULT '',
            last_name TEXT NOT NULL DEFAULT '',
            cellphone TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS auth_tokens (
            token TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sources (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT,
            site_url TEXT,
            feed_url TEXT NOT NULL,
            image_url TEXT,
            description TEXT,
            last_polled TEXT,
            due_poll TEXT NOT NULL,
            last_modified TEXT,
            last_result TEXT,
            interval INTEGER NOT NULL DEFAULT 400,
            last_success TEXT,
            last_change TEXT,
            live INTEGER NOT NULL DEFAULT 1,
            status_code INTEGER NOT NULL DEFAULT 0,
            last_302_url TEXT,
            last_302_start TEXT,
            max_index INTEGER NOT NULL DEFAULT 0,
            num_subs INTEGER NOT NULL DEFAULT 1,
            is_cloud_flare INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source_id INTEGER NOT NULL REFERENCES sources(id) ON DELETE CASCADE,
            title TEXT NOT NULL DEFAULT '',
            body TEXT NOT NULL,
            link TEXT,
            found TEXT NOT NULL,
            created TEXT NOT NULL,
            uuid TEXT NOT NULL,
            author TEXT,
            image_url TEXT,
            is_liked INTEGER,
            is_bookmarked INTEGER,
            created_at TEXT NOT NULL
        );",
    )
    .map_err(|e| migration_error(format!("Failed to create base tables: {}", e)))
}

/// Run migrations from the given version to the current version.
fn migrate_schema(conn: &Connection, from_version: i32) -> StorageResult<()> {
    let mut version = from_version;

    while version < SCHEMA_VERSION {
        match version {
            1 => migrate_v1_to_v2(conn)?,
            _ => {
                return Err(migration_error(format!(
                    "No migration path from schema version {}",
                    version
                )));
            }
        }
        version += 1;
        set_schema_version(conn, version)?;
    }

    Ok(())
}

/// Version 2: lookup indexes for owner scoping, post ordering and uuids.
fn migrate_v1_to_v2(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_sources_user ON sources(user_id);
        CREATE INDEX IF NOT EXISTS idx_posts_source ON posts(source_id);
        CREATE INDEX IF NOT EXISTS idx_posts_created ON posts(created);
        CREATE INDEX IF NOT EXISTS idx_posts_uuid ON posts(uuid);
        CREATE INDEX IF NOT EXISTS idx_auth_tokens_user ON auth_tokens(user_id);",
    )
    .map_err(|e| migration_error(format!("Failed to create indexes: {}", e)))
}
