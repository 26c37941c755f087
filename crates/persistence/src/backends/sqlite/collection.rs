//! SQL-backed collections.

use std::fmt::Debug;
use std::marker::PhantomData;

use async_trait::async_trait;
use rusqlite::Connection;
use tracing::trace;

use crate::core::{Collection, Entity};
use crate::error::{BackendError, StorageError, StorageResult};
use crate::query::Predicate;
use crate::types::SortDirection;

use super::backend::{SqlitePool, checkout};
use super::query_builder::QueryBuilder;

/// A record type that can be loaded from SQLite by id.
pub trait SqliteRecord: Entity {
    /// Loads the records with the given ids, returned in the order of `ids`.
    /// Missing ids are skipped.
    fn load(conn: &Connection, ids: &[i64]) -> StorageResult<Vec<Self>>;
}

/// A collection compiled to SQL on count and slice.
pub struct SqliteCollection<R> {
    pool: SqlitePool,
    predicates: Vec<Predicate>,
    orderings: Vec<(String, SortDirection)>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for SqliteCollection<R> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            predicates: self.predicates.clone(),
            orderings: self.orderings.clone(),
            _record: PhantomData,
        }
    }
}

impl<R> Debug for SqliteCollection<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCollection")
            .field("predicates", &self.predicates)
            .field("orderings", &self.orderings)
            .finish_non_exhaustive()
    }
}

impl<R: SqliteRecord> SqliteCollection<R> {
    /// A collection of the rows matching `scope`.
    pub(crate) fn scoped(pool: SqlitePool, scope: Vec<Predicate>) -> Self {
        Self {
            pool,
            predicates: scope,
            orderings: Vec::new(),
            _record: PhantomData,
        }
    }

    fn builder(&self) -> QueryBuilder {
        QueryBuilder::new(R::schema())
    }
}

fn query_error(e: rusqlite::Error) -> StorageError {
    StorageError::Backend(BackendError::QueryError {
        message: e.to_string(),
    })
}

#[async_trait]
impl<R: SqliteRecord> Collection for SqliteCollection<R> {
    type Record = R;

    fn filter(&self, predicate: Predicate) -> Self {
        let mut next = self.clone();
        next.predicates.push(predicate);
        next
    }

    fn order_by(&self, path: &str, direction: SortDirection) -> Self {
        let mut next = self.clone();
        next.orderings.push((path.to_string(), direction));
        next
    }

    async fn count(&self) -> StorageResult<u64> {
        let frag = self.builder().build_count(&self.predicates);
        trace!(sql = %frag.sql, "Counting collection");

        let conn = checkout(&self.pool)?;
        let count: i64 = conn
            .query_row(&frag.sql, frag.param_refs().as_slice(), |row| row.get(0))
            .map_err(query_error)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn slice(&self, offset: u64, limit: u64) -> StorageResult<Vec<R>> {
        let frag = self
            .builder()
            .build_id_slice(&self.predicates, &self.orderings, offset, limit);
        trace!(sql = %frag.sql, "Slicing collection");

        let conn = checkout(&self.pool)?;
        let ids = {
            let mut stmt = conn.prepare(&frag.sql).map_err(query_error)?;
            let rows = stmt
                .query_map(frag.param_refs().as_slice(), |row| row.get::<_, i64>(0))
                .map_err(query_error)?;
            rows.collect::<Result<Vec<i64>, _>>().map_err(query_error)?
        };

        if ids.is_empty() {
            return Ok(Vec::new());
        }
        R::load(&conn, &ids)
    }
}
