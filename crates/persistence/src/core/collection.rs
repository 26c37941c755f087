//! The refinable record collection contract.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::query::Predicate;
use crate::types::SortDirection;

use super::entity::Entity;

/// A lazily evaluated, immutable set of records.
///
/// Refinements return a new collection and never change the receiver.
/// Orderings accumulate with the first call as the primary key; every
/// implementation breaks remaining ties by ascending id so that slices are
/// stable across pages.
///
/// # Example
///
/// ```ignore
/// let recent_first = sources
///     .filter(Predicate::compare("live", FilterOperator::Equals, true))
///     .order_by("created_at", SortDirection::Desc);
/// let total = recent_first.count().await?;
/// let page = recent_first.slice(0, 20).await?;
/// ```
#[async_trait]
pub trait Collection: Clone + Send + Sync {
    /// The record type yielded by [`Collection::slice`].
    type Record: Entity;

    /// Narrows the collection to records matching `predicate`.
    fn filter(&self, predicate: Predicate) -> Self;

    /// Adds an ordering on `path`.
    fn order_by(&self, path: &str, direction: SortDirection) -> Self;

    /// Counts the records without materializing them where the store allows.
    async fn count(&self) -> StorageResult<u64>;

    /// Loads at most `limit` records starting at `offset`, in collection
    /// order.
    async fn slice(&self, offset: u64, limit: u64) -> StorageResult<Vec<Self::Record>>;
}
