//! In-process collection over a record snapshot.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{Collection, Entity};
use crate::error::StorageResult;
use crate::query::Predicate;
use crate::types::SortDirection;

/// A collection evaluated in process over a snapshot of records.
///
/// The snapshot is shared between refinements; predicates and orderings are
/// applied when the collection is counted or sliced.
#[derive(Debug, Clone)]
pub struct MemoryCollection<R> {
    records: Arc<Vec<R>>,
    predicates: Vec<Predicate>,
    orderings: Vec<(String, SortDirection)>,
}

impl<R: Entity> MemoryCollection<R> {
    /// Wraps a snapshot. Records are put in ascending id order.
    pub fn new(mut records: Vec<R>) -> Self {
        records.sort_by_key(|r| r.id());
        Self {
            records: Arc::new(records),
            predicates: Vec::new(),
            orderings: Vec::new(),
        }
    }

    fn evaluate(&self) -> Vec<&R> {
        let mut matched: Vec<&R> = self
            .records
            .iter()
            .filter(|r| self.predicates.iter().all(|p| p.matches(*r)))
            .collect();

        if !self.orderings.is_empty() {
            matched.sort_by(|a, b| self.compare(a, b));
        }
        matched
    }

    fn compare(&self, a: &R, b: &R) -> Ordering {
        for (path, direction) in &self.orderings {
            let ord = a.field_value(path).sort_cmp(&b.field_value(path));
            let ord = match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        a.id().cmp(&b.id())
    }
}

#[async_trait]
impl<R: Entity> Collection for MemoryCollection<R> {
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
        Ok(self.evaluate().len() as u64)
    }

    async fn slice(&self, offset: u64, limit: u64) -> StorageResult<Vec<R>> {
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(self
            .evaluate()
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EntitySchema, FieldDescriptor};
    use crate::types::{FieldValue, FilterOperator};
    use serde::Serialize;

    static ROW_SCHEMA: EntitySchema = EntitySchema {
        name: "Row",
        table: "rows",
        fields: &[
            FieldDescriptor::integer("id"),
            FieldDescriptor::text("label"),
            FieldDescriptor::integer("rank"),
        ],
    };

    #[derive(Debug, Clone, Serialize)]
    struct Row {
        id: i64,
        label: Option<&'static str>,
        rank: i64,
    }

    impl Entity for Row {
        fn schema() -> &'static EntitySchema {
            &ROW_SCHEMA
        }

        fn id(&self) -> i64 {
            self.id
        }

        fn field_value(&self, path: &str) -> FieldValue {
            match path {
                "id" => self.id.into(),
                "label" => self.label.map(str::to_string).into(),
                "rank" => self.rank.into(),
                _ => FieldValue::Null,
            }
        }
    }

    fn rows() -> MemoryCollection<Row> {
        MemoryCollection::new(vec![
            Row { id: 3, label: Some("c"), rank: 1 },
            Row { id: 1, label: Some("a"), rank: 2 },
            Row { id: 2, label: None, rank: 1 },
            Row { id: 4, label: Some("b"), rank: 2 },
        ])
    }

    fn ids(rows: &[Row]) -> Vec<i64> {
        rows.iter().map(|r| r.id).collect()
    }

    #[tokio::test]
    async fn test_default_order_is_id() {
        let all = rows().slice(0, 10).await.unwrap();
        assert_eq!(ids(&all), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_refinement_does_not_mutate_receiver() {
        let base = rows();
        let narrowed = base.filter(Predicate::equals("rank", 2i64));
        assert_eq!(narrowed.count().await.unwrap(), 2);
        assert_eq!(base.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_multi_key_sort_with_id_tiebreak() {
        let sorted = rows()
            .order_by("rank", SortDirection::Desc)
            .order_by("label", SortDirection::Asc);
        let all = sorted.slice(0, 10).await.unwrap();
        assert_eq!(ids(&all), vec![1, 4, 2, 3]);
    }

    #[tokio::test]
    async fn test_nulls_sort_first_ascending() {
        let all = rows()
            .order_by("label", SortDirection::Asc)
            .slice(0, 10)
            .await
            .unwrap();
        assert_eq!(ids(&all), vec![2, 1, 4, 3]);
    }

    #[tokio::test]
    async fn test_slice_window() {
        let page = rows().slice(1, 2).await.unwrap();
        assert_eq!(ids(&page), vec![2, 3]);
        assert!(rows().slice(10, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_any_predicate() {
        let either = rows().filter(Predicate::any([
            Predicate::compare("label", FilterOperator::ContainsCI, "A"),
            Predicate::equals("label", FieldValue::Null),
        ]));
        assert_eq!(ids(&either.slice(0, 10).await.unwrap()), vec![1, 2]);
    }
}
