//! Applies parsed list-query clauses to a base collection.

use tracing::trace;

use crate::core::{Collection, Entity};
use crate::schema::EntityCapabilities;
use crate::types::{FilterClause, FilterOperator, ListQuery};

use super::coerce::coerce;
use super::normalize::normalize_dialect;
use super::predicate::Predicate;

/// Refines `base` with the filters, search and sorts of `query`.
///
/// Composition order is fixed: every filter clause in query order, then
/// the search disjunction, then every sort clause in query order. Clauses
/// naming a path outside the matching capability set are skipped. `base` is
/// left untouched.
pub fn compose<C: Collection>(base: &C, query: &ListQuery, caps: &EntityCapabilities) -> C {
    let mut refined = base.clone();

    for clause in &query.filters {
        match filter_predicate::<C::Record>(clause, caps) {
            Some(predicate) => refined = refined.filter(predicate),
            None => trace!(path = %clause.path, "Skipping non-filterable field"),
        }
    }

    if let Some(predicate) = query
        .search
        .as_deref()
        .and_then(|text| search_predicate(text, caps))
    {
        refined = refined.filter(predicate);
    }

    for sort in &query.sorts {
        if caps.allows_sort(&sort.path) {
            refined = refined.order_by(&sort.path, sort.direction);
        } else {
            trace!(path = %sort.path, "Skipping non-sortable field");
        }
    }

    refined
}

/// Builds the predicate for one filter clause, coercing its value to the
/// field's kind.
pub fn filter_predicate<E: Entity>(
    clause: &FilterClause,
    caps: &EntityCapabilities,
) -> Option<Predicate> {
    if !caps.allows_filter(&clause.path) {
        return None;
    }
    let value = coerce(E::schema(), &clause.path, &clause.raw_value);
    Some(Predicate::compare(clause.path.clone(), clause.operator, value))
}

/// Builds the search disjunction: a case-insensitive containment test of
/// the normalized text against every searchable field.
///
/// Returns `None` for empty text or when nothing is searchable.
pub fn search_predicate(text: &str, caps: &EntityCapabilities) -> Option<Predicate> {
    if text.is_empty() || caps.searchable().is_empty() {
        return None;
    }
    let needle = normalize_dialect(text);
    Some(Predicate::any(caps.searchable().iter().map(|path| {
        Predicate::compare(path.clone(), FilterOperator::ContainsCI, needle.clone())
    })))
}
