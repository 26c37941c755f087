//! Parsed list-query clauses.
//!
//! A [`ListQuery`] is what the query-parameter parser produces from a list
//! request: filter clauses, sort clauses, an optional search string and the
//! page request. Field paths in a `ListQuery` have already been gated by the
//! entity's capability sets.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::pagination::PageRequest;

/// Comparison operator of a filter clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    /// Case-insensitive substring containment on text; equality otherwise.
    ContainsCI,
    Equals,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl FilterOperator {
    /// All operators with their query-key prefixes.
    pub const PREFIXES: [(&'static str, FilterOperator); 6] = [
        ("filter__", FilterOperator::ContainsCI),
        ("exact__", FilterOperator::Equals),
        ("lt__", FilterOperator::Lt),
        ("lte__", FilterOperator::Lte),
        ("gt__", FilterOperator::Gt),
        ("gte__", FilterOperator::Gte),
    ];

    /// Splits a query key such as `lte__interval` into operator and path.
    ///
    /// Returns `None` when the key carries no known prefix or the remaining
    /// path is empty.
    pub fn split_key(key: &str) -> Option<(FilterOperator, &str)> {
        Self::PREFIXES.iter().find_map(|(prefix, op)| {
            key.strip_prefix(prefix)
                .filter(|path| !path.is_empty())
                .map(|path| (*op, path))
        })
    }

    /// The query-key prefix of this operator.
    pub fn prefix(&self) -> &'static str {
        match self {
            FilterOperator::ContainsCI => "filter__",
            FilterOperator::Equals => "exact__",
            FilterOperator::Lt => "lt__",
            FilterOperator::Lte => "lte__",
            FilterOperator::Gt => "gt__",
            FilterOperator::Gte => "gte__",
        }
    }

    /// Returns true for the four ordering comparisons.
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            FilterOperator::Lt | FilterOperator::Lte | FilterOperator::Gt | FilterOperator::Gte
        )
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix().trim_end_matches('_'))
    }
}

/// One `{prefix}{path}={value}` query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterClause {
    pub operator: FilterOperator,
    pub path: String,
    /// The raw, uncoerced query value.
    pub raw_value: String,
}

impl FilterClause {
    pub fn new(
        operator: FilterOperator,
        path: impl Into<String>,
        raw_value: impl Into<String>,
    ) -> Self {
        Self {
            operator,
            path: path.into(),
            raw_value: raw_value.into(),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One token of the `sort` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortClause {
    pub path: String,
    pub direction: SortDirection,
}

impl SortClause {
    /// Parses `[+|-]?path`. A leading `-` sorts descending; a leading `+`
    /// or no sign sorts ascending. Returns `None` for an empty path.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        let (direction, path) = match token.strip_prefix('-') {
            Some(rest) => (SortDirection::Desc, rest),
            None => (SortDirection::Asc, token.strip_prefix('+').unwrap_or(token)),
        };
        if path.is_empty() {
            return None;
        }
        Some(Self {
            path: path.to_string(),
            direction,
        })
    }

    pub fn asc(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// The parsed form of a list request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Filters in query-string order.
    pub filters: Vec<FilterClause>,
    /// Sorts in token order, primary first.
    pub sorts: Vec<SortClause>,
    /// Free-text search; never empty when present.
    pub search: Option<String>,
    pub page: PageRequest,
}

impl ListQuery {
    /// A query with no clauses for the given page.
    pub fn for_page(page: PageRequest) -> Self {
        Self {
            page,
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, clause: FilterClause) -> Self {
        self.filters.push(clause);
        self
    }

    pub fn with_sort(mut self, clause: SortClause) -> Self {
        self.sorts.push(clause);
        self
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.search = (!text.is_empty()).then_some(text);
        self
    }
}
