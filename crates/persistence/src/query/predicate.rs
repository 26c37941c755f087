//! Predicates accepted by [`Collection::filter`](crate::core::Collection::filter).

use std::cmp::Ordering;

use crate::core::Entity;
use crate::types::{FieldValue, FilterOperator};

/// A single field comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub path: String,
    pub operator: FilterOperator,
    pub value: FieldValue,
}

/// A filter predicate: a comparison or a disjunction of predicates.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare(Comparison),
    /// Matches when any member matches; an empty disjunction matches nothing.
    Any(Vec<Predicate>),
}

impl Predicate {
    pub fn compare(
        path: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<FieldValue>,
    ) -> Self {
        Predicate::Compare(Comparison {
            path: path.into(),
            operator,
            value: value.into(),
        })
    }

    pub fn equals(path: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::compare(path, FilterOperator::Equals, value)
    }

    pub fn any(members: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::Any(members.into_iter().collect())
    }

    /// Evaluates the predicate against a record in process.
    pub fn matches<E: Entity>(&self, record: &E) -> bool {
        match self {
            Predicate::Compare(cmp) => cmp.matches(&record.field_value(&cmp.path)),
            Predicate::Any(members) => members.iter().any(|p| p.matches(record)),
        }
    }
}

impl Comparison {
    /// Evaluates the comparison against a field value.
    ///
    /// A null operand means "is null" under `Equals` and `ContainsCI` and
    /// matches nothing under the ordering operators. A null field value
    /// never matches a non-null operand. `ContainsCI` with a text operand is
    /// a case-insensitive substring test on the rendered field value; with
    /// any other operand it is equality.
    pub fn matches(&self, actual: &FieldValue) -> bool {
        if self.value.is_null() {
            return match self.operator {
                FilterOperator::ContainsCI | FilterOperator::Equals => actual.is_null(),
                _ => false,
            };
        }
        if actual.is_null() {
            return false;
        }

        match self.operator {
            FilterOperator::ContainsCI => match self.value.as_text() {
                Some(needle) => contains_ci(&actual.render(), needle),
                None => actual.compare(&self.value) == Some(Ordering::Equal),
            },
            FilterOperator::Equals => actual.compare(&self.value) == Some(Ordering::Equal),
            FilterOperator::Lt => actual.compare(&self.value) == Some(Ordering::Less),
            FilterOperator::Lte => matches!(
                actual.compare(&self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOperator::Gt => actual.compare(&self.value) == Some(Ordering::Greater),
            FilterOperator::Gte => matches!(
                actual.compare(&self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
        }
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmp(operator: FilterOperator, value: impl Into<FieldValue>) -> Comparison {
        Comparison {
            path: "f".to_string(),
            operator,
            value: value.into(),
        }
    }

    #[test]
    fn test_contains_ci() {
        let c = cmp(FilterOperator::ContainsCI, "RUST");
        assert!(c.matches(&FieldValue::from("This Week in Rust")));
        assert!(!c.matches(&FieldValue::from("Go")));
        assert!(!c.matches(&FieldValue::Null));
    }

    #[test]
    fn test_contains_on_non_text_is_equality() {
        let c = cmp(FilterOperator::ContainsCI, 40i64);
        assert!(c.matches(&FieldValue::Integer(40)));
        assert!(!c.matches(&FieldValue::Integer(400)));
    }

    #[test]
    fn test_contains_text_against_number_renders() {
        let c = cmp(FilterOperator::ContainsCI, "40");
        assert!(c.matches(&FieldValue::Integer(400)));
    }

    #[test]
    fn test_null_operand() {
        assert!(cmp(FilterOperator::Equals, FieldValue::Null).matches(&FieldValue::Null));
        assert!(cmp(FilterOperator::ContainsCI, FieldValue::Null).matches(&FieldValue::Null));
        assert!(!cmp(FilterOperator::Equals, FieldValue::Null).matches(&FieldValue::from("x")));
        assert!(!cmp(FilterOperator::Lt, FieldValue::Null).matches(&FieldValue::Null));
    }

    #[test]
    fn test_ordering_operators() {
        let v = FieldValue::Integer(10);
        assert!(cmp(FilterOperator::Lt, 11i64).matches(&v));
        assert!(!cmp(FilterOperator::Lt, 10i64).matches(&v));
        assert!(cmp(FilterOperator::Lte, 10i64).matches(&v));
        assert!(cmp(FilterOperator::Gt, 9i64).matches(&v));
        assert!(!cmp(FilterOperator::Gt, 10i64).matches(&v));
        assert!(cmp(FilterOperator::Gte, 10i64).matches(&v));
    }

    #[test]
    fn test_equals_is_case_sensitive() {
        assert!(!cmp(FilterOperator::Equals, "tech").matches(&FieldValue::from("Tech")));
        assert!(cmp(FilterOperator::Equals, "Tech").matches(&FieldValue::from("Tech")));
    }

    #[test]
    fn test_boolean_equality() {
        let c = cmp(FilterOperator::Equals, false);
        assert!(c.matches(&FieldValue::Boolean(false)));
        assert!(!c.matches(&FieldValue::Boolean(true)));
        assert!(!c.matches(&FieldValue::Null));
    }
}
