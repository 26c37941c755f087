//! Typed field values used by predicates, orderings and record access.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::Serialize;

/// A single field value, either read from a record or coerced from a query
/// parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Absent value (SQL `NULL`, JSON `null`).
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Returns true for [`FieldValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Returns the inner string of a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Renders the value as text the way it is stored.
    ///
    /// Timestamps use fixed-width RFC 3339 with microseconds so that the
    /// rendering orders the same way as the instant.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Timestamp(ts) => format_timestamp(ts),
        }
    }

    /// Compares two non-null values.
    ///
    /// Numbers compare numerically across integer and float. A timestamp
    /// compared with text parses the text as a date-time; anything else
    /// without a natural ordering falls back to comparing renderings.
    /// Returns `None` when either side is null.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        use FieldValue::*;

        match (self, other) {
            (Null, _) | (_, Null) => None,
            (Text(a), Text(b)) => Some(a.as_str().cmp(b.as_str())),
            (Integer(a), Integer(b)) => Some(a.cmp(b)),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Integer(a), Float(b)) => (*a as f64).partial_cmp(b),
            (Float(a), Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Boolean(a), Boolean(b)) => Some(a.cmp(b)),
            (Timestamp(a), Timestamp(b)) => Some(a.cmp(b)),
            (Timestamp(a), Text(b)) => match parse_timestamp(b) {
                Some(b) => Some(a.cmp(&b)),
                None => Some(format_timestamp(a).as_str().cmp(b.as_str())),
            },
            (Text(_), Timestamp(_)) => other.compare(self).map(Ordering::reverse),
            (Integer(a), Text(b)) => compare_number_text(*a as f64, b),
            (Float(a), Text(b)) => compare_number_text(*a, b),
            (Text(_), Integer(_) | Float(_)) => other.compare(self).map(Ordering::reverse),
            _ => Some(self.render().cmp(&other.render())),
        }
    }

    /// Total order used for sorting: null sorts before every other value.
    pub fn sort_cmp(&self, other: &FieldValue) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.compare(other).unwrap_or(Ordering::Equal),
        }
    }
}

fn compare_number_text(number: f64, text: &str) -> Option<Ordering> {
    match text.trim().parse::<f64>() {
        Ok(parsed) => number.partial_cmp(&parsed),
        Err(_) => Some(number.to_string().as_str().cmp(text)),
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("null"),
            other => f.write_str(&other.render()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(ts: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(ts)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// Formats a timestamp in the fixed-width storage form.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses RFC 3339, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS` or a bare
/// `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_numeric_cross_compare() {
        assert_eq!(
            FieldValue::Integer(2).compare(&FieldValue::Float(2.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            FieldValue::Float(3.0).compare(&FieldValue::Integer(3)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_timestamp_against_text() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let value = FieldValue::Timestamp(ts);
        assert_eq!(
            value.compare(&FieldValue::from("2024-03-01")),
            Some(Ordering::Greater)
        );
        assert_eq!(
            value.compare(&FieldValue::from("2024-03-01T12:00:00Z")),
            Some(Ordering::Equal)
        );
        assert_eq!(
            FieldValue::from("2025-01-01").compare(&value),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_integer_against_text() {
        assert_eq!(
            FieldValue::Integer(7).compare(&FieldValue::from("7")),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_null_never_compares() {
        assert_eq!(FieldValue::Null.compare(&FieldValue::Null), None);
        assert_eq!(FieldValue::Integer(1).compare(&FieldValue::Null), None);
    }

    #[test]
    fn test_sort_cmp_null_first() {
        assert_eq!(
            FieldValue::Null.sort_cmp(&FieldValue::from("a")),
            Ordering::Less
        );
        assert_eq!(FieldValue::Null.sort_cmp(&FieldValue::Null), Ordering::Equal);
    }

    #[test]
    fn test_render_timestamp_fixed_width() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            FieldValue::Timestamp(ts).render(),
            "2024-01-02T03:04:05.000000Z"
        );
    }

    #[test]
    fn test_parse_timestamp_forms() {
        assert!(parse_timestamp("2024-01-02").is_some());
        assert!(parse_timestamp("2024-01-02T03:04:05+03:30").is_some());
        assert!(parse_timestamp("2024-01-02 03:04:05").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_option_into_value() {
        let none: Option<String> = None;
        assert_eq!(FieldValue::from(none), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(true)), FieldValue::Boolean(true));
    }
}
