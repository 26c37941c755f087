//! Forgiving conversion of raw query strings into typed field values.
//!
//! Coercion never fails: unparseable numbers become zero and any boolean
//! input other than `false`/`0` is true, so malformed filter values cannot
//! turn into client errors.

use crate::schema::{EntitySchema, FieldKind};
use crate::types::FieldValue;

use super::normalize::normalize_dialect;

/// The literal that always coerces to [`FieldValue::Null`].
pub const NULL_LITERAL: &str = "null";

/// Coerces `raw` into the kind of the field at `path` on `schema`.
///
/// Unknown paths keep the raw string as text.
pub fn coerce(schema: &'static EntitySchema, path: &str, raw: &str) -> FieldValue {
    match schema.resolve(path) {
        Some(resolved) => coerce_kind(resolved.kind(), raw),
        None if raw == NULL_LITERAL => FieldValue::Null,
        None => FieldValue::Text(raw.to_string()),
    }
}

/// Coerces `raw` for a field of the given kind.
pub fn coerce_kind(kind: FieldKind, raw: &str) -> FieldValue {
    if raw == NULL_LITERAL {
        return FieldValue::Null;
    }

    match kind {
        FieldKind::Text => FieldValue::Text(normalize_dialect(raw)),
        FieldKind::Integer => FieldValue::Integer(raw.trim().parse().unwrap_or(0)),
        FieldKind::Float => FieldValue::Float(raw.trim().parse().unwrap_or(0.0)),
        FieldKind::Boolean => FieldValue::Boolean(parse_flag(raw)),
        FieldKind::Timestamp | FieldKind::Reference(_) => FieldValue::Text(raw.to_string()),
    }
}

fn parse_flag(raw: &str) -> bool {
    !(raw.eq_ignore_ascii_case("false") || raw == "0")
}
