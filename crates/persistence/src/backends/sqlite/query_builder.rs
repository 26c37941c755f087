//! SQL query builder for list collections.
//!
//! Translates predicates and orderings into SQL against one entity table.
//! The entity's table is aliased `t0` and every one-hop reference is
//! `LEFT JOIN`ed as `r_<field>`, so a dotted path like `user.email`
//! compiles to `r_user.email`.

use rusqlite::ToSql;
use rusqlite::types::{ToSqlOutput, Value};

use crate::query::{Comparison, Predicate};
use crate::schema::{EntitySchema, FieldKind, ResolvedPath};
use crate::types::{FieldValue, FilterOperator, SortDirection, format_timestamp, parse_timestamp};

use super::backend::LOWER_FN;

/// A fragment of SQL with bound parameters.
#[derive(Debug, Clone, Default)]
pub struct SqlFragment {
    /// The SQL clause.
    pub sql: String,
    /// Bound parameter values.
    pub params: Vec<SqlParam>,
}

/// A bound SQL parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// String parameter.
    String(String),
    /// Integer parameter.
    Integer(i64),
    /// Float parameter.
    Float(f64),
    /// Null parameter.
    Null,
}

impl SqlParam {
    /// Creates a string parameter.
    pub fn string(s: impl Into<String>) -> Self {
        SqlParam::String(s.into())
    }

    /// Creates an integer parameter.
    pub fn integer(i: i64) -> Self {
        SqlParam::Integer(i)
    }

    /// Binds a field value for comparison against a column of `kind`.
    ///
    /// Text compared with a timestamp column is normalized to the stored
    /// form when it parses as a date-time.
    pub fn for_column(value: &FieldValue, kind: FieldKind) -> Self {
        match (value, kind) {
            (FieldValue::Null, _) => SqlParam::Null,
            (FieldValue::Text(s), FieldKind::Timestamp) => match parse_timestamp(s) {
                Some(ts) => SqlParam::String(format_timestamp(&ts)),
                None => SqlParam::string(s.as_str()),
            },
            (FieldValue::Text(s), _) => SqlParam::string(s.as_str()),
            (FieldValue::Integer(i), _) => SqlParam::Integer(*i),
            (FieldValue::Float(f), _) => SqlParam::Float(*f),
            (FieldValue::Boolean(b), _) => SqlParam::Integer(i64::from(*b)),
            (FieldValue::Timestamp(ts), _) => SqlParam::String(format_timestamp(ts)),
        }
    }
}

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlParam::String(s) => s.to_sql(),
            SqlParam::Integer(i) => i.to_sql(),
            SqlParam::Float(f) => f.to_sql(),
            SqlParam::Null => Ok(ToSqlOutput::Owned(Value::Null)),
        }
    }
}

impl SqlFragment {
    /// Creates a new SQL fragment.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Adds a parameter placeholder and returns the placeholder string.
    pub fn add_param(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        format!("?{}", self.params.len())
    }

    /// Returns true if this fragment is empty.
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Parameters as trait objects for `rusqlite`.
    pub fn param_refs(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p as &dyn ToSql).collect()
    }
}

/// Builds list queries for one entity.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder {
    schema: &'static EntitySchema,
}

impl QueryBuilder {
    pub fn new(schema: &'static EntitySchema) -> Self {
        Self { schema }
    }

    /// `SELECT COUNT(*)` over the matching rows.
    pub fn build_count(&self, predicates: &[Predicate]) -> SqlFragment {
        let mut frag = SqlFragment::default();
        let where_clause = self.build_where(predicates, &mut frag);
        frag.sql = format!(
            "SELECT COUNT(*) {} WHERE {}",
            self.build_from(),
            where_clause
        );
        frag
    }

    /// Selects the ids of one window of matching rows, in collection order.
    pub fn build_id_slice(
        &self,
        predicates: &[Predicate],
        orderings: &[(String, SortDirection)],
        offset: u64,
        limit: u64,
    ) -> SqlFragment {
        let mut frag = SqlFragment::default();
        let where_clause = self.build_where(predicates, &mut frag);
        let limit = frag.add_param(SqlParam::integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        let offset = frag.add_param(SqlParam::integer(i64::try_from(offset).unwrap_or(i64::MAX)));
        frag.sql = format!(
            "SELECT t0.id {} WHERE {} {} LIMIT {} OFFSET {}",
            self.build_from(),
            where_clause,
            self.build_order_by(orderings),
            limit,
            offset
        );
        frag
    }

    /// The `FROM` clause with one `LEFT JOIN` per reference field.
    pub fn build_from(&self) -> String {
        let mut from = format!("FROM {} t0", self.schema.table);
        for reference in self.schema.references() {
            if let Some(target) = reference.kind.target() {
                from.push_str(&format!(
                    " LEFT JOIN {table} r_{name} ON r_{name}.id = t0.{column}",
                    table = target.table,
                    name = reference.name,
                    column = reference.column
                ));
            }
        }
        from
    }

    /// Conjunction of all predicates; `1` when there are none.
    fn build_where(&self, predicates: &[Predicate], frag: &mut SqlFragment) -> String {
        if predicates.is_empty() {
            return "1".to_string();
        }
        predicates
            .iter()
            .map(|p| format!("({})", self.build_predicate(p, frag)))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    fn build_predicate(&self, predicate: &Predicate, frag: &mut SqlFragment) -> String {
        match predicate {
            Predicate::Compare(cmp) => self.build_comparison(cmp, frag),
            Predicate::Any(members) if members.is_empty() => "0".to_string(),
            Predicate::Any(members) => members
                .iter()
                .map(|p| format!("({})", self.build_predicate(p, frag)))
                .collect::<Vec<_>>()
                .join(" OR "),
        }
    }

    fn build_comparison(&self, cmp: &Comparison, frag: &mut SqlFragment) -> String {
        // Unknown paths read as NULL, like an absent field
        let (column, kind) = match self.schema.resolve(&cmp.path) {
            Some(resolved) => (column_expr(&resolved), resolved.kind()),
            None => ("NULL".to_string(), FieldKind::Text),
        };

        if cmp.value.is_null() {
            return match cmp.operator {
                FilterOperator::ContainsCI | FilterOperator::Equals => {
                    format!("{} IS NULL", column)
                }
                _ => "0".to_string(),
            };
        }

        if let (FilterOperator::ContainsCI, Some(needle)) = (cmp.operator, cmp.value.as_text()) {
            let needle = escape_like(&needle.to_lowercase());
            let pattern = frag.add_param(SqlParam::String(format!("%{}%", needle)));
            return format!(
                "{}({}) LIKE {} ESCAPE '\\'",
                LOWER_FN,
                text_expr(&column, kind),
                pattern
            );
        }

        let op = match cmp.operator {
            FilterOperator::ContainsCI | FilterOperator::Equals => "=",
            FilterOperator::Lt => "<",
            FilterOperator::Lte => "<=",
            FilterOperator::Gt => ">",
            FilterOperator::Gte => ">=",
        };
        let placeholder = frag.add_param(SqlParam::for_column(&cmp.value, kind));
        format!("{} {} {}", column, op, placeholder)
    }

    /// `ORDER BY` for the orderings, always ending with `t0.id ASC`.
    pub fn build_order_by(&self, orderings: &[(String, SortDirection)]) -> String {
        let mut clauses: Vec<String> = orderings
            .iter()
            .filter_map(|(path, direction)| {
                let resolved = self.schema.resolve(path)?;
                let dir = match direction {
                    SortDirection::Asc => "ASC",
                    SortDirection::Desc => "DESC",
                };
                Some(format!("{} {}", column_expr(&resolved), dir))
            })
            .collect();
        clauses.push("t0.id ASC".to_string());
        format!("ORDER BY {}", clauses.join(", "))
    }
}

fn column_expr(resolved: &ResolvedPath) -> String {
    match resolved.via {
        Some(via) => format!("r_{}.{}", via.name, resolved.field.column),
        None => format!("t0.{}", resolved.field.column),
    }
}

/// Renders a column as text the same way [`FieldValue::render`] does.
fn text_expr(column: &str, kind: FieldKind) -> String {
    match kind {
        FieldKind::Text | FieldKind::Timestamp => column.to_string(),
        FieldKind::Boolean => format!(
            "CASE {} WHEN 1 THEN 'true' WHEN 0 THEN 'false' END",
            column
        ),
        FieldKind::Integer | FieldKind::Float | FieldKind::Reference(_) => {
            format!("CAST({} AS TEXT)", column)
        }
    }
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
