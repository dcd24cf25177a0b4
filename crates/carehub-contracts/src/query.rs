//! Query specifications and responses.
//!
//! The fluent client builds a `QuerySpec` and hands it to a backend's single
//! `execute` entry point. Matching and mutation logic live in the backend,
//! never in the fluent chain.

use std::cmp::Ordering as CmpOrdering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{error::StoreResult, record::Row};

/// An equality filter: `row[column] === value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Strict equality on the row's column value.
    ///
    /// A row that lacks the column never matches a concrete value. Filtering
    /// on `Value::Null` selects exactly the rows where the column is absent
    /// or null. Numbers compare by value, so `45` matches `45.0`; values of
    /// different JSON types never match.
    pub fn matches(&self, row: &Row) -> StoreResult<bool> {
        let matched = match row.column(&self.column)? {
            Some(actual) => strict_eq(&actual, &self.value),
            None => self.value.is_null(),
        };
        Ok(matched)
    }
}

fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (integral(x), integral(y)) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

fn integral(n: &serde_json::Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Sort order applied to a select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ordering {
    pub column: String,
    pub ascending: bool,
}

impl Ordering {
    /// Compare two rows on the ordering column.
    ///
    /// Strings compare lexicographically and numbers numerically. Rows that
    /// lack the column, or carry a value of another type, sort after the rest
    /// regardless of direction.
    pub fn compare(&self, a: &Row, b: &Row) -> StoreResult<CmpOrdering> {
        let left = a.column(&self.column)?;
        let right = b.column(&self.column)?;
        let ordering = match (comparable(left.as_ref()), comparable(right.as_ref())) {
            (Some(l), Some(r)) => {
                let ord = l.partial_cmp(&r).unwrap_or(CmpOrdering::Equal);
                if self.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            }
            (Some(_), None) => CmpOrdering::Less,
            (None, Some(_)) => CmpOrdering::Greater,
            (None, None) => CmpOrdering::Equal,
        };
        Ok(ordering)
    }
}

#[derive(Debug, PartialEq, PartialOrd)]
enum SortKey<'a> {
    Number(f64),
    Text(&'a str),
}

fn comparable(value: Option<&Value>) -> Option<SortKey<'_>> {
    match value? {
        Value::Number(n) => n.as_f64().map(SortKey::Number),
        Value::String(s) => Some(SortKey::Text(s.as_str())),
        _ => None,
    }
}

/// What a query does once its rows are matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Read rows. `columns` is accepted for call-shape compatibility; rows are
    /// always returned whole.
    Select { columns: String },
    /// Append `payload` as a new row.
    Insert { payload: Value },
    /// Shallow-merge `patch` into every matching row.
    Update { patch: Value },
    /// Remove every matching row.
    Delete,
}

impl Operation {
    /// True for inserts, updates, and deletes.
    pub fn is_write(&self) -> bool {
        !matches!(self, Operation::Select { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Select { .. } => "select",
            Operation::Insert { .. } => "insert",
            Operation::Update { .. } => "update",
            Operation::Delete => "delete",
        }
    }
}

/// A complete, self-describing query against one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    /// Table name as the caller wrote it. Unknown names are not an error.
    pub table: String,
    pub operation: Operation,
    pub filter: Option<Filter>,
    /// Only honored by selects.
    pub order: Option<Ordering>,
}

impl QuerySpec {
    pub fn select(table: impl Into<String>, columns: impl Into<String>) -> Self {
        Self::new(table, Operation::Select { columns: columns.into() })
    }

    pub fn insert(table: impl Into<String>, payload: Value) -> Self {
        Self::new(table, Operation::Insert { payload })
    }

    pub fn update(table: impl Into<String>, patch: Value, filter: Filter) -> Self {
        Self::new(table, Operation::Update { patch }).with_filter(filter)
    }

    pub fn delete(table: impl Into<String>, filter: Filter) -> Self {
        Self::new(table, Operation::Delete).with_filter(filter)
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_order(mut self, order: Ordering) -> Self {
        self.order = Some(order);
        self
    }

    fn new(table: impl Into<String>, operation: Operation) -> Self {
        Self {
            table: table.into(),
            operation,
            filter: None,
            order: None,
        }
    }
}

/// The result descriptor for updates and deletes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationOutcome {
    /// Always `None` from the in-memory store; kept for parity with the real
    /// backend's `{ error }` field.
    pub error: Option<String>,
    /// How many rows were replaced or removed.
    pub affected: usize,
}

/// What `execute` resolves to, one variant per operation family.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResponse {
    /// Selects: matching rows, copied out of the store.
    Rows(Vec<Row>),
    /// Inserts: the stored row, or `None` for an unknown table.
    Inserted(Option<Row>),
    /// Updates and deletes.
    Mutated(MutationOutcome),
}
