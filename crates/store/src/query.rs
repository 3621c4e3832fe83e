//! Equality-filter queries over JSON rows.

use core::cmp::Ordering;

use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use uuid::Uuid;

use crate::error::StoreError;
use crate::table::Table;

/// A stored record: column name to JSON value.
pub type Row = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Select query: equality filters, an optional ordering column, an optional limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.filters
            .iter()
            .all(|f| row.get(&f.column) == Some(&f.value))
    }

    /// Filters as a JSON object, for containment matching in SQL backends.
    pub fn filter_object(&self) -> Value {
        Value::Object(
            self.filters
                .iter()
                .map(|f| (f.column.clone(), f.value.clone()))
                .collect(),
        )
    }

    /// Filter, sort (stable) and truncate a row set.
    pub fn apply(&self, rows: impl IntoIterator<Item = Row>) -> Vec<Row> {
        let mut out: Vec<Row> = rows.into_iter().filter(|r| self.matches(r)).collect();

        if let Some(order) = &self.order {
            out.sort_by(|a, b| {
                let ord = compare_values(a.get(&order.column), b.get(&order.column));
                if order.ascending { ord } else { ord.reverse() }
            });
        }

        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        out
    }
}

/// Zero rows is `None`, one row is `Some`, anything more is an error.
pub fn maybe_single(table: Table, mut rows: Vec<Row>) -> Result<Option<Row>, StoreError> {
    match rows.len() {
        0 => Ok(None),
        1 => Ok(rows.pop()),
        count => Err(StoreError::MultipleRows {
            table: table.name(),
            count,
        }),
    }
}

pub fn row_id(row: &Row) -> Result<Uuid, StoreError> {
    row.get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| StoreError::InvalidRow("row has no valid `id`".to_string()))
}

// Missing values sort first. Strings that parse as RFC 3339 timestamps or
// ISO dates compare chronologically.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => compare_strings(x, y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn compare_strings(x: &str, y: &str) -> Ordering {
    if let (Ok(x), Ok(y)) = (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
        return x.cmp(&y);
    }
    if let (Ok(x), Ok(y)) = (
        NaiveDate::parse_from_str(x, "%Y-%m-%d"),
        NaiveDate::parse_from_str(y, "%Y-%m-%d"),
    ) {
        return x.cmp(&y);
    }
    x.cmp(y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn equality_filters_all_must_match() {
        let q = Query::new().eq("user_id", "u1").eq("status", "pending");
        assert!(q.matches(&row(json!({"user_id": "u1", "status": "pending"}))));
        assert!(!q.matches(&row(json!({"user_id": "u1", "status": "approved"}))));
        assert!(!q.matches(&row(json!({"status": "pending"}))));
    }

    #[test]
    fn timestamps_order_chronologically_not_lexically() {
        // Offsets make lexical order disagree with instant order.
        let rows = vec![
            row(json!({"n": 1, "created_at": "2024-01-01T10:00:00+05:30"})),
            row(json!({"n": 2, "created_at": "2024-01-01T05:00:00Z"})),
        ];
        let sorted = Query::new().order_by("created_at", false).apply(rows);
        assert_eq!(sorted[0]["n"], 2);
        assert_eq!(sorted[1]["n"], 1);
    }

    #[test]
    fn dates_and_numbers_sort_and_limit_truncates() {
        let rows = vec![
            row(json!({"due_date": "2024-03-01", "amt": 5})),
            row(json!({"due_date": "2024-12-01", "amt": 1})),
            row(json!({"due_date": "2024-06-01", "amt": 10})),
        ];

        let by_date = Query::new().order_by("due_date", false).limit(2).apply(rows.clone());
        assert_eq!(by_date.len(), 2);
        assert_eq!(by_date[0]["due_date"], "2024-12-01");
        assert_eq!(by_date[1]["due_date"], "2024-06-01");

        let by_amount = Query::new().order_by("amt", true).apply(rows);
        assert_eq!(by_amount[0]["amt"], 1);
    }

    #[test]
    fn maybe_single_semantics() {
        assert!(maybe_single(Table::UserRoles, vec![]).unwrap().is_none());
        assert!(
            maybe_single(Table::UserRoles, vec![row(json!({"role": "admin"}))])
                .unwrap()
                .is_some()
        );
        let err = maybe_single(Table::UserRoles, vec![Row::new(), Row::new()]).unwrap_err();
        assert!(matches!(err, StoreError::MultipleRows { count: 2, .. }));
    }
}
