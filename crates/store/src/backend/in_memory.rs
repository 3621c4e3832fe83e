use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use super::RecordBackend;
use crate::error::StoreError;
use crate::query::{Query, Row, row_id};
use crate::table::Table;

/// In-memory record backend for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    inner: RwLock<HashMap<Table, Vec<Row>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl RecordBackend for InMemoryBackend {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Row>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        let rows = map.get(&table).map(|rows| rows.iter().cloned());
        Ok(rows.map(|rows| query.apply(rows)).unwrap_or_default())
    }

    async fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError> {
        let id = row_id(&row)?;
        let mut map = self.inner.write().map_err(poisoned)?;
        let rows = map.entry(table).or_default();

        if rows.iter().any(|r| row_id(r).ok() == Some(id)) {
            return Err(StoreError::InvalidRow(format!(
                "duplicate key {id} in \"{table}\""
            )));
        }
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: Table, id: Uuid, patch: Row) -> Result<Row, StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        let row = map
            .get_mut(&table)
            .and_then(|rows| rows.iter_mut().find(|r| row_id(r).ok() == Some(id)))
            .ok_or(StoreError::NotFound {
                table: table.name(),
                id,
            })?;

        row.extend(patch);
        Ok(row.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn tables_are_isolated() {
        let backend = InMemoryBackend::new();
        let id = Uuid::now_v7();
        backend
            .insert(Table::Certificates, row(json!({"id": id.to_string()})))
            .await
            .unwrap();

        let certs = backend.select(Table::Certificates, &Query::new()).await.unwrap();
        let grievances = backend.select(Table::Grievances, &Query::new()).await.unwrap();
        assert_eq!(certs.len(), 1);
        assert!(grievances.is_empty());
    }

    #[tokio::test]
    async fn update_merges_shallowly_and_reports_missing_rows() {
        let backend = InMemoryBackend::new();
        let id = Uuid::now_v7();
        backend
            .insert(
                Table::PropertyTax,
                row(json!({"id": id.to_string(), "status": "unpaid", "owner_name": "R"})),
            )
            .await
            .unwrap();

        let merged = backend
            .update(Table::PropertyTax, id, row(json!({"status": "paid"})))
            .await
            .unwrap();
        assert_eq!(merged["status"], "paid");
        assert_eq!(merged["owner_name"], "R");

        let missing = backend
            .update(Table::PropertyTax, Uuid::now_v7(), Row::new())
            .await
            .unwrap_err();
        assert!(matches!(missing, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let backend = InMemoryBackend::new();
        let r = row(json!({"id": Uuid::now_v7().to_string()}));
        backend.insert(Table::Profiles, r.clone()).await.unwrap();
        assert!(backend.insert(Table::Profiles, r).await.is_err());
    }
}
