//! Raw record backends. No access policy is applied at this layer.

mod in_memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::query::{Query, Row};
use crate::table::Table;

pub use in_memory::InMemoryBackend;
pub use postgres::PostgresBackend;

#[async_trait]
pub trait RecordBackend: Send + Sync {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Row>, StoreError>;

    /// Store a complete row. The row must already carry its `id`.
    async fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError>;

    /// Shallow-merge `patch` into the row with `id` and return the merged row.
    async fn update(&self, table: Table, id: Uuid, patch: Row) -> Result<Row, StoreError>;
}

#[async_trait]
impl<B> RecordBackend for Arc<B>
where
    B: RecordBackend + ?Sized,
{
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Row>, StoreError> {
        (**self).select(table, query).await
    }

    async fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError> {
        (**self).insert(table, row).await
    }

    async fn update(&self, table: Table, id: Uuid, patch: Row) -> Result<Row, StoreError> {
        (**self).update(table, id, patch).await
    }
}
