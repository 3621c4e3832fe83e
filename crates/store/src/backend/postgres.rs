//! Postgres-backed record storage.
//!
//! Every collection lives in one `portal_records` table keyed by
//! `(table_name, id)` with the row itself in a JSONB `data` column. Equality
//! filters are pushed down as JSONB containment (`data @> $filter`); ordering
//! and limits are applied after the fetch so they share the in-memory
//! comparison rules.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Row as _};
use tracing::instrument;
use uuid::Uuid;

use super::RecordBackend;
use crate::error::StoreError;
use crate::query::{Query, Row, row_id};
use crate::table::Table;

const SCHEMA: &str = include_str!("../../migrations/0001_portal_records.sql");

#[derive(Debug, Clone)]
pub struct PostgresBackend {
    pool: Arc<PgPool>,
}

impl PostgresBackend {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Create the record table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA).execute(&*self.pool).await?;
        Ok(())
    }
}

fn decode(rows: Vec<sqlx::postgres::PgRow>) -> Result<Vec<Row>, StoreError> {
    rows.into_iter()
        .map(|r| {
            r.try_get::<Json<Row>, _>("data")
                .map(|Json(data)| data)
                .map_err(StoreError::from)
        })
        .collect()
}

#[async_trait]
impl RecordBackend for PostgresBackend {
    #[instrument(skip(self, query), fields(table = %table))]
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Row>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT data
            FROM portal_records
            WHERE table_name = $1 AND data @> $2
            ORDER BY created_at, id
            "#,
        )
        .bind(table.name())
        .bind(Json(query.filter_object()))
        .fetch_all(&*self.pool)
        .await?;

        Ok(query.apply(decode(rows)?))
    }

    #[instrument(skip(self, row), fields(table = %table))]
    async fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError> {
        let id = row_id(&row)?;
        let stored = sqlx::query(
            r#"
            INSERT INTO portal_records (table_name, id, data)
            VALUES ($1, $2, $3)
            RETURNING data
            "#,
        )
        .bind(table.name())
        .bind(id)
        .bind(Json(&row))
        .fetch_one(&*self.pool)
        .await?;

        Ok(stored.try_get::<Json<Row>, _>("data")?.0)
    }

    #[instrument(skip(self, patch), fields(table = %table, id = %id))]
    async fn update(&self, table: Table, id: Uuid, patch: Row) -> Result<Row, StoreError> {
        let updated = sqlx::query(
            r#"
            UPDATE portal_records
            SET data = data || $3
            WHERE table_name = $1 AND id = $2
            RETURNING data
            "#,
        )
        .bind(table.name())
        .bind(id)
        .bind(Json(&patch))
        .fetch_optional(&*self.pool)
        .await?;

        match updated {
            Some(r) => Ok(r.try_get::<Json<Row>, _>("data")?.0),
            None => Err(StoreError::NotFound {
                table: table.name(),
                id,
            }),
        }
    }
}
