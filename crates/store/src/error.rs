use thiserror::Error;
use uuid::Uuid;

use crate::policy::Operation;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{operation} on \"{table}\" violates row-level security policy")]
    PolicyViolation {
        table: &'static str,
        operation: Operation,
    },

    #[error("record {id} not found in \"{table}\"")]
    NotFound { table: &'static str, id: Uuid },

    #[error("expected at most one row from \"{table}\", got {count}")]
    MultipleRows { table: &'static str, count: usize },

    #[error("invalid row: {0}")]
    InvalidRow(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}
