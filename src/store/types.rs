//! Record types shared by all result stores

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::calculator::Operation;

/// A persisted, immutable memoized computation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredResult {
    pub id: i64,
    pub operation: Operation,
    pub value: f64,
    pub canonical_key: String,
    pub created_at: DateTime<Utc>,
}

/// A computation that has not been persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewResult {
    pub operation: Operation,
    pub value: f64,
    pub canonical_key: String,
}

/// Errors raised at the storage boundary
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record already exists for this key and operation.
    #[error("Result already stored for {operation} [{canonical_key}]")]
    Duplicate {
        canonical_key: String,
        operation: Operation,
    },

    /// A stored row could not be mapped back into a record.
    #[error("Corrupt row: column '{column}' holds '{value}'")]
    Corrupt { column: &'static str, value: String },

    /// Underlying SQLite failure.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
