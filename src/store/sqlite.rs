//! SQLite-backed result store
//!
//! One connection guarded by a mutex; the server shares the store across
//! connection threads behind an `Arc`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;

use super::types::{NewResult, StoreError, StoredResult};
use super::ResultStore;
use crate::calculator::Operation;

/// (id, operation, value, canonical_key, created_at)
type ResultRow = (i64, String, f64, String, DateTime<Utc>);

const SELECT_COLUMNS: &str = "SELECT id, operation, value, canonical_key, created_at FROM results";

/// Result store over a single SQLite database
pub struct SqliteResultStore {
    conn: Mutex<Connection>,
}

impl SqliteResultStore {
    /// Open or create a results database file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite database at {}", path.display()))?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory database for testing
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to create in-memory database")?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Initialize SQLite schema
    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                operation TEXT NOT NULL,
                value REAL NOT NULL,
                canonical_key TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (canonical_key, operation)
            );",
        )
        .context("Failed to initialize results schema")?;
        Ok(())
    }

    /// Number of stored results
    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM results", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn find_one(
        &self,
        filter: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Option<StoredResult>, StoreError> {
        let sql = format!("{} WHERE {}", SELECT_COLUMNS, filter);
        let conn = self.conn.lock();
        let row: Option<ResultRow> = conn
            .query_row(&sql, params, |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            })
            .optional()?;

        row.map(into_record).transpose()
    }
}

fn into_record(row: ResultRow) -> Result<StoredResult, StoreError> {
    let (id, operation, value, canonical_key, created_at) = row;
    let operation = operation
        .parse::<Operation>()
        .map_err(|_| StoreError::Corrupt {
            column: "operation",
            value: operation.clone(),
        })?;

    Ok(StoredResult {
        id,
        operation,
        value,
        canonical_key,
        created_at,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

impl ResultStore for SqliteResultStore {
    fn save(&self, result: NewResult) -> Result<StoredResult, StoreError> {
        let created_at = Utc::now();
        let conn = self.conn.lock();

        let inserted = conn.query_row(
            "INSERT INTO results (operation, value, canonical_key, created_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id",
            params![
                result.operation.as_str(),
                result.value,
                &result.canonical_key,
                created_at,
            ],
            |row| row.get::<_, i64>(0),
        );

        let id = match inserted {
            Ok(id) => id,
            Err(e) if is_unique_violation(&e) => {
                return Err(StoreError::Duplicate {
                    canonical_key: result.canonical_key,
                    operation: result.operation,
                });
            }
            Err(e) => return Err(e.into()),
        };

        Ok(StoredResult {
            id,
            operation: result.operation,
            value: result.value,
            canonical_key: result.canonical_key,
            created_at,
        })
    }

    fn find_by_key_and_operation(
        &self,
        key: &str,
        operation: Operation,
    ) -> Result<Option<StoredResult>, StoreError> {
        self.find_one(
            "canonical_key = ?1 AND operation = ?2",
            &[&key, &operation.as_str()],
        )
    }

    fn find_by_id(&self, id: i64) -> Result<Option<StoredResult>, StoreError> {
        self.find_one("id = ?1", &[&id])
    }
}
