//! Persistence for memoized results
//!
//! The calculator only needs three capabilities from storage: save a new
//! record, find one by `(canonical_key, operation)`, and find one by id.
//! [`ResultStore`] is that seam; [`SqliteResultStore`] is the implementation
//! the server and CLI use.
//!
//! # Example
//! ```no_run
//! use memocalc::store::{ResultStore, SqliteResultStore};
//! use memocalc::calculator::Operation;
//!
//! let store = SqliteResultStore::open("results.db")?;
//! let hit = store.find_by_key_and_operation("10.0,20.0", Operation::Addition)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod sqlite;
pub mod types;

pub use sqlite::SqliteResultStore;
pub use types::{NewResult, StoreError, StoredResult};

use crate::calculator::Operation;

/// Record store for memoized results.
///
/// Implementations must guarantee at most one record per
/// `(canonical_key, operation)` pair; a second `save` for the same pair
/// fails with [`StoreError::Duplicate`].
pub trait ResultStore: Send + Sync {
    /// Persist a new record and return it with its assigned id
    fn save(&self, result: NewResult) -> Result<StoredResult, StoreError>;

    /// Find the record for a canonical key under an operation
    fn find_by_key_and_operation(
        &self,
        key: &str,
        operation: Operation,
    ) -> Result<Option<StoredResult>, StoreError>;

    /// Find a record by its id
    fn find_by_id(&self, id: i64) -> Result<Option<StoredResult>, StoreError>;
}

impl<S: ResultStore + ?Sized> ResultStore for std::sync::Arc<S> {
    fn save(&self, result: NewResult) -> Result<StoredResult, StoreError> {
        (**self).save(result)
    }

    fn find_by_key_and_operation(
        &self,
        key: &str,
        operation: Operation,
    ) -> Result<Option<StoredResult>, StoreError> {
        (**self).find_by_key_and_operation(key, operation)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<StoredResult>, StoreError> {
        (**self).find_by_id(id)
    }
}
