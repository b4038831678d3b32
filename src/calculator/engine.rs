//! Memoizing calculation engine
//!
//! `evaluate` computes a result at most once per canonical key: a hit is
//! returned verbatim from the store, a miss is reduced, persisted, then
//! returned. The two lookup paths never compute or write.

use super::canonical;
use super::error::CalcError;
use super::operation::Operation;
use crate::store::{NewResult, ResultStore};

/// Calculation engine over an injected result store
pub struct Calculator<S> {
    store: S,
}

impl<S: ResultStore> Calculator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Compute `operation` over `inputs`, reusing a stored result when one exists.
    pub fn evaluate(&self, inputs: &[f64], operation: Operation) -> Result<f64, CalcError> {
        if inputs.is_empty() {
            log::error!("No number to do the {} operation", operation);
            return Err(CalcError::EmptyInput);
        }

        let key = canonical::key(inputs, operation);
        if let Some(existing) = self.store.find_by_key_and_operation(&key, operation)? {
            log::debug!(
                "Reusing result #{} for {} [{}]",
                existing.id,
                operation,
                key
            );
            return Ok(existing.value);
        }

        log::info!("Calculating {} operation for {}", operation, key);
        let value = operation.reduce(inputs)?;
        let saved = self.store.save(NewResult {
            operation,
            value,
            canonical_key: key,
        })?;

        Ok(saved.value)
    }

    /// Fetch a stored result by id
    pub fn lookup_by_id(&self, id: i64) -> Result<f64, CalcError> {
        self.store
            .find_by_id(id)?
            .map(|result| result.value)
            .ok_or(CalcError::NotFound)
    }

    /// Fetch a stored result by resubmitting its inputs and operation
    pub fn lookup_by_inputs(&self, inputs: &[f64], operation: Operation) -> Result<f64, CalcError> {
        let key = canonical::key(inputs, operation);
        self.store
            .find_by_key_and_operation(&key, operation)?
            .map(|result| result.value)
            .ok_or(CalcError::NotFound)
    }
}
