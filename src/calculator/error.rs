//! Failure kinds reported by the calculation engine.

use crate::store::StoreError;

/// Errors surfaced by [`Calculator`](super::Calculator) operations.
///
/// Every variant is a distinct, typed failure; none is ever coerced into a
/// numeric sentinel.
///
/// # Examples
///
/// ```rust
/// use memocalc::calculator::{CalcError, Operation};
///
/// match Operation::Division.reduce(&[10.0, 0.0]) {
///     Err(CalcError::DivisionByZero) => {}
///     other => panic!("unexpected: {:?}", other),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum CalcError {
    /// The input sequence had no numbers to fold.
    #[error("No number to do the operation")]
    EmptyInput,

    /// A divisor in the division fold was zero.
    #[error("Divide by zero.")]
    DivisionByZero,

    /// No stored result matches the lookup.
    #[error("Result does not exist")]
    NotFound,

    /// The store failed; passed through unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// Store errors wrap rusqlite errors, which aren't comparable; compare by kind.
impl PartialEq for CalcError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::EmptyInput, Self::EmptyInput)
                | (Self::DivisionByZero, Self::DivisionByZero)
                | (Self::NotFound, Self::NotFound)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_stable() {
        assert_eq!(CalcError::EmptyInput.to_string(), "No number to do the operation");
        assert_eq!(CalcError::DivisionByZero.to_string(), "Divide by zero.");
        assert_eq!(CalcError::NotFound.to_string(), "Result does not exist");
    }
}
