//! The four arithmetic operations and their reduction rules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::CalcError;

/// Arithmetic operation applied as a left fold over the inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl Operation {
    /// Every operation, in route order
    pub const ALL: [Operation; 4] = [
        Operation::Addition,
        Operation::Subtraction,
        Operation::Multiplication,
        Operation::Division,
    ];

    /// Upper-case name used on disk and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Addition => "ADDITION",
            Self::Subtraction => "SUBTRACTION",
            Self::Multiplication => "MULTIPLICATION",
            Self::Division => "DIVISION",
        }
    }

    /// Whether reordering the inputs leaves the result unchanged
    pub fn is_commutative(&self) -> bool {
        matches!(self, Self::Addition | Self::Multiplication)
    }

    /// Fold `inputs` left to right, seeded by the first element.
    ///
    /// Empty input is rejected before anything is folded. For division, the
    /// first zero divisor aborts the fold.
    pub fn reduce(&self, inputs: &[f64]) -> Result<f64, CalcError> {
        let (&seed, rest) = inputs.split_first().ok_or(CalcError::EmptyInput)?;

        match self {
            Self::Addition => Ok(rest.iter().fold(seed, |acc, &next| acc + next)),
            Self::Subtraction => Ok(rest.iter().fold(seed, |acc, &next| acc - next)),
            Self::Multiplication => Ok(rest.iter().fold(seed, |acc, &next| acc * next)),
            Self::Division => rest.iter().try_fold(seed, |dividend, &divisor| {
                if divisor == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                Ok(dividend / divisor)
            }),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an operation name that isn't one of the four
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown operation '{0}' (expected one of ADDITION, SUBTRACTION, MULTIPLICATION, DIVISION)")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}
