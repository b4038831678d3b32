//! Memoized arithmetic over lists of numbers
//!
//! - [`canonical`] turns inputs + operation into a lookup key
//! - [`Calculator`] decides between a stored hit and a fresh computation
//! - [`Operation::reduce`] holds the fold rules
//!
//! # Example
//! ```
//! use memocalc::calculator::{Calculator, Operation};
//! use memocalc::store::SqliteResultStore;
//!
//! let calc = Calculator::new(SqliteResultStore::open_in_memory()?);
//! assert_eq!(calc.evaluate(&[10.0, 20.0, 30.0], Operation::Addition)?, 60.0);
//! assert_eq!(calc.lookup_by_inputs(&[30.0, 10.0, 20.0], Operation::Addition)?, 60.0);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod canonical;
pub mod engine;
pub mod error;
pub mod operation;

pub use engine::Calculator;
pub use error::CalcError;
pub use operation::{Operation, UnknownOperation};
