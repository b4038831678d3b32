pub mod calculator;
pub mod config;
pub mod paths;
pub mod store;

// Re-export commonly used types
pub use calculator::{CalcError, Calculator, Operation};
pub use config::AppConfig;
pub use store::{ResultStore, SqliteResultStore};
