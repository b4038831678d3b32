pub mod compute;
pub mod lookup;
pub mod serve;

use anyhow::Result;
use serde_json::json;

use memocalc::{AppConfig, Calculator, SqliteResultStore};

/// Open the configured results database behind a calculator
fn open_calculator(config: &AppConfig) -> Result<Calculator<SqliteResultStore>> {
    let store = SqliteResultStore::open(&config.database.path)?;
    Ok(Calculator::new(store))
}

/// Print a result the way every command does
fn print_result(value: f64, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&json!({ "result": value }))?);
    } else {
        println!("{:?}", value);
    }
    Ok(())
}
