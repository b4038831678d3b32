use anyhow::Result;

use memocalc::{AppConfig, Operation};

/// Evaluate `operation` over `numbers`, memoizing into the configured database
pub fn execute(config: &AppConfig, operation: Operation, numbers: &[f64], json: bool) -> Result<()> {
    let calculator = super::open_calculator(config)?;
    let value = calculator.evaluate(numbers, operation)?;
    super::print_result(value, json)
}
