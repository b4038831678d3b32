use anyhow::Result;

use memocalc::{AppConfig, Operation};

/// What to look up
pub enum LookupTarget {
    Id(i64),
    Inputs(Operation, Vec<f64>),
}

/// Print a previously stored result; never computes
pub fn execute(config: &AppConfig, target: LookupTarget, json: bool) -> Result<()> {
    let calculator = super::open_calculator(config)?;
    let value = match target {
        LookupTarget::Id(id) => calculator.lookup_by_id(id)?,
        LookupTarget::Inputs(operation, numbers) => {
            calculator.lookup_by_inputs(&numbers, operation)?
        }
    };
    super::print_result(value, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use memocalc::CalcError;

    #[test]
    fn test_lookup_after_compute() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.database.path = dir.path().join("results.db");

        crate::commands::compute::execute(&config, Operation::Multiplication, &[4.0, 2.0], false)
            .unwrap();

        execute(
            &config,
            LookupTarget::Inputs(Operation::Multiplication, vec![2.0, 4.0]),
            false,
        )
        .unwrap();
        execute(&config, LookupTarget::Id(1), true).unwrap();

        let err = execute(&config, LookupTarget::Id(2), false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CalcError>(),
            Some(CalcError::NotFound)
        ));
    }
}
