//! Integration tests for the memoizing calculator over an on-disk store

use std::sync::Arc;

use memocalc::calculator::canonical;
use memocalc::store::StoreError;
use memocalc::{CalcError, Calculator, Operation, ResultStore, SqliteResultStore};

#[test]
fn test_results_survive_reopen() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("data").join("results.db");

    {
        let calc = Calculator::new(SqliteResultStore::open(&db_path)?);
        assert_eq!(calc.evaluate(&[10.0, 20.0, 30.0], Operation::Addition)?, 60.0);
        assert_eq!(calc.evaluate(&[20.0, 10.0, 30.0], Operation::Subtraction)?, -20.0);
    }

    let calc = Calculator::new(SqliteResultStore::open(&db_path)?);
    assert_eq!(calc.lookup_by_inputs(&[30.0, 20.0, 10.0], Operation::Addition)?, 60.0);
    assert_eq!(calc.lookup_by_inputs(&[20.0, 10.0, 30.0], Operation::Subtraction)?, -20.0);
    assert_eq!(calc.store().count()?, 2);

    // Second evaluate after reopen is a hit
    assert_eq!(calc.evaluate(&[10.0, 30.0, 20.0], Operation::Addition)?, 60.0);
    assert_eq!(calc.store().count()?, 2);
    Ok(())
}

#[test]
fn test_lookup_by_id_matches_stored_record() -> anyhow::Result<()> {
    let calc = Calculator::new(SqliteResultStore::open_in_memory()?);
    calc.evaluate(&[2.0, 3.0, 4.0], Operation::Multiplication)?;

    let key = canonical::key(&[4.0, 3.0, 2.0], Operation::Multiplication);
    let record = calc
        .store()
        .find_by_key_and_operation(&key, Operation::Multiplication)?
        .expect("stored record");

    assert_eq!(record.canonical_key, "2.0,3.0,4.0");
    assert_eq!(calc.lookup_by_id(record.id)?, 24.0);
    assert_eq!(calc.lookup_by_id(record.id + 1), Err(CalcError::NotFound));
    Ok(())
}

#[test]
fn test_failures_leave_store_untouched() -> anyhow::Result<()> {
    let calc = Calculator::new(SqliteResultStore::open_in_memory()?);

    assert_eq!(
        calc.evaluate(&[10.0, 0.0], Operation::Division),
        Err(CalcError::DivisionByZero)
    );
    assert_eq!(
        calc.evaluate(&[100.0, 5.0, 0.0, 2.0], Operation::Division),
        Err(CalcError::DivisionByZero)
    );
    assert_eq!(calc.evaluate(&[], Operation::Addition), Err(CalcError::EmptyInput));
    assert_eq!(calc.store().count()?, 0);

    // Failed divisions are not memoized: the lookup still misses
    assert_eq!(
        calc.lookup_by_inputs(&[10.0, 0.0], Operation::Division),
        Err(CalcError::NotFound)
    );
    Ok(())
}

#[test]
fn test_concurrent_evaluations_store_one_record() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = Arc::new(SqliteResultStore::open(dir.path().join("results.db"))?);
    let calc = Arc::new(Calculator::new(Arc::clone(&store)));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let calc = Arc::clone(&calc);
            std::thread::spawn(move || {
                let mut inputs = vec![1.0, 2.0, 3.0, 4.0];
                inputs.rotate_left(i % 4);
                calc.evaluate(&inputs, Operation::Addition)
            })
        })
        .collect();

    for handle in handles {
        match handle.join().expect("worker panicked") {
            Ok(value) => assert_eq!(value, 10.0),
            // A writer that lost the insert race reports the duplicate
            Err(CalcError::Store(StoreError::Duplicate { .. })) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(store.count()?, 1);
    assert_eq!(calc.lookup_by_inputs(&[4.0, 3.0, 2.0, 1.0], Operation::Addition)?, 10.0);
    Ok(())
}
