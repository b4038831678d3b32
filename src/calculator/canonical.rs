//! Canonical lookup keys for memoized results.
//!
//! Two input sequences that must produce the same result under an operation
//! map to the same key:
//! - Commutative operations (addition, multiplication): inputs sorted ascending
//! - Subtraction and division: input order preserved
//!
//! Numbers are rendered with the shortest representation that round-trips
//! (`10.0`, `0.1`, `1e21`) and joined with `,`.

use super::operation::Operation;

/// Compute the canonical key for `inputs` under `operation`.
pub fn key(inputs: &[f64], operation: Operation) -> String {
    if operation.is_commutative() {
        let mut sorted = inputs.to_vec();
        sorted.sort_by(f64::total_cmp);
        join(&sorted)
    } else {
        join(inputs)
    }
}

fn join(numbers: &[f64]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:?}", n))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commutative_keys_ignore_order() {
        let permutations: [[f64; 3]; 6] = [
            [10.0, 20.0, 30.0],
            [10.0, 30.0, 20.0],
            [20.0, 10.0, 30.0],
            [20.0, 30.0, 10.0],
            [30.0, 10.0, 20.0],
            [30.0, 20.0, 10.0],
        ];
        for op in [Operation::Addition, Operation::Multiplication] {
            for p in &permutations {
                assert_eq!(key(p, op), "10.0,20.0,30.0");
            }
        }
    }

    #[test]
    fn test_non_commutative_keys_keep_order() {
        for op in [Operation::Subtraction, Operation::Division] {
            assert_eq!(key(&[20.0, 10.0, 30.0], op), "20.0,10.0,30.0");
            assert_ne!(key(&[20.0, 10.0, 30.0], op), key(&[30.0, 10.0, 20.0], op));
        }
    }

    #[test]
    fn test_sort_is_numeric_not_lexical() {
        assert_eq!(key(&[9.0, 10.0, -1.5], Operation::Addition), "-1.5,9.0,10.0");
    }

    #[test]
    fn test_empty_inputs_give_empty_key() {
        for op in Operation::ALL {
            assert_eq!(key(&[], op), "");
        }
    }

    #[test]
    fn test_formatting_round_trips() {
        let inputs = [0.1, 1.0 / 3.0, 1e21, -2.5e-8];
        let k = key(&inputs, Operation::Subtraction);
        let parsed: Vec<f64> = k.split(',').map(|s| s.parse().unwrap()).collect();
        assert_eq!(parsed, inputs);
        assert!(!k.ends_with(','));
    }

    #[test]
    fn test_whole_numbers_keep_fraction() {
        assert_eq!(key(&[5.0], Operation::Division), "5.0");
    }
}
