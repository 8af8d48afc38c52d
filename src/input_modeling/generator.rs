//! Validation and derivation for continuous-time Markov chain generators.
//!
//! Validation, stationary solves and moment derivation are kept as
//! separate free functions, so that each step can be run (and fail) on its
//! own.  The parameter builders for MAP, MMPP2 and Phase-Type compose them
//! in order.

use super::linalg::{self, Matrix, Vector};
use crate::utils::errors::ParameterError;
use crate::utils::TOLERANCE;

/// Raw moments derived from a fundamental matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub mean: f64,
    pub second_moment: f64,
    pub variance: f64,
}

pub fn validate_square(matrix: &'static str, m: &Matrix) -> Result<(), ParameterError> {
    if m.nrows() != m.ncols() {
        return Err(ParameterError::NotSquare {
            matrix,
            rows: m.nrows(),
            cols: m.ncols(),
        });
    }
    Ok(())
}

/// Checks the hidden-transition generator: strictly negative diagonal,
/// nonnegative off-diagonal, and row sums no greater than the tolerance.
pub fn validate_generator(generator: &Matrix) -> Result<(), ParameterError> {
    for (row, entries) in generator.row_iter().enumerate() {
        for (col, value) in entries.iter().copied().enumerate() {
            if row == col && !(value < 0.0) {
                return Err(ParameterError::NonNegativeDiagonal { row, value });
            }
            if row != col && !(value >= 0.0) {
                return Err(ParameterError::NegativeOffDiagonal { row, col, value });
            }
        }
        let sum = entries.sum();
        if sum > TOLERANCE {
            return Err(ParameterError::PositiveRowSum { row, sum });
        }
    }
    Ok(())
}

/// Checks that every observable transition rate is nonnegative.
pub fn validate_observable(observable: &Matrix) -> Result<(), ParameterError> {
    for (row, entries) in observable.row_iter().enumerate() {
        if let Some((col, value)) = entries
            .iter()
            .copied()
            .enumerate()
            .find(|(_, value)| !(*value >= 0.0))
        {
            return Err(ParameterError::NegativeObservableRate { row, col, value });
        }
    }
    Ok(())
}

/// Checks that hidden plus observable rates sum to zero on every row.
pub fn validate_balanced(hidden: &Matrix, observable: &Matrix) -> Result<(), ParameterError> {
    let combined = hidden + observable;
    for (row, entries) in combined.row_iter().enumerate() {
        let sum = entries.sum();
        if sum.abs() > TOLERANCE {
            return Err(ParameterError::UnbalancedRowSum { row, sum });
        }
    }
    Ok(())
}

/// Checks an initial probability vector against the generator dimension.
pub fn validate_initial_vector(alpha: &Vector, dimension: usize) -> Result<(), ParameterError> {
    if alpha.len() != dimension {
        return Err(ParameterError::DimensionMismatch {
            expected: dimension,
            found: alpha.len(),
        });
    }
    super::elementary::probability_vector(alpha.as_slice())
}

/// Validates a (D0, D1) pair in order: shape, D0 as a generator, D1 as
/// observable rates, then the row balance of D0 + D1.
pub fn validate_map(d0: &Matrix, d1: &Matrix) -> Result<(), ParameterError> {
    validate_square("D0", d0)?;
    validate_square("D1", d1)?;
    if d0.nrows() != d1.nrows() {
        return Err(ParameterError::DimensionMismatch {
            expected: d0.nrows(),
            found: d1.nrows(),
        });
    }
    validate_generator(d0)?;
    validate_observable(d1)?;
    validate_balanced(d0, d1)
}

/// Validates a Phase-Type (alpha, T) pair.
pub fn validate_phase_type(alpha: &Vector, t: &Matrix) -> Result<(), ParameterError> {
    validate_square("T", t)?;
    validate_generator(t)?;
    validate_initial_vector(alpha, t.nrows())
}

/// M = -(generator)^-1
pub fn fundamental_matrix(generator: &Matrix) -> Result<Matrix, ParameterError> {
    Ok(-linalg::invert(generator)?)
}

/// Per-phase exit rates, the negated diagonal of the generator.
pub fn exit_rates(generator: &Matrix) -> Vec<f64> {
    generator.diagonal().iter().map(|value| -value).collect()
}

/// Divides each row by its phase's exit rate.  The hidden matrix has its
/// diagonal zeroed, as there are no hidden self-transitions.
pub fn embedded_matrices(hidden: &Matrix, observable: &Matrix) -> (Matrix, Matrix) {
    let rates = exit_rates(hidden);
    let mut p0 = hidden.clone();
    let mut p1 = observable.clone();
    for (row, rate) in rates.iter().enumerate() {
        p0.row_mut(row).unscale_mut(*rate);
        p1.row_mut(row).unscale_mut(*rate);
        p0[(row, row)] = 0.0;
    }
    (p0, p1)
}

/// Stationary distribution of the chain embedded at observable
/// transitions, P = M * D1.  The system pi (P - I) = 0 has its last column
/// replaced by ones, so that solving against the last unit vector also
/// enforces pi * 1 = 1.
pub fn stationary_vector(
    fundamental: &Matrix,
    observable: &Matrix,
) -> Result<Vector, ParameterError> {
    let n = fundamental.nrows();
    let embedded = linalg::multiply(fundamental, observable)?;
    let mut system = embedded - Matrix::identity(n, n);
    system.column_mut(n - 1).fill(1.0);
    let mut rhs = Vector::zeros(n);
    rhs[n - 1] = 1.0;
    // pi is a row vector, so solve the transposed system
    linalg::solve(&system.transpose(), &rhs)
}

/// First moment `initial * M * 1`, second moment `2 * initial * M^2 * 1`,
/// and the variance between them.
pub fn moments(initial: &Vector, fundamental: &Matrix) -> Moments {
    let first = fundamental * linalg::ones(fundamental.nrows());
    let second = fundamental * &first;
    let mean = initial.dot(&first);
    let second_moment = 2.0 * initial.dot(&second);
    Moments {
        mean,
        second_moment,
        variance: second_moment - mean * mean,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input_modeling::linalg::from_rows;

    fn matrix(rows: &[Vec<f64>]) -> Matrix {
        from_rows("test", rows).unwrap()
    }

    #[test]
    fn rejects_row_sum_beyond_tolerance() {
        let d0 = matrix(&[vec![-2.0, 2.000002], vec![1.0, -1.0]]);
        let d1 = matrix(&[vec![0.0, 0.0], vec![0.0, 0.0]]);
        assert!(matches!(
            validate_map(&d0, &d1),
            Err(ParameterError::PositiveRowSum { row: 0, .. })
        ));
    }

    #[test]
    fn validation_reports_first_failing_condition() {
        let d1 = matrix(&[vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert!(matches!(
            validate_map(&matrix(&[vec![-1.0, 0.0, 0.0]]), &d1),
            Err(ParameterError::NotSquare { matrix: "D0", .. })
        ));
        assert!(matches!(
            validate_map(&matrix(&[vec![0.0, 0.0], vec![0.0, -1.0]]), &d1),
            Err(ParameterError::NonNegativeDiagonal { row: 0, .. })
        ));
        assert!(matches!(
            validate_map(&matrix(&[vec![-1.0, -0.5], vec![0.0, -1.0]]), &d1),
            Err(ParameterError::NegativeOffDiagonal { row: 0, col: 1, .. })
        ));
        assert!(matches!(
            validate_map(
                &matrix(&[vec![-1.0, 0.0], vec![0.0, -1.0]]),
                &matrix(&[vec![1.5, -0.5], vec![0.0, 1.0]])
            ),
            Err(ParameterError::NegativeObservableRate { row: 0, col: 1, .. })
        ));
        assert!(matches!(
            validate_map(
                &matrix(&[vec![-2.0, 0.5], vec![0.0, -1.0]]),
                &matrix(&[vec![1.0, 0.0], vec![0.0, 1.0]])
            ),
            Err(ParameterError::UnbalancedRowSum { row: 0, .. })
        ));
        assert!(matches!(
            validate_map(&matrix(&[vec![-1.0]]), &d1),
            Err(ParameterError::DimensionMismatch { expected: 1, found: 2 })
        ));
    }

    #[test]
    fn stationary_vector_is_a_distribution() {
        let generators = [
            (
                vec![vec![-3.0, 1.0], vec![0.5, -1.5]],
                vec![vec![1.5, 0.5], vec![0.2, 0.8]],
            ),
            (
                vec![
                    vec![-5.0, 1.0, 1.0],
                    vec![0.0, -2.0, 0.5],
                    vec![0.3, 0.3, -1.0],
                ],
                vec![
                    vec![2.0, 0.5, 0.5],
                    vec![0.5, 0.5, 0.5],
                    vec![0.0, 0.0, 0.4],
                ],
            ),
        ];
        for (d0, d1) in generators.iter() {
            let d0 = matrix(d0);
            let d1 = matrix(d1);
            validate_map(&d0, &d1).unwrap();
            let fundamental = fundamental_matrix(&d0).unwrap();
            let pi = stationary_vector(&fundamental, &d1).unwrap();
            assert!(pi.iter().all(|p| *p >= -TOLERANCE));
            assert!((pi.sum() - 1.0).abs() < TOLERANCE);
            // Invariant under the embedded chain
            let embedded = &fundamental * &d1;
            let next = embedded.transpose() * &pi;
            assert!((next - &pi).norm() < 1e-9);
        }
    }

    #[test]
    fn embedded_rows_are_stochastic() {
        let d0 = matrix(&[vec![-3.0, 1.0], vec![0.5, -1.5]]);
        let d1 = matrix(&[vec![1.5, 0.5], vec![0.2, 0.8]]);
        let (p0, p1) = embedded_matrices(&d0, &d1);
        assert_eq!(p0[(0, 0)], 0.0);
        assert_eq!(p0[(1, 1)], 0.0);
        assert!((p0[(0, 1)] - 1.0 / 3.0).abs() < 1e-12);
        (0..2).for_each(|row| {
            let total = p0.row(row).sum() + p1.row(row).sum();
            assert!((total - 1.0).abs() < 1e-12);
        });
        assert_eq!(exit_rates(&d0), vec![3.0, 1.5]);
    }

    #[test]
    fn exponential_moments_from_single_phase() {
        let t = matrix(&[vec![-4.0]]);
        let fundamental = fundamental_matrix(&t).unwrap();
        let moments = moments(&Vector::from_vec(vec![1.0]), &fundamental);
        assert!((moments.mean - 0.25).abs() < 1e-12);
        assert!((moments.second_moment - 0.125).abs() < 1e-12);
        assert!((moments.variance - 0.0625).abs() < 1e-12);
    }
}
