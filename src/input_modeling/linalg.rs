//! Dense linear algebra over `nalgebra`, used only while building
//! matrix-derived parameters.

use nalgebra::{DMatrix, DVector};

use crate::utils::errors::ParameterError;

pub type Matrix = DMatrix<f64>;
pub type Vector = DVector<f64>;

/// Builds a matrix from rectangular rows.
pub fn from_rows(matrix: &'static str, rows: &[Vec<f64>]) -> Result<Matrix, ParameterError> {
    let cols = rows.first().map(Vec::len).unwrap_or(0);
    if rows.is_empty() || cols == 0 {
        return Err(ParameterError::EmptyMatrix { matrix });
    }
    if rows.iter().any(|row| row.len() != cols) {
        return Err(ParameterError::RaggedMatrix { matrix });
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Ok(Matrix::from_row_slice(rows.len(), cols, &flat))
}

pub fn to_rows(matrix: &Matrix) -> Vec<Vec<f64>> {
    matrix
        .row_iter()
        .map(|row| row.iter().copied().collect())
        .collect()
}

pub fn invert(matrix: &Matrix) -> Result<Matrix, ParameterError> {
    matrix
        .clone()
        .try_inverse()
        .ok_or(ParameterError::SingularMatrix)
}

/// Solves `matrix * x = rhs` by LU decomposition.
pub fn solve(matrix: &Matrix, rhs: &Vector) -> Result<Vector, ParameterError> {
    matrix
        .clone()
        .lu()
        .solve(rhs)
        .ok_or(ParameterError::SingularMatrix)
}

/// Matrix product, checking that the inner dimensions agree.
pub fn multiply(left: &Matrix, right: &Matrix) -> Result<Matrix, ParameterError> {
    if left.ncols() != right.nrows() {
        return Err(ParameterError::DimensionMismatch {
            expected: left.ncols(),
            found: right.nrows(),
        });
    }
    Ok(left * right)
}

pub fn ones(n: usize) -> Vector {
    Vector::from_element(n, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_round_trip_through_matrix() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let matrix = from_rows("test", &rows).unwrap();
        assert_eq!(matrix.nrows(), 3);
        assert_eq!(matrix[(1, 0)], 3.0);
        assert_eq!(to_rows(&matrix), rows);
    }

    #[test]
    fn ragged_and_empty_rows_are_rejected() {
        assert_eq!(
            from_rows("D0", &[vec![1.0, 2.0], vec![3.0]]),
            Err(ParameterError::RaggedMatrix { matrix: "D0" })
        );
        assert_eq!(
            from_rows("D1", &[]),
            Err(ParameterError::EmptyMatrix { matrix: "D1" })
        );
    }

    #[test]
    fn inverse_and_solve_agree() {
        let matrix = from_rows("test", &[vec![4.0, 1.0], vec![2.0, 3.0]]).unwrap();
        let rhs = Vector::from_vec(vec![1.0, 2.0]);
        let solved = solve(&matrix, &rhs).unwrap();
        let inverted = invert(&matrix).unwrap() * &rhs;
        assert!((solved - inverted).norm() < 1e-12);
    }

    #[test]
    fn product_checks_inner_dimensions() {
        let left = from_rows("left", &[vec![1.0, 2.0, 3.0]]).unwrap();
        let right = from_rows("right", &[vec![1.0], vec![0.5], vec![2.0]]).unwrap();
        assert_eq!(multiply(&left, &right).unwrap()[(0, 0)], 8.0);
        assert_eq!(
            multiply(&left, &left),
            Err(ParameterError::DimensionMismatch {
                expected: 3,
                found: 1
            })
        );
    }

    #[test]
    fn singular_matrix_is_reported() {
        let matrix = from_rows("test", &[vec![1.0, 2.0], vec![2.0, 4.0]]).unwrap();
        assert_eq!(invert(&matrix), Err(ParameterError::SingularMatrix));
    }
}
