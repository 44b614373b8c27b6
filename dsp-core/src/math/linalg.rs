//! Dense solve/invert facade over the linear-algebra backend
//!
//! The estimation and spectral code goes through these functions instead of
//! calling nalgebra directly, so the algorithmic layers stay independent of
//! the concrete decomposition library. Near-singularity is detected
//! explicitly: after LU factorization, the smallest pivot magnitude on the
//! diagonal of U must exceed `PIVOT_TOLERANCE` times the largest, otherwise
//! the matrix is rejected as singular rather than letting NaN or Inf
//! propagate.

use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::error::{DspError, Result};

/// Relative pivot threshold below which a matrix is treated as singular.
pub const PIVOT_TOLERANCE: f64 = 1e-12;

/// Solves `a * x = rhs` for a real dense system.
pub fn solve_real(a: &DMatrix<f64>, rhs: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let lu = a.clone().lu();
    check_pivots(lu.u().diagonal().iter().map(|p| p.abs()))?;
    lu.solve(rhs)
        .ok_or_else(|| DspError::SingularMatrix("real LU solve failed".into()))
}

/// Inverts a real dense matrix.
pub fn invert_real(a: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let lu = a.clone().lu();
    check_pivots(lu.u().diagonal().iter().map(|p| p.abs()))?;
    lu.try_inverse()
        .ok_or_else(|| DspError::SingularMatrix("real LU inversion failed".into()))
}

/// Inverts a complex dense matrix.
pub fn invert_complex(a: &DMatrix<Complex64>) -> Result<DMatrix<Complex64>> {
    let lu = a.clone().lu();
    check_pivots(lu.u().diagonal().iter().map(|p| p.norm()))?;
    lu.try_inverse()
        .ok_or_else(|| DspError::SingularMatrix("complex LU inversion failed".into()))
}

/// Determinant of a real dense matrix.
pub fn determinant(a: &DMatrix<f64>) -> f64 {
    a.clone().lu().determinant()
}

fn check_pivots<I>(magnitudes: I) -> Result<()>
where
    I: Iterator<Item = f64>,
{
    let mut smallest = f64::INFINITY;
    let mut largest = 0.0f64;
    for magnitude in magnitudes {
        smallest = smallest.min(magnitude);
        largest = largest.max(magnitude);
    }
    if largest == 0.0 || smallest <= PIVOT_TOLERANCE * largest {
        return Err(DspError::SingularMatrix(format!(
            "pivot ratio {:e} below tolerance {:e}",
            if largest == 0.0 { 0.0 } else { smallest / largest },
            PIVOT_TOLERANCE
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_real() {
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 4.0]);
        let rhs = DMatrix::from_row_slice(2, 1, &[2.0, 8.0]);
        let x = solve_real(&a, &rhs).unwrap();
        assert!((x[(0, 0)] - 1.0).abs() < 1e-12);
        assert!((x[(1, 0)] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_invert_real_roundtrip() {
        let a = DMatrix::from_row_slice(2, 2, &[4.0, 7.0, 2.0, 6.0]);
        let inv = invert_real(&a).unwrap();
        let identity = &a * inv;
        assert!((identity[(0, 0)] - 1.0).abs() < 1e-12);
        assert!(identity[(0, 1)].abs() < 1e-12);
        assert!((identity[(1, 1)] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_singular_matrix_is_rejected() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let rhs = DMatrix::from_row_slice(2, 1, &[1.0, 1.0]);
        assert!(matches!(
            solve_real(&a, &rhs),
            Err(DspError::SingularMatrix(_))
        ));
    }

    #[test]
    fn test_invert_complex() {
        let a = DMatrix::from_row_slice(
            2,
            2,
            &[
                Complex64::new(1.0, 1.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(0.0, 2.0),
            ],
        );
        let inv = invert_complex(&a).unwrap();
        let identity = &a * inv;
        assert!((identity[(0, 0)] - Complex64::new(1.0, 0.0)).norm() < 1e-12);
        assert!((identity[(1, 1)] - Complex64::new(1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_determinant() {
        let a = DMatrix::from_row_slice(2, 2, &[3.0, 0.0, 0.0, 2.0]);
        assert!((determinant(&a) - 6.0).abs() < 1e-12);
    }
}
