//! Dense matrix helpers for the normal equations.
//!
//! Products and transposes use `faer`'s operators; only the Gram-matrix
//! inverse is computed by hand with Gauss-Jordan elimination.

use faer::{Col, Mat};

/// Pivots with an absolute value at or below this are treated as zero.
pub const PIVOT_TOLERANCE: f64 = 1e-12;

/// Transpose of `a`.
pub fn transpose(a: &Mat<f64>) -> Mat<f64> {
    a.transpose().to_owned()
}

/// Matrix-matrix product `a · b`.
///
/// # Panics
/// Panics if `a.ncols() != b.nrows()`.
pub fn mat_mul(a: &Mat<f64>, b: &Mat<f64>) -> Mat<f64> {
    a * b
}

/// Matrix-vector product `a · v`.
///
/// # Panics
/// Panics if `a.ncols() != v.nrows()`.
pub fn mat_vec_mul(a: &Mat<f64>, v: &Col<f64>) -> Col<f64> {
    a * v
}

/// Dot product of a feature row with a coefficient slice.
pub fn dot(row: &[f64], coefficients: &[f64]) -> f64 {
    row.iter().zip(coefficients).map(|(x, b)| x * b).sum()
}

/// Invert a square matrix by Gauss-Jordan elimination with partial pivoting.
///
/// Returns `None` when, in some column, no candidate pivot at or below the
/// diagonal exceeds [`PIVOT_TOLERANCE`] in absolute value. A singular input is
/// an expected outcome (a constant or all-zero feature column produces one),
/// so it is reported as absence rather than as an error.
pub fn gauss_jordan_inverse(a: &Mat<f64>) -> Option<Mat<f64>> {
    let n = a.nrows();
    if n != a.ncols() {
        return None;
    }

    let mut m = a.clone();
    let mut inv = Mat::<f64>::identity(n, n);

    for col in 0..n {
        // Partial pivoting: largest magnitude at or below the diagonal.
        let mut pivot_row = col;
        for r in (col + 1)..n {
            if m[(r, col)].abs() > m[(pivot_row, col)].abs() {
                pivot_row = r;
            }
        }
        if m[(pivot_row, col)].abs() <= PIVOT_TOLERANCE {
            return None;
        }

        if pivot_row != col {
            swap_rows(&mut m, col, pivot_row);
            swap_rows(&mut inv, col, pivot_row);
        }

        let pivot = m[(col, col)];
        for c in 0..n {
            m[(col, c)] /= pivot;
            inv[(col, c)] /= pivot;
        }

        for r in 0..n {
            if r == col {
                continue;
            }
            let factor = m[(r, col)];
            if factor == 0.0 {
                continue;
            }
            for c in 0..n {
                m[(r, c)] -= factor * m[(col, c)];
                inv[(r, c)] -= factor * inv[(col, c)];
            }
        }
    }

    Some(inv)
}

fn swap_rows(m: &mut Mat<f64>, a: usize, b: usize) {
    for c in 0..m.ncols() {
        let tmp = m[(a, c)];
        m[(a, c)] = m[(b, c)];
        m[(b, c)] = tmp;
    }
}

/// Detect columns that are constant (zero variance).
pub fn detect_constant_columns(x: &Mat<f64>, tolerance: f64) -> Vec<bool> {
    let n_cols = x.ncols();
    let n_rows = x.nrows();

    if n_rows == 0 {
        return vec![true; n_cols];
    }

    let mut constant = vec![false; n_cols];

    for (j, flag) in constant.iter_mut().enumerate() {
        let first = x[(0, j)];
        *flag = (1..n_rows).all(|i| (x[(i, j)] - first).abs() < tolerance);
    }

    constant
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transpose() {
        let a = Mat::from_fn(2, 3, |i, j| (i * 3 + j) as f64);
        let t = transpose(&a);
        assert_eq!(t.nrows(), 3);
        assert_eq!(t.ncols(), 2);
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(a[(i, j)], t[(j, i)]);
            }
        }
    }

    #[test]
    fn test_mat_mul_and_vec_mul() {
        // [1 2; 3 4] · [5; 6] = [17; 39]
        let mut a = Mat::zeros(2, 2);
        a[(0, 0)] = 1.0;
        a[(0, 1)] = 2.0;
        a[(1, 0)] = 3.0;
        a[(1, 1)] = 4.0;
        let v = Col::from_fn(2, |i| (i + 5) as f64);

        let av = mat_vec_mul(&a, &v);
        assert!((av[0] - 17.0).abs() < 1e-12);
        assert!((av[1] - 39.0).abs() < 1e-12);

        let aa = mat_mul(&a, &a);
        assert!((aa[(0, 0)] - 7.0).abs() < 1e-12);
        assert!((aa[(0, 1)] - 10.0).abs() < 1e-12);
        assert!((aa[(1, 0)] - 15.0).abs() < 1e-12);
        assert!((aa[(1, 1)] - 22.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_requires_pivoting() {
        // Zero on the leading diagonal forces a row swap.
        let mut a = Mat::zeros(2, 2);
        a[(0, 1)] = 1.0;
        a[(1, 0)] = 2.0;

        let inv = gauss_jordan_inverse(&a).expect("matrix is invertible");
        assert!((inv[(0, 0)] - 0.0).abs() < 1e-12);
        assert!((inv[(0, 1)] - 0.5).abs() < 1e-12);
        assert!((inv[(1, 0)] - 1.0).abs() < 1e-12);
        assert!((inv[(1, 1)] - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_singular_zero_column() {
        let mut a = Mat::zeros(3, 3);
        a[(0, 0)] = 1.0;
        a[(1, 1)] = 1.0;
        // Column 2 entirely zero.
        assert!(gauss_jordan_inverse(&a).is_none());
    }

    #[test]
    fn test_inverse_non_square() {
        let a = Mat::<f64>::zeros(2, 3);
        assert!(gauss_jordan_inverse(&a).is_none());
    }

    #[test]
    fn test_dot() {
        assert!((dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]) - 32.0).abs() < 1e-12);
    }

    #[test]
    fn test_detect_constant_columns() {
        let mut x = Mat::zeros(5, 3);
        for i in 0..5 {
            x[(i, 0)] = 1.0;
            x[(i, 1)] = i as f64;
            x[(i, 2)] = 2.0;
        }

        let constant = detect_constant_columns(&x, 1e-10);
        assert!(constant[0]);
        assert!(!constant[1]);
        assert!(constant[2]);
    }

    #[test]
    fn test_detect_constant_columns_empty() {
        let x = Mat::<f64>::zeros(0, 3);
        let constant = detect_constant_columns(&x, 1e-10);
        assert_eq!(constant.len(), 3);
        assert!(constant.iter().all(|&c| c));
    }
}
