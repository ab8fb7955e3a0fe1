//! Linear algebra utilities.

mod matrix;

pub use matrix::{
    detect_constant_columns, dot, gauss_jordan_inverse, mat_mul, mat_vec_mul, transpose,
    PIVOT_TOLERANCE,
};
