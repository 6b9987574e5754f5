//! Small dense matrix used for the odometry transforms

use crate::error::{LocalizationError, Result};
use nalgebra::DMatrix;

/// A dense, zero-initialized real matrix
///
/// Indexing out of range panics, the same as slice indexing. Multiplication
/// checks its shapes and reports [`LocalizationError::DimensionMismatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: DMatrix<f64>,
}

impl Matrix {
    /// Create a `rows` x `cols` matrix of zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Matrix {
            data: DMatrix::zeros(rows, cols),
        }
    }

    /// Create a column vector from `values`
    pub fn column(values: &[f64]) -> Self {
        Matrix {
            data: DMatrix::from_column_slice(values.len(), 1, values),
        }
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[(row, col)] = value;
    }

    /// Multiply `self * other`
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols() != other.rows() {
            return Err(LocalizationError::DimensionMismatch {
                lhs_rows: self.rows(),
                lhs_cols: self.cols(),
                rhs_rows: other.rows(),
                rhs_cols: other.cols(),
            });
        }
        Ok(Matrix {
            data: &self.data * &other.data,
        })
    }
}
