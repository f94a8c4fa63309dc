//! Dense two-dimensional `f64` buffers.
//!
//! Every combining operation checks shapes up front and returns a fresh
//! matrix; inputs are never aliased with outputs.

use rand::Rng;

/// Errors raised by shape-checked matrix operations.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MatrixError {
    #[display("invalid matrix dimensions {rows}x{cols} (both must be at least 1)")]
    InvalidDimensions { rows: usize, cols: usize },
    #[display("matrix dimension mismatch: {left_rows}x{left_cols} vs {right_rows}x{right_cols}")]
    DimensionMismatch {
        left_rows: usize,
        left_cols: usize,
        right_rows: usize,
        right_cols: usize,
    },
}

impl MatrixError {
    fn mismatch(left: &Matrix, right: &Matrix) -> Self {
        Self::DimensionMismatch {
            left_rows: left.rows,
            left_cols: left.cols,
            right_rows: right.rows,
            right_cols: right.cols,
        }
    }
}

/// A `rows × cols` matrix stored in row-major order.
///
/// The shape is fixed at construction; only the values can change.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl Matrix {
    /// Creates a zero-filled matrix.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::InvalidDimensions`] if `rows` or `cols` is zero.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self, MatrixError> {
        if rows == 0 || cols == 0 {
            return Err(MatrixError::InvalidDimensions { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            values: vec![0.0; rows * cols],
        })
    }

    /// Creates a matrix from row-major values.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::InvalidDimensions`] if either dimension is zero or
    /// `values.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, values: Vec<f64>) -> Result<Self, MatrixError> {
        if rows == 0 || cols == 0 || values.len() != rows * cols {
            return Err(MatrixError::InvalidDimensions { rows, cols });
        }
        Ok(Self { rows, cols, values })
    }

    /// Creates an `n × 1` column vector.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::InvalidDimensions`] if `values` is empty.
    pub fn column(values: &[f64]) -> Result<Self, MatrixError> {
        Self::from_vec(values.len(), 1, values.to_vec())
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns `true` if both matrices have the same shape.
    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    /// Returns the value at (`row`, `col`), or `None` if out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.index(row, col).map(|i| self.values[i])
    }

    /// Returns all values in row-major order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns all values in row-major order for in-place updates.
    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Returns the first column as a vector.
    #[must_use]
    pub fn to_column_vec(&self) -> Vec<f64> {
        (0..self.rows).filter_map(|row| self.get(row, 0)).collect()
    }

    /// Overwrites every entry with a value drawn uniformly from `[-1, 1)`.
    pub fn randomize<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for v in &mut self.values {
            *v = rng.random_range(-1.0..1.0);
        }
    }

    /// Computes the matrix product `self · rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::DimensionMismatch`] unless `self.cols() == rhs.rows()`.
    pub fn multiply(&self, rhs: &Self) -> Result<Self, MatrixError> {
        if self.cols != rhs.rows {
            return Err(MatrixError::mismatch(self, rhs));
        }
        let mut values = Vec::with_capacity(self.rows * rhs.cols);
        for i in 0..self.rows {
            let row = &self.values[i * self.cols..(i + 1) * self.cols];
            for j in 0..rhs.cols {
                let mut sum = 0.0;
                for (k, a) in row.iter().enumerate() {
                    sum += a * rhs.values[k * rhs.cols + j];
                }
                values.push(sum);
            }
        }
        Ok(Self {
            rows: self.rows,
            cols: rhs.cols,
            values,
        })
    }

    /// Computes the element-wise sum `self + rhs`.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::DimensionMismatch`] unless both shapes are identical.
    pub fn add(&self, rhs: &Self) -> Result<Self, MatrixError> {
        if !self.same_shape(rhs) {
            return Err(MatrixError::mismatch(self, rhs));
        }
        let values = self
            .values
            .iter()
            .zip(&rhs.values)
            .map(|(a, b)| a + b)
            .collect();
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            values,
        })
    }

    /// Applies `f` to every entry, returning a matrix of the same shape.
    #[must_use]
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        Self {
            rows: self.rows,
            cols: self.cols,
            values: self.values.iter().copied().map(f).collect(),
        }
    }

    /// Replaces entries with the corresponding entry of `donor` wherever `pick` returns `true`.
    ///
    /// `pick` is called exactly once per entry, in row-major order.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::DimensionMismatch`] unless both shapes are identical.
    pub fn inherit_from<F>(&mut self, donor: &Self, mut pick: F) -> Result<(), MatrixError>
    where
        F: FnMut() -> bool,
    {
        if !self.same_shape(donor) {
            return Err(MatrixError::mismatch(self, donor));
        }
        for (v, d) in self.values.iter_mut().zip(&donor.values) {
            if pick() {
                *v = *d;
            }
        }
        Ok(())
    }
}
