//! Dense and CSR (Compressed Sparse Row) matrix views
//!
//! Based on `GraphBLAST` (Yang et al., ACM `ToMS` 2022) sparse layouts.
//!
//! # CSR Format
//!
//! ```text
//! Edges: A → B (2.0), A → C (1.0), B → C (4.0)
//!
//! CSR (row = source):
//!   row_offsets: [0, 2, 3, 3]  // Row A: [0..2), row B: [2..3), row C: [3..3)
//!   col_indices: [1, 2, 2]
//!   values:      [2.0, 1.0, 4.0]
//! ```

use crate::error::RankError;

/// Row-major dense matrix of `f64`
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl DenseMatrix {
    /// Create a `rows × cols` matrix of zeros
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Create a square `n × n` matrix of zeros
    #[must_use]
    pub fn square(n: usize) -> Self {
        Self::zeros(n, n)
    }

    /// Build from nested rows
    ///
    /// # Errors
    ///
    /// Returns [`RankError::RaggedMatrix`] if rows differ in length
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, RankError> {
        let num_rows = rows.len();
        let num_cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(num_rows * num_cols);

        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != num_cols {
                return Err(RankError::RaggedMatrix {
                    row,
                    expected: num_cols,
                    found: values.len(),
                });
            }
            data.extend(values);
        }

        Ok(Self {
            rows: num_rows,
            cols: num_cols,
            data,
        })
    }

    /// Number of rows
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Entry at `(row, col)`, zero when out of bounds
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row < self.rows && col < self.cols {
            self.data[row * self.cols + col]
        } else {
            0.0
        }
    }

    /// Overwrite entry at `(row, col)`; out-of-bounds writes are ignored
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        if row < self.rows && col < self.cols {
            self.data[row * self.cols + col] = value;
        }
    }

    /// Borrow one row
    #[must_use]
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Copy one column
    #[must_use]
    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.rows).map(|row| self.get(row, col)).collect()
    }

    /// Sum of each row
    #[must_use]
    pub fn row_sums(&self) -> Vec<f64> {
        (0..self.rows).map(|row| self.row(row).iter().sum()).collect()
    }

    /// Sum of each column
    #[must_use]
    pub fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.cols];
        for row in 0..self.rows {
            for (sum, value) in sums.iter_mut().zip(self.row(row)) {
                *sum += value;
            }
        }
        sums
    }

    /// Transposed copy
    #[must_use]
    pub fn transpose(&self) -> Self {
        let mut out = Self::zeros(self.cols, self.rows);
        for row in 0..self.rows {
            for col in 0..self.cols {
                out.data[col * self.rows + row] = self.data[row * self.cols + col];
            }
        }
        out
    }

    /// Element-wise product
    ///
    /// # Errors
    ///
    /// Returns [`RankError::DimensionMismatch`] if shapes differ
    pub fn hadamard(&self, other: &Self) -> Result<Self, RankError> {
        if self.shape() != other.shape() {
            return Err(RankError::DimensionMismatch {
                what: "element-wise product",
                expected: format!("{}x{}", self.rows, self.cols),
                found: format!("{}x{}", other.rows, other.cols),
            });
        }

        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| a * b)
                .collect(),
        })
    }

    /// `out = self @ x`
    ///
    /// # Errors
    ///
    /// Returns [`RankError::DimensionMismatch`] if `x` or `out` has the wrong length
    pub fn mul_vec(&self, x: &[f64], out: &mut [f64]) -> Result<(), RankError> {
        if x.len() != self.cols {
            return Err(RankError::length("dense mat-vec operand", self.cols, x.len()));
        }
        if out.len() != self.rows {
            return Err(RankError::length("dense mat-vec output", self.rows, out.len()));
        }

        for (row, slot) in out.iter_mut().enumerate() {
            *slot = self.row(row).iter().zip(x).map(|(a, b)| a * b).sum();
        }
        Ok(())
    }
}

/// CSR (Compressed Sparse Row) matrix
///
/// Column indices are sorted within each row, so point lookups are a binary search.
///
/// # Example
///
/// ```
/// use fraudrank::CsrMatrix;
///
/// let m = CsrMatrix::from_triplets(3, 3, &[(0, 1, 2.0), (0, 2, 1.0), (1, 2, 4.0)]);
/// assert_eq!(m.nnz(), 3);
/// assert_eq!(m.get(0, 1), 2.0);
/// assert_eq!(m.column_sums(), vec![0.0, 2.0, 5.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    /// Row i's entries live at `row_offsets[i]..row_offsets[i + 1]`
    /// Length: `num_rows` + 1
    row_offsets: Vec<usize>,

    /// Column index per stored entry
    /// Length: `nnz`
    col_indices: Vec<usize>,

    /// Stored values
    /// Length: `nnz`
    values: Vec<f64>,

    num_rows: usize,
    num_cols: usize,
}

impl CsrMatrix {
    /// Empty `rows × cols` matrix
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            row_offsets: vec![0; rows + 1],
            col_indices: Vec::new(),
            values: Vec::new(),
            num_rows: rows,
            num_cols: cols,
        }
    }

    /// Build from `(row, col, value)` triplets
    ///
    /// Duplicate coordinates are summed. Triplets outside the shape are dropped.
    #[must_use]
    pub fn from_triplets(rows: usize, cols: usize, triplets: &[(usize, usize, f64)]) -> Self {
        let mut sorted: Vec<(usize, usize, f64)> = triplets
            .iter()
            .copied()
            .filter(|&(r, c, _)| r < rows && c < cols)
            .collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut row_offsets = Vec::with_capacity(rows + 1);
        let mut col_indices: Vec<usize> = Vec::with_capacity(sorted.len());
        let mut values: Vec<f64> = Vec::with_capacity(sorted.len());
        let mut row_of_entry: Vec<usize> = Vec::with_capacity(sorted.len());

        for (r, c, v) in sorted {
            // Merge duplicates (same row, same column as the previous entry)
            if row_of_entry.last() == Some(&r) && col_indices.last() == Some(&c) {
                if let Some(last) = values.last_mut() {
                    *last += v;
                }
                continue;
            }
            row_of_entry.push(r);
            col_indices.push(c);
            values.push(v);
        }

        row_offsets.push(0);
        let mut cursor = 0;
        for row in 0..rows {
            while cursor < row_of_entry.len() && row_of_entry[cursor] == row {
                cursor += 1;
            }
            row_offsets.push(cursor);
        }

        Self {
            row_offsets,
            col_indices,
            values,
            num_rows: rows,
            num_cols: cols,
        }
    }

    /// Sparse copy of a dense matrix (exact zeros are not stored)
    #[must_use]
    pub fn from_dense(dense: &DenseMatrix) -> Self {
        let mut triplets = Vec::new();
        for row in 0..dense.rows() {
            for (col, &value) in dense.row(row).iter().enumerate() {
                if value != 0.0 {
                    triplets.push((row, col, value));
                }
            }
        }
        Self::from_triplets(dense.rows(), dense.cols(), &triplets)
    }

    /// Number of rows
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.num_cols
    }

    /// `(rows, cols)`
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.num_rows, self.num_cols)
    }

    /// Number of stored entries
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Column indices and values of one row
    #[must_use]
    pub fn row(&self, row: usize) -> (&[usize], &[f64]) {
        let start = self.row_offsets[row];
        let end = self.row_offsets[row + 1];
        (&self.col_indices[start..end], &self.values[start..end])
    }

    /// Entry at `(row, col)`, zero if not stored
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row >= self.num_rows {
            return 0.0;
        }
        let (cols, values) = self.row(row);
        cols.binary_search(&col).map_or(0.0, |pos| values[pos])
    }

    /// Transposed copy
    #[must_use]
    pub fn transpose(&self) -> Self {
        let mut triplets = Vec::with_capacity(self.nnz());
        for row in 0..self.num_rows {
            let (cols, values) = self.row(row);
            for (&col, &value) in cols.iter().zip(values) {
                triplets.push((col, row, value));
            }
        }
        Self::from_triplets(self.num_cols, self.num_rows, &triplets)
    }

    /// Element-wise product, keeping the sparsity pattern of `self`
    ///
    /// # Errors
    ///
    /// Returns [`RankError::DimensionMismatch`] if shapes differ
    pub fn hadamard(&self, other: &Self) -> Result<Self, RankError> {
        if self.shape() != other.shape() {
            return Err(RankError::DimensionMismatch {
                what: "element-wise product",
                expected: format!("{}x{}", self.num_rows, self.num_cols),
                found: format!("{}x{}", other.num_rows, other.num_cols),
            });
        }

        let mut out = self.clone();
        for row in 0..self.num_rows {
            let start = self.row_offsets[row];
            let end = self.row_offsets[row + 1];
            for idx in start..end {
                out.values[idx] *= other.get(row, self.col_indices[idx]);
            }
        }
        Ok(out)
    }

    /// `out = self @ x` in a single pass over the stored entries
    ///
    /// # Errors
    ///
    /// Returns [`RankError::DimensionMismatch`] if `x` or `out` has the wrong length
    pub fn mul_vec(&self, x: &[f64], out: &mut [f64]) -> Result<(), RankError> {
        if x.len() != self.num_cols {
            return Err(RankError::length("sparse mat-vec operand", self.num_cols, x.len()));
        }
        if out.len() != self.num_rows {
            return Err(RankError::length("sparse mat-vec output", self.num_rows, out.len()));
        }

        for (row, slot) in out.iter_mut().enumerate() {
            let (cols, values) = self.row(row);
            *slot = cols.iter().zip(values).map(|(&c, &v)| v * x[c]).sum();
        }
        Ok(())
    }

    /// Sum of each row
    #[must_use]
    pub fn row_sums(&self) -> Vec<f64> {
        (0..self.num_rows)
            .map(|row| self.row(row).1.iter().sum())
            .collect()
    }

    /// Sum of each column
    #[must_use]
    pub fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.num_cols];
        for (&col, &value) in self.col_indices.iter().zip(&self.values) {
            sums[col] += value;
        }
        sums
    }

    /// Dense copy
    #[must_use]
    pub fn to_dense(&self) -> DenseMatrix {
        let mut dense = DenseMatrix::zeros(self.num_rows, self.num_cols);
        for row in 0..self.num_rows {
            let (cols, values) = self.row(row);
            for (&col, &value) in cols.iter().zip(values) {
                dense.set(row, col, value);
            }
        }
        dense
    }

    /// Raw CSR components `(row_offsets, col_indices, values)`
    #[must_use]
    pub fn csr_components(&self) -> (&[usize], &[usize], &[f64]) {
        (&self.row_offsets, &self.col_indices, &self.values)
    }
}

/// Scale non-negative finite weights to sum 1 in place
///
/// Divides by the largest weight before summing, so totals beyond `f64::MAX` cannot
/// overflow. Returns `false` and leaves `weights` untouched when there is no positive mass.
pub(crate) fn normalize_weights(weights: &mut [f64]) -> bool {
    let max = weights.iter().copied().fold(0.0_f64, f64::max);
    if !(max > 0.0 && max.is_finite()) {
        return false;
    }

    for w in weights.iter_mut() {
        *w /= max;
    }
    // At least 1.0: the largest entry is now exactly 1
    let total: f64 = weights.iter().sum();
    for w in weights.iter_mut() {
        *w /= total;
    }
    true
}
