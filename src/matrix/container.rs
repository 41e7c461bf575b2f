//! The double-indexed sparse matrix container

use std::fmt;

use crate::error::{Error, Result};
use crate::matrix::view::{Diagonal, Transposed};
use crate::matrix::{SparseMatrixCSC, SparseMatrixCSR};
use crate::types::Scalar;
use crate::vector::{next_id, Vector};

/// A sparse `m × n` matrix stored in both CSR and CSC form
///
/// The CSC form is derived from the CSR form whenever the contents are
/// (re)built, so row-wise and column-wise traversal are both available
/// without conversion at call time. A `Matrix<()>` is a pattern matrix.
pub struct Matrix<T> {
    id: usize,
    capacity: usize,
    crs: SparseMatrixCSR<T>,
    ccs: SparseMatrixCSC<T>,
}

impl<T: Scalar> Matrix<T> {
    /// Creates an empty `m × n` matrix with zero capacity
    pub fn new(m: usize, n: usize) -> Self {
        Self {
            id: next_id(),
            capacity: 0,
            crs: SparseMatrixCSR::zeros(m, n),
            ccs: SparseMatrixCSC::zeros(m, n),
        }
    }

    /// Creates an empty `m × n` matrix with room for `capacity` nonzeroes
    pub fn with_capacity(m: usize, n: usize, capacity: usize) -> Result<Self> {
        let mut matrix = Self::new(m, n);
        matrix.resize(capacity)?;
        Ok(matrix)
    }

    /// Wraps existing CSR storage, deriving the CSC form
    ///
    /// Fails if the CSR arrays violate their invariants.
    pub fn from_csr(crs: SparseMatrixCSR<T>) -> Result<Self> {
        crs.validate()?;
        let ccs = crs.to_csc();
        Ok(Self {
            id: next_id(),
            capacity: crs.nnz(),
            crs,
            ccs,
        })
    }

    /// A square matrix holding the entries of `diag` on its diagonal
    pub fn from_diagonal(diag: &Vector<T>) -> Self {
        let n = diag.size();
        let mut row_ptr = Vec::with_capacity(n + 1);
        let mut col_idx = Vec::with_capacity(diag.nnz());
        let mut values = Vec::with_capacity(diag.nnz());
        row_ptr.push(0);
        for i in 0..n {
            if let Some(v) = diag.get(i) {
                col_idx.push(i);
                values.push(v.clone());
            }
            row_ptr.push(col_idx.len());
        }
        let crs = SparseMatrixCSR {
            n_rows: n,
            n_cols: n,
            row_ptr,
            col_idx,
            values,
        };
        let ccs = crs.to_csc();
        Self {
            id: next_id(),
            capacity: crs.nnz(),
            crs,
            ccs,
        }
    }

    /// Number of rows
    #[inline]
    pub fn nrows(&self) -> usize {
        self.crs.n_rows
    }

    /// Number of columns
    #[inline]
    pub fn ncols(&self) -> usize {
        self.crs.n_cols
    }

    /// Number of stored nonzeroes
    #[inline]
    pub fn nnz(&self) -> usize {
        self.crs.nnz()
    }

    /// Number of nonzeroes the matrix can hold without reallocating
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The unique identifier of this matrix
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Removes all nonzeroes
    pub fn clear(&mut self) {
        self.crs.row_ptr.iter_mut().for_each(|p| *p = 0);
        self.crs.col_idx.clear();
        self.crs.values.clear();
        self.ccs.col_ptr.iter_mut().for_each(|p| *p = 0);
        self.ccs.row_idx.clear();
        self.ccs.values.clear();
    }

    /// Ensures storage for at least `capacity` nonzeroes
    ///
    /// The logical contents are unchanged. Fails with [`Error::OutOfMem`] if
    /// the storage cannot be reserved.
    pub fn resize(&mut self, capacity: usize) -> Result<()> {
        let max = self.nrows().saturating_mul(self.ncols());
        let capacity = capacity.min(max);
        if capacity <= self.capacity {
            return Ok(());
        }
        let additional = capacity - self.nnz();
        self.crs
            .col_idx
            .try_reserve(additional)
            .and_then(|_| self.crs.values.try_reserve(additional))
            .and_then(|_| self.ccs.row_idx.try_reserve(additional))
            .and_then(|_| self.ccs.values.try_reserve(additional))
            .map_err(|_| Error::OutOfMem {
                requested: capacity,
            })?;
        self.capacity = capacity;
        Ok(())
    }

    /// Column indices and values of row `i`, sorted by column
    #[inline]
    pub fn row(&self, i: usize) -> (&[usize], &[T]) {
        self.crs.row(i)
    }

    /// Row indices and values of column `j`, sorted by row
    #[inline]
    pub fn col(&self, j: usize) -> (&[usize], &[T]) {
        self.ccs.col(j)
    }

    /// Iterates over `(row, col, value)` triplets in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> + '_ {
        self.crs.triplets()
    }

    /// The CSR form
    pub fn csr(&self) -> &SparseMatrixCSR<T> {
        &self.crs
    }

    /// The CSC form
    pub fn csc(&self) -> &SparseMatrixCSC<T> {
        &self.ccs
    }

    /// A logical transpose that shares this matrix's storage
    pub fn transpose(&self) -> Transposed<'_, Self> {
        Transposed::new(self)
    }

    /// The diagonal `(i, i)` entries as a one-dimensional view
    pub fn diagonal(&self) -> Diagonal<'_, T> {
        Diagonal::new(self)
    }

    /// Replaces the contents with `crs`, rebuilding the CSC form
    pub(crate) fn replace(&mut self, crs: SparseMatrixCSR<T>) {
        debug_assert_eq!(crs.n_rows, self.nrows());
        debug_assert_eq!(crs.n_cols, self.ncols());
        self.ccs = crs.to_csc();
        self.capacity = self.capacity.max(crs.nnz());
        self.crs = crs;
    }
}

impl Matrix<()> {
    /// Converts a pattern matrix into a valued matrix holding `value` at every nonzero
    pub fn with_values<T: Scalar>(&self, value: T) -> Matrix<T> {
        let crs = SparseMatrixCSR {
            n_rows: self.crs.n_rows,
            n_cols: self.crs.n_cols,
            row_ptr: self.crs.row_ptr.clone(),
            col_idx: self.crs.col_idx.clone(),
            values: vec![value; self.nnz()],
        };
        let ccs = crs.to_csc();
        Matrix {
            id: next_id(),
            capacity: crs.nnz(),
            crs,
            ccs,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("id", &self.id)
            .field("capacity", &self.capacity)
            .field("crs", &self.crs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_matrix_is_empty() {
        let a = Matrix::<f64>::new(3, 4);
        assert_eq!(a.nrows(), 3);
        assert_eq!(a.ncols(), 4);
        assert_eq!(a.nnz(), 0);
        assert_eq!(a.capacity(), 0);
    }

    #[test]
    fn test_resize_keeps_contents() {
        let diag = Vector::from_dense(vec![1, 2, 3]);
        let mut a = Matrix::from_diagonal(&diag);
        a.resize(7).unwrap();
        assert_eq!(a.capacity(), 7);
        assert_eq!(a.nnz(), 3);

        // Capacity beyond m·n is clamped
        a.resize(100).unwrap();
        assert_eq!(a.capacity(), 9);
    }

    #[test]
    fn test_from_diagonal_sparse() {
        let mut diag = Vector::new(4);
        diag.set_element(1, 5).unwrap();
        diag.set_element(3, 7).unwrap();
        let a = Matrix::from_diagonal(&diag);
        let entries: Vec<_> = a.iter().map(|(i, j, &v)| (i, j, v)).collect();
        assert_eq!(entries, vec![(1, 1, 5), (3, 3, 7)]);
        assert_eq!(a.col(3), (&[3usize][..], &[7][..]));
    }

    #[test]
    fn test_clear() {
        let mut a = Matrix::from_diagonal(&Vector::from_dense(vec![1.0, 2.0]));
        a.clear();
        assert_eq!(a.nnz(), 0);
        assert_eq!(a.row(1).0.len(), 0);
        assert_eq!(a.col(0).0.len(), 0);
    }

    #[test]
    fn test_pattern_with_values() {
        let crs = SparseMatrixCSR::new(2, 2, vec![0, 1, 2], vec![1, 0], vec![(), ()]);
        let pattern = Matrix::from_csr(crs).unwrap();
        let valued = pattern.with_values(1.5f64);
        assert_eq!(valued.row(0), (&[1usize][..], &[1.5][..]));
    }
}
