//! Logical views over sparse matrices
//!
//! Views never copy storage: a [`Transposed`] view answers row queries with
//! the columns of the matrix underneath, and a [`Diagonal`] view narrows a
//! matrix to its `(i, i)` entries.

use crate::matrix::{Matrix, SparseMatrixCSR};
use crate::types::Scalar;
use crate::vector::Vector;

/// Read access to a sparse matrix, its rows and its columns
///
/// Rows and columns come back as sorted index slices with matching values.
pub trait SparseView<T> {
    /// Number of rows
    fn nrows(&self) -> usize;
    /// Number of columns
    fn ncols(&self) -> usize;
    /// Number of nonzeroes
    fn nnz(&self) -> usize;
    /// Column indices and values of row `i`
    fn row(&self, i: usize) -> (&[usize], &[T]);
    /// Row indices and values of column `j`
    fn col(&self, j: usize) -> (&[usize], &[T]);
}

impl<T: Scalar> SparseView<T> for Matrix<T> {
    fn nrows(&self) -> usize {
        Matrix::nrows(self)
    }

    fn ncols(&self) -> usize {
        Matrix::ncols(self)
    }

    fn nnz(&self) -> usize {
        Matrix::nnz(self)
    }

    fn row(&self, i: usize) -> (&[usize], &[T]) {
        Matrix::row(self, i)
    }

    fn col(&self, j: usize) -> (&[usize], &[T]) {
        Matrix::col(self, j)
    }
}

/// The transpose of a matrix or view, sharing its storage
pub struct Transposed<'a, M: ?Sized> {
    inner: &'a M,
}

impl<'a, M: ?Sized> Clone for Transposed<'a, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, M: ?Sized> Copy for Transposed<'a, M> {}

impl<'a, M: ?Sized> Transposed<'a, M> {
    /// Wraps `inner`
    pub fn new(inner: &'a M) -> Self {
        Self { inner }
    }

    /// The view underneath
    pub fn inner(&self) -> &'a M {
        self.inner
    }

    /// Transposes again
    pub fn transpose(&self) -> Transposed<'_, Self> {
        Transposed::new(self)
    }
}

impl<'a, T, M: SparseView<T> + ?Sized> SparseView<T> for Transposed<'a, M> {
    fn nrows(&self) -> usize {
        self.inner.ncols()
    }

    fn ncols(&self) -> usize {
        self.inner.nrows()
    }

    fn nnz(&self) -> usize {
        self.inner.nnz()
    }

    fn row(&self, i: usize) -> (&[usize], &[T]) {
        self.inner.col(i)
    }

    fn col(&self, j: usize) -> (&[usize], &[T]) {
        self.inner.row(j)
    }
}

/// Copies any view into a new matrix
pub fn materialize<T: Scalar, M: SparseView<T> + ?Sized>(view: &M) -> Matrix<T> {
    let (m, n) = (view.nrows(), view.ncols());
    let mut row_ptr = Vec::with_capacity(m + 1);
    let mut col_idx = Vec::with_capacity(view.nnz());
    let mut values = Vec::with_capacity(view.nnz());
    row_ptr.push(0);
    for i in 0..m {
        let (cols, vals) = view.row(i);
        col_idx.extend_from_slice(cols);
        values.extend_from_slice(vals);
        row_ptr.push(col_idx.len());
    }
    let mut out = Matrix::new(m, n);
    out.replace(SparseMatrixCSR {
        n_rows: m,
        n_cols: n,
        row_ptr,
        col_idx,
        values,
    });
    out
}

/// The diagonal of a matrix as a one-dimensional container of length `min(m, n)`
pub struct Diagonal<'a, T> {
    matrix: &'a Matrix<T>,
}

impl<'a, T: Scalar> Diagonal<'a, T> {
    /// Views the diagonal of `matrix`
    pub fn new(matrix: &'a Matrix<T>) -> Self {
        Self { matrix }
    }

    /// Length of the diagonal
    pub fn size(&self) -> usize {
        self.matrix.nrows().min(self.matrix.ncols())
    }

    /// The entry `(i, i)`, if stored
    pub fn get(&self, i: usize) -> Option<&'a T> {
        if i >= self.size() {
            return None;
        }
        let (cols, vals) = self.matrix.row(i);
        cols.binary_search(&i).ok().map(|k| &vals[k])
    }

    /// Iterates over the stored diagonal entries in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a T)> + '_ {
        (0..self.size()).filter_map(move |i| self.get(i).map(|v| (i, v)))
    }

    /// Number of stored diagonal entries
    pub fn nnz(&self) -> usize {
        self.iter().count()
    }

    /// Copies the diagonal into a vector
    pub fn to_vector(&self) -> Vector<T> {
        let mut out = Vector::new(self.size());
        for (i, v) in self.iter() {
            out.insert_unchecked(i, v.clone());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Matrix<i32> {
        // [1 0 2]
        // [0 3 0]
        Matrix::from_csr(SparseMatrixCSR::new(
            2,
            3,
            vec![0, 2, 3],
            vec![0, 2, 1],
            vec![1, 2, 3],
        ))
        .unwrap()
    }

    #[test]
    fn test_transposed_dimensions() {
        let a = sample();
        let t = a.transpose();
        assert_eq!(SparseView::nrows(&t), 3);
        assert_eq!(SparseView::ncols(&t), 2);
        assert_eq!(t.row(2), (&[0usize][..], &[2][..]));
        assert_eq!(t.col(0), (&[0usize, 2][..], &[1, 2][..]));
    }

    #[test]
    fn test_double_transpose_is_identity() {
        let a = sample();
        let t = a.transpose();
        let tt = t.transpose();
        let back = materialize(&tt);
        assert_eq!(back.csr(), a.csr());
    }

    #[test]
    fn test_diagonal_view() {
        let a = sample();
        let d = a.diagonal();
        assert_eq!(d.size(), 2);
        assert_eq!(d.get(0), Some(&1));
        assert_eq!(d.get(1), Some(&3));
        assert_eq!(d.nnz(), 2);
        assert_eq!(d.to_vector().to_sorted_pairs(), vec![(0, 1), (1, 3)]);
    }
}
