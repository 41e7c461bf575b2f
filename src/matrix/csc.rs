//! Column-compressed (CCS) storage

use std::fmt;

use crate::error::{Error, Result};

/// Column-compressed arrays of an `n_rows × n_cols` matrix
///
/// The mirror of [`SparseMatrixCSR`](super::SparseMatrixCSR): column `j`
/// owns `col_ptr[j]..col_ptr[j + 1]` of `row_idx` and `values`. A
/// [`Matrix`](crate::Matrix) keeps both so column-wise kernels never convert
/// on the fly.
#[derive(Clone, PartialEq)]
pub struct SparseMatrixCSC<T> {
    pub n_rows: usize,
    pub n_cols: usize,
    pub col_ptr: Vec<usize>,
    pub row_idx: Vec<usize>,
    pub values: Vec<T>,
}

impl<T> SparseMatrixCSC<T> {
    /// # Panics
    ///
    /// On inconsistent array lengths or a row index past `n_rows`.
    pub fn new(
        n_rows: usize,
        n_cols: usize,
        col_ptr: Vec<usize>,
        row_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Self {
        assert_eq!(col_ptr.len(), n_cols + 1, "expected one offset per column plus one");
        assert_eq!(row_idx.len(), values.len(), "index and value arrays differ in length");
        assert_eq!(col_ptr[n_cols], row_idx.len(), "last offset must equal nnz");
        if let Some(&row) = row_idx.iter().find(|&&row| row >= n_rows) {
            panic!("row index {} exceeds {} rows", row, n_rows);
        }

        Self {
            n_rows,
            n_cols,
            col_ptr,
            row_idx,
            values,
        }
    }

    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            col_ptr: vec![0; n_cols + 1],
            row_idx: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        const OP: &str = "SparseMatrixCSC::validate";
        if self.col_ptr.len() != self.n_cols + 1 {
            return Err(Error::Mismatch {
                op: OP,
                expected: self.n_cols + 1,
                got: self.col_ptr.len(),
            });
        }
        if self.col_ptr.windows(2).any(|w| w[1] < w[0]) {
            return Err(Error::illegal(OP, "column pointers decrease"));
        }
        match self.row_idx.iter().find(|&&row| row >= self.n_rows) {
            Some(&row) => Err(Error::IndexOutOfRange {
                index: row,
                size: self.n_rows,
            }),
            None => Ok(()),
        }
    }

    pub fn nnz(&self) -> usize {
        self.row_idx.len()
    }

    /// Row indices and values of column `j`
    #[inline]
    pub fn col(&self, j: usize) -> (&[usize], &[T]) {
        let span = self.col_ptr[j]..self.col_ptr[j + 1];
        (&self.row_idx[span.clone()], &self.values[span])
    }

    pub fn col_iter(&self, j: usize) -> impl Iterator<Item = (usize, &T)> {
        let (rows, vals) = self.col(j);
        rows.iter().copied().zip(vals)
    }
}

impl<T: fmt::Debug> fmt::Debug for SparseMatrixCSC<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CCS")
            .field("shape", &(self.n_rows, self.n_cols))
            .field("col_ptr", &self.col_ptr)
            .field("row_idx", &self.row_idx)
            .field("values", &self.values)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_are_slices_of_the_arrays() {
        //    [1 2 0]
        //    [0 3 0]
        //    [4 0 5]
        let a = SparseMatrixCSC::new(3, 3, vec![0, 2, 4, 5], vec![0, 2, 0, 1, 2], vec![1, 4, 2, 3, 5]);
        assert_eq!(a.nnz(), 5);
        assert!(a.validate().is_ok());
        assert_eq!(a.col_iter(0).collect::<Vec<_>>(), vec![(0, &1), (2, &4)]);
        assert_eq!(a.col(2), (&[2][..], &[5][..]));
    }

    #[test]
    fn test_validate_reports_out_of_range_rows() {
        let mut a = SparseMatrixCSC::<f32>::zeros(2, 1);
        a.col_ptr = vec![0, 1];
        a.row_idx = vec![2];
        a.values = vec![1.0];
        assert!(matches!(a.validate(), Err(Error::IndexOutOfRange { index: 2, size: 2 })));
    }

    #[test]
    #[should_panic(expected = "expected one offset per column plus one")]
    fn test_new_rejects_short_offsets() {
        SparseMatrixCSC::new(3, 3, vec![0, 2, 4], vec![0, 2, 0, 1, 2], vec![1, 4, 2, 3, 5]);
    }

    #[test]
    #[should_panic(expected = "row index 3 exceeds 3 rows")]
    fn test_new_rejects_out_of_range_row() {
        SparseMatrixCSC::new(3, 1, vec![0, 1], vec![3], vec![1]);
    }
}
