//! Row-compressed (CRS) storage

use std::fmt;

use crate::error::{Error, Result};

/// Row-compressed arrays of an `n_rows × n_cols` matrix
///
/// Row `i` owns the half-open range `row_ptr[i]..row_ptr[i + 1]` of
/// `col_idx` and `values`; its column indices are strictly increasing.
#[derive(Clone, PartialEq)]
pub struct SparseMatrixCSR<T> {
    pub n_rows: usize,
    pub n_cols: usize,
    /// `n_rows + 1` offsets, ending at `nnz`
    pub row_ptr: Vec<usize>,
    pub col_idx: Vec<usize>,
    pub values: Vec<T>,
}

impl<T> SparseMatrixCSR<T> {
    /// Wraps already-compressed arrays
    ///
    /// # Panics
    ///
    /// When the offsets do not cover exactly `col_idx`, when index and value
    /// arrays differ in length, or when [`validate`](Self::validate) fails.
    pub fn new(
        n_rows: usize,
        n_cols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Self {
        assert_eq!(row_ptr.len(), n_rows + 1, "expected one offset per row plus one");
        assert_eq!(col_idx.len(), values.len(), "index and value arrays differ in length");
        assert_eq!(row_ptr[n_rows], col_idx.len(), "last offset must equal nnz");

        let matrix = Self {
            n_rows,
            n_cols,
            row_ptr,
            col_idx,
            values,
        };
        if let Err(err) = matrix.validate() {
            panic!("{}", err);
        }
        matrix
    }

    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            row_ptr: vec![0; n_rows + 1],
            col_idx: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Checks offsets, index bounds and per-row ordering
    pub fn validate(&self) -> Result<()> {
        const OP: &str = "SparseMatrixCSR::validate";
        if self.row_ptr.len() != self.n_rows + 1 {
            return Err(Error::Mismatch {
                op: OP,
                expected: self.n_rows + 1,
                got: self.row_ptr.len(),
            });
        }
        for (i, span) in self.row_ptr.windows(2).enumerate() {
            if span[1] < span[0] || span[1] > self.col_idx.len() {
                return Err(Error::illegal(OP, format!("row pointer out of order at row {}", i)));
            }
            let cols = &self.col_idx[span[0]..span[1]];
            if let Some(&col) = cols.iter().find(|&&col| col >= self.n_cols) {
                return Err(Error::IndexOutOfRange {
                    index: col,
                    size: self.n_cols,
                });
            }
            if cols.windows(2).any(|w| w[0] >= w[1]) {
                return Err(Error::illegal(
                    OP,
                    format!("columns of row {} are not strictly increasing", i),
                ));
            }
        }
        Ok(())
    }

    pub fn nnz(&self) -> usize {
        self.col_idx.len()
    }

    /// Column indices and values of row `i`
    #[inline]
    pub fn row(&self, i: usize) -> (&[usize], &[T]) {
        let span = self.row_ptr[i]..self.row_ptr[i + 1];
        (&self.col_idx[span.clone()], &self.values[span])
    }

    /// `(col, value)` pairs of row `i`
    pub fn row_iter(&self, i: usize) -> impl Iterator<Item = (usize, &T)> {
        let (cols, vals) = self.row(i);
        cols.iter().copied().zip(vals)
    }

    /// Every `(row, col, value)` in row-major order
    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, &T)> + '_ {
        (0..self.n_rows).flat_map(move |i| self.row_iter(i).map(move |(j, v)| (i, j, v)))
    }
}

impl<T: fmt::Debug> fmt::Debug for SparseMatrixCSR<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SHOWN: usize = 8;
        write!(f, "CRS {}x{} nnz={} [", self.n_rows, self.n_cols, self.nnz())?;
        for (k, (i, j, v)) in self.triplets().take(SHOWN).enumerate() {
            if k > 0 {
                write!(f, ", ")?;
            }
            write!(f, "({}, {}): {:?}", i, j, v)?;
        }
        if self.nnz() > SHOWN {
            write!(f, ", ..")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    //    [1 2 0]
    //    [0 3 0]
    //    [4 0 5]
    fn sample() -> SparseMatrixCSR<i32> {
        SparseMatrixCSR::new(3, 3, vec![0, 2, 3, 5], vec![0, 1, 1, 0, 2], vec![1, 2, 3, 4, 5])
    }

    #[test]
    fn test_rows_are_slices_of_the_arrays() {
        let a = sample();
        assert_eq!(a.nnz(), 5);
        assert_eq!(a.row(0), (&[0, 1][..], &[1, 2][..]));
        assert_eq!(a.row_iter(1).collect::<Vec<_>>(), vec![(1, &3)]);
        assert_eq!(a.row(2).1, &[4, 5]);
    }

    #[test]
    fn test_triplets_row_major() {
        let a = SparseMatrixCSR::new(2, 3, vec![0, 1, 3], vec![2, 0, 1], vec!['a', 'b', 'c']);
        let triplets: Vec<_> = a.triplets().map(|(i, j, &v)| (i, j, v)).collect();
        assert_eq!(triplets, vec![(0, 2, 'a'), (1, 0, 'b'), (1, 1, 'c')]);
    }

    #[test]
    fn test_zeros_has_empty_rows() {
        let z = SparseMatrixCSR::<u8>::zeros(4, 2);
        assert_eq!(z.row_ptr, vec![0; 5]);
        assert!(z.validate().is_ok());
        assert_eq!(z.triplets().count(), 0);
    }

    #[test]
    fn test_validate_rejects_bad_structure() {
        let mut a = sample();
        a.col_idx.swap(0, 1);
        assert!(matches!(a.validate(), Err(Error::Illegal { .. })));

        let mut b = sample();
        b.col_idx[4] = 3;
        assert!(matches!(b.validate(), Err(Error::IndexOutOfRange { index: 3, size: 3 })));
    }

    #[test]
    fn test_debug_is_compact() {
        let shown = format!("{:?}", sample());
        assert!(shown.starts_with("CRS 3x3 nnz=5 [(0, 0): 1"));
        assert!(!shown.contains(".."));
    }

    #[test]
    #[should_panic(expected = "expected one offset per row plus one")]
    fn test_new_rejects_short_offsets() {
        SparseMatrixCSR::new(3, 3, vec![0, 2, 3], vec![0, 1, 1, 0, 2], vec![1, 2, 3, 4, 5]);
    }

    #[test]
    #[should_panic(expected = "index and value arrays differ in length")]
    fn test_new_rejects_missing_values() {
        SparseMatrixCSR::new(3, 3, vec![0, 2, 3, 5], vec![0, 1, 1, 0, 2], vec![1, 2, 3, 4]);
    }
}
