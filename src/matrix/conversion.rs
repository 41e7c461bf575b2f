//! Switching between the row- and column-compressed forms

use crate::matrix::{SparseMatrixCSC, SparseMatrixCSR};
use crate::utils::exclusive_scan;

/// Counting sort of compressed entries by their minor index
///
/// Walks the `outer` major slices in order, so every output slice lists its
/// entries by increasing major index. Returns the new offsets, the new minor
/// indices (the old major ones) and the values.
fn regroup<T: Clone>(
    outer: usize,
    inner: usize,
    ptr: &[usize],
    idx: &[usize],
    values: &[T],
) -> (Vec<usize>, Vec<usize>, Vec<T>) {
    let mut counts = vec![0; inner];
    for &k in idx {
        counts[k] += 1;
    }
    let offsets = exclusive_scan(&counts);

    let mut cursor = offsets.clone();
    let mut slots: Vec<Option<(usize, T)>> = vec![None; idx.len()];
    for major in 0..outer {
        for pos in ptr[major]..ptr[major + 1] {
            let minor = idx[pos];
            slots[cursor[minor]] = Some((major, values[pos].clone()));
            cursor[minor] += 1;
        }
    }
    let (majors, vals) = slots.into_iter().flatten().unzip();
    (offsets, majors, vals)
}

impl<T: Clone> SparseMatrixCSR<T> {
    pub fn to_csc(&self) -> SparseMatrixCSC<T> {
        let (col_ptr, row_idx, values) =
            regroup(self.n_rows, self.n_cols, &self.row_ptr, &self.col_idx, &self.values);
        SparseMatrixCSC {
            n_rows: self.n_rows,
            n_cols: self.n_cols,
            col_ptr,
            row_idx,
            values,
        }
    }

    /// `Aᵀ` in row-compressed form, i.e. the column-compressed arrays of `A`
    pub fn transpose(&self) -> SparseMatrixCSR<T> {
        let csc = self.to_csc();
        SparseMatrixCSR {
            n_rows: self.n_cols,
            n_cols: self.n_rows,
            row_ptr: csc.col_ptr,
            col_idx: csc.row_idx,
            values: csc.values,
        }
    }
}

impl<T: Clone> SparseMatrixCSC<T> {
    pub fn to_csr(&self) -> SparseMatrixCSR<T> {
        let (row_ptr, col_idx, values) =
            regroup(self.n_cols, self.n_rows, &self.col_ptr, &self.row_idx, &self.values);
        SparseMatrixCSR {
            n_rows: self.n_rows,
            n_cols: self.n_cols,
            row_ptr,
            col_idx,
            values,
        }
    }
}
