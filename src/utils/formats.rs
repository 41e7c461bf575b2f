//! Utilities for converting between our containers and external libraries

use ndarray::Array2;
use sprs::CsMat;

use crate::error::{Error, Result};
use crate::matrix::{Matrix, SparseMatrixCSR, SparseView};
use crate::types::Scalar;
use crate::vector::Vector;

/// Converts a matrix to sprs CsMat format (as CSR)
pub fn to_sprs_csr<T: Scalar>(matrix: &Matrix<T>) -> Result<CsMat<T>> {
    let csr = matrix.csr();
    CsMat::try_new(
        (csr.n_rows, csr.n_cols),
        csr.row_ptr.clone(),
        csr.col_idx.clone(),
        csr.values.clone(),
    )
    .map_err(|_| Error::illegal("to_sprs_csr", "sprs rejected the CSR structure"))
}

/// Converts an sprs CsMat in either storage order into a matrix
pub fn from_sprs<T: Scalar>(matrix: CsMat<T>) -> Result<Matrix<T>> {
    // Ensure matrix is in CSR format
    let matrix = if matrix.is_csr() {
        matrix
    } else {
        matrix.to_csr()
    };

    let (n_rows, n_cols) = matrix.shape();
    let (row_ptr, col_idx, values) = matrix.into_raw_storage();

    Matrix::from_csr(SparseMatrixCSR {
        n_rows,
        n_cols,
        row_ptr,
        col_idx,
        values,
    })
}

/// Materialises any sparse view as a dense array, filling gaps with `fill`
pub fn to_dense<T: Scalar, M: SparseView<T> + ?Sized>(view: &M, fill: T) -> Array2<T> {
    let mut dense = Array2::from_elem((view.nrows(), view.ncols()), fill);
    for i in 0..view.nrows() {
        let (cols, vals) = view.row(i);
        for (&j, v) in cols.iter().zip(vals) {
            dense[[i, j]] = v.clone();
        }
    }
    dense
}

/// Materialises a vector as a dense array, filling gaps with `fill`
pub fn vector_to_dense<T: Scalar>(vector: &Vector<T>, fill: T) -> Vec<T> {
    let mut dense = vec![fill; vector.size()];
    for (i, v) in vector.iter() {
        dense[i] = v.clone();
    }
    dense
}
