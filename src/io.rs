//! Ingestion of vectors and matrices, and the lazy-execution interface
//!
//! Every build validates its whole input before touching the destination, so
//! a failed build leaves the container as it was.

use tracing::trace;

use crate::algebra::Operator;
use crate::config::IoMode;
use crate::coordinates::Coordinates;
use crate::descriptors::{Descriptor, NO_DUPLICATES, NO_OPERATION};
use crate::error::{check_size, Error, Result};
use crate::matrix::{Matrix, SparseMatrixCSR};
use crate::types::Scalar;
use crate::utils::exclusive_scan;
use crate::vector::Vector;

/// A container whose outstanding work can be awaited
pub trait Container {
    /// The unique identifier of the container
    fn id(&self) -> usize;
    /// Number of nonzeroes
    fn nnz(&self) -> usize;
}

impl<T: Scalar> Container for Vector<T> {
    fn id(&self) -> usize {
        Vector::id(self)
    }

    fn nnz(&self) -> usize {
        Vector::nnz(self)
    }
}

impl<T: Scalar> Container for Matrix<T> {
    fn id(&self) -> usize {
        Matrix::id(self)
    }

    fn nnz(&self) -> usize {
        Matrix::nnz(self)
    }
}

/// Forces all outstanding work to complete
///
/// Primitives of this backend execute eagerly, so there is never work left.
pub fn wait() -> Result<()> {
    Ok(())
}

/// Forces all outstanding work on `containers` to complete
pub fn wait_on(containers: &[&dyn Container]) -> Result<()> {
    trace!(count = containers.len(), "wait_on");
    Ok(())
}

/// Ingests `values` at positions `0..len`
///
/// Existing entries at other positions are kept. Fails with
/// [`Error::Mismatch`] if more values than the vector size are supplied.
/// Both IO modes behave the same on a single process.
pub fn build_vector<T, I>(x: &mut Vector<T>, values: I, mode: IoMode) -> Result<()>
where
    T: Scalar,
    I: IntoIterator<Item = T>,
{
    let values: Vec<T> = values.into_iter().collect();
    trace!(size = x.size(), len = values.len(), ?mode, "build_vector");
    if values.len() > x.size() {
        return Err(Error::Mismatch {
            op: "build_vector",
            expected: x.size(),
            got: values.len(),
        });
    }

    let new_entries = (0..values.len()).filter(|&i| !x.contains(i)).count();
    x.grow_capacity(x.nnz() + new_entries);
    for (i, v) in values.into_iter().enumerate() {
        x.insert_unchecked(i, v);
    }
    Ok(())
}

/// Collects index/value pairs, checking ranges and (optionally) duplicates
fn collect_pairs<T, I, V>(
    op: &'static str,
    n: usize,
    indices: I,
    values: V,
    desc: Descriptor,
) -> Result<(Vec<usize>, Vec<T>)>
where
    I: IntoIterator<Item = usize>,
    V: IntoIterator<Item = T>,
{
    let indices: Vec<usize> = indices.into_iter().collect();
    let values: Vec<T> = values.into_iter().collect();
    check_size(op, indices.len(), values.len())?;

    if let Some(&index) = indices.iter().find(|&&i| i >= n) {
        return Err(Error::IndexOutOfRange { index, size: n });
    }

    if desc.contains(NO_DUPLICATES) {
        let mut seen = Coordinates::new(n);
        for &i in &indices {
            if seen.assign(i) {
                return Err(Error::DuplicateIndex { op, index: i });
            }
        }
    }
    Ok((indices, values))
}

/// Number of distinct indices among `indices` not yet assigned in `x`
fn count_new<T: Scalar>(x: &Vector<T>, indices: &[usize]) -> usize {
    let mut seen = Coordinates::new(x.size());
    indices
        .iter()
        .filter(|&&i| !x.contains(i) && !seen.assign(i))
        .count()
}

/// Ingests values at explicit indices
///
/// Entries already present, or repeated in the input, are overwritten in
/// input order so the last write wins. Under `NO_DUPLICATES` a repeated
/// index fails with [`Error::DuplicateIndex`].
pub fn build_vector_indexed<T, I, V>(
    x: &mut Vector<T>,
    indices: I,
    values: V,
    mode: IoMode,
    desc: Descriptor,
) -> Result<()>
where
    T: Scalar,
    I: IntoIterator<Item = usize>,
    V: IntoIterator<Item = T>,
{
    let (indices, values) = collect_pairs("build_vector_indexed", x.size(), indices, values, desc)?;
    trace!(size = x.size(), len = indices.len(), ?mode, "build_vector_indexed");

    let extra = count_new(x, &indices);
    x.grow_capacity(x.nnz() + extra);
    for (i, v) in indices.into_iter().zip(values) {
        x.insert_unchecked(i, v);
    }
    Ok(())
}

/// Ingests values at explicit indices, folding collisions with `dup`
///
/// A value arriving at an index that is already assigned, whether from the
/// previous contents or earlier in the input, is combined as
/// `x[i] ← dup(x[i], v)`.
pub fn build_vector_indexed_with_dup<T, I, V, Op>(
    x: &mut Vector<T>,
    indices: I,
    values: V,
    mode: IoMode,
    dup: Op,
    desc: Descriptor,
) -> Result<()>
where
    T: Scalar,
    I: IntoIterator<Item = usize>,
    V: IntoIterator<Item = T>,
    Op: Operator<D1 = T, D2 = T, D3 = T>,
{
    let (indices, values) = collect_pairs(
        "build_vector_indexed_with_dup",
        x.size(),
        indices,
        values,
        desc,
    )?;
    trace!(
        size = x.size(),
        len = indices.len(),
        ?mode,
        dup = Op::NAME,
        "build_vector_indexed_with_dup"
    );

    let extra = count_new(x, &indices);
    x.grow_capacity(x.nnz() + extra);
    let (coords, raw) = x.parts_mut();
    for (i, v) in indices.into_iter().zip(values) {
        if coords.assign(i) {
            dup.foldl(&mut raw[i], &v);
        } else {
            raw[i] = v;
        }
    }
    Ok(())
}

/// Ingests values at explicit indices that are guaranteed unique
pub fn build_vector_unique<T, I, V>(
    x: &mut Vector<T>,
    indices: I,
    values: V,
    mode: IoMode,
) -> Result<()>
where
    T: Scalar,
    I: IntoIterator<Item = usize>,
    V: IntoIterator<Item = T>,
{
    build_vector_indexed(x, indices, values, mode, NO_DUPLICATES)
}

/// Replaces the contents of `a` with the given unique triplets
///
/// Fails with [`Error::Mismatch`] if the three inputs differ in length or an
/// index is out of range, and with [`Error::DuplicateCoordinate`] if a
/// coordinate repeats. Rows come out with sorted column indices and the CSC form is
/// rebuilt.
pub fn build_matrix_unique<T, R, C, V>(
    a: &mut Matrix<T>,
    rows: R,
    cols: C,
    values: V,
    mode: IoMode,
) -> Result<()>
where
    T: Scalar,
    R: IntoIterator<Item = usize>,
    C: IntoIterator<Item = usize>,
    V: IntoIterator<Item = T>,
{
    let rows: Vec<usize> = rows.into_iter().collect();
    let cols: Vec<usize> = cols.into_iter().collect();
    let values: Vec<T> = values.into_iter().collect();
    trace!(
        nrows = a.nrows(),
        ncols = a.ncols(),
        nz = rows.len(),
        ?mode,
        "build_matrix_unique"
    );
    check_size("build_matrix_unique", rows.len(), cols.len())?;
    check_size("build_matrix_unique", rows.len(), values.len())?;

    let crs = assemble_csr(a.nrows(), a.ncols(), &rows, &cols, values)?;
    a.replace(crs);
    Ok(())
}

/// Replaces the contents of the pattern matrix `a` with the given unique coordinates
pub fn build_pattern_matrix_unique<R, C>(
    a: &mut Matrix<()>,
    rows: R,
    cols: C,
    mode: IoMode,
) -> Result<()>
where
    R: IntoIterator<Item = usize>,
    C: IntoIterator<Item = usize>,
{
    let rows: Vec<usize> = rows.into_iter().collect();
    let cols: Vec<usize> = cols.into_iter().collect();
    check_size("build_pattern_matrix_unique", rows.len(), cols.len())?;
    let values = vec![(); rows.len()];
    build_matrix_unique(a, rows, cols, values, mode)
}

/// Counting sort of triplets into CSR with sorted, unique columns per row
pub(crate) fn assemble_csr<T: Scalar>(
    n_rows: usize,
    n_cols: usize,
    rows: &[usize],
    cols: &[usize],
    values: Vec<T>,
) -> Result<SparseMatrixCSR<T>> {
    let mut row_counts = vec![0usize; n_rows];
    for (&i, &j) in rows.iter().zip(cols) {
        if i >= n_rows {
            return Err(Error::Mismatch {
                op: "build_matrix_unique",
                expected: n_rows,
                got: i + 1,
            });
        }
        if j >= n_cols {
            return Err(Error::Mismatch {
                op: "build_matrix_unique",
                expected: n_cols,
                got: j + 1,
            });
        }
        row_counts[i] += 1;
    }
    let row_ptr = exclusive_scan(&row_counts);

    // Scatter into row buckets
    let mut next = row_ptr.clone();
    let mut order = vec![0usize; rows.len()];
    for (k, &i) in rows.iter().enumerate() {
        order[next[i]] = k;
        next[i] += 1;
    }

    // Sort each row by column and reject repeated coordinates
    for i in 0..n_rows {
        let bucket = &mut order[row_ptr[i]..row_ptr[i + 1]];
        bucket.sort_unstable_by_key(|&k| cols[k]);
        if let Some(w) = bucket.windows(2).find(|w| cols[w[0]] == cols[w[1]]) {
            return Err(Error::DuplicateCoordinate {
                op: "build_matrix_unique",
                row: i,
                col: cols[w[0]],
            });
        }
    }

    let col_idx = order.iter().map(|&k| cols[k]).collect();
    let mut slots: Vec<Option<T>> = values.into_iter().map(Some).collect();
    let values = order
        .iter()
        .map(|&k| slots[k].take().unwrap_or_default())
        .collect();

    Ok(SparseMatrixCSR {
        n_rows,
        n_cols,
        row_ptr,
        col_idx,
        values,
    })
}

/// Convenience: a vector built from explicit unique entries
pub fn vector_from_pairs<T: Scalar>(n: usize, pairs: &[(usize, T)]) -> Result<Vector<T>> {
    let mut x = Vector::new(n);
    build_vector_indexed(
        &mut x,
        pairs.iter().map(|p| p.0),
        pairs.iter().map(|p| p.1.clone()),
        IoMode::Sequential,
        NO_OPERATION,
    )?;
    Ok(x)
}
