//! Level-2 primitives: sparse matrix–vector multiplication and outer products
//!
//! `mxv` walks the rows of the matrix, or its columns under the transpose
//! descriptor, and `vxm` is `mxv` with the transpose bit flipped. Rows are
//! processed on the rayon pool once the matrix is large enough.

use tracing::trace;

use crate::algebra::{IsSemiring, Operator};
use crate::descriptors::{Descriptor, TRANSPOSE_MATRIX};
use crate::error::{check_size, Error, Result};
use crate::mask::MaskFilter;
use crate::matrix::{Matrix, SparseMatrixCSR, SparseView, Transposed};
use crate::parallel;
use crate::phase::{reserve_output, Phase};
use crate::types::{Scalar, Truthy};
use crate::vector::Vector;

/// Computes `y ← y ⊕ A·x` under `ring`
///
/// Only rows with at least one product contribute; rows of `A` that are
/// empty, or that only meet unassigned entries of `x`, leave `y` as is.
/// A contributing row is written even when its sum equals the semiring
/// zero, so `y[i]` becomes assigned whenever row `i` meets `x`.
///
/// # Arguments
///
/// * `y` - Output vector of size `nrows(A)`
/// * `a` - Input matrix or matrix view
/// * `x` - Input vector of size `ncols(A)`
/// * `ring` - Semiring supplying `⊕` and `⊗`
/// * `desc` - `TRANSPOSE_MATRIX` multiplies with `Aᵀ` instead; `DENSE`
///   requires `x` and `y` to be dense
/// * `phase` - Under [`Phase::Resize`] only the capacity of `y` is raised
pub fn mxv<S, V>(
    y: &mut Vector<S::D>,
    a: &V,
    x: &Vector<S::D>,
    ring: S,
    desc: Descriptor,
    phase: Phase,
) -> Result<()>
where
    S: IsSemiring,
    V: SparseView<S::D> + Sync + ?Sized,
{
    dispatch(y, &MaskFilter::none(), a, x, ring, desc, phase)
}

/// [`mxv`] restricted to output indices that pass `mask`
pub fn mxv_masked<S, V, M>(
    y: &mut Vector<S::D>,
    mask: &Vector<M>,
    a: &V,
    x: &Vector<S::D>,
    ring: S,
    desc: Descriptor,
    phase: Phase,
) -> Result<()>
where
    S: IsSemiring,
    V: SparseView<S::D> + Sync + ?Sized,
    M: Scalar + Truthy,
{
    let filter = MaskFilter::new("mxv", mask, y.size(), desc)?;
    dispatch(y, &filter, a, x, ring, desc, phase)
}

/// Computes `y ← y ⊕ x·A` under `ring`
///
/// Equivalent to [`mxv`] with the transpose descriptor toggled.
pub fn vxm<S, V>(
    y: &mut Vector<S::D>,
    x: &Vector<S::D>,
    a: &V,
    ring: S,
    desc: Descriptor,
    phase: Phase,
) -> Result<()>
where
    S: IsSemiring,
    V: SparseView<S::D> + Sync + ?Sized,
{
    mxv(y, a, x, ring, desc.toggle(TRANSPOSE_MATRIX), phase)
}

/// [`vxm`] restricted to output indices that pass `mask`
pub fn vxm_masked<S, V, M>(
    y: &mut Vector<S::D>,
    mask: &Vector<M>,
    x: &Vector<S::D>,
    a: &V,
    ring: S,
    desc: Descriptor,
    phase: Phase,
) -> Result<()>
where
    S: IsSemiring,
    V: SparseView<S::D> + Sync + ?Sized,
    M: Scalar + Truthy,
{
    mxv_masked(y, mask, a, x, ring, desc.toggle(TRANSPOSE_MATRIX), phase)
}

fn dispatch<S, V>(
    y: &mut Vector<S::D>,
    filter: &MaskFilter<'_>,
    a: &V,
    x: &Vector<S::D>,
    ring: S,
    desc: Descriptor,
    phase: Phase,
) -> Result<()>
where
    S: IsSemiring,
    V: SparseView<S::D> + Sync + ?Sized,
{
    if desc.is_transposed() {
        multiply(y, filter, &Transposed::new(a), x, ring, desc, phase)
    } else {
        multiply(y, filter, a, x, ring, desc, phase)
    }
}

fn multiply<S, V>(
    y: &mut Vector<S::D>,
    filter: &MaskFilter<'_>,
    a: &V,
    x: &Vector<S::D>,
    ring: S,
    desc: Descriptor,
    phase: Phase,
) -> Result<()>
where
    S: IsSemiring,
    V: SparseView<S::D> + Sync + ?Sized,
{
    trace!(
        m = a.nrows(),
        n = a.ncols(),
        nnz = a.nnz(),
        x_nnz = x.nnz(),
        masked = filter.is_active(),
        ?desc,
        ?phase,
        "mxv"
    );
    check_size("mxv", a.nrows(), y.size())?;
    check_size("mxv", a.ncols(), x.size())?;
    if desc.is_dense() && !(x.is_dense() && y.is_dense()) {
        return Err(Error::NotDense { op: "mxv" });
    }

    let rows: Vec<usize> = match filter.candidates() {
        Some(idx) => idx.to_vec(),
        None if filter.is_active() => (0..a.nrows()).filter(|&i| filter.allows(i)).collect(),
        None => (0..a.nrows()).collect(),
    };

    if !phase.executes() {
        let bound = y.nnz()
            + rows
                .iter()
                .filter(|&&i| !y.contains(i) && !a.row(i).0.is_empty())
                .count();
        return reserve_output("mxv", y, bound, phase);
    }

    // Empty operands contribute nothing
    if x.nnz() == 0 || a.nnz() == 0 {
        return Ok(());
    }

    let x_values = x.raw_values();
    let x_coords = x.coords();
    let products: Vec<(usize, S::D)> = if parallel::should_parallelize(a.nnz()) {
        parallel::par_row_products(&ring, a, x_values, x_coords, &rows)
    } else {
        rows.iter()
            .filter_map(|&i| {
                let (cols, vals) = a.row(i);
                parallel::row_product(&ring, cols, vals, x_values, x_coords).map(|acc| (i, acc))
            })
            .collect()
    };

    let required = y.nnz() + products.iter().filter(|(i, _)| !y.contains(*i)).count();
    reserve_output("mxv", y, required, phase)?;

    let (coords, values) = y.parts_mut();
    for (i, acc) in products {
        if coords.assign(i) {
            values[i] = ring.add(&values[i], &acc);
        } else {
            values[i] = acc;
        }
    }
    Ok(())
}

/// Outer product: `C[i, j] ← op(u[i], v[j])` for every `i` in `u` and `j` in `v`
///
/// `C` is cleared first and grows as needed.
pub fn outer<Op: Operator>(
    c: &mut Matrix<Op::D3>,
    u: &Vector<Op::D1>,
    v: &Vector<Op::D2>,
    op: Op,
    desc: Descriptor,
    phase: Phase,
) -> Result<()> {
    outer_inner(c, |_, _| true, u, v, op, desc, phase)
}

/// [`outer`] restricted to coordinates that pass the matrix mask `mask`
///
/// The structural and invert-mask descriptor bits apply as for vector masks.
pub fn masked_outer<Op, M>(
    c: &mut Matrix<Op::D3>,
    mask: &Matrix<M>,
    u: &Vector<Op::D1>,
    v: &Vector<Op::D2>,
    op: Op,
    desc: Descriptor,
    phase: Phase,
) -> Result<()>
where
    Op: Operator,
    M: Scalar + Truthy,
{
    check_size("maskedOuter", c.nrows(), mask.nrows())?;
    check_size("maskedOuter", c.ncols(), mask.ncols())?;
    let structural = desc.is_structural();
    let invert = desc.inverts_mask();
    let allows = |i: usize, j: usize| {
        let (cols, vals) = mask.row(i);
        let hit = match cols.binary_search(&j) {
            Ok(k) => structural || vals[k].truthy(),
            Err(_) => false,
        };
        hit != invert
    };
    outer_inner(c, allows, u, v, op, desc, phase)
}

fn outer_inner<Op, F>(
    c: &mut Matrix<Op::D3>,
    allows: F,
    u: &Vector<Op::D1>,
    v: &Vector<Op::D2>,
    op: Op,
    desc: Descriptor,
    phase: Phase,
) -> Result<()>
where
    Op: Operator,
    F: Fn(usize, usize) -> bool,
{
    trace!(op = Op::NAME, m = u.size(), n = v.size(), ?desc, ?phase, "outer");
    check_size("outer", c.nrows(), u.size())?;
    check_size("outer", c.ncols(), v.size())?;

    let rows = u.coords().to_sorted();
    let cols = v.coords().to_sorted();

    if !phase.executes() {
        let bound = rows
            .iter()
            .map(|&i| cols.iter().filter(|&&j| allows(i, j)).count())
            .sum();
        return c.resize(bound);
    }

    let (uv, vv) = (u.raw_values(), v.raw_values());
    let mut row_ptr = vec![0usize; c.nrows() + 1];
    let mut col_idx = Vec::new();
    let mut values = Vec::new();
    let mut next_row = 0;
    for &i in &rows {
        while next_row <= i {
            row_ptr[next_row] = col_idx.len();
            next_row += 1;
        }
        for &j in cols.iter().filter(|&&j| allows(i, j)) {
            col_idx.push(j);
            values.push(op.apply(&uv[i], &vv[j]));
        }
    }
    for p in row_ptr.iter_mut().skip(next_row) {
        *p = col_idx.len();
    }

    c.replace(SparseMatrixCSR {
        n_rows: c.nrows(),
        n_cols: c.ncols(),
        row_ptr,
        col_idx,
        values,
    });
    Ok(())
}
