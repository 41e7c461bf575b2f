//! Distributed containers over the 1D block-cyclic distribution
//!
//! Each process of a launch stores the part of a [`DistVector`] that the
//! [`Distribution`](crate::distribution::Distribution) assigns to it, and
//! the rows of a [`DistMatrix`] it owns. Operations that need data from
//! other processes go through the [`Context`]'s collectives, so they are
//! collective: every process must call them in the same order.

use tracing::trace;

use crate::algebra::{Add, IsMonoid, IsSemiring};
use crate::blas1;
use crate::blas2;
use crate::config::IoMode;
use crate::descriptors::{Descriptor, DENSE, NO_OPERATION};
use crate::error::{check_size, Error, Result};
use crate::io;
use crate::launcher::Context;
use crate::matrix::Matrix;
use crate::phase::Phase;
use crate::types::Scalar;
use crate::vector::Vector;

/// Routes `buckets[k]` to process `k` and returns everything sent to this
/// process, in rank order
fn exchange<T: Scalar>(ctx: &Context, buckets: Vec<Vec<T>>) -> Result<Vec<T>> {
    let coll = ctx.collectives();
    let p = ctx.nprocs();
    let out_counts: Vec<usize> = buckets.iter().map(Vec::len).collect();
    let out_disp = crate::utils::exclusive_scan(&out_counts);

    let mut in_counts = Vec::with_capacity(p);
    coll.alltoall(&out_counts, &mut in_counts)?;
    let in_disp = crate::utils::exclusive_scan(&in_counts);

    let src: Vec<T> = buckets.into_iter().flatten().collect();
    let mut dst = vec![T::default(); in_disp[p]];
    coll.alltoallv(&src, &out_counts, &out_disp[..p], &mut dst, &in_counts, &in_disp[..p])?;
    Ok(dst)
}

/// A vector of global size `n` spread over the processes of a launch
pub struct DistVector<T> {
    n: usize,
    local: Vector<T>,
}

impl<T: Scalar> DistVector<T> {
    /// Creates an empty distributed vector of global size `n`
    pub fn new(ctx: &Context, n: usize) -> Self {
        let local_n = ctx
            .distribution()
            .global_length_to_local(n, ctx.pid(), ctx.nprocs());
        Self {
            n,
            local: Vector::new(local_n),
        }
    }

    /// The global size
    #[inline]
    pub fn size(&self) -> usize {
        self.n
    }

    /// This process's part
    #[inline]
    pub fn local(&self) -> &Vector<T> {
        &self.local
    }

    /// This process's part, mutably
    #[inline]
    pub fn local_mut(&mut self) -> &mut Vector<T> {
        &mut self.local
    }

    /// Global number of nonzeroes
    pub fn nnz(&self, ctx: &Context) -> Result<usize> {
        let mut nnz = self.local.nnz();
        ctx.collectives().allreduce(&mut nnz, Add::<usize>::new())?;
        Ok(nnz)
    }

    /// The value at global index `i`, if this process owns `i` and it is assigned
    pub fn get(&self, ctx: &Context, i: usize) -> Option<&T> {
        let dist = ctx.distribution();
        if i >= self.n || dist.global_index_to_process_id(i, self.n, ctx.nprocs()) != ctx.pid() {
            return None;
        }
        self.local.get(dist.global_index_to_local(i, self.n, ctx.nprocs()))
    }

    /// Sets global index `i` on the process that owns it
    ///
    /// Every process must call this with the same arguments. Fails with
    /// [`Error::IndexOutOfRange`] if `i` is not below the global size.
    pub fn set_element(&mut self, ctx: &Context, i: usize, value: T) -> Result<()> {
        if i >= self.n {
            return Err(Error::IndexOutOfRange {
                index: i,
                size: self.n,
            });
        }
        let dist = ctx.distribution();
        if dist.global_index_to_process_id(i, self.n, ctx.nprocs()) == ctx.pid() {
            let li = dist.global_index_to_local(i, self.n, ctx.nprocs());
            self.local.set_element(li, value)?;
        }
        Ok(())
    }

    /// Assigns `alpha` to every global index
    pub fn set_scalar(&mut self, alpha: T) -> Result<()> {
        blas1::set_scalar(&mut self.local, alpha, NO_OPERATION, Phase::Execute)
    }

    /// Ingests `(index, value)` pairs under the launch's IO mode
    ///
    /// Under [`IoMode::Sequential`] every process passes the full input and
    /// keeps the entries it owns. Under [`IoMode::Parallel`] every process
    /// passes a disjoint part of the input, and entries travel to their
    /// owners. Repeated indices resolve with the last write winning.
    pub fn build_vector<I, V>(&mut self, ctx: &Context, indices: I, values: V) -> Result<()>
    where
        I: IntoIterator<Item = usize>,
        V: IntoIterator<Item = T>,
    {
        let (p, pid, n) = (ctx.nprocs(), ctx.pid(), self.n);
        let dist = *ctx.distribution();
        let indices: Vec<usize> = indices.into_iter().collect();
        let values: Vec<T> = values.into_iter().collect();
        check_size("build_vector", indices.len(), values.len())?;
        trace!(pid, n, len = indices.len(), mode = ?ctx.io_mode(), "DistVector::build_vector");
        if let Some(&index) = indices.iter().find(|&&i| i >= n) {
            return Err(Error::IndexOutOfRange { index, size: n });
        }

        let (mine_idx, mine_val): (Vec<usize>, Vec<T>) = match ctx.io_mode() {
            IoMode::Sequential => indices
                .into_iter()
                .zip(values)
                .filter(|&(i, _)| dist.global_index_to_process_id(i, n, p) == pid)
                .unzip(),
            IoMode::Parallel => {
                let mut idx_buckets = vec![Vec::new(); p];
                let mut val_buckets = vec![Vec::new(); p];
                for (i, v) in indices.into_iter().zip(values) {
                    let owner = dist.global_index_to_process_id(i, n, p);
                    idx_buckets[owner].push(i);
                    val_buckets[owner].push(v);
                }
                (exchange(ctx, idx_buckets)?, exchange(ctx, val_buckets)?)
            }
        };

        let local: Vec<usize> = mine_idx
            .into_iter()
            .map(|i| dist.global_index_to_local(i, n, p))
            .collect();
        io::build_vector_indexed(&mut self.local, local, mine_val, ctx.io_mode(), NO_OPERATION)
    }

    /// All assigned entries as `(global index, value)` pairs, on every process
    pub fn gather_all(&self, ctx: &Context) -> Result<Vec<(usize, T)>> {
        let (p, pid, n) = (ctx.nprocs(), ctx.pid(), self.n);
        let dist = ctx.distribution();
        let pairs = self.local.to_sorted_pairs();
        let indices: Vec<usize> = pairs
            .iter()
            .map(|(li, _)| dist.local_index_to_global(*li, n, pid, p))
            .collect();
        let values: Vec<T> = pairs.into_iter().map(|(_, v)| v).collect();

        let coll = ctx.collectives();
        let mut all_indices = Vec::new();
        let mut all_values = Vec::new();
        coll.allgather(&indices, &mut all_indices)?;
        coll.allgather(&values, &mut all_values)?;

        let mut entries: Vec<(usize, T)> = all_indices.into_iter().zip(all_values).collect();
        entries.sort_unstable_by_key(|e| e.0);
        Ok(entries)
    }

    /// The whole vector, replicated on every process
    pub fn to_global(&self, ctx: &Context) -> Result<Vector<T>> {
        let (indices, values): (Vec<usize>, Vec<T>) = self.gather_all(ctx)?.into_iter().unzip();
        let mut global = Vector::new(self.n);
        io::build_vector_indexed(&mut global, indices, values, IoMode::Sequential, NO_OPERATION)?;
        Ok(global)
    }

    /// Folds every assigned entry into `alpha` under `monoid`
    pub fn foldl_to_scalar<M>(&self, ctx: &Context, alpha: &mut T, monoid: M, desc: Descriptor) -> Result<()>
    where
        M: IsMonoid<D = T>,
    {
        let mut partial = monoid.identity();
        blas1::foldl_to_scalar(&mut partial, &self.local, monoid, desc)?;
        ctx.collectives().allreduce(&mut partial, monoid.operator())?;
        monoid.fold(alpha, &partial);
        Ok(())
    }
}

/// Distributed dot product: `alpha ← alpha ⊕ ⊕_i (x[i] ⊗ y[i])` on every process
pub fn dot<S: IsSemiring>(
    ctx: &Context,
    alpha: &mut S::D,
    x: &DistVector<S::D>,
    y: &DistVector<S::D>,
    ring: S,
    desc: Descriptor,
) -> Result<()> {
    check_size("dot", x.size(), y.size())?;
    let mut partial = ring.zero();
    blas1::dot(&mut partial, x.local(), y.local(), ring, desc)?;
    ctx.collectives().allreduce(&mut partial, ring.additive_operator())?;
    *alpha = ring.add(alpha, &partial);
    Ok(())
}

/// An `m × n` matrix whose rows are spread over the processes of a launch
pub struct DistMatrix<T> {
    m: usize,
    n: usize,
    local: Matrix<T>,
}

impl<T: Scalar> DistMatrix<T> {
    /// Creates an empty distributed `m × n` matrix
    pub fn new(ctx: &Context, m: usize, n: usize) -> Self {
        let local_m = ctx
            .distribution()
            .global_length_to_local(m, ctx.pid(), ctx.nprocs());
        Self {
            m,
            n,
            local: Matrix::new(local_m, n),
        }
    }

    /// Global number of rows
    pub fn nrows(&self) -> usize {
        self.m
    }

    /// Global number of columns
    pub fn ncols(&self) -> usize {
        self.n
    }

    /// The rows this process owns, indexed locally
    pub fn local(&self) -> &Matrix<T> {
        &self.local
    }

    /// Global number of nonzeroes
    pub fn nnz(&self, ctx: &Context) -> Result<usize> {
        let mut nnz = self.local.nnz();
        ctx.collectives().allreduce(&mut nnz, Add::<usize>::new())?;
        Ok(nnz)
    }

    /// Replaces the contents with unique triplets under the launch's IO mode
    pub fn build_matrix_unique<R, C, V>(&mut self, ctx: &Context, rows: R, cols: C, values: V) -> Result<()>
    where
        R: IntoIterator<Item = usize>,
        C: IntoIterator<Item = usize>,
        V: IntoIterator<Item = T>,
    {
        let (p, pid, m) = (ctx.nprocs(), ctx.pid(), self.m);
        let dist = *ctx.distribution();
        let rows: Vec<usize> = rows.into_iter().collect();
        let cols: Vec<usize> = cols.into_iter().collect();
        let values: Vec<T> = values.into_iter().collect();
        check_size("build_matrix_unique", rows.len(), cols.len())?;
        check_size("build_matrix_unique", rows.len(), values.len())?;
        trace!(pid, m, n = self.n, nz = rows.len(), "DistMatrix::build_matrix_unique");
        if let Some(&i) = rows.iter().find(|&&i| i >= m) {
            return Err(Error::Mismatch {
                op: "build_matrix_unique",
                expected: m,
                got: i + 1,
            });
        }

        let (my_rows, my_cols, my_vals) = match ctx.io_mode() {
            IoMode::Sequential => {
                let mut kept = (Vec::new(), Vec::new(), Vec::new());
                for ((i, j), v) in rows.into_iter().zip(cols).zip(values) {
                    if dist.global_index_to_process_id(i, m, p) == pid {
                        kept.0.push(i);
                        kept.1.push(j);
                        kept.2.push(v);
                    }
                }
                kept
            }
            IoMode::Parallel => {
                let mut row_buckets = vec![Vec::new(); p];
                let mut col_buckets = vec![Vec::new(); p];
                let mut val_buckets = vec![Vec::new(); p];
                for ((i, j), v) in rows.into_iter().zip(cols).zip(values) {
                    let owner = dist.global_index_to_process_id(i, m, p);
                    row_buckets[owner].push(i);
                    col_buckets[owner].push(j);
                    val_buckets[owner].push(v);
                }
                (
                    exchange(ctx, row_buckets)?,
                    exchange(ctx, col_buckets)?,
                    exchange(ctx, val_buckets)?,
                )
            }
        };

        let local_rows: Vec<usize> = my_rows
            .into_iter()
            .map(|i| dist.global_index_to_local(i, m, p))
            .collect();
        io::build_matrix_unique(&mut self.local, local_rows, my_cols, my_vals, ctx.io_mode())
    }

    /// Distributed `y ← y ⊕ A·x`, or `y ← y ⊕ Aᵀ·x` under `TRANSPOSE_MATRIX`
    ///
    /// For `A·x`, `x` is replicated on every process first; each process
    /// then multiplies the rows it owns. For `Aᵀ·x`, each process multiplies
    /// its rows' transpose with its own part of `x`, and the partial sums
    /// travel to the owners of the output indices.
    pub fn mxv<S>(
        &self,
        ctx: &Context,
        y: &mut DistVector<T>,
        x: &DistVector<T>,
        ring: S,
        desc: Descriptor,
    ) -> Result<()>
    where
        S: IsSemiring<D = T>,
    {
        if desc.is_transposed() {
            return self.mxv_transposed(ctx, y, x, ring, desc);
        }
        check_size("mxv", self.m, y.size())?;
        check_size("mxv", self.n, x.size())?;
        trace!(pid = ctx.pid(), m = self.m, n = self.n, "DistMatrix::mxv");
        let x_full = x.to_global(ctx)?;
        blas2::mxv(&mut y.local, &self.local, &x_full, ring, desc, Phase::Execute)
    }

    fn mxv_transposed<S>(
        &self,
        ctx: &Context,
        y: &mut DistVector<T>,
        x: &DistVector<T>,
        ring: S,
        desc: Descriptor,
    ) -> Result<()>
    where
        S: IsSemiring<D = T>,
    {
        check_size("mxv", self.n, y.size())?;
        check_size("mxv", self.m, x.size())?;
        trace!(pid = ctx.pid(), m = self.m, n = self.n, "DistMatrix::mxv transposed");
        let (p, dist) = (ctx.nprocs(), *ctx.distribution());

        if desc.is_dense() {
            // Agree on the outcome so no process is left inside a collective
            let mut sparse = usize::from(!x.local.is_dense() || !y.local.is_dense());
            ctx.collectives().allreduce(&mut sparse, Add::<usize>::new())?;
            if sparse > 0 {
                return Err(Error::NotDense { op: "mxv" });
            }
        }

        let mut partial = Vector::new(self.n);
        blas2::mxv(
            &mut partial,
            &self.local,
            &x.local,
            ring,
            desc.without(DENSE),
            Phase::Execute,
        )?;

        let mut idx_buckets = vec![Vec::new(); p];
        let mut val_buckets = vec![Vec::new(); p];
        for (j, v) in partial.iter() {
            let owner = dist.global_index_to_process_id(j, self.n, p);
            idx_buckets[owner].push(j);
            val_buckets[owner].push(v.clone());
        }
        let indices = exchange(ctx, idx_buckets)?;
        let values = exchange(ctx, val_buckets)?;

        let (coords, out) = y.local.parts_mut();
        for (j, v) in indices.into_iter().zip(values) {
            let lj = dist.global_index_to_local(j, self.n, p);
            if coords.assign(lj) {
                out[lj] = ring.add(&out[lj], &v);
            } else {
                out[lj] = v;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{PlusMonoid, PlusTimes};
    use crate::config::Config;
    use crate::launcher::Launcher;

    fn launcher(p: usize, mode: IoMode) -> Launcher {
        let config = Config {
            block_size: 2,
            ..Config::default()
        };
        Launcher::new(p, mode).unwrap().with_config(config).unwrap()
    }

    #[test]
    fn test_build_sequential_and_gather() {
        let out = launcher(3, IoMode::Sequential)
            .exec(|ctx| {
                let mut v = DistVector::<i32>::new(ctx, 11);
                v.build_vector(ctx, vec![0, 3, 5, 10], vec![1, 2, 3, 4])?;
                Ok((v.nnz(ctx)?, v.gather_all(ctx)?))
            })
            .unwrap();
        for (nnz, entries) in out {
            assert_eq!(nnz, 4);
            assert_eq!(entries, vec![(0, 1), (3, 2), (5, 3), (10, 4)]);
        }
    }

    #[test]
    fn test_build_parallel_routes_entries() {
        let out = launcher(2, IoMode::Parallel)
            .exec(|ctx| {
                let mut v = DistVector::<i32>::new(ctx, 8);
                // Each process contributes the entries at its own parity
                let idx: Vec<usize> = (0..8).filter(|i| i % 2 == ctx.pid()).collect();
                let vals: Vec<i32> = idx.iter().map(|&i| i as i32 * 10).collect();
                v.build_vector(ctx, idx, vals)?;
                Ok((v.local().nnz(), v.gather_all(ctx)?))
            })
            .unwrap();
        // Blocks of two: process 0 owns 0,1,4,5 and process 1 owns 2,3,6,7
        assert_eq!(out[0].0, 4);
        assert_eq!(out[1].0, 4);
        let expected: Vec<(usize, i32)> = (0..8).map(|i| (i, i as i32 * 10)).collect();
        assert_eq!(out[0].1, expected);
    }

    #[test]
    fn test_distributed_dot_and_fold() {
        let out = launcher(4, IoMode::Sequential)
            .exec(|ctx| {
                let mut x = DistVector::<i64>::new(ctx, 37);
                let mut y = DistVector::<i64>::new(ctx, 37);
                x.set_scalar(1)?;
                y.set_scalar(3)?;
                let mut alpha = 0;
                dot(ctx, &mut alpha, &x, &y, PlusTimes::<i64>::new(), NO_OPERATION)?;
                let mut total = 0;
                y.foldl_to_scalar(ctx, &mut total, PlusMonoid::<i64>::new(), NO_OPERATION)?;
                Ok((alpha, total))
            })
            .unwrap();
        assert!(out.iter().all(|&r| r == (111, 111)));
    }

    #[test]
    fn test_distributed_mxv() {
        let out = launcher(3, IoMode::Sequential)
            .exec(|ctx| {
                // Bidiagonal 5×5: A[i,i] = 1, A[i,i+1] = 2
                let mut a = DistMatrix::<i32>::new(ctx, 5, 5);
                let rows: Vec<usize> = (0..5).chain(0..4).collect();
                let cols: Vec<usize> = (0..5).chain(1..5).collect();
                let vals: Vec<i32> = vec![1; 5].into_iter().chain(vec![2; 4]).collect();
                a.build_matrix_unique(ctx, rows, cols, vals)?;

                let mut x = DistVector::new(ctx, 5);
                x.build_vector(ctx, 0..5, vec![1, 2, 3, 4, 5])?;
                let mut y = DistVector::new(ctx, 5);
                a.mxv(ctx, &mut y, &x, PlusTimes::<i32>::new(), NO_OPERATION)?;
                Ok((a.nnz(ctx)?, y.gather_all(ctx)?))
            })
            .unwrap();
        let expected = vec![(0, 5), (1, 8), (2, 11), (3, 14), (4, 5)];
        for (nnz, y) in out {
            assert_eq!(nnz, 9);
            assert_eq!(y, expected);
        }
    }

    #[test]
    fn test_distributed_mxv_transposed() {
        let out = launcher(3, IoMode::Sequential)
            .exec(|ctx| {
                let mut a = DistMatrix::<i32>::new(ctx, 5, 5);
                let rows: Vec<usize> = (0..5).chain(0..4).collect();
                let cols: Vec<usize> = (0..5).chain(1..5).collect();
                let vals: Vec<i32> = vec![1; 5].into_iter().chain(vec![2; 4]).collect();
                a.build_matrix_unique(ctx, rows, cols, vals)?;

                let mut x = DistVector::new(ctx, 5);
                x.build_vector(ctx, 0..5, vec![1, 2, 3, 4, 5])?;
                let mut y = DistVector::new(ctx, 5);
                y.set_element(ctx, 0, 100)?;
                let ring = PlusTimes::<i32>::new();
                a.mxv(ctx, &mut y, &x, ring, crate::descriptors::TRANSPOSE_MATRIX)?;
                y.gather_all(ctx)
            })
            .unwrap();
        // y[j] = x[j] + 2·x[j-1], added onto the existing y[0]
        let expected = vec![(0, 101), (1, 4), (2, 7), (3, 10), (4, 13)];
        for y in out {
            assert_eq!(y, expected);
        }
    }

    #[test]
    fn test_set_element_out_of_range() {
        let out = launcher(2, IoMode::Sequential)
            .exec(|ctx| {
                let mut v = DistVector::<u8>::new(ctx, 4);
                v.set_element(ctx, 3, 7)?;
                let rc = v.set_element(ctx, 4, 1).unwrap_err().rc();
                Ok((v.get(ctx, 3).copied(), rc))
            })
            .unwrap();
        // Index 3 lives in block 1, on process 1
        assert_eq!(out[0], (None, crate::Rc::Mismatch));
        assert_eq!(out[1], (Some(7), crate::Rc::Mismatch));
    }
}
