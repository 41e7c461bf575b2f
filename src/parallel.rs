//! # Shared-memory kernels
//!
//! Rayon versions of the hot loops behind BLAS1 and BLAS2. The primitives
//! dispatch here once the work exceeds [`Config::parallel_threshold`];
//! below it they stay on the calling thread.

use rayon::prelude::*;

use crate::algebra::{IsMonoid, IsSemiring};
use crate::config::Config;
use crate::coordinates::Coordinates;
use crate::matrix::SparseView;

/// Whether `work` items justify the rayon pool
#[inline]
pub(crate) fn should_parallelize(work: usize) -> bool {
    work >= Config::global().parallel_threshold
}

/// Folds `values[i]` for every `i` in `indices` under `monoid`
///
/// Partial results per worker start from the identity and are combined in
/// an unspecified order.
pub(crate) fn par_fold<M: IsMonoid>(monoid: &M, values: &[M::D], indices: &[usize]) -> M::D {
    indices
        .par_iter()
        .fold(
            || monoid.identity(),
            |acc, &i| monoid.apply(&acc, &values[i]),
        )
        .reduce(|| monoid.identity(), |a, b| monoid.apply(&a, &b))
}

/// Sums `x[i] ⊗ y[i]` over the indices of `indices` that `other` also holds
///
/// Returns `None` when the intersection is empty.
pub(crate) fn par_dot<S: IsSemiring>(
    ring: &S,
    x: &[S::D],
    y: &[S::D],
    indices: &[usize],
    other: &Coordinates,
) -> Option<S::D> {
    indices
        .par_iter()
        .filter(|&&i| other.assigned(i))
        .map(|&i| ring.mul(&x[i], &y[i]))
        .reduce_with(|a, b| ring.add(&a, &b))
}

/// Row products `⊕_j A[i,j] ⊗ x[j]` for each row in `rows`
///
/// Rows without any contributing product are left out of the result.
pub(crate) fn par_row_products<S, V>(
    ring: &S,
    view: &V,
    x_values: &[S::D],
    x_coords: &Coordinates,
    rows: &[usize],
) -> Vec<(usize, S::D)>
where
    S: IsSemiring,
    V: SparseView<S::D> + Sync + ?Sized,
{
    rows.par_iter()
        .filter_map(|&i| {
            let (cols, vals) = view.row(i);
            row_product(ring, cols, vals, x_values, x_coords).map(|acc| (i, acc))
        })
        .collect()
}

/// One row product, sequentially
#[inline]
pub(crate) fn row_product<S: IsSemiring>(
    ring: &S,
    cols: &[usize],
    vals: &[S::D],
    x_values: &[S::D],
    x_coords: &Coordinates,
) -> Option<S::D> {
    let mut acc: Option<S::D> = None;
    for (&j, a) in cols.iter().zip(vals) {
        if !x_coords.assigned(j) {
            continue;
        }
        let product = ring.mul(a, &x_values[j]);
        acc = Some(match acc {
            Some(sum) => ring.add(&sum, &product),
            None => product,
        });
    }
    acc
}

/// Runs `f(i)` for every index, distributing the indices across the pool
pub(crate) fn par_for_each_index<F>(indices: &[usize], f: F)
where
    F: Fn(usize) + Send + Sync,
{
    indices.par_iter().for_each(|&i| f(i));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{PlusMonoid, PlusTimes};
    use crate::matrix::{Matrix, SparseMatrixCSR};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_par_fold_matches_sequential() {
        let values: Vec<i64> = (0..1000).collect();
        let indices: Vec<usize> = (0..1000).step_by(3).collect();
        let expected: i64 = indices.iter().map(|&i| values[i]).sum();
        assert_eq!(par_fold(&PlusMonoid::<i64>::new(), &values, &indices), expected);
    }

    #[test]
    fn test_par_dot_intersection() {
        let x = vec![1i32, 2, 3, 4];
        let y = vec![10i32, 20, 30, 40];
        let mut other = Coordinates::new(4);
        other.assign(1);
        other.assign(3);
        let ring = PlusTimes::<i32>::new();
        assert_eq!(par_dot(&ring, &x, &y, &[0, 1, 2, 3], &other), Some(2 * 20 + 4 * 40));
        assert_eq!(par_dot(&ring, &x, &y, &[0, 2], &other), None);
    }

    #[test]
    fn test_par_row_products() {
        // [1 2]
        // [0 0]
        // [0 3]
        let a = Matrix::from_csr(SparseMatrixCSR::new(
            3,
            2,
            vec![0, 2, 2, 3],
            vec![0, 1, 1],
            vec![1, 2, 3],
        ))
        .unwrap();
        let x = vec![5, 7];
        let coords = Coordinates::dense(2);
        let ring = PlusTimes::<i32>::new();
        let mut rows = par_row_products(&ring, &a, &x, &coords, &[0, 1, 2]);
        rows.sort_unstable();
        assert_eq!(rows, vec![(0, 19), (2, 21)]);
    }

    #[test]
    fn test_par_for_each_index() {
        let hits = AtomicUsize::new(0);
        par_for_each_index(&[1, 4, 9], |i| {
            hits.fetch_add(i, Ordering::Relaxed);
        });
        assert_eq!(hits.load(Ordering::Relaxed), 14);
    }
}
