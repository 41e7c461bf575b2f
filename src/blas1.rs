//! Level-1 primitives: assignment, folds, element-wise operations and dot
//!
//! Every primitive checks its arguments and the output capacity before it
//! writes, so an error return leaves the output as it was. Under
//! [`Phase::Resize`] a primitive only grows the output capacity.

use tracing::trace;

use crate::algebra::{IsMonoid, IsSemiring, Operator};
use crate::descriptors::Descriptor;
use crate::error::{check_size, Error, Result};
use crate::mask::MaskFilter;
use crate::parallel;
use crate::phase::{reserve_output, Phase};
use crate::types::{FromIndex, Scalar, Truthy, Valued};
use crate::vector::Vector;

/// Fails with [`Error::NotDense`] if the dense descriptor is set and `x` is sparse
fn require_dense<T: Scalar>(op: &'static str, desc: Descriptor, x: &Vector<T>) -> Result<()> {
    if desc.is_dense() && !x.is_dense() {
        Err(Error::NotDense { op })
    } else {
        Ok(())
    }
}

/// Fails with [`Error::Unsupported`] if `USE_INDEX` reaches a value-copying `set`
///
/// Writing indices needs a [`FromIndex`] value type, which only
/// [`set_use_index`] can require.
fn reject_use_index(op: &'static str, desc: Descriptor) -> Result<()> {
    if desc.uses_index() {
        Err(Error::Unsupported(format!(
            "{} under use_index; call set_use_index to write indices",
            op
        )))
    } else {
        Ok(())
    }
}

/// Indices assigned in both `x` and `y`, walking the sparser of the two
fn intersection<A: Scalar, B: Scalar>(x: &Vector<A>, y: &Vector<B>) -> Vec<usize> {
    if x.nnz() <= y.nnz() {
        x.indices().filter(|&i| y.contains(i)).collect()
    } else {
        y.indices().filter(|&i| x.contains(i)).collect()
    }
}

/// Indices in `0..n` that pass `filter`
fn passing(filter: &MaskFilter<'_>, n: usize) -> Vec<usize> {
    match filter.candidates() {
        Some(idx) => idx.to_vec(),
        None => (0..n).filter(|&i| filter.allows(i)).collect(),
    }
}

/// Assigns `alpha` to every index of `z`, making it dense
///
/// A vector of size zero is left as is.
pub fn set_scalar<T: Scalar>(z: &mut Vector<T>, alpha: T, desc: Descriptor, phase: Phase) -> Result<()> {
    let n = z.size();
    trace!(op = "set", n, ?desc, ?phase, "set_scalar");
    reject_use_index("set_scalar", desc)?;
    reserve_output("set", z, n, phase)?;
    if !phase.executes() {
        return Ok(());
    }

    let (coords, values) = z.parts_mut();
    coords.assign_all();
    values.fill(alpha);
    Ok(())
}

/// Clears `z`, then assigns `alpha` at every index that passes `mask`
pub fn set_scalar_masked<T, M>(
    z: &mut Vector<T>,
    mask: &Vector<M>,
    alpha: T,
    desc: Descriptor,
    phase: Phase,
) -> Result<()>
where
    T: Scalar,
    M: Scalar + Truthy,
{
    reject_use_index("set_scalar_masked", desc)?;
    let filter = MaskFilter::new("set", mask, z.size(), desc)?;
    if !filter.is_active() {
        return set_scalar(z, alpha, desc, phase);
    }
    trace!(op = "set", n = z.size(), mask_nnz = mask.nnz(), ?desc, ?phase, "set_scalar_masked");

    let targets = passing(&filter, z.size());
    reserve_output("set", z, targets.len(), phase)?;
    if !phase.executes() {
        return Ok(());
    }

    z.clear();
    for i in targets {
        z.insert_unchecked(i, alpha.clone());
    }
    Ok(())
}

/// Copies the structure and values of `x` into `z`
///
/// Fails with [`Error::Mismatch`] on differing sizes and with
/// [`Error::NotDense`] if the dense descriptor is set and `x` is sparse.
/// `USE_INDEX` is rejected with [`Error::Unsupported`] and `z` is left as
/// it was; [`set_use_index`] is the index-writing form.
pub fn set<T: Scalar>(z: &mut Vector<T>, x: &Vector<T>, desc: Descriptor, phase: Phase) -> Result<()> {
    trace!(op = "set", n = z.size(), nnz = x.nnz(), ?desc, ?phase, "set");
    reject_use_index("set", desc)?;
    check_size("set", z.size(), x.size())?;
    require_dense("set", desc, x)?;
    reserve_output("set", z, x.nnz(), phase)?;
    if !phase.executes() {
        return Ok(());
    }

    z.clear();
    let src = x.raw_values();
    for i in x.indices() {
        z.insert_unchecked(i, src[i].clone());
    }
    Ok(())
}

/// Clears `z`, then copies the entries of `x` at indices that pass `mask`
pub fn set_masked<T, M>(
    z: &mut Vector<T>,
    mask: &Vector<M>,
    x: &Vector<T>,
    desc: Descriptor,
    phase: Phase,
) -> Result<()>
where
    T: Scalar,
    M: Scalar + Truthy,
{
    reject_use_index("set_masked", desc)?;
    check_size("set", z.size(), x.size())?;
    let filter = MaskFilter::new("set", mask, z.size(), desc)?;
    if !filter.is_active() {
        return set(z, x, desc, phase);
    }
    require_dense("set", desc, x)?;
    trace!(op = "set", n = z.size(), nnz = x.nnz(), ?desc, ?phase, "set_masked");

    let targets: Vec<usize> = x.indices().filter(|&i| filter.allows(i)).collect();
    reserve_output("set", z, targets.len(), phase)?;
    if !phase.executes() {
        return Ok(());
    }

    z.clear();
    let src = x.raw_values();
    for i in targets {
        z.insert_unchecked(i, src[i].clone());
    }
    Ok(())
}

/// Copies the structure of `x` into `z`, storing each index as its own value
///
/// The `USE_INDEX` bit is implied here and may be passed or omitted.
pub fn set_use_index<T, U>(z: &mut Vector<T>, x: &Vector<U>, desc: Descriptor, phase: Phase) -> Result<()>
where
    T: Scalar + FromIndex,
    U: Scalar,
{
    trace!(op = "set", n = z.size(), nnz = x.nnz(), ?desc, ?phase, "set_use_index");
    check_size("set", z.size(), x.size())?;
    require_dense("set", desc, x)?;
    reserve_output("set", z, x.nnz(), phase)?;
    if !phase.executes() {
        return Ok(());
    }

    z.clear();
    for i in x.indices() {
        z.insert_unchecked(i, T::from_index(i));
    }
    Ok(())
}

/// In-place left fold of `x` into `z`
///
/// Indices present only in `x` are copied, indices present in both become
/// `op(z[i], x[i])`, and indices present only in `z` are untouched.
pub fn foldl<T, Op>(z: &mut Vector<T>, x: &Vector<T>, op: Op, desc: Descriptor, phase: Phase) -> Result<()>
where
    T: Scalar,
    Op: Operator<D1 = T, D2 = T, D3 = T>,
{
    trace!(op = Op::NAME, n = z.size(), nnz = x.nnz(), ?desc, ?phase, "foldl");
    check_size("foldl", z.size(), x.size())?;
    require_dense("foldl", desc, z)?;
    require_dense("foldl", desc, x)?;

    let required = z.nnz() + z.coords().count_missing_from(x.coords());
    reserve_output("foldl", z, required, phase)?;
    if !phase.executes() {
        return Ok(());
    }

    let src = x.raw_values();
    let (coords, values) = z.parts_mut();
    for i in x.indices() {
        if coords.assign(i) {
            op.foldl(&mut values[i], &src[i]);
        } else {
            values[i] = src[i].clone();
        }
    }
    Ok(())
}

/// In-place right fold of `x` into `z`: `z[i] ← op(x[i], z[i])`
pub fn foldr<T, Op>(x: &Vector<T>, z: &mut Vector<T>, op: Op, desc: Descriptor, phase: Phase) -> Result<()>
where
    T: Scalar,
    Op: Operator<D1 = T, D2 = T, D3 = T>,
{
    trace!(op = Op::NAME, n = z.size(), nnz = x.nnz(), ?desc, ?phase, "foldr");
    check_size("foldr", z.size(), x.size())?;
    require_dense("foldr", desc, z)?;
    require_dense("foldr", desc, x)?;

    let required = z.nnz() + z.coords().count_missing_from(x.coords());
    reserve_output("foldr", z, required, phase)?;
    if !phase.executes() {
        return Ok(());
    }

    let src = x.raw_values();
    let (coords, values) = z.parts_mut();
    for i in x.indices() {
        if coords.assign(i) {
            op.foldr(&src[i], &mut values[i]);
        } else {
            values[i] = src[i].clone();
        }
    }
    Ok(())
}

/// Folds a scalar into every assigned entry: `z[i] ← op(z[i], alpha)`
pub fn foldl_scalar<T, Op>(z: &mut Vector<T>, alpha: &T, op: Op, desc: Descriptor) -> Result<()>
where
    T: Scalar,
    Op: Operator<D1 = T, D2 = T, D3 = T>,
{
    trace!(op = Op::NAME, n = z.size(), nnz = z.nnz(), ?desc, "foldl_scalar");
    require_dense("foldl", desc, z)?;

    let (coords, values) = z.parts_mut();
    for i in coords.iter() {
        op.foldl(&mut values[i], alpha);
    }
    Ok(())
}

/// Reduces the assigned entries of `x` under `monoid`, in any order
fn reduce<M: IsMonoid>(x: &Vector<M::D>, monoid: &M) -> M::D {
    let values = x.raw_values();
    if parallel::should_parallelize(x.nnz()) {
        parallel::par_fold(monoid, values, x.coords().as_slice())
    } else {
        x.indices().fold(monoid.identity(), |acc, i| monoid.apply(&acc, &values[i]))
    }
}

/// Folds every assigned entry of `x` into `alpha`: `alpha ← alpha ⊕ (⊕_i x[i])`
///
/// The reduction order is unspecified. Fails with [`Error::NotDense`] if
/// the dense descriptor is set and `x` is sparse.
pub fn foldl_to_scalar<M: IsMonoid>(
    alpha: &mut M::D,
    x: &Vector<M::D>,
    monoid: M,
    desc: Descriptor,
) -> Result<()> {
    trace!(n = x.size(), nnz = x.nnz(), ?desc, "foldl_to_scalar");
    require_dense("foldl", desc, x)?;
    let partial = reduce(x, &monoid);
    monoid.fold(alpha, &partial);
    Ok(())
}

/// Folds every assigned entry of `x` into `alpha` from the left: `alpha ← (⊕_i x[i]) ⊕ alpha`
pub fn foldr_to_scalar<M: IsMonoid>(
    x: &Vector<M::D>,
    alpha: &mut M::D,
    monoid: M,
    desc: Descriptor,
) -> Result<()> {
    trace!(n = x.size(), nnz = x.nnz(), ?desc, "foldr_to_scalar");
    require_dense("foldr", desc, x)?;
    let partial = reduce(x, &monoid);
    *alpha = monoid.apply(&partial, alpha);
    Ok(())
}

/// Out-of-place element-wise application over the intersection of supports
///
/// `z` is cleared, then `z[i] ← op(x[i], y[i])` for every `i` in both `x`
/// and `y`.
pub fn e_wise_apply<Op: Operator>(
    z: &mut Vector<Op::D3>,
    x: &Vector<Op::D1>,
    y: &Vector<Op::D2>,
    op: Op,
    desc: Descriptor,
    phase: Phase,
) -> Result<()> {
    e_wise_apply_inner(z, &MaskFilter::none(), x, y, op, desc, phase)
}

/// [`e_wise_apply`] restricted to indices that pass `mask`
pub fn e_wise_apply_masked<Op, M>(
    z: &mut Vector<Op::D3>,
    mask: &Vector<M>,
    x: &Vector<Op::D1>,
    y: &Vector<Op::D2>,
    op: Op,
    desc: Descriptor,
    phase: Phase,
) -> Result<()>
where
    Op: Operator,
    M: Scalar + Truthy,
{
    let filter = MaskFilter::new("eWiseApply", mask, z.size(), desc)?;
    e_wise_apply_inner(z, &filter, x, y, op, desc, phase)
}

fn e_wise_apply_inner<Op: Operator>(
    z: &mut Vector<Op::D3>,
    filter: &MaskFilter<'_>,
    x: &Vector<Op::D1>,
    y: &Vector<Op::D2>,
    op: Op,
    desc: Descriptor,
    phase: Phase,
) -> Result<()> {
    trace!(op = Op::NAME, n = z.size(), masked = filter.is_active(), ?desc, ?phase, "eWiseApply");
    check_size("eWiseApply", z.size(), x.size())?;
    check_size("eWiseApply", z.size(), y.size())?;
    require_dense("eWiseApply", desc, x)?;
    require_dense("eWiseApply", desc, y)?;

    let mut targets = intersection(x, y);
    if filter.is_active() {
        targets.retain(|&i| filter.allows(i));
    }
    reserve_output("eWiseApply", z, targets.len(), phase)?;
    if !phase.executes() {
        return Ok(());
    }

    let (xv, yv) = (x.raw_values(), y.raw_values());
    z.clear();
    for i in targets {
        z.insert_unchecked(i, op.apply(&xv[i], &yv[i]));
    }
    Ok(())
}

/// Out-of-place element-wise application over the union of supports
///
/// `z` becomes dense. Where only one input holds a value that value is
/// copied, and where neither does `z[i]` is the identity of `monoid`.
pub fn e_wise_apply_monoid<M: IsMonoid>(
    z: &mut Vector<M::D>,
    x: &Vector<M::D>,
    y: &Vector<M::D>,
    monoid: M,
    desc: Descriptor,
    phase: Phase,
) -> Result<()> {
    e_wise_apply_monoid_inner(z, &MaskFilter::none(), x, y, monoid, desc, phase)
}

/// [`e_wise_apply_monoid`] restricted to indices that pass `mask`
pub fn e_wise_apply_monoid_masked<M, K>(
    z: &mut Vector<M::D>,
    mask: &Vector<K>,
    x: &Vector<M::D>,
    y: &Vector<M::D>,
    monoid: M,
    desc: Descriptor,
    phase: Phase,
) -> Result<()>
where
    M: IsMonoid,
    K: Scalar + Truthy,
{
    let filter = MaskFilter::new("eWiseApply", mask, z.size(), desc)?;
    e_wise_apply_monoid_inner(z, &filter, x, y, monoid, desc, phase)
}

fn e_wise_apply_monoid_inner<M: IsMonoid>(
    z: &mut Vector<M::D>,
    filter: &MaskFilter<'_>,
    x: &Vector<M::D>,
    y: &Vector<M::D>,
    monoid: M,
    desc: Descriptor,
    phase: Phase,
) -> Result<()> {
    trace!(n = z.size(), masked = filter.is_active(), ?desc, ?phase, "eWiseApply(monoid)");
    check_size("eWiseApply", z.size(), x.size())?;
    check_size("eWiseApply", z.size(), y.size())?;
    require_dense("eWiseApply", desc, x)?;
    require_dense("eWiseApply", desc, y)?;

    let targets = passing(filter, z.size());
    reserve_output("eWiseApply", z, targets.len(), phase)?;
    if !phase.executes() {
        return Ok(());
    }

    z.clear();
    for i in targets {
        let value = match (x.get(i), y.get(i)) {
            (Some(a), Some(b)) => monoid.apply(a, b),
            (Some(a), None) => a.clone(),
            (None, Some(b)) => b.clone(),
            (None, None) => monoid.identity(),
        };
        z.insert_unchecked(i, value);
    }
    Ok(())
}

/// In-place element-wise addition: `z[i] ← z[i] ⊕ (x ⊕ y)[i]` over the union of supports
pub fn e_wise_add<S: IsSemiring>(
    z: &mut Vector<S::D>,
    x: &Vector<S::D>,
    y: &Vector<S::D>,
    ring: S,
    desc: Descriptor,
    phase: Phase,
) -> Result<()> {
    trace!(n = z.size(), x_nnz = x.nnz(), y_nnz = y.nnz(), ?desc, ?phase, "eWiseAdd");
    check_size("eWiseAdd", z.size(), x.size())?;
    check_size("eWiseAdd", z.size(), y.size())?;
    require_dense("eWiseAdd", desc, x)?;
    require_dense("eWiseAdd", desc, y)?;

    let from_y: Vec<usize> = y.indices().filter(|&i| !x.contains(i)).collect();
    let required = z.nnz()
        + x.indices().filter(|&i| !z.contains(i)).count()
        + from_y.iter().filter(|&&i| !z.contains(i)).count();
    reserve_output("eWiseAdd", z, required, phase)?;
    if !phase.executes() {
        return Ok(());
    }

    let (xv, yv) = (x.raw_values(), y.raw_values());
    let contributions = x
        .indices()
        .map(|i| match y.get(i) {
            Some(b) => (i, ring.add(&xv[i], b)),
            None => (i, xv[i].clone()),
        })
        .chain(from_y.into_iter().map(|i| (i, yv[i].clone())));

    let (coords, values) = z.parts_mut();
    for (i, v) in contributions {
        if coords.assign(i) {
            values[i] = ring.add(&values[i], &v);
        } else {
            values[i] = v;
        }
    }
    Ok(())
}

/// In-place element-wise multiplication: `z[i] ← z[i] ⊕ (x[i] ⊗ y[i])` over the intersection of supports
pub fn e_wise_mul<S: IsSemiring>(
    z: &mut Vector<S::D>,
    x: &Vector<S::D>,
    y: &Vector<S::D>,
    ring: S,
    desc: Descriptor,
    phase: Phase,
) -> Result<()> {
    trace!(n = z.size(), x_nnz = x.nnz(), y_nnz = y.nnz(), ?desc, ?phase, "eWiseMul");
    check_size("eWiseMul", z.size(), x.size())?;
    check_size("eWiseMul", z.size(), y.size())?;
    require_dense("eWiseMul", desc, x)?;
    require_dense("eWiseMul", desc, y)?;

    let targets = intersection(x, y);
    let required = z.nnz() + targets.iter().filter(|&&i| !z.contains(i)).count();
    reserve_output("eWiseMul", z, required, phase)?;
    if !phase.executes() {
        return Ok(());
    }

    let (xv, yv) = (x.raw_values(), y.raw_values());
    let (coords, values) = z.parts_mut();
    for i in targets {
        let product = ring.mul(&xv[i], &yv[i]);
        if coords.assign(i) {
            values[i] = ring.add(&values[i], &product);
        } else {
            values[i] = product;
        }
    }
    Ok(())
}

/// Dot product: `alpha ← alpha ⊕ ⊕_{i ∈ x ∩ y} (x[i] ⊗ y[i])`
///
/// Disjoint supports leave `alpha` unchanged.
pub fn dot<S: IsSemiring>(
    alpha: &mut S::D,
    x: &Vector<S::D>,
    y: &Vector<S::D>,
    ring: S,
    desc: Descriptor,
) -> Result<()> {
    trace!(n = x.size(), x_nnz = x.nnz(), y_nnz = y.nnz(), ?desc, "dot");
    check_size("dot", x.size(), y.size())?;
    require_dense("dot", desc, x)?;
    require_dense("dot", desc, y)?;

    let (sparse, other) = if x.nnz() <= y.nnz() { (x, y) } else { (y, x) };
    let (xv, yv) = (x.raw_values(), y.raw_values());

    let partial = if parallel::should_parallelize(sparse.nnz()) {
        parallel::par_dot(&ring, xv, yv, sparse.coords().as_slice(), other.coords())
    } else {
        sparse
            .indices()
            .filter(|&i| other.contains(i))
            .map(|i| ring.mul(&xv[i], &yv[i]))
            .reduce(|a, b| ring.add(&a, &b))
    };

    if let Some(sum) = partial {
        *alpha = ring.add(alpha, &sum);
    }
    Ok(())
}

/// Dot product over an improper semiring given as an additive monoid and a
/// multiplicative operator
///
/// Both input domains must carry values; pattern vectors do not satisfy
/// [`Valued`].
pub fn dot_with<M, Op>(
    alpha: &mut M::D,
    x: &Vector<Op::D1>,
    y: &Vector<Op::D2>,
    add: M,
    mul: Op,
    desc: Descriptor,
) -> Result<()>
where
    M: IsMonoid,
    Op: Operator<D3 = M::D>,
    Op::D1: Valued,
    Op::D2: Valued,
{
    trace!(add = M::Op::NAME, mul = Op::NAME, n = x.size(), ?desc, "dot(improper)");
    check_size("dot", x.size(), y.size())?;
    require_dense("dot", desc, x)?;
    require_dense("dot", desc, y)?;

    let (xv, yv) = (x.raw_values(), y.raw_values());
    let partial = intersection(x, y)
        .into_iter()
        .map(|i| mul.apply(&xv[i], &yv[i]))
        .reduce(|a, b| add.apply(&a, &b));

    if let Some(sum) = partial {
        add.fold(alpha, &sum);
    }
    Ok(())
}

/// Invokes `f(i)` for every index assigned in `x`
///
/// `f` may touch captured containers only at position `i`. Large inputs
/// are processed in parallel, so `f` must tolerate concurrent calls.
pub fn e_wise_lambda<T, F>(f: F, x: &Vector<T>) -> Result<()>
where
    T: Scalar,
    F: Fn(usize) + Send + Sync,
{
    trace!(n = x.size(), nnz = x.nnz(), "eWiseLambda");
    if parallel::should_parallelize(x.nnz()) {
        parallel::par_for_each_index(x.coords().as_slice(), f);
    } else {
        x.indices().for_each(f);
    }
    Ok(())
}

/// Updates every assigned entry of `x` in place with `f(i, &mut x[i])`
pub fn e_wise_lambda_mut<T, F>(f: F, x: &mut Vector<T>) -> Result<()>
where
    T: Scalar,
    F: Fn(usize, &mut T) + Send + Sync,
{
    trace!(n = x.size(), nnz = x.nnz(), "eWiseLambda(mut)");
    let (coords, values) = x.parts_mut();
    for i in coords.iter() {
        f(i, &mut values[i]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{Add, Max, MinMonoid, PlusMonoid, PlusTimes, Subtract, Mul};
    use crate::descriptors::{DENSE, NO_OPERATION, USE_INDEX};
    use crate::error::Rc;

    fn sparse(n: usize, pairs: &[(usize, i32)]) -> Vector<i32> {
        let mut v = Vector::new(n);
        for &(i, x) in pairs {
            v.set_element(i, x).unwrap();
        }
        v
    }

    #[test]
    fn test_set_scalar_dense() {
        let mut z = Vector::<i32>::new(4);
        set_scalar(&mut z, 3, NO_OPERATION, Phase::Execute).unwrap();
        assert!(z.is_dense());
        assert_eq!(z.get(2), Some(&3));

        let mut empty = Vector::<i32>::new(0);
        assert!(set_scalar(&mut empty, 1, NO_OPERATION, Phase::Execute).is_ok());
    }

    #[test]
    fn test_set_scalar_capacity() {
        let mut z = Vector::<i32>::with_capacity(4, 1).unwrap();
        let err = set_scalar(&mut z, 1, NO_OPERATION, Phase::Execute).unwrap_err();
        assert_eq!(err.rc(), Rc::Illegal);
        assert_eq!(z.nnz(), 0);

        set_scalar(&mut z, 1, NO_OPERATION, Phase::Resize).unwrap();
        assert_eq!(z.capacity(), 4);
        assert_eq!(z.nnz(), 0);
        set_scalar(&mut z, 1, NO_OPERATION, Phase::Execute).unwrap();
        assert_eq!(z.nnz(), 4);
    }

    #[test]
    fn test_set_copy_and_dense_check() {
        let x = sparse(5, &[(1, 10), (4, 40)]);
        let mut z = sparse(5, &[(0, 1)]);
        set(&mut z, &x, NO_OPERATION, Phase::Execute).unwrap();
        assert_eq!(z.to_sorted_pairs(), x.to_sorted_pairs());

        let err = set(&mut z, &x, DENSE, Phase::Execute).unwrap_err();
        assert_eq!(err, Error::NotDense { op: "set" });
    }

    #[test]
    fn test_set_masked() {
        let x = Vector::from_dense(vec![1, 2, 3, 4]);
        let mut mask = Vector::<bool>::new(4);
        mask.set_element(0, true).unwrap();
        mask.set_element(2, true).unwrap();
        let mut z = Vector::new(4);
        set_masked(&mut z, &mask, &x, NO_OPERATION, Phase::Execute).unwrap();
        assert_eq!(z.to_sorted_pairs(), vec![(0, 1), (2, 3)]);

        set_scalar_masked(&mut z, &mask, 9, NO_OPERATION, Phase::Execute).unwrap();
        assert_eq!(z.to_sorted_pairs(), vec![(0, 9), (2, 9)]);
    }

    #[test]
    fn test_set_use_index() {
        let x = sparse(6, &[(2, 0), (5, 0)]);
        let mut z = Vector::<u64>::new(6);
        set_use_index(&mut z, &x, NO_OPERATION, Phase::Execute).unwrap();
        assert_eq!(z.to_sorted_pairs(), vec![(2, 2), (5, 5)]);

        let mut again = Vector::<u64>::new(6);
        set_use_index(&mut again, &x, USE_INDEX, Phase::Execute).unwrap();
        assert_eq!(again.to_sorted_pairs(), z.to_sorted_pairs());
    }

    #[test]
    fn test_value_copying_set_rejects_use_index() {
        let x = sparse(6, &[(5, 100), (2, 200)]);
        let mut z = sparse(6, &[(0, 7)]);
        let err = set(&mut z, &x, USE_INDEX, Phase::Execute).unwrap_err();
        assert_eq!(err.rc(), Rc::Unsupported);
        assert_eq!(z.to_sorted_pairs(), vec![(0, 7)]);

        let mask = Vector::filled(6, true);
        assert!(set_masked(&mut z, &mask, &x, USE_INDEX, Phase::Execute).is_err());
        assert!(set_scalar(&mut z, 1, USE_INDEX, Phase::Execute).is_err());
        assert!(set_scalar_masked(&mut z, &mask, 1, USE_INDEX, Phase::Execute).is_err());
        assert_eq!(z.to_sorted_pairs(), vec![(0, 7)]);
    }

    #[test]
    fn test_foldl_vectors() {
        let mut z = sparse(5, &[(0, 1), (2, 2)]);
        let x = sparse(5, &[(2, 10), (3, 30)]);
        foldl(&mut z, &x, Add::<i32>::new(), NO_OPERATION, Phase::Execute).unwrap();
        assert_eq!(z.to_sorted_pairs(), vec![(0, 1), (2, 12), (3, 30)]);
    }

    #[test]
    fn test_foldr_order() {
        let mut z = sparse(3, &[(0, 10)]);
        let x = sparse(3, &[(0, 3)]);
        foldr(&x, &mut z, Subtract::<i32>::new(), NO_OPERATION, Phase::Execute).unwrap();
        assert_eq!(z.get(0), Some(&-7));
        foldl(&mut z, &x, Subtract::<i32>::new(), NO_OPERATION, Phase::Execute).unwrap();
        assert_eq!(z.get(0), Some(&-10));
    }

    #[test]
    fn test_foldl_dense_descriptor() {
        let mut z = Vector::from_dense(vec![1, 2]);
        let x = sparse(2, &[(0, 1)]);
        let err = foldl(&mut z, &x, Add::<i32>::new(), DENSE, Phase::Execute).unwrap_err();
        assert_eq!(err.rc(), Rc::Illegal);
    }

    #[test]
    fn test_foldl_scalar() {
        let mut z = sparse(4, &[(1, 5), (3, 1)]);
        foldl_scalar(&mut z, &3, Max::<i32>::new(), NO_OPERATION).unwrap();
        assert_eq!(z.to_sorted_pairs(), vec![(1, 5), (3, 3)]);
    }

    #[test]
    fn test_fold_to_scalar() {
        let x = sparse(6, &[(0, 4), (3, -2), (5, 7)]);
        let mut alpha = 1;
        foldl_to_scalar(&mut alpha, &x, PlusMonoid::<i32>::new(), NO_OPERATION).unwrap();
        assert_eq!(alpha, 10);

        let mut lowest = i32::MAX;
        foldr_to_scalar(&x, &mut lowest, MinMonoid::<i32>::new(), NO_OPERATION).unwrap();
        assert_eq!(lowest, -2);

        let err = foldl_to_scalar(&mut alpha, &x, PlusMonoid::<i32>::new(), DENSE).unwrap_err();
        assert_eq!(err.rc(), Rc::Illegal);
    }

    #[test]
    fn test_e_wise_apply_intersection() {
        let x = sparse(5, &[(0, 1), (1, 2), (3, 4)]);
        let y = sparse(5, &[(1, 10), (3, 20), (4, 30)]);
        let mut z = sparse(5, &[(0, 99)]);
        e_wise_apply(&mut z, &x, &y, Mul::<i32>::new(), NO_OPERATION, Phase::Execute).unwrap();
        assert_eq!(z.to_sorted_pairs(), vec![(1, 20), (3, 80)]);
    }

    #[test]
    fn test_e_wise_apply_monoid_union() {
        let x = sparse(4, &[(0, 1), (1, 2)]);
        let y = sparse(4, &[(1, 10), (2, 20)]);
        let mut z = Vector::new(4);
        e_wise_apply_monoid(&mut z, &x, &y, PlusMonoid::<i32>::new(), NO_OPERATION, Phase::Execute)
            .unwrap();
        assert_eq!(z.to_sorted_pairs(), vec![(0, 1), (1, 12), (2, 20), (3, 0)]);
    }

    #[test]
    fn test_e_wise_apply_masked() {
        let x = Vector::from_dense(vec![1, 2, 3]);
        let y = Vector::from_dense(vec![4, 5, 6]);
        let mask = sparse(3, &[(0, 1), (1, 0)]);
        let mut z = Vector::new(3);
        e_wise_apply_masked(&mut z, &mask, &x, &y, Add::<i32>::new(), NO_OPERATION, Phase::Execute)
            .unwrap();
        assert_eq!(z.to_sorted_pairs(), vec![(0, 5)]);
    }

    #[test]
    fn test_e_wise_add_and_mul() {
        let ring = PlusTimes::<i32>::new();
        let x = sparse(4, &[(0, 1), (1, 2)]);
        let y = sparse(4, &[(1, 3), (2, 4)]);

        let mut z = sparse(4, &[(1, 100), (3, 7)]);
        e_wise_add(&mut z, &x, &y, ring, NO_OPERATION, Phase::Execute).unwrap();
        assert_eq!(z.to_sorted_pairs(), vec![(0, 1), (1, 105), (2, 4), (3, 7)]);

        let mut z = sparse(4, &[(1, 100)]);
        e_wise_mul(&mut z, &x, &y, ring, NO_OPERATION, Phase::Execute).unwrap();
        assert_eq!(z.to_sorted_pairs(), vec![(1, 106)]);
    }

    #[test]
    fn test_dot_disjoint_keeps_alpha() {
        let x = sparse(4, &[(0, 1)]);
        let y = sparse(4, &[(3, 1)]);
        let mut alpha = 5;
        dot(&mut alpha, &x, &y, PlusTimes::<i32>::new(), NO_OPERATION).unwrap();
        assert_eq!(alpha, 5);
    }

    #[test]
    fn test_dot_improper() {
        let x = Vector::from_dense(vec![1.0f64, 2.0, 3.0]);
        let y = Vector::from_dense(vec![1.0f64, 1.0, 1.0]);
        let mut alpha = 0.0;
        dot_with(&mut alpha, &x, &y, PlusMonoid::<f64>::new(), Mul::<f64>::new(), NO_OPERATION).unwrap();
        assert_eq!(alpha, 6.0);
    }

    #[test]
    fn test_e_wise_lambda() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let x = sparse(10, &[(2, 0), (7, 0)]);
        let sum = AtomicUsize::new(0);
        e_wise_lambda(|i| {
            sum.fetch_add(i, Ordering::Relaxed);
        }, &x)
        .unwrap();
        assert_eq!(sum.load(Ordering::Relaxed), 9);

        let mut y = Vector::from_dense(vec![1, 1, 1]);
        e_wise_lambda_mut(|i, v| *v += i as i32, &mut y).unwrap();
        assert_eq!(y.to_sorted_pairs(), vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn test_size_mismatch() {
        let mut z = Vector::<i32>::new(3);
        let x = Vector::<i32>::new(4);
        let err = set(&mut z, &x, NO_OPERATION, Phase::Execute).unwrap_err();
        assert_eq!(err.rc(), Rc::Mismatch);
    }
}
