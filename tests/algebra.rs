//! Operators, monoids and semirings

use spalg::algebra::{
    AbsDiff, Add, AnyOr, Divide, LessThan, LorMonoid, MaxMonoid, MinMonoid, Mul, Subtract,
    TimesMonoid,
};
use spalg::{IsMonoid, IsSemiring, LorLand, MaxPlus, MinPlus, Operator, PlusMonoid, PlusTimes};

#[test]
fn test_operator_entry_points_agree() {
    let op = Mul::<i64>::new();
    let (x, y) = (6, 7);
    assert_eq!(op.apply(&x, &y), 42);

    let mut left = x;
    op.foldl(&mut left, &y);
    assert_eq!(left, 42);

    let mut right = y;
    op.foldr(&x, &mut right);
    assert_eq!(right, 42);
}

#[test]
fn test_non_commutative_fold_order() {
    let op = Subtract::<i32>::new();
    let mut z = 10;
    op.foldl(&mut z, &3);
    assert_eq!(z, 7);
    let mut z = 10;
    op.foldr(&3, &mut z);
    assert_eq!(z, -7);
    assert!(!<Subtract<i32> as Operator>::ASSOCIATIVE);
    assert!(!<Divide<f64> as Operator>::COMMUTATIVE);
}

#[test]
fn test_supplementary_operators() {
    assert_eq!(AbsDiff::<u32>::new().apply(&3, &10), 7);
    assert_eq!(AbsDiff::<u32>::new().apply(&10, &3), 7);
    assert_eq!(Divide::<f64>::new().apply(&1.0, &4.0), 0.25);
    assert_eq!(AnyOr::<i32>::new().apply(&0, &5), 5);
    assert_eq!(AnyOr::<i32>::new().apply(&2, &5), 2);
    assert!(LessThan::<i32, bool>::new().apply(&1, &2));
    assert!(<AnyOr<i32> as Operator>::IDEMPOTENT);
}

#[test]
fn test_monoid_identities() {
    assert_eq!(PlusMonoid::<i32>::new().identity(), 0);
    assert_eq!(TimesMonoid::<u8>::new().identity(), 1);
    assert_eq!(MinMonoid::<i16>::new().identity(), i16::MAX);
    assert_eq!(MaxMonoid::<i16>::new().identity(), i16::MIN);
    assert_eq!(MinMonoid::<f64>::new().identity(), f64::INFINITY);
    assert_eq!(MaxMonoid::<f32>::new().identity(), f32::NEG_INFINITY);
    assert!(!LorMonoid::<bool>::new().identity());
}

#[test]
fn test_identity_is_neutral() {
    let m = MinMonoid::<i64>::new();
    for v in [-5i64, 0, 17] {
        assert_eq!(m.apply(&m.identity(), &v), v);
        assert_eq!(m.apply(&v, &m.identity()), v);
    }
}

#[test]
fn test_standard_semiring() {
    let ring = PlusTimes::<i32>::new();
    assert_eq!(ring.zero(), 0);
    assert_eq!(ring.one(), 1);
    assert_eq!(ring.add(&2, &3), 5);
    assert_eq!(ring.mul(&2, &3), 6);
    assert_eq!(ring.additive_monoid().identity(), 0);
    assert_eq!(
        ring.additive_operator().apply(&1, &1),
        Add::<i32>::new().apply(&1, &1)
    );
}

#[test]
fn test_tropical_semirings() {
    let min_plus = MinPlus::<f64>::new();
    assert_eq!(min_plus.zero(), f64::INFINITY);
    assert_eq!(min_plus.one(), 0.0);
    assert_eq!(min_plus.add(&3.0, &1.5), 1.5);
    assert_eq!(min_plus.mul(&3.0, &1.5), 4.5);

    let max_plus = MaxPlus::<i32>::new();
    assert_eq!(max_plus.zero(), i32::MIN);
    assert_eq!(max_plus.add(&3, &-1), 3);
}

#[test]
fn test_boolean_semiring() {
    let ring = LorLand::<bool>::new();
    assert!(!ring.zero());
    assert!(ring.one());
    assert!(ring.add(&true, &false));
    assert!(!ring.mul(&true, &false));
}
