//! Monoids: an associative operator paired with an identity

use std::fmt;
use std::marker::PhantomData;

use super::identities::{
    Identity, LogicalFalse, LogicalTrue, NegativeInfinity, One, PositiveInfinity, Zero,
};
use super::ops::{Add, AnyOr, LogicalAnd, LogicalOr, Max, Min, Mul, Operator};
use crate::types::Scalar;

pub(crate) struct AssociativityCheck<Op>(PhantomData<Op>);

impl<Op: Operator> AssociativityCheck<Op> {
    pub(crate) const OK: () = assert!(
        Op::ASSOCIATIVE,
        "a monoid cannot be built from a non-associative operator"
    );
}

/// A monoid over the domain of `Op`, with identity generator `Id`
///
/// Instantiating a monoid over an operator whose `ASSOCIATIVE` property is
/// false fails to compile.
pub struct Monoid<Op, Id> {
    op: Op,
    _identity: PhantomData<Id>,
}

impl<T, Op, Id> Monoid<Op, Id>
where
    T: Scalar,
    Op: Operator<D1 = T, D2 = T, D3 = T>,
    Id: Identity<T>,
{
    /// Creates the monoid
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = AssociativityCheck::<Op>::OK;
        Self {
            op: Op::default(),
            _identity: PhantomData,
        }
    }

    /// The identity, generated for an arbitrary type `U` the generator supports
    pub fn get_identity<U>(&self) -> U
    where
        Id: Identity<U>,
    {
        Id::value()
    }
}

impl<Op: Copy, Id> Clone for Monoid<Op, Id> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Op: Copy, Id> Copy for Monoid<Op, Id> {}

impl<T, Op, Id> Default for Monoid<Op, Id>
where
    T: Scalar,
    Op: Operator<D1 = T, D2 = T, D3 = T>,
    Id: Identity<T>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Op: fmt::Debug, Id: fmt::Debug + Default> fmt::Debug for Monoid<Op, Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monoid")
            .field("op", &self.op)
            .field("identity", &Id::default())
            .finish()
    }
}

/// Interface that primitives require of a monoid argument
pub trait IsMonoid: Copy + Default + fmt::Debug + Send + Sync + 'static {
    /// The single domain of the monoid
    type D: Scalar;
    /// The underlying operator
    type Op: Operator<D1 = Self::D, D2 = Self::D, D3 = Self::D>;

    /// The underlying operator
    fn operator(&self) -> Self::Op;

    /// The identity of the operator
    fn identity(&self) -> Self::D;

    /// `x ⊙ y`
    #[inline]
    fn apply(&self, x: &Self::D, y: &Self::D) -> Self::D {
        self.operator().apply(x, y)
    }

    /// `z ← z ⊙ y`
    #[inline]
    fn fold(&self, z: &mut Self::D, y: &Self::D) {
        *z = self.apply(z, y);
    }
}

impl<T, Op, Id> IsMonoid for Monoid<Op, Id>
where
    T: Scalar,
    Op: Operator<D1 = T, D2 = T, D3 = T>,
    Id: Identity<T>,
{
    type D = T;
    type Op = Op;

    #[inline]
    fn operator(&self) -> Op {
        #[allow(clippy::let_unit_value)]
        let () = AssociativityCheck::<Op>::OK;
        self.op
    }

    #[inline]
    fn identity(&self) -> T {
        Id::value()
    }
}

/// `(+, 0)`
pub type PlusMonoid<T> = Monoid<Add<T>, Zero>;
/// `(*, 1)`
pub type TimesMonoid<T> = Monoid<Mul<T>, One>;
/// `(min, +∞)`
pub type MinMonoid<T> = Monoid<Min<T>, PositiveInfinity>;
/// `(max, -∞)`
pub type MaxMonoid<T> = Monoid<Max<T>, NegativeInfinity>;
/// `(∨, false)`
pub type LorMonoid<T> = Monoid<LogicalOr<T>, LogicalFalse>;
/// `(∧, true)`
pub type LandMonoid<T> = Monoid<LogicalAnd<T>, LogicalTrue>;
/// `(any_or, 0)`
pub type AnyOrMonoid<T> = Monoid<AnyOr<T>, Zero>;
