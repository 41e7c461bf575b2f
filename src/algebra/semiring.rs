//! Semirings: a commutative additive monoid and a multiplicative monoid

use std::fmt;
use std::marker::PhantomData;

use super::identities::{
    Identity, LogicalFalse, LogicalTrue, NegativeInfinity, One, PositiveInfinity, Zero,
};
use super::monoid::{IsMonoid, Monoid};
use super::ops::{Add, LogicalAnd, LogicalOr, Max, Min, Mul, Operator};
use crate::types::Scalar;

struct SemiringCheck<AddOp, MulOp>(PhantomData<(AddOp, MulOp)>);

impl<AddOp: Operator, MulOp: Operator> SemiringCheck<AddOp, MulOp> {
    const OK: () = {
        assert!(
            AddOp::ASSOCIATIVE,
            "the additive operator of a semiring must be associative"
        );
        assert!(
            AddOp::COMMUTATIVE,
            "the additive operator of a semiring must be commutative"
        );
        assert!(
            MulOp::ASSOCIATIVE,
            "the multiplicative operator of a semiring must be associative"
        );
    };
}

/// A semiring `(⊕, ⊗, 0, 1)` over a single domain
///
/// The type parameters name the additive operator, the multiplicative
/// operator, and the identity generators of both. All four must agree on the
/// domain; the additive operator must be associative and commutative.
///
/// # Examples
///
/// | Semiring | ⊕ | ⊗ | 0 | 1 |
/// |----------|---|---|---|---|
/// | [`PlusTimes`] | + | × | 0 | 1 |
/// | [`MinPlus`]   | min | + | +∞ | 0 |
/// | [`MaxPlus`]   | max | + | -∞ | 0 |
/// | [`MaxTimes`]  | max | × | 0 | 1 |
/// | [`LorLand`]   | ∨ | ∧ | false | true |
pub struct Semiring<AddOp, MulOp, ZeroId, OneId> {
    add: AddOp,
    mul: MulOp,
    _identities: PhantomData<(ZeroId, OneId)>,
}

impl<T, AddOp, MulOp, ZeroId, OneId> Semiring<AddOp, MulOp, ZeroId, OneId>
where
    T: Scalar,
    AddOp: Operator<D1 = T, D2 = T, D3 = T>,
    MulOp: Operator<D1 = T, D2 = T, D3 = T>,
    ZeroId: Identity<T>,
    OneId: Identity<T>,
{
    /// Creates the semiring
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = SemiringCheck::<AddOp, MulOp>::OK;
        Self {
            add: AddOp::default(),
            mul: MulOp::default(),
            _identities: PhantomData,
        }
    }

    /// The additive identity converted to an arbitrary supported type
    pub fn get_zero<U>(&self) -> U
    where
        ZeroId: Identity<U>,
    {
        ZeroId::value()
    }

    /// The multiplicative identity converted to an arbitrary supported type
    pub fn get_one<U>(&self) -> U
    where
        OneId: Identity<U>,
    {
        OneId::value()
    }
}

impl<AddOp: Copy, MulOp: Copy, ZeroId, OneId> Clone for Semiring<AddOp, MulOp, ZeroId, OneId> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<AddOp: Copy, MulOp: Copy, ZeroId, OneId> Copy for Semiring<AddOp, MulOp, ZeroId, OneId> {}

impl<T, AddOp, MulOp, ZeroId, OneId> Default for Semiring<AddOp, MulOp, ZeroId, OneId>
where
    T: Scalar,
    AddOp: Operator<D1 = T, D2 = T, D3 = T>,
    MulOp: Operator<D1 = T, D2 = T, D3 = T>,
    ZeroId: Identity<T>,
    OneId: Identity<T>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<AddOp: fmt::Debug, MulOp: fmt::Debug, ZeroId, OneId> fmt::Debug
    for Semiring<AddOp, MulOp, ZeroId, OneId>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Semiring")
            .field("add", &self.add)
            .field("mul", &self.mul)
            .finish()
    }
}

/// Interface that primitives require of a semiring argument
pub trait IsSemiring: Copy + Default + fmt::Debug + Send + Sync + 'static {
    /// The single domain of the semiring
    type D: Scalar;
    /// The additive operator `⊕`
    type AddOp: Operator<D1 = Self::D, D2 = Self::D, D3 = Self::D>;
    /// The multiplicative operator `⊗`
    type MulOp: Operator<D1 = Self::D, D2 = Self::D, D3 = Self::D>;
    /// `(⊕, 0)`
    type AdditiveMonoid: IsMonoid<D = Self::D, Op = Self::AddOp>;
    /// `(⊗, 1)`
    type MultiplicativeMonoid: IsMonoid<D = Self::D, Op = Self::MulOp>;

    /// The additive identity
    fn zero(&self) -> Self::D;
    /// The multiplicative identity
    fn one(&self) -> Self::D;
    /// `⊕`
    fn additive_operator(&self) -> Self::AddOp;
    /// `⊗`
    fn multiplicative_operator(&self) -> Self::MulOp;
    /// `(⊕, 0)`
    fn additive_monoid(&self) -> Self::AdditiveMonoid;
    /// `(⊗, 1)`
    fn multiplicative_monoid(&self) -> Self::MultiplicativeMonoid;

    /// `x ⊕ y`
    #[inline]
    fn add(&self, x: &Self::D, y: &Self::D) -> Self::D {
        self.additive_operator().apply(x, y)
    }

    /// `x ⊗ y`
    #[inline]
    fn mul(&self, x: &Self::D, y: &Self::D) -> Self::D {
        self.multiplicative_operator().apply(x, y)
    }
}

impl<T, AddOp, MulOp, ZeroId, OneId> IsSemiring for Semiring<AddOp, MulOp, ZeroId, OneId>
where
    T: Scalar,
    AddOp: Operator<D1 = T, D2 = T, D3 = T>,
    MulOp: Operator<D1 = T, D2 = T, D3 = T>,
    ZeroId: Identity<T>,
    OneId: Identity<T>,
{
    type D = T;
    type AddOp = AddOp;
    type MulOp = MulOp;
    type AdditiveMonoid = Monoid<AddOp, ZeroId>;
    type MultiplicativeMonoid = Monoid<MulOp, OneId>;

    #[inline]
    fn zero(&self) -> T {
        ZeroId::value()
    }

    #[inline]
    fn one(&self) -> T {
        OneId::value()
    }

    #[inline]
    fn additive_operator(&self) -> AddOp {
        #[allow(clippy::let_unit_value)]
        let () = SemiringCheck::<AddOp, MulOp>::OK;
        self.add
    }

    #[inline]
    fn multiplicative_operator(&self) -> MulOp {
        self.mul
    }

    fn additive_monoid(&self) -> Monoid<AddOp, ZeroId> {
        Monoid::new()
    }

    fn multiplicative_monoid(&self) -> Monoid<MulOp, OneId> {
        Monoid::new()
    }
}

/// The standard `(+, ×, 0, 1)` semiring
pub type PlusTimes<T> = Semiring<Add<T>, Mul<T>, Zero, One>;
/// The tropical `(min, +, +∞, 0)` semiring
pub type MinPlus<T> = Semiring<Min<T>, Add<T>, PositiveInfinity, Zero>;
/// The `(max, +, -∞, 0)` semiring
pub type MaxPlus<T> = Semiring<Max<T>, Add<T>, NegativeInfinity, Zero>;
/// The `(max, ×, 0, 1)` semiring over non-negative values
pub type MaxTimes<T> = Semiring<Max<T>, Mul<T>, Zero, One>;
/// The boolean `(∨, ∧, false, true)` semiring
pub type LorLand<T> = Semiring<LogicalOr<T>, LogicalAnd<T>, LogicalFalse, LogicalTrue>;
