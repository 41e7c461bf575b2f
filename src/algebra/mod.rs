//! Algebraic structures: operators, identities, monoids and semirings
//!
//! Properties such as associativity and commutativity are associated
//! constants of [`Operator`]. Building a [`Monoid`] from a non-associative
//! operator, or a [`Semiring`] whose addition does not commute, fails at
//! compile time when the structure is instantiated.

pub mod identities;
pub mod monoid;
pub mod ops;
pub mod semiring;

pub use identities::{
    Extremal, Identity, LogicalFalse, LogicalTrue, NegativeInfinity, One, PositiveInfinity, Zero,
};
pub use monoid::{
    AnyOrMonoid, IsMonoid, LandMonoid, LorMonoid, MaxMonoid, MinMonoid, Monoid, PlusMonoid,
    TimesMonoid,
};
pub use ops::{
    AbsDiff, Add, AnyOr, Divide, Equal, GreaterThan, HomogeneousOperator, LeftAssign, LessThan,
    LogicalAnd, LogicalOr, Max, Min, Mul, NotEqual, Operator, RightAssign, Subtract,
};
pub use semiring::{IsSemiring, LorLand, MaxPlus, MaxTimes, MinPlus, PlusTimes, Semiring};
