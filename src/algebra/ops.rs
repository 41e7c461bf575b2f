//! Binary operators and their static properties
//!
//! An operator maps `D1 × D2 → D3`. Its algebraic properties are associated
//! constants, so monoid and semiring construction can reject an unsuitable
//! operator when the generic code is instantiated.

use std::fmt;
use std::marker::PhantomData;
use std::ops;

use crate::types::{Scalar, Truthy};

/// A binary operator `D1 × D2 → D3`
pub trait Operator: Copy + Default + fmt::Debug + Send + Sync + 'static {
    /// Domain of the left-hand input
    type D1: Scalar;
    /// Domain of the right-hand input
    type D2: Scalar;
    /// Domain of the output
    type D3: Scalar;

    /// Short name used in log output
    const NAME: &'static str;
    /// `(x ⊙ y) ⊙ z = x ⊙ (y ⊙ z)`
    const ASSOCIATIVE: bool;
    /// `x ⊙ y = y ⊙ x`
    const COMMUTATIVE: bool;
    /// `x ⊙ x = x`
    const IDEMPOTENT: bool = false;
    /// The additive zero annihilates under this operator
    const HAS_ANNIHILATOR: bool = false;
    /// The operator may run on pattern (valueless) containers
    const PATTERN_SAFE: bool = false;

    /// Out-of-place application: returns `x ⊙ y`
    fn apply(&self, x: &Self::D1, y: &Self::D2) -> Self::D3;

    /// In-place left fold: `z ← z ⊙ y`
    #[inline]
    fn foldl(&self, z: &mut Self::D3, y: &Self::D2)
    where
        Self::D3: Into<Self::D1>,
    {
        let left: Self::D1 = z.clone().into();
        *z = self.apply(&left, y);
    }

    /// In-place right fold: `z ← x ⊙ z`
    #[inline]
    fn foldr(&self, x: &Self::D1, z: &mut Self::D3)
    where
        Self::D3: Into<Self::D2>,
    {
        let right: Self::D2 = z.clone().into();
        *z = self.apply(x, &right);
    }

    /// Element-wise application over equal-length buffers
    ///
    /// # Panics
    ///
    /// Panics if the buffers differ in length.
    fn e_wise_apply(&self, x: &[Self::D1], y: &[Self::D2], out: &mut [Self::D3]) {
        assert_eq!(x.len(), y.len(), "input buffers must have equal length");
        assert_eq!(x.len(), out.len(), "output buffer must match the inputs");
        for ((a, b), z) in x.iter().zip(y).zip(out.iter_mut()) {
            *z = self.apply(a, b);
        }
    }
}

/// Operators whose three domains coincide
pub trait HomogeneousOperator<T>: Operator<D1 = T, D2 = T, D3 = T> {}

impl<T, Op: Operator<D1 = T, D2 = T, D3 = T>> HomogeneousOperator<T> for Op {}

macro_rules! operator_type {
    ($(#[$doc:meta])* $name:ident<$t:ident>) => {
        $(#[$doc])*
        pub struct $name<$t>(PhantomData<fn() -> $t>);

        operator_type!(@impls $name<$t>);
    };
    ($(#[$doc:meta])* $name:ident<$t:ident, $r:ident = $default:ident>) => {
        $(#[$doc])*
        pub struct $name<$t, $r = $default>(PhantomData<fn() -> ($t, $r)>);

        operator_type!(@impls $name<$t, $r>);
    };
    (@impls $name:ident<$($p:ident),+>) => {
        impl<$($p),+> $name<$($p),+> {
            /// Creates the operator
            pub const fn new() -> Self {
                $name(PhantomData)
            }
        }

        impl<$($p),+> Clone for $name<$($p),+> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<$($p),+> Copy for $name<$($p),+> {}

        impl<$($p),+> Default for $name<$($p),+> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<$($p),+> fmt::Debug for $name<$($p),+> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(stringify!($name))
            }
        }
    };
}

operator_type!(
    /// `x + y`
    Add<T>
);
operator_type!(
    /// `x * y`
    Mul<T>
);
operator_type!(
    /// The smaller of `x` and `y`
    Min<T>
);
operator_type!(
    /// The larger of `x` and `y`
    Max<T>
);
operator_type!(
    /// Returns `x`, discarding `y`
    LeftAssign<T>
);
operator_type!(
    /// Returns `y`, discarding `x`
    RightAssign<T>
);
operator_type!(
    /// `x - y`
    Subtract<T>
);
operator_type!(
    /// `x / y`
    Divide<T>
);
operator_type!(
    /// `|x - y|`
    AbsDiff<T>
);
operator_type!(
    /// `x` if it evaluates true, otherwise `y`
    AnyOr<T>
);
operator_type!(
    /// `x ∨ y`, written back as a value of the input domain
    LogicalOr<T>
);
operator_type!(
    /// `x ∧ y`, written back as a value of the input domain
    LogicalAnd<T>
);
operator_type!(
    /// `x == y`, converted to the result domain
    Equal<T, R = T>
);
operator_type!(
    /// `x != y`, converted to the result domain
    NotEqual<T, R = T>
);
operator_type!(
    /// `x < y`, converted to the result domain
    LessThan<T, R = T>
);
operator_type!(
    /// `x > y`, converted to the result domain
    GreaterThan<T, R = T>
);

impl<T: Scalar + ops::Add<Output = T>> Operator for Add<T> {
    type D1 = T;
    type D2 = T;
    type D3 = T;

    const NAME: &'static str = "add";
    const ASSOCIATIVE: bool = true;
    const COMMUTATIVE: bool = true;

    #[inline]
    fn apply(&self, x: &T, y: &T) -> T {
        x.clone() + y.clone()
    }
}

impl<T: Scalar + ops::Mul<Output = T>> Operator for Mul<T> {
    type D1 = T;
    type D2 = T;
    type D3 = T;

    const NAME: &'static str = "mul";
    const ASSOCIATIVE: bool = true;
    const COMMUTATIVE: bool = true;
    const HAS_ANNIHILATOR: bool = true;

    #[inline]
    fn apply(&self, x: &T, y: &T) -> T {
        x.clone() * y.clone()
    }
}

impl<T: Scalar + PartialOrd> Operator for Min<T> {
    type D1 = T;
    type D2 = T;
    type D3 = T;

    const NAME: &'static str = "min";
    const ASSOCIATIVE: bool = true;
    const COMMUTATIVE: bool = true;
    const IDEMPOTENT: bool = true;

    #[inline]
    fn apply(&self, x: &T, y: &T) -> T {
        if y < x {
            y.clone()
        } else {
            x.clone()
        }
    }
}

impl<T: Scalar + PartialOrd> Operator for Max<T> {
    type D1 = T;
    type D2 = T;
    type D3 = T;

    const NAME: &'static str = "max";
    const ASSOCIATIVE: bool = true;
    const COMMUTATIVE: bool = true;
    const IDEMPOTENT: bool = true;

    #[inline]
    fn apply(&self, x: &T, y: &T) -> T {
        if y > x {
            y.clone()
        } else {
            x.clone()
        }
    }
}

impl<T: Scalar> Operator for LeftAssign<T> {
    type D1 = T;
    type D2 = T;
    type D3 = T;

    const NAME: &'static str = "left_assign";
    const ASSOCIATIVE: bool = true;
    const COMMUTATIVE: bool = false;
    const IDEMPOTENT: bool = true;
    const PATTERN_SAFE: bool = true;

    #[inline]
    fn apply(&self, x: &T, _: &T) -> T {
        x.clone()
    }
}

impl<T: Scalar> Operator for RightAssign<T> {
    type D1 = T;
    type D2 = T;
    type D3 = T;

    const NAME: &'static str = "right_assign";
    const ASSOCIATIVE: bool = true;
    const COMMUTATIVE: bool = false;
    const IDEMPOTENT: bool = true;
    const PATTERN_SAFE: bool = true;

    #[inline]
    fn apply(&self, _: &T, y: &T) -> T {
        y.clone()
    }
}

impl<T: Scalar + ops::Sub<Output = T>> Operator for Subtract<T> {
    type D1 = T;
    type D2 = T;
    type D3 = T;

    const NAME: &'static str = "subtract";
    const ASSOCIATIVE: bool = false;
    const COMMUTATIVE: bool = false;

    #[inline]
    fn apply(&self, x: &T, y: &T) -> T {
        x.clone() - y.clone()
    }
}

impl<T: Scalar + ops::Div<Output = T>> Operator for Divide<T> {
    type D1 = T;
    type D2 = T;
    type D3 = T;

    const NAME: &'static str = "divide";
    const ASSOCIATIVE: bool = false;
    const COMMUTATIVE: bool = false;

    #[inline]
    fn apply(&self, x: &T, y: &T) -> T {
        x.clone() / y.clone()
    }
}

impl<T: Scalar + PartialOrd + ops::Sub<Output = T>> Operator for AbsDiff<T> {
    type D1 = T;
    type D2 = T;
    type D3 = T;

    const NAME: &'static str = "abs_diff";
    const ASSOCIATIVE: bool = false;
    const COMMUTATIVE: bool = true;

    #[inline]
    fn apply(&self, x: &T, y: &T) -> T {
        if x > y {
            x.clone() - y.clone()
        } else {
            y.clone() - x.clone()
        }
    }
}

impl<T: Scalar + Truthy> Operator for AnyOr<T> {
    type D1 = T;
    type D2 = T;
    type D3 = T;

    const NAME: &'static str = "any_or";
    const ASSOCIATIVE: bool = true;
    const COMMUTATIVE: bool = true;
    const IDEMPOTENT: bool = true;

    #[inline]
    fn apply(&self, x: &T, y: &T) -> T {
        if x.truthy() {
            x.clone()
        } else {
            y.clone()
        }
    }
}

impl<T: Scalar + Truthy + From<bool>> Operator for LogicalOr<T> {
    type D1 = T;
    type D2 = T;
    type D3 = T;

    const NAME: &'static str = "logical_or";
    const ASSOCIATIVE: bool = true;
    const COMMUTATIVE: bool = true;
    const IDEMPOTENT: bool = true;
    const PATTERN_SAFE: bool = true;

    #[inline]
    fn apply(&self, x: &T, y: &T) -> T {
        T::from(x.truthy() || y.truthy())
    }
}

impl<T: Scalar + Truthy + From<bool>> Operator for LogicalAnd<T> {
    type D1 = T;
    type D2 = T;
    type D3 = T;

    const NAME: &'static str = "logical_and";
    const ASSOCIATIVE: bool = true;
    const COMMUTATIVE: bool = true;
    const IDEMPOTENT: bool = true;
    const HAS_ANNIHILATOR: bool = true;
    const PATTERN_SAFE: bool = true;

    #[inline]
    fn apply(&self, x: &T, y: &T) -> T {
        T::from(x.truthy() && y.truthy())
    }
}

impl<T: Scalar + PartialEq, R: Scalar + From<bool>> Operator for Equal<T, R> {
    type D1 = T;
    type D2 = T;
    type D3 = R;

    const NAME: &'static str = "equal";
    const ASSOCIATIVE: bool = true;
    const COMMUTATIVE: bool = true;

    #[inline]
    fn apply(&self, x: &T, y: &T) -> R {
        R::from(x == y)
    }
}

impl<T: Scalar + PartialEq, R: Scalar + From<bool>> Operator for NotEqual<T, R> {
    type D1 = T;
    type D2 = T;
    type D3 = R;

    const NAME: &'static str = "not_equal";
    const ASSOCIATIVE: bool = true;
    const COMMUTATIVE: bool = true;

    #[inline]
    fn apply(&self, x: &T, y: &T) -> R {
        R::from(x != y)
    }
}

impl<T: Scalar + PartialOrd, R: Scalar + From<bool>> Operator for LessThan<T, R> {
    type D1 = T;
    type D2 = T;
    type D3 = R;

    const NAME: &'static str = "less_than";
    const ASSOCIATIVE: bool = false;
    const COMMUTATIVE: bool = false;

    #[inline]
    fn apply(&self, x: &T, y: &T) -> R {
        R::from(x < y)
    }
}

impl<T: Scalar + PartialOrd, R: Scalar + From<bool>> Operator for GreaterThan<T, R> {
    type D1 = T;
    type D2 = T;
    type D3 = R;

    const NAME: &'static str = "greater_than";
    const ASSOCIATIVE: bool = false;
    const COMMUTATIVE: bool = false;

    #[inline]
    fn apply(&self, x: &T, y: &T) -> R {
        R::from(x > y)
    }
}
