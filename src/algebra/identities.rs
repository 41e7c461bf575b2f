//! Identity generators
//!
//! An identity is a marker type that yields the identity value of a monoid for
//! every type it supports. `Zero` yields `0` for numbers, `PositiveInfinity`
//! yields `+∞` for floats and the maximum for integers, and so on.

use std::fmt;

/// Generates the identity value for the type `T`
pub trait Identity<T>: Copy + Default + fmt::Debug + Send + Sync + 'static {
    /// The identity value
    fn value() -> T;
}

/// Numeric extremes used by the infinity identities
///
/// Integers use their bounds; floating-point types use true infinities.
pub trait Extremal {
    /// The largest representable value (`+∞` where available)
    fn positive_infinity() -> Self;
    /// The smallest representable value (`-∞` where available)
    fn negative_infinity() -> Self;
}

macro_rules! extremal_int {
    ($($t:ty),*) => {
        $(
            impl Extremal for $t {
                fn positive_infinity() -> Self {
                    <$t as num_traits::Bounded>::max_value()
                }
                fn negative_infinity() -> Self {
                    <$t as num_traits::Bounded>::min_value()
                }
            }
        )*
    };
}

macro_rules! extremal_float {
    ($($t:ty),*) => {
        $(
            impl Extremal for $t {
                fn positive_infinity() -> Self {
                    <$t as num_traits::Float>::infinity()
                }
                fn negative_infinity() -> Self {
                    <$t as num_traits::Float>::neg_infinity()
                }
            }
        )*
    };
}

extremal_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
extremal_float!(f32, f64);

impl Extremal for bool {
    fn positive_infinity() -> Self {
        true
    }
    fn negative_infinity() -> Self {
        false
    }
}

/// The additive identity `0`
#[derive(Debug, Clone, Copy, Default)]
pub struct Zero;

/// The multiplicative identity `1`
#[derive(Debug, Clone, Copy, Default)]
pub struct One;

/// Identity of `min`
#[derive(Debug, Clone, Copy, Default)]
pub struct PositiveInfinity;

/// Identity of `max`
#[derive(Debug, Clone, Copy, Default)]
pub struct NegativeInfinity;

/// Identity of logical or
#[derive(Debug, Clone, Copy, Default)]
pub struct LogicalFalse;

/// Identity of logical and
#[derive(Debug, Clone, Copy, Default)]
pub struct LogicalTrue;

impl<T: num_traits::Zero> Identity<T> for Zero {
    #[inline]
    fn value() -> T {
        T::zero()
    }
}

impl<T: num_traits::One> Identity<T> for One {
    #[inline]
    fn value() -> T {
        T::one()
    }
}

impl<T: Extremal> Identity<T> for PositiveInfinity {
    #[inline]
    fn value() -> T {
        T::positive_infinity()
    }
}

impl<T: Extremal> Identity<T> for NegativeInfinity {
    #[inline]
    fn value() -> T {
        T::negative_infinity()
    }
}

impl<T: From<bool>> Identity<T> for LogicalFalse {
    #[inline]
    fn value() -> T {
        T::from(false)
    }
}

impl<T: From<bool>> Identity<T> for LogicalTrue {
    #[inline]
    fn value() -> T {
        T::from(true)
    }
}
