//! Value-type traits shared by containers, masks and operators

/// Bounds every container value type satisfies
///
/// The unit type `()` is a valid scalar: containers over `()` are pattern
/// containers that only carry structure.
pub trait Scalar: Clone + Default + Send + Sync + 'static {}

impl<T: Clone + Default + Send + Sync + 'static> Scalar for T {}

/// Interpretation of a value as a mask entry or a logical operand
pub trait Truthy {
    /// Whether the value evaluates true
    fn truthy(&self) -> bool;
}

impl Truthy for bool {
    fn truthy(&self) -> bool {
        *self
    }
}

/// Pattern entries are true wherever they are present
impl Truthy for () {
    fn truthy(&self) -> bool {
        true
    }
}

macro_rules! truthy_numeric {
    ($($t:ty),*) => {
        $(
            impl Truthy for $t {
                #[inline]
                fn truthy(&self) -> bool {
                    *self != (0 as $t)
                }
            }
        )*
    };
}

truthy_numeric!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

/// Conversion of a vector index into a value type, used by `USE_INDEX`
pub trait FromIndex {
    /// Converts the index `i`
    fn from_index(i: usize) -> Self;
}

macro_rules! from_index_numeric {
    ($($t:ty),*) => {
        $(
            impl FromIndex for $t {
                #[inline]
                fn from_index(i: usize) -> Self {
                    i as $t
                }
            }
        )*
    };
}

from_index_numeric!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl FromIndex for () {
    fn from_index(_: usize) -> Self {}
}

/// Value types that carry a value, which excludes the pattern type `()`
pub trait Valued: Scalar {}

macro_rules! valued {
    ($($t:ty),*) => {
        $(impl Valued for $t {})*
    };
}

valued!(bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);
