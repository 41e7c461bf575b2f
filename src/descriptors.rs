//! Descriptors select semantic variants of a primitive
//!
//! A [`Descriptor`] is a bitmask; descriptors compose with `|`. Primitives
//! inspect individual bits and ignore any bit they do not know about.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A set of descriptor bits
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Descriptor(u32);

/// Default: no special semantics
pub const NO_OPERATION: Descriptor = Descriptor(0);

/// A mask entry `m` means "skip `i` iff `m` evaluates true"
pub const INVERT_MASK: Descriptor = Descriptor(1);

/// Operate on the transpose of the matrix argument
pub const TRANSPOSE_MATRIX: Descriptor = Descriptor(2);

/// Input index lists are free of duplicates; a violation is illegal
pub const NO_DUPLICATES: Descriptor = Descriptor(4);

/// The mask tests presence only, ignoring values
pub const STRUCTURAL: Descriptor = Descriptor(8);

/// Shorthand for `STRUCTURAL | INVERT_MASK`
pub const STRUCTURAL_COMPLEMENT: Descriptor = Descriptor(8 | 1);

/// Every referenced container is fully populated
pub const DENSE: Descriptor = Descriptor(16);

/// Set-style primitives write the index `i` at position `i`
pub const USE_INDEX: Descriptor = Descriptor(64);

/// Forbid implicit conversions between container types and operator domains
///
/// Containers and operators are typed, so this bit always holds: a domain
/// mismatch is a type error at the call site.
pub const NO_CASTING: Descriptor = Descriptor(256);

/// Reserved for fusion hints of `mxv`/`vxm`
pub const IN_PLACE: Descriptor = Descriptor(8192);

/// Largest value any combination of the recognised bits can take
pub const MAX_DESCRIPTOR_VALUE: u32 = 16383;

const NAMES: [(Descriptor, &str); 9] = [
    (INVERT_MASK, "invert_mask"),
    (TRANSPOSE_MATRIX, "transpose_matrix"),
    (NO_DUPLICATES, "no_duplicates"),
    (STRUCTURAL, "structural"),
    (DENSE, "dense"),
    (USE_INDEX, "use_index"),
    (NO_CASTING, "no_casting"),
    (IN_PLACE, "in_place"),
    (NO_OPERATION, "no_operation"),
];

impl Descriptor {
    /// Wraps raw bits; unknown bits are retained and ignored
    pub const fn from_bits(bits: u32) -> Self {
        Descriptor(bits)
    }

    /// The raw bits
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every bit of `other` is set in `self`
    pub const fn contains(self, other: Descriptor) -> bool {
        self.0 & other.0 == other.0
    }

    /// The union of two descriptors
    pub const fn union(self, other: Descriptor) -> Descriptor {
        Descriptor(self.0 | other.0)
    }

    /// `self` with the bits of `other` toggled
    pub const fn toggle(self, other: Descriptor) -> Descriptor {
        Descriptor(self.0 ^ other.0)
    }

    /// `self` with the bits of `other` cleared
    pub const fn without(self, other: Descriptor) -> Descriptor {
        Descriptor(self.0 & !other.0)
    }

    pub(crate) fn is_dense(self) -> bool {
        self.contains(DENSE)
    }

    pub(crate) fn is_transposed(self) -> bool {
        self.contains(TRANSPOSE_MATRIX)
    }

    pub(crate) fn is_structural(self) -> bool {
        self.contains(STRUCTURAL)
    }

    pub(crate) fn inverts_mask(self) -> bool {
        self.contains(INVERT_MASK)
    }

    pub(crate) fn uses_index(self) -> bool {
        self.contains(USE_INDEX)
    }
}

impl BitOr for Descriptor {
    type Output = Descriptor;

    fn bitor(self, rhs: Descriptor) -> Descriptor {
        self.union(rhs)
    }
}

impl BitOrAssign for Descriptor {
    fn bitor_assign(&mut self, rhs: Descriptor) {
        *self = self.union(rhs);
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("Descriptor(no_operation)");
        }
        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(bit, _)| bit.0 != 0 && self.contains(*bit))
            .map(|&(_, name)| name)
            .collect();
        write!(f, "Descriptor({})", names.join(" | "))
    }
}
