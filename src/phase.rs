//! Execution phases of a primitive

use crate::error::{Error, Result};
use crate::types::Scalar;
use crate::vector::Vector;

/// Selects whether a primitive adjusts capacity, computes output structure,
/// or computes values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Allocate capacity for the output; logical contents are unchanged
    Resize,
    /// Perform the operation
    #[default]
    Execute,
    /// Determine the output structure. The blocking backends treat this as
    /// [`Phase::Execute`].
    Symbolic,
}

impl Phase {
    /// Whether the primitive should produce values
    pub fn executes(self) -> bool {
        !matches!(self, Phase::Resize)
    }
}

/// Capacity handling shared by every vector-producing primitive
///
/// In the resize phase, grows the capacity of `out` to hold `required`
/// nonzeroes. In the other phases, fails with [`Error::Illegal`] when the
/// capacity is insufficient.
pub(crate) fn reserve_output<T: Scalar>(
    op: &'static str,
    out: &mut Vector<T>,
    required: usize,
    phase: Phase,
) -> Result<()> {
    let required = required.min(out.size());
    match phase {
        Phase::Resize => {
            out.grow_capacity(required);
            Ok(())
        }
        Phase::Execute | Phase::Symbolic => {
            if required > out.capacity() {
                Err(Error::illegal(
                    op,
                    format!(
                        "output capacity {} is below the {} nonzeroes required",
                        out.capacity(),
                        required
                    ),
                ))
            } else {
                Ok(())
            }
        }
    }
}
