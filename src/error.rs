//! Error types and return codes
//!
//! Every primitive returns a [`Result`]. The process-wide return code of a call
//! is recovered with [`Rc::from`], which maps `Ok` to [`Rc::Success`] and an
//! error to its code via [`Error::rc`].

use std::fmt;
use thiserror::Error;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Process-wide return codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rc {
    /// The call completed as specified
    Success,
    /// Out-of-range index, duplicate under `NO_DUPLICATES`, sparse operand under
    /// `DENSE`, or insufficient capacity during execution
    Illegal,
    /// Two containers disagree on their dimensions
    Mismatch,
    /// An integer overflow would occur
    Overflow,
    /// Allocation failed, or capacity was insufficient during a resize
    OutOfMem,
    /// Valid inputs, but the computation produced no result
    Failed,
    /// Valid inputs, but this backend does not implement the operation
    Unsupported,
    /// The communication layer lost state; the distributed state is undefined
    Panic,
}

impl Rc {
    /// Whether this code signals success
    pub fn is_success(self) -> bool {
        self == Rc::Success
    }
}

impl fmt::Display for Rc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rc::Success => "Success",
            Rc::Illegal => "Illegal call",
            Rc::Mismatch => "Mismatching dimensions during call",
            Rc::Overflow => "Overflow",
            Rc::OutOfMem => "Out of memory",
            Rc::Failed => "A call to a primitive failed",
            Rc::Unsupported => "Unsupported operation for this backend",
            Rc::Panic => "Panic: undefined state",
        };
        f.write_str(text)
    }
}

/// Errors that primitives, containers and collectives can raise
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Containers passed to the same call disagree on their sizes
    #[error("Size mismatch in {op}: expected {expected}, got {got}")]
    Mismatch {
        /// Name of the failing call
        op: &'static str,
        /// Expected size
        expected: usize,
        /// Size that was supplied
        got: usize,
    },

    /// An index falls outside of the container it addresses
    #[error("Index {index} out of range for dimension of size {size}")]
    IndexOutOfRange {
        /// Offending index
        index: usize,
        /// Dimension size
        size: usize,
    },

    /// The same index occurs twice while `NO_DUPLICATES` was promised
    #[error("Duplicate index {index} in {op} while no_duplicates was set")]
    DuplicateIndex {
        /// Name of the failing call
        op: &'static str,
        /// The index that occurred more than once
        index: usize,
    },

    /// The same matrix coordinate occurs twice in a unique build
    #[error("Duplicate coordinate ({row}, {col}) in {op}")]
    DuplicateCoordinate {
        op: &'static str,
        row: usize,
        col: usize,
    },

    /// A container was sparse while the `DENSE` descriptor was given
    #[error("Sparse operand passed to {op} under the dense descriptor")]
    NotDense {
        /// Name of the failing call
        op: &'static str,
    },

    /// The call is illegal for another reason
    #[error("Illegal call to {op}: {reason}")]
    Illegal {
        /// Name of the failing call
        op: &'static str,
        /// Human-readable explanation
        reason: String,
    },

    /// Integer overflow
    #[error("Overflow in {0}")]
    Overflow(&'static str),

    /// Allocation failure
    #[error("Out of memory: failed to reserve {requested} elements")]
    OutOfMem {
        /// Number of elements that could not be reserved
        requested: usize,
    },

    /// Computation produced no result
    #[error("Operation failed: {0}")]
    Failed(String),

    /// Not implemented by this backend
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Communication substrate failure
    #[error("Collective communication failed: {0}")]
    Panic(String),
}

impl Error {
    /// The return code corresponding to this error
    pub fn rc(&self) -> Rc {
        match self {
            Error::Mismatch { .. } | Error::IndexOutOfRange { .. } => Rc::Mismatch,
            Error::DuplicateIndex { .. }
            | Error::DuplicateCoordinate { .. }
            | Error::NotDense { .. }
            | Error::Illegal { .. } => {
                Rc::Illegal
            }
            Error::Overflow(_) => Rc::Overflow,
            Error::OutOfMem { .. } => Rc::OutOfMem,
            Error::Failed(_) => Rc::Failed,
            Error::Unsupported(_) => Rc::Unsupported,
            Error::Panic(_) => Rc::Panic,
        }
    }

    pub(crate) fn illegal(op: &'static str, reason: impl Into<String>) -> Self {
        Error::Illegal {
            op,
            reason: reason.into(),
        }
    }
}

impl<T> From<&Result<T>> for Rc {
    fn from(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Rc::Success,
            Err(err) => err.rc(),
        }
    }
}

/// Checks that `got` equals `expected`, reporting a [`Error::Mismatch`] otherwise
pub(crate) fn check_size(op: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(Error::Mismatch { op, expected, got })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rc_mapping() {
        let ok: Result<()> = Ok(());
        assert_eq!(Rc::from(&ok), Rc::Success);

        let err: Result<()> = Err(Error::IndexOutOfRange { index: 3, size: 2 });
        assert_eq!(Rc::from(&err), Rc::Mismatch);

        let err: Result<()> = Err(Error::NotDense { op: "dot" });
        assert_eq!(Rc::from(&err), Rc::Illegal);

        assert_eq!(Error::Panic("lost peer".into()).rc(), Rc::Panic);
    }

    #[test]
    fn test_check_size() {
        assert!(check_size("set", 4, 4).is_ok());
        assert_eq!(
            check_size("set", 4, 5),
            Err(Error::Mismatch { op: "set", expected: 4, got: 5 })
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Rc::Success.to_string(), "Success");
        let err = Error::DuplicateIndex { op: "buildVector", index: 7 };
        assert!(err.to_string().contains("Duplicate index 7"));
    }
}
