//! 1D block-cyclic distribution of an index space over `P` processes
//!
//! Global indices are cut into blocks of `b` consecutive elements, and
//! block `k` is owned by process `k mod P`. Within a process the owned
//! blocks are stored back to back, in global order. The last, possibly
//! partial, block is owned by process `(n / b) mod P`.
//!
//! The process-contiguous layout places all of process 0's elements first,
//! then process 1's, and so on; [`Distribution::local_offset`] gives where
//! each process starts in that layout.

use crate::config::{Config, DEFAULT_BLOCK_SIZE};
use crate::error::{Error, Result};

/// Block-cyclic index mapping with a fixed block size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Distribution {
    block_size: usize,
}

impl Default for Distribution {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl Distribution {
    /// Creates a distribution with blocks of `block_size` elements
    ///
    /// Fails with [`Error::Illegal`] on a zero block size.
    pub fn new(block_size: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(Error::illegal("Distribution::new", "block size must be positive"));
        }
        Ok(Self { block_size })
    }

    /// The distribution described by `config`
    pub fn from_config(config: &Config) -> Self {
        Self {
            block_size: config.block_size.max(1),
        }
    }

    /// The block size `b`
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of elements process `s` owns out of `n`
    ///
    /// # Panics
    ///
    /// Panics if `p` is zero.
    pub fn global_length_to_local(&self, n: usize, s: usize, p: usize) -> usize {
        let b = self.block_size;
        let blocks = n / b;
        let overflow = blocks % p;
        let regular = (blocks / p) * b;
        if overflow == s {
            regular + n % b
        } else if overflow > s {
            regular + b
        } else {
            regular
        }
    }

    /// Where process `s` starts in the process-contiguous layout of `n` elements
    pub fn local_offset(&self, n: usize, s: usize, p: usize) -> usize {
        let b = self.block_size;
        let blocks = n / b;
        let overflow = blocks % p;
        let regular = (blocks / p) * b;
        if s <= overflow {
            (regular + b) * s
        } else {
            regular + overflow * (regular + b) + n % b + (s - overflow - 1) * regular
        }
    }

    /// The process owning global index `i`
    #[inline]
    pub fn global_index_to_process_id(&self, i: usize, _n: usize, p: usize) -> usize {
        (i / self.block_size) % p
    }

    /// The position of global index `i` within its owner's local storage
    #[inline]
    pub fn global_index_to_local(&self, i: usize, _n: usize, p: usize) -> usize {
        let b = self.block_size;
        ((i / b) / p) * b + i % b
    }

    /// The global index of local position `li` on process `s`
    #[inline]
    pub fn local_index_to_global(&self, li: usize, _n: usize, s: usize, p: usize) -> usize {
        let b = self.block_size;
        ((li / b) * p + s) * b + li % b
    }

    /// The process whose range in the process-contiguous layout covers `offset`
    ///
    /// Processes owning nothing are skipped. Offsets at or beyond `n` map to
    /// the last process.
    pub fn offset_to_pid(&self, offset: usize, n: usize, p: usize) -> usize {
        // Offsets are non-decreasing in `s`; keep local_offset(lo) <= offset
        let (mut lo, mut hi) = (0, p);
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if self.local_offset(n, mid, p) <= offset {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        lo
    }
}

/// Number of elements process `s` owns, under the configured block size
pub fn global_length_to_local(n: usize, s: usize, p: usize) -> usize {
    Distribution::from_config(Config::global()).global_length_to_local(n, s, p)
}

/// Start of process `s` in the process-contiguous layout, under the configured block size
pub fn local_offset(n: usize, s: usize, p: usize) -> usize {
    Distribution::from_config(Config::global()).local_offset(n, s, p)
}

/// The process owning global index `i`, under the configured block size
pub fn global_index_to_process_id(i: usize, n: usize, p: usize) -> usize {
    Distribution::from_config(Config::global()).global_index_to_process_id(i, n, p)
}

/// The local position of global index `i`, under the configured block size
pub fn global_index_to_local(i: usize, n: usize, p: usize) -> usize {
    Distribution::from_config(Config::global()).global_index_to_local(i, n, p)
}

/// The global index of local position `li` on process `s`, under the configured block size
pub fn local_index_to_global(li: usize, n: usize, s: usize, p: usize) -> usize {
    Distribution::from_config(Config::global()).local_index_to_global(li, n, s, p)
}

/// The process covering `offset` in the process-contiguous layout, under the configured block size
pub fn offset_to_pid(offset: usize, n: usize, p: usize) -> usize {
    Distribution::from_config(Config::global()).offset_to_pid(offset, n, p)
}
