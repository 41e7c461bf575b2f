//! Helpers shared by the containers, the collectives and interop code

pub mod formats;

pub use formats::{from_sprs, to_dense, to_sprs_csr, vector_to_dense};

/// Offsets of consecutive segments with the given lengths
///
/// `counts.len() + 1` entries: `0`, the running totals, then the grand total.
/// Used for compressed-storage pointers and `alltoallv` displacements.
pub fn exclusive_scan(counts: &[usize]) -> Vec<usize> {
    std::iter::once(0)
        .chain(counts.iter().scan(0, |total, &c| {
            *total += c;
            Some(*total)
        }))
        .collect()
}
