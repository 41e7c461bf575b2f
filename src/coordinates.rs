//! Sparsity carrier for vectors
//!
//! Tracks which of the indices `0..n` are assigned using a dense flag array
//! for O(1) membership and a stack of assigned indices for O(nnz)
//! enumeration. Both buffers are cache-line aligned.

use aligned_vec::AVec;

use crate::config::CACHE_LINE_SIZE;

/// The set of assigned positions of a vector
///
/// The flag array and the stack always agree: `assigned(i)` holds exactly
/// when `i` occurs (once) in the stack.
#[derive(Clone)]
pub struct Coordinates {
    /// Flags marking which positions are assigned (size: n)
    assigned: AVec<bool>,

    /// The assigned indices, in order of first assignment (size: nnz)
    stack: AVec<usize>,
}

impl Coordinates {
    /// Creates an empty carrier over `0..n`
    pub fn new(n: usize) -> Self {
        Self {
            assigned: AVec::from_iter(CACHE_LINE_SIZE, std::iter::repeat(false).take(n)),
            stack: AVec::new(CACHE_LINE_SIZE),
        }
    }

    /// Creates a carrier with every index of `0..n` assigned
    pub fn dense(n: usize) -> Self {
        let mut coords = Self::new(n);
        coords.assign_all();
        coords
    }

    /// Number of positions tracked
    #[inline]
    pub fn size(&self) -> usize {
        self.assigned.len()
    }

    /// Number of assigned positions
    #[inline]
    pub fn nnz(&self) -> usize {
        self.stack.len()
    }

    /// Whether every position is assigned
    #[inline]
    pub fn is_dense(&self) -> bool {
        self.nnz() == self.size()
    }

    /// Whether no position is assigned
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Whether position `i` is assigned
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    #[inline]
    pub fn assigned(&self, i: usize) -> bool {
        self.assigned[i]
    }

    /// Assigns position `i`
    ///
    /// Returns whether `i` was already assigned; in that case the carrier is
    /// unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    #[inline]
    pub fn assign(&mut self, i: usize) -> bool {
        if self.assigned[i] {
            true
        } else {
            self.assigned[i] = true;
            self.stack.push(i);
            false
        }
    }

    /// Assigns every position; the stack holds `0..n` in natural order
    pub fn assign_all(&mut self) {
        let n = self.size();
        if self.nnz() == n {
            return;
        }
        self.stack.clear();
        self.stack.reserve(n);
        for i in 0..n {
            self.assigned[i] = true;
            self.stack.push(i);
        }
    }

    /// Unassigns every position, in O(nnz)
    pub fn clear(&mut self) {
        for &i in self.stack.iter() {
            self.assigned[i] = false;
        }
        self.stack.clear();
    }

    /// The `k`-th assigned index in enumeration order
    #[inline]
    pub fn index(&self, k: usize) -> usize {
        self.stack[k]
    }

    /// The assigned indices in enumeration order
    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        self.stack.as_slice()
    }

    /// Iterates over the assigned indices; every index occurs exactly once
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.stack.iter().copied()
    }

    /// The assigned indices in ascending order
    pub fn to_sorted(&self) -> Vec<usize> {
        if self.is_dense() {
            return (0..self.size()).collect();
        }
        let mut sorted = self.stack.as_slice().to_vec();
        sorted.sort_unstable();
        sorted
    }

    /// Counts the positions assigned in `other` but not in `self`
    pub(crate) fn count_missing_from(&self, other: &Coordinates) -> usize {
        other.iter().filter(|&i| !self.assigned(i)).count()
    }
}

impl std::fmt::Debug for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinates")
            .field("size", &self.size())
            .field("nnz", &self.nnz())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let coords = Coordinates::new(5);
        assert_eq!(coords.size(), 5);
        assert_eq!(coords.nnz(), 0);
        assert!(coords.is_empty());
        assert!(!coords.is_dense());
        assert!((0..5).all(|i| !coords.assigned(i)));
    }

    #[test]
    fn test_assign_is_idempotent() {
        let mut coords = Coordinates::new(8);
        assert!(!coords.assign(3));
        assert!(!coords.assign(6));
        assert!(coords.assign(3));
        assert_eq!(coords.nnz(), 2);
        assert_eq!(coords.as_slice(), &[3, 6]);
    }

    #[test]
    fn test_assign_all_and_clear() {
        let mut coords = Coordinates::new(4);
        coords.assign(2);
        coords.assign_all();
        assert!(coords.is_dense());
        assert_eq!(coords.as_slice(), &[0, 1, 2, 3]);

        coords.clear();
        assert_eq!(coords.nnz(), 0);
        assert!((0..4).all(|i| !coords.assigned(i)));

        // Reuse after clear
        coords.assign(1);
        assert_eq!(coords.to_sorted(), vec![1]);
    }

    #[test]
    fn test_to_sorted() {
        let mut coords = Coordinates::new(10);
        for i in [7, 2, 9, 0] {
            coords.assign(i);
        }
        assert_eq!(coords.to_sorted(), vec![0, 2, 7, 9]);
    }

    #[test]
    fn test_zero_size() {
        let mut coords = Coordinates::new(0);
        coords.assign_all();
        assert!(coords.is_dense());
        assert_eq!(coords.nnz(), 0);
    }

    #[test]
    fn test_count_missing_from() {
        let mut a = Coordinates::new(6);
        let mut b = Coordinates::new(6);
        a.assign(1);
        a.assign(2);
        b.assign(2);
        b.assign(4);
        b.assign(5);
        assert_eq!(a.count_missing_from(&b), 2);
        assert_eq!(b.count_missing_from(&a), 1);
    }
}
