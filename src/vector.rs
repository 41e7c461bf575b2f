//! Sparse or dense one-dimensional vector container

use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::coordinates::Coordinates;
use crate::error::{Error, Result};
use crate::pinned::PinnedVector;
use crate::types::Scalar;

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    /// Identifier counter of the SPMD process running on this thread, if any
    static PROCESS_IDS: Cell<Option<usize>> = Cell::new(None);
}

/// Hands out unique container identifiers
///
/// Inside [`with_process_ids`] the identifiers come from the calling
/// process's own counter, so every process of a launch numbers its
/// containers identically. Elsewhere a shared counter is used.
pub(crate) fn next_id() -> usize {
    PROCESS_IDS.with(|ids| match ids.get() {
        Some(id) => {
            ids.set(Some(id + 1));
            id
        }
        None => NEXT_ID.fetch_add(1, Ordering::Relaxed),
    })
}

/// Runs `f` with a fresh identifier counter owned by the calling thread
pub(crate) fn with_process_ids<R>(f: impl FnOnce() -> R) -> R {
    let outer = PROCESS_IDS.with(|ids| ids.replace(Some(0)));
    let result = f();
    PROCESS_IDS.with(|ids| ids.set(outer));
    result
}

/// A vector of size `n` holding values at a subset of its indices
///
/// A `Vector<()>` is a pattern vector that tracks structure only. Value
/// storage is shared with any [`PinnedVector`] handed out by [`Vector::pin`];
/// writes after pinning copy the storage first, so pinned views stay valid.
pub struct Vector<T> {
    /// Unique identifier, assigned at construction
    id: usize,

    /// Maximum number of nonzeroes the vector may hold
    capacity: usize,

    /// Which indices are assigned
    coords: Coordinates,

    /// Value storage (size: n); only meaningful at assigned indices
    values: Arc<Vec<T>>,
}

impl<T: Scalar> Vector<T> {
    /// Creates an empty vector of size `n` with capacity `n`
    pub fn new(n: usize) -> Self {
        Self {
            id: next_id(),
            capacity: n,
            coords: Coordinates::new(n),
            values: Arc::new(vec![T::default(); n]),
        }
    }

    /// Creates an empty vector of size `n` with room for `capacity` nonzeroes
    ///
    /// A capacity larger than `n` is clamped to `n`. Fails with
    /// [`Error::OutOfMem`] if the value storage cannot be allocated.
    pub fn with_capacity(n: usize, capacity: usize) -> Result<Self> {
        let mut values = Vec::new();
        values
            .try_reserve_exact(n)
            .map_err(|_| Error::OutOfMem { requested: n })?;
        values.resize(n, T::default());
        Ok(Self {
            id: next_id(),
            capacity: capacity.min(n),
            coords: Coordinates::new(n),
            values: Arc::new(values),
        })
    }

    /// Creates a dense vector holding `values`
    pub fn from_dense(values: Vec<T>) -> Self {
        let n = values.len();
        Self {
            id: next_id(),
            capacity: n,
            coords: Coordinates::dense(n),
            values: Arc::new(values),
        }
    }

    /// Creates a dense vector of size `n` with every entry equal to `value`
    pub fn filled(n: usize, value: T) -> Self {
        Self::from_dense(vec![value; n])
    }

    /// The size `n` of the vector
    #[inline]
    pub fn size(&self) -> usize {
        self.coords.size()
    }

    /// The maximum number of nonzeroes the vector can hold
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of assigned entries
    #[inline]
    pub fn nnz(&self) -> usize {
        self.coords.nnz()
    }

    /// The unique identifier of this vector
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Whether every index is assigned
    #[inline]
    pub fn is_dense(&self) -> bool {
        self.coords.is_dense()
    }

    /// Whether index `i` is assigned
    #[inline]
    pub fn contains(&self, i: usize) -> bool {
        i < self.size() && self.coords.assigned(i)
    }

    /// The value at index `i`, if assigned
    #[inline]
    pub fn get(&self, i: usize) -> Option<&T> {
        if self.contains(i) {
            Some(&self.values[i])
        } else {
            None
        }
    }

    /// Sets entry `i` to `value`
    ///
    /// Fails with [`Error::IndexOutOfRange`] if `i` is not below the size, and
    /// with [`Error::Illegal`] if `i` is new and the capacity is exhausted.
    pub fn set_element(&mut self, i: usize, value: T) -> Result<()> {
        if i >= self.size() {
            return Err(Error::IndexOutOfRange {
                index: i,
                size: self.size(),
            });
        }
        if !self.coords.assigned(i) && self.nnz() == self.capacity {
            return Err(Error::illegal(
                "set_element",
                format!("capacity {} exhausted", self.capacity),
            ));
        }
        self.coords.assign(i);
        Arc::make_mut(&mut self.values)[i] = value;
        Ok(())
    }

    /// Removes all entries, leaving the value storage untouched
    pub fn clear(&mut self) {
        self.coords.clear();
    }

    /// Ensures capacity for at least `capacity` nonzeroes
    ///
    /// Logical contents are unchanged. Requests beyond the size are clamped;
    /// shrinking below the current number of nonzeroes is illegal.
    pub fn resize(&mut self, capacity: usize) -> Result<()> {
        let capacity = capacity.min(self.size());
        if capacity < self.nnz() {
            return Err(Error::illegal(
                "resize",
                format!(
                    "requested capacity {} is below the {} current nonzeroes",
                    capacity,
                    self.nnz()
                ),
            ));
        }
        self.capacity = capacity;
        Ok(())
    }

    /// Iterates over `(index, value)` pairs of the assigned entries
    ///
    /// The order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.coords.iter().map(move |i| (i, &self.values[i]))
    }

    /// Iterates over the assigned indices
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.coords.iter()
    }

    /// The assigned entries as `(index, value)` pairs in ascending index order
    pub fn to_sorted_pairs(&self) -> Vec<(usize, T)> {
        self.coords
            .to_sorted()
            .into_iter()
            .map(|i| (i, self.values[i].clone()))
            .collect()
    }

    /// Hands out a long-lived shared view of the current contents
    pub fn pin(&self) -> PinnedVector<T> {
        PinnedVector::new(self.size(), self.coords.to_sorted(), Arc::clone(&self.values))
    }

    /// The sparsity carrier
    #[inline]
    pub(crate) fn coords(&self) -> &Coordinates {
        &self.coords
    }

    /// Raw value storage, indexed by vector index
    #[inline]
    pub(crate) fn raw_values(&self) -> &[T] {
        &self.values
    }

    /// Mutable access to the carrier and the value storage
    ///
    /// Copies the value storage first if it is shared with a pinned view.
    pub(crate) fn parts_mut(&mut self) -> (&mut Coordinates, &mut [T]) {
        (&mut self.coords, Arc::make_mut(&mut self.values).as_mut_slice())
    }

    /// Assigns `value` at `i` without checking capacity
    #[inline]
    pub(crate) fn insert_unchecked(&mut self, i: usize, value: T) {
        self.coords.assign(i);
        Arc::make_mut(&mut self.values)[i] = value;
    }

    /// Raises the capacity so it can hold `nnz` entries
    pub(crate) fn grow_capacity(&mut self, nnz: usize) {
        self.capacity = self.capacity.max(nnz.min(self.size()));
    }

    /// Whether `extra` new entries fit within the capacity
    #[inline]
    pub(crate) fn fits(&self, extra: usize) -> bool {
        self.nnz() + extra <= self.capacity
    }
}

impl<T: Scalar + fmt::Debug> fmt::Debug for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Vector {{")?;
        writeln!(f, "  id: {}", self.id)?;
        writeln!(f, "  size: {}, capacity: {}, nnz: {}", self.size(), self.capacity, self.nnz())?;

        // Print a sample of the content
        let pairs = self.to_sorted_pairs();
        let max_to_print = 8.min(pairs.len());
        if max_to_print > 0 {
            write!(f, "  content sample: ")?;
            for (i, v) in &pairs[..max_to_print] {
                write!(f, "({}, {:?}) ", i, v)?;
            }
            if pairs.len() > max_to_print {
                write!(f, "... ({} more)", pairs.len() - max_to_print)?;
            }
            writeln!(f)?;
        }
        write!(f, "}}")
    }
}
