//! Long-lived read-only views of vector storage

use std::sync::Arc;

/// A snapshot of a vector's nonzeroes sharing the vector's value storage
///
/// The storage stays alive for as long as any pinned view holds it. Entries
/// are exposed in ascending index order.
#[derive(Clone)]
pub struct PinnedVector<T> {
    size: usize,
    indices: Vec<usize>,
    values: Arc<Vec<T>>,
}

impl<T> PinnedVector<T> {
    pub(crate) fn new(size: usize, indices: Vec<usize>, values: Arc<Vec<T>>) -> Self {
        Self {
            size,
            indices,
            values,
        }
    }

    /// Size of the pinned vector
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of nonzeroes captured
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Index of the `k`-th nonzero
    pub fn index(&self, k: usize) -> usize {
        self.indices[k]
    }

    /// Value of the `k`-th nonzero
    pub fn value(&self, k: usize) -> &T {
        &self.values[self.indices[k]]
    }

    /// Iterates over `(index, value)` pairs in ascending index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.indices.iter().map(move |&i| (i, &self.values[i]))
    }
}
