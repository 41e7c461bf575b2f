//! Storage layouts for dense structured matrices
//!
//! Each [`Storage`] fixes the template of its polynomial; the runtime
//! coefficients follow from the matrix dimensions.

use ndarray::Array2;
use tracing::trace;

use super::imf::Imf;
use super::polynomial::{BivariateQuadratic, Coefficients};
use super::view::{Amf, AmfView};
use crate::error::{Error, Result};
use crate::types::Scalar;

/// Whether a packed layout walks rows or columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    RowWise,
    ColumnWise,
}

/// Physical layout of a dense structured matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Storage {
    /// All `m·n` entries, row after row
    FullRowMajor,
    /// All `m·n` entries, column after column
    FullColMajor,
    /// The upper triangle `j ≥ i` of a square matrix, `n(n+1)/2` entries
    PackedUpper(Orientation),
    /// The lower triangle `j ≤ i` of a square matrix, `n(n+1)/2` entries
    PackedLower(Orientation),
    /// `kl` subdiagonals and `ku` superdiagonals of a square matrix, one
    /// row of width `kl + ku + 1` per matrix row
    Band { kl: usize, ku: usize },
    /// An `m × 1` column stored as a plain array
    Array,
}

impl Storage {
    /// Whether `(i, j)` has a slot under this layout
    pub fn stores(&self, i: usize, j: usize) -> bool {
        match *self {
            Storage::FullRowMajor | Storage::FullColMajor => true,
            Storage::PackedUpper(_) => j >= i,
            Storage::PackedLower(_) => j <= i,
            Storage::Band { kl, ku } => j + kl >= i && j <= i + ku,
            Storage::Array => j == 0,
        }
    }

    /// Buffer length for an `m × n` matrix
    pub fn storage_dimensions(&self, m: usize, n: usize) -> usize {
        match *self {
            Storage::FullRowMajor | Storage::FullColMajor => m * n,
            Storage::PackedUpper(_) | Storage::PackedLower(_) => n * (n + 1) / 2,
            Storage::Band { kl, ku } => n * (kl + ku + 1),
            Storage::Array => m,
        }
    }

    /// The storage polynomial for an `m × n` matrix
    ///
    /// # Errors
    ///
    /// [`Error::Mismatch`] if a packed or band layout is given a
    /// non-square shape, or the array layout more than one column, and
    /// [`Error::Overflow`] if a dimension does not fit an `i64`.
    pub fn polynomial(&self, m: usize, n: usize) -> Result<BivariateQuadratic> {
        let square = |op| {
            if m == n {
                Ok(())
            } else {
                Err(Error::Mismatch { op, expected: m, got: n })
            }
        };
        let dim = |v: usize| i64::try_from(v).map_err(|_| Error::Overflow("matrix dimension"));
        let (template, runtime, d) = match *self {
            Storage::FullRowMajor => (
                Coefficients::new(0, 0, 0, 1, 1, 0),
                Coefficients::new(0, 0, 0, dim(n)?, 1, 0),
                1,
            ),
            Storage::FullColMajor => (
                Coefficients::new(0, 0, 0, 1, 1, 0),
                Coefficients::new(0, 0, 0, 1, dim(m)?, 0),
                1,
            ),
            Storage::PackedUpper(Orientation::RowWise) => {
                square("Storage::PackedUpper")?;
                (
                    Coefficients::new(-1, 0, 0, 1, 2, 0),
                    Coefficients::new(1, 0, 0, 2 * dim(n)? - 1, 1, 0),
                    2,
                )
            }
            Storage::PackedUpper(Orientation::ColumnWise) => {
                square("Storage::PackedUpper")?;
                (
                    Coefficients::new(0, 1, 0, 2, 1, 0),
                    Coefficients::new(0, 1, 0, 1, 1, 0),
                    2,
                )
            }
            Storage::PackedLower(Orientation::RowWise) => {
                square("Storage::PackedLower")?;
                (
                    Coefficients::new(1, 0, 0, 1, 2, 0),
                    Coefficients::new(1, 0, 0, 1, 1, 0),
                    2,
                )
            }
            Storage::PackedLower(Orientation::ColumnWise) => {
                square("Storage::PackedLower")?;
                (
                    Coefficients::new(0, -1, 0, 2, 1, 0),
                    Coefficients::new(0, 1, 0, 1, 2 * dim(n)? - 1, 0),
                    2,
                )
            }
            Storage::Band { kl, ku } => {
                square("Storage::Band")?;
                (
                    Coefficients::new(0, 0, 0, 1, 1, 1),
                    Coefficients::new(0, 0, 0, dim(kl + ku)?, 1, dim(kl)?),
                    1,
                )
            }
            Storage::Array => {
                if n != 1 {
                    return Err(Error::Mismatch {
                        op: "Storage::Array",
                        expected: 1,
                        got: n,
                    });
                }
                (
                    Coefficients::new(0, 0, 0, 1, 0, 0),
                    Coefficients::new(0, 0, 0, 1, 0, 0),
                    1,
                )
            }
        };
        BivariateQuadratic::new(template, runtime, d)
    }

    /// The identity AMF of an `m × n` matrix under this layout
    pub fn amf(&self, m: usize, n: usize) -> Result<Amf> {
        Amf::new(
            Imf::id(m),
            Imf::id(n),
            self.polynomial(m, n)?,
            self.storage_dimensions(m, n),
        )
    }
}

/// A dense matrix that stores only the slots its [`Storage`] provides
#[derive(Debug, Clone)]
pub struct StructuredMatrix<T> {
    storage: Storage,
    amf: Amf,
    data: Vec<T>,
}

impl<T: Scalar> StructuredMatrix<T> {
    /// An `m × n` matrix with every stored slot set to `fill`
    ///
    /// Fails with [`Error::OutOfMem`] if the buffer cannot be allocated.
    pub fn new(storage: Storage, m: usize, n: usize, fill: T) -> Result<Self> {
        let amf = storage.amf(m, n)?;
        let len = amf.storage_dimensions();
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| Error::OutOfMem { requested: len })?;
        data.resize(len, fill);
        trace!(?storage, m, n, len, "StructuredMatrix::new");
        Ok(Self { storage, amf, data })
    }

    /// Copies the stored region of `dense`
    pub fn from_dense(storage: Storage, dense: &Array2<T>) -> Result<Self> {
        let (m, n) = dense.dim();
        let mut out = Self::new(storage, m, n, T::default())?;
        for ((i, j), v) in dense.indexed_iter() {
            if storage.stores(i, j) {
                out.set(i, j, v.clone())?;
            }
        }
        Ok(out)
    }

    pub fn storage(&self) -> Storage {
        self.storage
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.amf.logical_dimensions()
    }

    /// The raw storage buffer
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// The value at `(i, j)`, or `None` if the layout has no slot for it
    pub fn get(&self, i: usize, j: usize) -> Option<&T> {
        if !self.storage.stores(i, j) {
            return None;
        }
        self.amf.storage_index(i, j).ok().map(|k| &self.data[k])
    }

    /// Fails with [`Error::Illegal`] if the layout has no slot for `(i, j)`
    pub fn set(&mut self, i: usize, j: usize, value: T) -> Result<()> {
        if !self.storage.stores(i, j) {
            return Err(Error::illegal(
                "StructuredMatrix::set",
                format!("({}, {}) is outside the stored region of {:?}", i, j, self.storage),
            ));
        }
        let k = self.amf.storage_index(i, j)?;
        self.data[k] = value;
        Ok(())
    }

    /// A view of the whole matrix
    pub fn view(&self) -> AmfView<'_, T> {
        AmfView::from_parts(&self.data, self.amf.clone())
    }

    /// Dense copy, with `fill` in the slots the layout does not store
    pub fn to_array(&self, fill: T) -> Array2<T> {
        let (m, n) = self.dimensions();
        Array2::from_shape_fn((m, n), |(i, j)| self.get(i, j).cloned().unwrap_or_else(|| fill.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(storage: Storage, n: usize) -> Vec<usize> {
        let amf = storage.amf(n, n).unwrap();
        let mut out = Vec::new();
        for i in 0..n {
            for j in 0..n {
                if storage.stores(i, j) {
                    out.push(amf.storage_index(i, j).unwrap());
                }
            }
        }
        out
    }

    #[test]
    fn test_packed_layouts_are_bijective() {
        let n = 5;
        let len = n * (n + 1) / 2;
        for storage in [
            Storage::PackedUpper(Orientation::RowWise),
            Storage::PackedUpper(Orientation::ColumnWise),
            Storage::PackedLower(Orientation::RowWise),
            Storage::PackedLower(Orientation::ColumnWise),
        ] {
            let mut s = slots(storage, n);
            s.sort_unstable();
            assert_eq!(s, (0..len).collect::<Vec<_>>(), "{:?}", storage);
        }
    }

    #[test]
    fn test_packed_upper_row_wise_order() {
        // Row-wise walk of the upper triangle visits slots in order
        assert_eq!(
            slots(Storage::PackedUpper(Orientation::RowWise), 4),
            (0..10).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_band_layout() {
        let storage = Storage::Band { kl: 1, ku: 2 };
        let amf = storage.amf(4, 4).unwrap();
        assert_eq!(amf.storage_dimensions(), 16);
        assert_eq!(amf.storage_index(0, 0).unwrap(), 1);
        assert_eq!(amf.storage_index(2, 1).unwrap(), 8);
        assert_eq!(amf.storage_index(2, 4 - 1).unwrap(), 10);
        assert!(!storage.stores(3, 0));
        assert!(!storage.stores(0, 3));
    }

    #[test]
    fn test_full_layouts() {
        let row = Storage::FullRowMajor.amf(2, 3).unwrap();
        let col = Storage::FullColMajor.amf(2, 3).unwrap();
        assert_eq!(row.storage_index(1, 2).unwrap(), 5);
        assert_eq!(col.storage_index(1, 2).unwrap(), 5);
        assert_eq!(col.storage_index(1, 0).unwrap(), 1);
        assert_eq!(Storage::Array.amf(4, 1).unwrap().storage_index(3, 0).unwrap(), 3);
    }

    #[test]
    fn test_packed_needs_square() {
        let err = Storage::PackedLower(Orientation::RowWise).amf(3, 4).unwrap_err();
        assert_eq!(err.rc(), crate::Rc::Mismatch);
        assert!(Storage::Array.amf(3, 2).is_err());
    }

    #[test]
    fn test_structured_matrix_roundtrip() {
        let dense = Array2::from_shape_fn((3, 3), |(i, j)| (10 * i + j) as i32);
        let upper = StructuredMatrix::from_dense(Storage::PackedUpper(Orientation::RowWise), &dense).unwrap();
        assert_eq!(upper.data(), &[0, 1, 2, 11, 12, 22]);
        assert_eq!(upper.get(1, 2), Some(&12));
        assert_eq!(upper.get(2, 1), None);
        let back = upper.to_array(-1);
        assert_eq!(back[[0, 2]], 2);
        assert_eq!(back[[2, 0]], -1);
    }

    #[test]
    fn test_transpose_of_packed_upper_reads_as_lower() {
        let dense = Array2::from_shape_fn((3, 3), |(i, j)| (10 * i + j) as i32);
        let upper = StructuredMatrix::from_dense(Storage::PackedUpper(Orientation::RowWise), &dense).unwrap();
        let t = upper.view().transpose();
        for i in 0..3 {
            for j in 0..=i {
                assert_eq!(*t.get(i, j).unwrap(), dense[[j, i]]);
            }
        }
        assert!(upper.clone().set(2, 0, 7).is_err());
    }

    #[test]
    fn test_diagonal_of_structured() {
        let dense = Array2::from_shape_fn((4, 4), |(i, j)| (i * 4 + j) as u32);
        let full = StructuredMatrix::from_dense(Storage::FullColMajor, &dense).unwrap();
        let diag = full.view().map_amf(Amf::diagonal).unwrap();
        let values: Vec<u32> = (0..4).map(|k| *diag.get(k, 0).unwrap()).collect();
        assert_eq!(values, vec![0, 5, 10, 15]);
    }
}
