//! Access mapping functions and the views built from them
//!
//! An [`Amf`] pairs a row and a column [`Imf`] with a storage polynomial.
//! Construction fuses every strided, zero or constant IMF into the
//! polynomial, so that after fusion only identities and runtime maps
//! ([`Imf::Select`], [`Imf::Composed`]) remain. Views (transpose,
//! diagonal, blocks, selections) are new AMFs over the same storage.

use std::ops::Range;

use ndarray::Array2;
use tracing::trace;

use super::imf::Imf;
use super::polynomial::{BivariateQuadratic, Substitution};
use super::storage::Storage;
use crate::error::{Error, Result};
use crate::types::Scalar;

fn to_i64(v: usize) -> Result<i64> {
    i64::try_from(v).map_err(|_| Error::Overflow("index does not fit the storage polynomial"))
}

/// Folds `imf` into one variable of `poly`, returning what remains of the IMF
fn fuse_dimension(
    imf: Imf,
    poly: BivariateQuadratic,
    substitute: fn(&BivariateQuadratic, Substitution) -> BivariateQuadratic,
) -> Result<(Imf, BivariateQuadratic)> {
    let n = imf.len();
    Ok(match imf {
        Imf::Strided { b, s, .. } => {
            let sub = Substitution::Affine {
                b: to_i64(b)?,
                s: to_i64(s)?,
            };
            (Imf::id(n), substitute(&poly, sub))
        }
        Imf::Zero { .. } => (Imf::zero(n), substitute(&poly, Substitution::Constant(0))),
        Imf::Constant { c, .. } => (Imf::zero(n), substitute(&poly, Substitution::Constant(to_i64(c)?))),
        runtime => (runtime, poly),
    })
}

/// Maps logical `(i, j)` to a position in flat storage
#[derive(Debug, Clone, PartialEq)]
pub struct Amf {
    imf_r: Imf,
    imf_c: Imf,
    poly: BivariateQuadratic,
    storage_dimensions: usize,
}

impl Amf {
    /// Builds `(i, j) ↦ poly(imf_r(i), imf_c(j))` and fuses what it can
    ///
    /// Fails with [`Error::Overflow`] if a stride or offset does not fit
    /// the polynomial's integer type.
    pub fn new(imf_r: Imf, imf_c: Imf, poly: BivariateQuadratic, storage_dimensions: usize) -> Result<Self> {
        let (imf_r, poly) = fuse_dimension(imf_r, poly, BivariateQuadratic::substitute_x)?;
        let (imf_c, poly) = fuse_dimension(imf_c, poly, BivariateQuadratic::substitute_y)?;
        Ok(Self {
            imf_r,
            imf_c,
            poly,
            storage_dimensions,
        })
    }

    /// Number of logical rows and columns
    pub fn logical_dimensions(&self) -> (usize, usize) {
        (self.imf_r.len(), self.imf_c.len())
    }

    /// Length of the storage buffer the AMF addresses
    pub fn storage_dimensions(&self) -> usize {
        self.storage_dimensions
    }

    pub fn row_imf(&self) -> &Imf {
        &self.imf_r
    }

    pub fn col_imf(&self) -> &Imf {
        &self.imf_c
    }

    pub fn polynomial(&self) -> &BivariateQuadratic {
        &self.poly
    }

    /// Storage position of logical `(i, j)`
    ///
    /// Fails with [`Error::IndexOutOfRange`] outside the logical
    /// dimensions or when the polynomial lands outside storage.
    pub fn storage_index(&self, i: usize, j: usize) -> Result<usize> {
        let (m, n) = self.logical_dimensions();
        if i >= m {
            return Err(Error::IndexOutOfRange { index: i, size: m });
        }
        if j >= n {
            return Err(Error::IndexOutOfRange { index: j, size: n });
        }
        let k = self
            .poly
            .evaluate(to_i64(self.imf_r.map(i))?, to_i64(self.imf_c.map(j))?);
        match usize::try_from(k) {
            Ok(k) if k < self.storage_dimensions => Ok(k),
            _ => Err(Error::IndexOutOfRange {
                index: k.max(0) as usize,
                size: self.storage_dimensions,
            }),
        }
    }

    /// A view whose logical `(i, j)` is this AMF's `(view_r(i), view_c(j))`
    ///
    /// Fails with [`Error::Mismatch`] if a view IMF's codomain differs from
    /// the corresponding logical dimension.
    pub fn compose(&self, view_r: &Imf, view_c: &Imf) -> Result<Self> {
        let (m, n) = self.logical_dimensions();
        if view_r.codomain() != m {
            return Err(Error::Mismatch {
                op: "Amf::compose",
                expected: m,
                got: view_r.codomain(),
            });
        }
        if view_c.codomain() != n {
            return Err(Error::Mismatch {
                op: "Amf::compose",
                expected: n,
                got: view_c.codomain(),
            });
        }
        Self::new(
            self.imf_r.compose(view_r),
            self.imf_c.compose(view_c),
            self.poly,
            self.storage_dimensions,
        )
    }

    /// The transposed view
    pub fn transpose(&self) -> Self {
        Self {
            imf_r: self.imf_c.clone(),
            imf_c: self.imf_r.clone(),
            poly: self.poly.transpose(),
            storage_dimensions: self.storage_dimensions,
        }
    }

    /// The main diagonal as a `min(m, n) × 1` view
    ///
    /// Fails with [`Error::Unsupported`] when the row and column maps are
    /// different runtime maps, since the polynomial can then not be
    /// collapsed.
    pub fn diagonal(&self) -> Result<Self> {
        let (m, n) = self.logical_dimensions();
        let k = m.min(n);
        let imf_r = match (&self.imf_r, &self.imf_c) {
            (r, c) if r.is_identity() && c.is_identity() => Imf::id(k),
            (r, c) if r == c => r.clone(),
            _ => {
                return Err(Error::Unsupported(
                    "diagonal of a view with distinct runtime index maps".to_string(),
                ))
            }
        };
        trace!(m, n, k, "Amf::diagonal");
        Ok(Self {
            imf_r,
            imf_c: Imf::zero(1),
            poly: self.poly.diagonal(),
            storage_dimensions: self.storage_dimensions,
        })
    }

    /// The contiguous block `rows × cols`
    pub fn block(&self, rows: Range<usize>, cols: Range<usize>) -> Result<Self> {
        let (m, n) = self.logical_dimensions();
        let view_r = Imf::strided(rows.len(), m, rows.start, 1)?;
        let view_c = Imf::strided(cols.len(), n, cols.start, 1)?;
        self.compose(&view_r, &view_c)
    }

    /// The submatrix at the given row and column indices
    pub fn select(&self, rows: Vec<usize>, cols: Vec<usize>) -> Result<Self> {
        let (m, n) = self.logical_dimensions();
        self.compose(&Imf::select(m, rows)?, &Imf::select(n, cols)?)
    }

    /// The same storage viewed as a matrix, through identity maps
    pub fn as_matrix(&self) -> Result<Self> {
        let (m, n) = self.logical_dimensions();
        self.compose(&Imf::id(m), &Imf::id(n))
    }
}

/// A dense, read-only view of a storage buffer through an [`Amf`]
pub struct AmfView<'a, T> {
    data: &'a [T],
    amf: Amf,
}

impl<'a, T: Scalar> AmfView<'a, T> {
    /// Fails with [`Error::Mismatch`] if `data` is shorter than the AMF's storage
    pub fn new(data: &'a [T], amf: Amf) -> Result<Self> {
        if data.len() < amf.storage_dimensions() {
            return Err(Error::Mismatch {
                op: "AmfView::new",
                expected: amf.storage_dimensions(),
                got: data.len(),
            });
        }
        Ok(Self { data, amf })
    }

    /// Reads a flat vector of length `m·n` as an `m × n` matrix
    ///
    /// Only the two full layouts make sense here; any other [`Storage`]
    /// gives [`Error::Illegal`].
    pub fn over_vector(data: &'a [T], m: usize, n: usize, layout: Storage) -> Result<Self> {
        if !matches!(layout, Storage::FullRowMajor | Storage::FullColMajor) {
            return Err(Error::illegal(
                "AmfView::over_vector",
                format!("{:?} is not a full layout", layout),
            ));
        }
        if data.len() != m * n {
            return Err(Error::Mismatch {
                op: "AmfView::over_vector",
                expected: m * n,
                got: data.len(),
            });
        }
        Ok(Self::from_parts(data, layout.amf(m, n)?.as_matrix()?))
    }

    pub(crate) fn from_parts(data: &'a [T], amf: Amf) -> Self {
        Self { data, amf }
    }

    pub fn amf(&self) -> &Amf {
        &self.amf
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.amf.logical_dimensions()
    }

    pub fn get(&self, i: usize, j: usize) -> Result<&T> {
        Ok(&self.data[self.amf.storage_index(i, j)?])
    }

    /// Re-views the same storage through `f(amf)`
    pub fn map_amf(&self, f: impl FnOnce(&Amf) -> Result<Amf>) -> Result<AmfView<'a, T>> {
        Ok(AmfView {
            data: self.data,
            amf: f(&self.amf)?,
        })
    }

    pub fn transpose(&self) -> AmfView<'a, T> {
        AmfView {
            data: self.data,
            amf: self.amf.transpose(),
        }
    }

    /// Copies the view into an [`Array2`]
    pub fn to_array(&self) -> Result<Array2<T>> {
        let (m, n) = self.dimensions();
        let mut out = Array2::from_elem((m, n), T::default());
        for i in 0..m {
            for j in 0..n {
                out[[i, j]] = self.get(i, j)?.clone();
            }
        }
        Ok(out)
    }
}
