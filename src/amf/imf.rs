//! Index mapping functions
//!
//! An [`Imf`] maps the logical indices `0..len()` of one dimension of a
//! view onto the indices `0..codomain()` of the container underneath.
//! Strided, constant and zero maps compose into maps of the same kind;
//! anything else composes into a boxed [`Imf::Composed`] that is evaluated
//! step by step.

use crate::error::{Error, Result};

/// An injection (or constant map) between integer intervals
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Imf {
    /// `i ↦ b + s·i`; the identity is `b = 0, s = 1`
    Strided {
        n: usize,
        codomain: usize,
        b: usize,
        s: usize,
    },
    /// Every index maps to 0
    Zero { n: usize },
    /// Every index maps to `c`
    Constant { n: usize, codomain: usize, c: usize },
    /// `i ↦ select[i]`
    Select { codomain: usize, select: Vec<usize> },
    /// `i ↦ f(g(i))`
    Composed { f: Box<Imf>, g: Box<Imf> },
}

impl Imf {
    /// The identity on `0..n`
    pub fn id(n: usize) -> Self {
        Imf::Strided {
            n,
            codomain: n,
            b: 0,
            s: 1,
        }
    }

    /// `i ↦ b + s·i` from `0..n` into `0..codomain`
    ///
    /// Fails with [`Error::Illegal`] if the last image falls outside the codomain.
    pub fn strided(n: usize, codomain: usize, b: usize, s: usize) -> Result<Self> {
        if n > 0 {
            let last = s.checked_mul(n - 1).and_then(|step| step.checked_add(b));
            if last.map_or(true, |last| last >= codomain) {
                return Err(Error::illegal(
                    "Imf::strided",
                    format!("{} + {}·{} exceeds codomain {}", b, s, n - 1, codomain),
                ));
            }
        }
        Ok(Imf::Strided { n, codomain, b, s })
    }

    /// The map sending `0..n` to 0
    pub fn zero(n: usize) -> Self {
        Imf::Zero { n }
    }

    /// The map sending `0..n` to `c`
    pub fn constant(n: usize, codomain: usize, c: usize) -> Result<Self> {
        if c >= codomain {
            return Err(Error::IndexOutOfRange {
                index: c,
                size: codomain,
            });
        }
        Ok(Imf::Constant { n, codomain, c })
    }

    /// The map `i ↦ select[i]`
    pub fn select(codomain: usize, select: Vec<usize>) -> Result<Self> {
        if let Some(&index) = select.iter().find(|&&k| k >= codomain) {
            return Err(Error::IndexOutOfRange {
                index,
                size: codomain,
            });
        }
        Ok(Imf::Select { codomain, select })
    }

    /// Size of the domain
    pub fn len(&self) -> usize {
        match self {
            Imf::Strided { n, .. } | Imf::Zero { n } | Imf::Constant { n, .. } => *n,
            Imf::Select { select, .. } => select.len(),
            Imf::Composed { g, .. } => g.len(),
        }
    }

    /// Whether the domain is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the codomain
    pub fn codomain(&self) -> usize {
        match self {
            Imf::Strided { codomain, .. }
            | Imf::Constant { codomain, .. }
            | Imf::Select { codomain, .. } => *codomain,
            Imf::Zero { .. } => 1,
            Imf::Composed { f, .. } => f.codomain(),
        }
    }

    /// Whether this is the identity on its domain
    pub fn is_identity(&self) -> bool {
        matches!(self, Imf::Strided { n, codomain, b: 0, s: 1 } if n == codomain)
    }

    /// The image of `i`
    ///
    /// # Panics
    ///
    /// Panics if `i` is outside the domain of a [`Imf::Select`].
    #[inline]
    pub fn map(&self, i: usize) -> usize {
        match self {
            Imf::Strided { b, s, .. } => b + s * i,
            Imf::Zero { .. } => 0,
            Imf::Constant { c, .. } => *c,
            Imf::Select { select, .. } => select[i],
            Imf::Composed { f, g } => f.map(g.map(i)),
        }
    }

    /// `self ∘ inner`: first `inner`, then `self`
    ///
    /// Strided after strided stays strided, and anything before or after a
    /// constant map is constant. Every other pairing is kept as a
    /// [`Imf::Composed`].
    pub fn compose(&self, inner: &Imf) -> Imf {
        if self.is_identity() {
            return inner.clone();
        }
        if inner.is_identity() {
            return self.clone();
        }
        let n = inner.len();
        let constant = |c: usize| {
            if c == 0 {
                Imf::Zero { n }
            } else {
                Imf::Constant {
                    n,
                    codomain: self.codomain(),
                    c,
                }
            }
        };
        match (self, inner) {
            (
                Imf::Strided {
                    codomain, b: fb, s: fs, ..
                },
                Imf::Strided { b: gb, s: gs, .. },
            ) => Imf::Strided {
                n,
                codomain: *codomain,
                b: fs * gb + fb,
                s: fs * gs,
            },
            (Imf::Zero { .. }, _) => Imf::Zero { n },
            (Imf::Constant { c, .. }, _) => constant(*c),
            (f, Imf::Zero { .. }) => constant(f.map(0)),
            (f, Imf::Constant { c, .. }) => constant(f.map(*c)),
            (f, g) => Imf::Composed {
                f: Box::new(f.clone()),
                g: Box::new(g.clone()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strided_bounds() {
        // last image is b + 9
        assert!(Imf::strided(4, 10, 0, 3).is_ok());
        assert!(Imf::strided(4, 10, 1, 3).is_err());
        assert!(Imf::strided(4, 10, 2, 3).is_err());
        assert!(Imf::strided(1, 10, 9, 100).is_ok());
        assert!(Imf::strided(0, 0, 5, 5).is_ok());
    }

    #[test]
    fn test_strided_huge_stride_is_illegal() {
        assert!(matches!(
            Imf::strided(2, 10, 0, usize::MAX),
            Err(Error::Illegal { .. })
        ));
        assert!(matches!(
            Imf::strided(3, usize::MAX, 1, usize::MAX / 2),
            Err(Error::Illegal { .. })
        ));
        assert!(matches!(
            Imf::strided(2, usize::MAX, usize::MAX, 0),
            Err(Error::Illegal { .. })
        ));
    }

    #[test]
    fn test_strided_composition_stays_strided() {
        let f = Imf::strided(5, 20, 2, 3).unwrap();
        let g = Imf::strided(2, 5, 1, 2).unwrap();
        let h = f.compose(&g);
        assert_eq!(
            h,
            Imf::Strided {
                n: 2,
                codomain: 20,
                b: 5,
                s: 6
            }
        );
        for i in 0..2 {
            assert_eq!(h.map(i), f.map(g.map(i)));
        }
    }

    #[test]
    fn test_identity_composition() {
        let id = Imf::id(6);
        assert!(id.is_identity());
        assert!(id.compose(&Imf::id(6)).is_identity());
        let s = Imf::strided(3, 6, 0, 2).unwrap();
        assert_eq!(id.compose(&s), s);
    }

    #[test]
    fn test_constant_absorbs() {
        let f = Imf::strided(5, 20, 2, 3).unwrap();
        let c = Imf::constant(4, 5, 1).unwrap();
        let h = f.compose(&c);
        assert_eq!(h.len(), 4);
        assert!((0..4).all(|i| h.map(i) == 5));
        assert_eq!(Imf::zero(3).compose(&f), Imf::zero(5));
        assert_eq!(Imf::id(3).compose(&Imf::zero(7)), Imf::zero(7));
    }

    #[test]
    fn test_select_composes_at_runtime() {
        let sel = Imf::select(10, vec![9, 4, 7]).unwrap();
        let g = Imf::strided(2, 3, 1, 1).unwrap();
        let h = sel.compose(&g);
        assert!(matches!(h, Imf::Composed { .. }));
        assert_eq!(h.len(), 2);
        assert_eq!(h.codomain(), 10);
        assert_eq!((h.map(0), h.map(1)), (4, 7));
    }

    #[test]
    fn test_select_out_of_range() {
        assert!(Imf::select(3, vec![0, 3]).is_err());
        assert!(Imf::constant(2, 2, 2).is_err());
    }
}
