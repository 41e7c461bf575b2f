//! Bivariate quadratic storage polynomials
//!
//! A storage layout maps a logical coordinate `(x, y)` to a position in a
//! flat buffer through
//!
//! ```text
//! p(x, y) = (Ax2·ax2·x² + Ay2·ay2·y² + Axy·axy·x·y + Ax·ax·x + Ay·ay·y + A0·a0) / D
//! ```
//!
//! The uppercase template coefficients are fixed per layout and the
//! lowercase ones depend on the dimensions of a particular container. A
//! template coefficient of zero drops its term from evaluation.

use crate::error::{Error, Result};

/// The six coefficients of a bivariate quadratic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Coefficients {
    pub x2: i64,
    pub y2: i64,
    pub xy: i64,
    pub x: i64,
    pub y: i64,
    pub c: i64,
}

impl Coefficients {
    pub const ZERO: Coefficients = Coefficients::new(0, 0, 0, 0, 0, 0);

    pub const fn new(x2: i64, y2: i64, xy: i64, x: i64, y: i64, c: i64) -> Self {
        Self { x2, y2, xy, x, y, c }
    }

    /// The same coefficients with the roles of `x` and `y` exchanged
    pub const fn swap_xy(self) -> Self {
        Self::new(self.y2, self.x2, self.xy, self.y, self.x, self.c)
    }

    fn times(self, other: Self) -> Self {
        Self::new(
            self.x2 * other.x2,
            self.y2 * other.y2,
            self.xy * other.xy,
            self.x * other.x,
            self.y * other.y,
            self.c * other.c,
        )
    }

    /// 1 where `self` is nonzero
    fn support(self) -> Self {
        let one = |v: i64| i64::from(v != 0);
        Self::new(one(self.x2), one(self.y2), one(self.xy), one(self.x), one(self.y), one(self.c))
    }
}

/// What to substitute for one variable of a polynomial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Substitution {
    /// `v ↦ b + s·v`
    Affine { b: i64, s: i64 },
    /// `v ↦ c`; the variable disappears
    Constant(i64),
}

/// A storage polynomial with template and runtime coefficients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BivariateQuadratic {
    template: Coefficients,
    runtime: Coefficients,
    denominator: i64,
}

impl BivariateQuadratic {
    /// # Arguments
    ///
    /// * `template` - Layout constants; a zero here removes the term
    /// * `runtime` - Dimension-dependent factors of each term
    /// * `denominator` - Exact divisor of the numerator; must be nonzero
    pub fn new(template: Coefficients, runtime: Coefficients, denominator: i64) -> Result<Self> {
        if denominator == 0 {
            return Err(Error::illegal("BivariateQuadratic::new", "denominator is zero"));
        }
        Ok(Self {
            template,
            runtime,
            denominator,
        })
    }

    /// A polynomial whose terms are exactly `effective`
    fn from_effective(effective: Coefficients, denominator: i64) -> Self {
        Self {
            template: effective.support(),
            runtime: effective,
            denominator,
        }
    }

    pub fn template(&self) -> Coefficients {
        self.template
    }

    pub fn runtime(&self) -> Coefficients {
        self.runtime
    }

    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    /// The products of template and runtime coefficients
    pub fn effective(&self) -> Coefficients {
        self.template.times(self.runtime)
    }

    /// `p(x, y)`
    #[inline]
    pub fn evaluate(&self, x: i64, y: i64) -> i64 {
        let (t, r) = (&self.template, &self.runtime);
        let mut acc = 0;
        if t.x2 != 0 {
            acc += t.x2 * r.x2 * x * x;
        }
        if t.y2 != 0 {
            acc += t.y2 * r.y2 * y * y;
        }
        if t.xy != 0 {
            acc += t.xy * r.xy * x * y;
        }
        if t.x != 0 {
            acc += t.x * r.x * x;
        }
        if t.y != 0 {
            acc += t.y * r.y * y;
        }
        if t.c != 0 {
            acc += t.c * r.c;
        }
        acc / self.denominator
    }

    /// `p(y, x)`
    pub fn transpose(&self) -> Self {
        Self {
            template: self.template.swap_xy(),
            runtime: self.runtime.swap_xy(),
            denominator: self.denominator,
        }
    }

    /// Substitutes `x` and re-collects the terms
    pub fn substitute_x(&self, sub: Substitution) -> Self {
        let e = self.effective();
        let fused = match sub {
            Substitution::Affine { b, s } => Coefficients::new(
                e.x2 * s * s,
                e.y2,
                e.xy * s,
                s * (2 * e.x2 * b + e.x),
                e.y + e.xy * b,
                e.c + e.x2 * b * b + e.x * b,
            ),
            Substitution::Constant(c) => Coefficients::new(
                0,
                e.y2,
                0,
                0,
                e.y + e.xy * c,
                e.c + e.x2 * c * c + e.x * c,
            ),
        };
        Self::from_effective(fused, self.denominator)
    }

    /// Substitutes `y` and re-collects the terms
    pub fn substitute_y(&self, sub: Substitution) -> Self {
        self.transpose().substitute_x(sub).transpose()
    }

    /// `q(x, ·) = p(x, x)`: a polynomial in `x` alone
    pub fn diagonal(&self) -> Self {
        let e = self.effective();
        Self::from_effective(
            Coefficients::new(e.x2 + e.y2 + e.xy, 0, 0, e.x + e.y, 0, e.c),
            self.denominator,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_row_major(n: i64) -> BivariateQuadratic {
        BivariateQuadratic::new(
            Coefficients::new(0, 0, 0, 1, 1, 0),
            Coefficients::new(0, 0, 0, n, 1, 0),
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_zero_denominator_rejected() {
        assert!(BivariateQuadratic::new(Coefficients::ZERO, Coefficients::ZERO, 0).is_err());
    }

    #[test]
    fn test_evaluate_skips_zero_template_terms() {
        // Runtime coefficients under a zero template never contribute
        let p = BivariateQuadratic::new(
            Coefficients::new(0, 0, 0, 1, 1, 0),
            Coefficients::new(100, 100, 100, 4, 1, 100),
            1,
        )
        .unwrap();
        assert_eq!(p.evaluate(2, 3), 11);
    }

    #[test]
    fn test_transpose_swaps_roles() {
        let p = full_row_major(7);
        let t = p.transpose();
        for (x, y) in [(0, 0), (2, 5), (6, 1)] {
            assert_eq!(t.evaluate(y, x), p.evaluate(x, y));
        }
        assert_eq!(t.transpose(), p);
    }

    #[test]
    fn test_affine_substitution_matches_direct_evaluation() {
        // Packed upper, row-wise, n = 6
        let p = BivariateQuadratic::new(
            Coefficients::new(-1, 0, 0, 1, 2, 0),
            Coefficients::new(1, 0, 0, 11, 1, 0),
            2,
        )
        .unwrap();
        let (br, sr, bc, sc) = (1, 2, 3, 1);
        let fused = p
            .substitute_x(Substitution::Affine { b: br, s: sr })
            .substitute_y(Substitution::Affine { b: bc, s: sc });
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(fused.evaluate(i, j), p.evaluate(br + sr * i, bc + sc * j));
            }
        }
    }

    #[test]
    fn test_constant_substitution_drops_variable() {
        let p = BivariateQuadratic::new(
            Coefficients::new(1, 1, 1, 1, 1, 1),
            Coefficients::new(2, 3, 5, 7, 11, 13),
            1,
        )
        .unwrap();
        let q = p.substitute_x(Substitution::Constant(4));
        let e = q.effective();
        assert_eq!((e.x2, e.xy, e.x), (0, 0, 0));
        for y in 0..5 {
            assert_eq!(q.evaluate(123, y), p.evaluate(4, y));
        }
    }

    #[test]
    fn test_diagonal_collapses() {
        let p = full_row_major(5);
        let d = p.diagonal();
        assert_eq!(d.effective().y, 0);
        for k in 0..5 {
            assert_eq!(d.evaluate(k, 99), p.evaluate(k, k));
        }
    }
}
