//! Mask evaluation under the structural and invert-mask descriptor bits

use crate::descriptors::Descriptor;
use crate::error::{check_size, Result};
use crate::types::{Scalar, Truthy};
use crate::vector::Vector;

/// Decides per index whether a masked primitive may write there
///
/// Without `STRUCTURAL`, index `i` passes if the mask holds a value at `i`
/// that evaluates true; with it, presence alone suffices. `INVERT_MASK`
/// negates the outcome. A mask of size zero means "no mask".
pub(crate) struct MaskFilter<'a> {
    test: Option<Box<dyn Fn(usize) -> bool + Send + Sync + 'a>>,
    candidates: Option<Vec<usize>>,
}

impl<'a> MaskFilter<'a> {
    /// A filter that lets every index pass
    pub(crate) fn none() -> Self {
        Self {
            test: None,
            candidates: None,
        }
    }

    /// Builds the filter for a mask guarding an output of size `n`
    ///
    /// Fails with [`Error::Mismatch`](crate::Error::Mismatch) if a non-empty
    /// mask does not have size `n`.
    pub(crate) fn new<M: Scalar + Truthy>(
        op: &'static str,
        mask: &'a Vector<M>,
        n: usize,
        desc: Descriptor,
    ) -> Result<Self> {
        if mask.size() == 0 {
            return Ok(Self::none());
        }
        check_size(op, n, mask.size())?;

        let structural = desc.is_structural();
        let invert = desc.inverts_mask();
        let values = mask.raw_values();
        let coords = mask.coords();
        let hit = move |i: usize| coords.assigned(i) && (structural || values[i].truthy());

        // Only a non-inverted mask bounds the indices worth visiting
        let candidates = if invert {
            None
        } else {
            let mut idx: Vec<usize> = coords.iter().filter(|&i| hit(i)).collect();
            idx.sort_unstable();
            Some(idx)
        };

        Ok(Self {
            test: Some(Box::new(move |i| hit(i) != invert)),
            candidates,
        })
    }

    /// Whether a mask is in effect
    #[inline]
    pub(crate) fn is_active(&self) -> bool {
        self.test.is_some()
    }

    /// Whether index `i` passes
    #[inline]
    pub(crate) fn allows(&self, i: usize) -> bool {
        match &self.test {
            Some(test) => test(i),
            None => true,
        }
    }

    /// All passing indices in ascending order, when the mask bounds them
    pub(crate) fn candidates(&self) -> Option<&[usize]> {
        self.candidates.as_deref()
    }
}
