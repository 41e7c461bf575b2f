//! Cost model selecting a collective algorithm
//!
//! With `P` processes, a payload of `N` bytes, a per-byte gap `g` and a
//! per-superstep latency `l`:
//!
//! | Algorithm | Cost |
//! |-----------|------|
//! | one step  | `P·N·g + l` |
//! | transpose | `2·N·g + 2·l` |
//! | tree      | `2·√P·N·g + 2·l` |

use crate::config::CollectivesConfig;

/// Communication pattern of a collective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Every process talks directly to the designated partner
    OneStep,
    /// Every process reduces `1/P` of the payload, then shares its chunk
    Transpose,
    /// Two-level tree with `√P` intermediate processes
    Tree,
}

/// The three cost formulas for a given `g` and `l`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    /// Per-byte message gap
    pub g: f64,
    /// Per-superstep latency
    pub l: f64,
}

impl CostModel {
    /// The model described by `config`
    pub fn from_config(config: &CollectivesConfig) -> Self {
        Self {
            g: config.g,
            l: config.l,
        }
    }

    /// Cost of the one-step algorithm
    pub fn one_step(&self, p: usize, bytes: usize) -> f64 {
        p as f64 * bytes as f64 * self.g + self.l
    }

    /// Cost of the two-step transpose algorithm
    pub fn transpose(&self, bytes: usize) -> f64 {
        2.0 * bytes as f64 * self.g + 2.0 * self.l
    }

    /// Cost of the two-level tree algorithm
    pub fn tree(&self, p: usize, bytes: usize) -> f64 {
        2.0 * (p as f64).sqrt() * bytes as f64 * self.g + 2.0 * self.l
    }

    /// The cheapest algorithm for `elements` items of `elem_bytes` bytes each
    ///
    /// The transpose algorithm splits the payload into `P` chunks and is
    /// never chosen when there are fewer elements than processes.
    pub fn choose(&self, p: usize, elements: usize, elem_bytes: usize) -> Algorithm {
        let bytes = elements.saturating_mul(elem_bytes.max(1));
        let basic = self.one_step(p, bytes);
        let transpose = self.transpose(bytes);
        let tree = self.tree(p, bytes);

        if basic <= transpose && basic <= tree {
            Algorithm::OneStep
        } else if elements < p || tree < transpose {
            Algorithm::Tree
        } else {
            Algorithm::Transpose
        }
    }
}

/// Picks the algorithm for a collective, honouring a forced choice in `config`
///
/// Operators that do not commute always use the one-step algorithm, and a
/// forced transpose falls back to the tree when the payload is too short.
/// Without a forced choice, the one-step algorithm is ruled out once its
/// `P`-fold fan-out exceeds the collectives buffer.
pub fn choose(
    config: &CollectivesConfig,
    p: usize,
    elements: usize,
    elem_bytes: usize,
    commutative: bool,
) -> Algorithm {
    if p <= 1 || !commutative {
        return Algorithm::OneStep;
    }
    match config.force_algorithm {
        Some(Algorithm::Transpose) if elements < p => Algorithm::Tree,
        Some(forced) => forced,
        None => {
            let model = CostModel::from_config(config);
            let fan_out = elements.saturating_mul(elem_bytes.max(1)).saturating_mul(p);
            match model.choose(p, elements, elem_bytes) {
                Algorithm::OneStep if fan_out > config.buffer_capacity => {
                    let bytes = elements.saturating_mul(elem_bytes.max(1));
                    if elements < p || model.tree(p, bytes) < model.transpose(bytes) {
                        Algorithm::Tree
                    } else {
                        Algorithm::Transpose
                    }
                }
                chosen => chosen,
            }
        }
    }
}
