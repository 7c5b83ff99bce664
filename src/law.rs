//! Coordinate spaces and the probability laws on them.
//!
//! Each coordinate `X_n` is one of three kinds of space, and each carries a
//! probability law `μ_n`. Laws measure [`IntervalSet`]s in closed form and
//! integrate functions of a single coordinate numerically.

use std::fmt;

use tracing::warn;

use crate::config::ExtensionConfig;
use crate::error::{MeasureError, MeasureResult};
use crate::interval::IntervalSet;
use crate::point::Value;
use crate::semiring::ENNReal;

/// Slack allowed when checking that a law has total mass one.
pub const MASS_TOLERANCE: f64 = 1e-9;

// ============================================================================
// SPACES
// ============================================================================

/// A nonempty coordinate space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Space {
    /// `{0, …, n-1}`, `n ≥ 1`
    Finite(u64),
    /// ℕ
    Naturals,
    /// The real interval `[lo, hi]`
    Interval { lo: f64, hi: f64 },
}

impl Space {
    /// Whether `value` is an element of the space.
    pub fn admits(&self, value: Value) -> bool {
        match (self, value) {
            (Space::Finite(n), Value::Nat(k)) => k < *n,
            (Space::Naturals, Value::Nat(_)) => true,
            (Space::Interval { lo, hi }, Value::Real(x)) => *lo <= x && x <= *hi,
            _ => false,
        }
    }

    /// The space as a subset of the line. The right end of an interval
    /// space is dropped, which no law here can see.
    pub fn support(&self) -> IntervalSet {
        match self {
            Space::Finite(n) => IntervalSet::interval(0.0, *n as f64),
            Space::Naturals => IntervalSet::interval(0.0, f64::INFINITY),
            Space::Interval { lo, hi } => IntervalSet::interval(*lo, *hi),
        }
    }

    /// Canonical form of `set ∩ space`: on countable spaces every piece is
    /// snapped to integer ends, so two sets with the same elements compare
    /// equal.
    pub fn normalize(&self, set: &IntervalSet) -> IntervalSet {
        match self {
            Space::Finite(_) | Space::Naturals => {
                let upper = match self {
                    Space::Finite(n) => *n as f64,
                    _ => f64::INFINITY,
                };
                IntervalSet::from_pieces(
                    set.pieces()
                        .iter()
                        .map(|&(lo, hi)| (lo.ceil().max(0.0), hi.ceil().min(upper)))
                        .collect(),
                )
            }
            Space::Interval { .. } => set.intersection(&self.support()),
        }
    }

    pub fn is_countable(&self) -> bool {
        !matches!(self, Space::Interval { .. })
    }
}

// ============================================================================
// LAWS
// ============================================================================

/// A probability measure on one coordinate.
#[derive(Clone, Debug, PartialEq)]
pub enum Law {
    /// Finite support `{0, …, n-1}` with the given weights
    Atoms(Vec<f64>),
    /// `μ{k} = (1 - ratio) · ratio^k` on ℕ
    Geometric { ratio: f64 },
    /// Normalised Lebesgue measure on `[lo, hi]`
    Uniform { lo: f64, hi: f64 },
}

impl Law {
    /// Fair coin on `{0, 1}`
    pub fn coin() -> Self {
        Law::Atoms(vec![0.5, 0.5])
    }

    /// `μ{1} = p`, `μ{0} = 1 - p`
    pub fn bernoulli(p: f64) -> Self {
        Law::Atoms(vec![1.0 - p, p])
    }

    /// Uniform on `{0, …, n-1}`
    pub fn uniform_finite(n: usize) -> Self {
        Law::Atoms(vec![1.0 / n as f64; n])
    }

    /// `μ{k} = 2^{-(k+1)}`
    pub fn geometric_half() -> Self {
        Law::Geometric { ratio: 0.5 }
    }

    /// Lebesgue measure on `[0, 1]`
    pub fn unit_lebesgue() -> Self {
        Law::Uniform { lo: 0.0, hi: 1.0 }
    }

    /// Check that the law is a probability measure.
    pub fn validate(&self) -> MeasureResult<()> {
        match self {
            Law::Atoms(weights) => {
                if weights.is_empty() {
                    return Err(MeasureError::invariant("atomic law has no atoms"));
                }
                if let Some(w) = weights.iter().find(|w| !(w.is_finite() && **w >= 0.0)) {
                    return Err(MeasureError::invariant(format!(
                        "atomic law has weight {} outside [0, ∞)",
                        w
                    )));
                }
                let total: f64 = weights.iter().sum();
                if (total - 1.0).abs() > MASS_TOLERANCE {
                    return Err(MeasureError::invariant(format!(
                        "atomic law has total mass {}, expected 1",
                        total
                    )));
                }
            }
            Law::Geometric { ratio } => {
                if !(*ratio >= 0.0 && *ratio < 1.0) {
                    return Err(MeasureError::invariant(format!(
                        "geometric ratio {} outside [0, 1)",
                        ratio
                    )));
                }
            }
            Law::Uniform { lo, hi } => {
                if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                    return Err(MeasureError::invariant(format!(
                        "uniform law on [{}, {}] is not a bounded nonempty interval",
                        lo, hi
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn space(&self) -> Space {
        match self {
            Law::Atoms(weights) => Space::Finite(weights.len() as u64),
            Law::Geometric { .. } => Space::Naturals,
            Law::Uniform { lo, hi } => Space::Interval { lo: *lo, hi: *hi },
        }
    }

    /// Mass of the atom `{k}` (zero on interval laws).
    pub fn mass(&self, k: u64) -> f64 {
        match self {
            Law::Atoms(weights) => weights.get(k as usize).copied().unwrap_or(0.0),
            Law::Geometric { ratio } => (1.0 - ratio) * ratio.powf(k as f64),
            Law::Uniform { .. } => 0.0,
        }
    }

    /// `μ(set)`, in closed form.
    pub fn measure(&self, set: &IntervalSet) -> MeasureResult<ENNReal> {
        let set = self.space().normalize(set);
        let total = match self {
            Law::Atoms(weights) => set
                .pieces()
                .iter()
                .map(|&(lo, hi)| {
                    let hi = hi.min(weights.len() as f64) as usize;
                    weights[lo as usize..hi].iter().sum::<f64>()
                })
                .sum::<f64>(),
            Law::Geometric { ratio } => set
                .pieces()
                .iter()
                .map(|&(lo, hi)| {
                    let upper = if hi.is_finite() { ratio.powf(hi) } else { 0.0 };
                    ratio.powf(lo) - upper
                })
                .sum::<f64>(),
            Law::Uniform { lo, hi } => {
                set.pieces().iter().map(|&(a, b)| b - a).sum::<f64>() / (hi - lo)
            }
        };
        ENNReal::clamped(total)
    }

    /// `∫ f dμ`.
    ///
    /// `breakpoints` are the places where `f` may jump. Atoms are summed
    /// exactly. A geometric law is summed past the last breakpoint until the
    /// remaining mass falls below `config.tail_tolerance`; the remainder is
    /// charged at the last evaluated term, which is exact when `f` is
    /// constant beyond its breakpoints. An interval law is cut at the
    /// breakpoints and each piece integrated by the midpoint rule.
    pub fn integrate(
        &self,
        f: &mut dyn FnMut(Value) -> MeasureResult<ENNReal>,
        breakpoints: &[f64],
        config: &ExtensionConfig,
    ) -> MeasureResult<ENNReal> {
        match self {
            Law::Atoms(weights) => {
                let mut total = ENNReal::ZERO;
                for (k, &w) in weights.iter().enumerate() {
                    if w > 0.0 {
                        total = total + f(Value::Nat(k as u64))?.scale(w);
                    }
                }
                Ok(total)
            }
            Law::Geometric { ratio } => {
                let last_jump = breakpoints
                    .iter()
                    .filter(|b| b.is_finite() && **b > 0.0)
                    .fold(0.0f64, |acc, &b| acc.max(b.ceil()));
                let mut total = ENNReal::ZERO;
                let mut k: u64 = 0;
                loop {
                    let value = f(Value::Nat(k))?;
                    let remaining = ratio.powf(k as f64 + 1.0);
                    let past_jumps = (k as f64) >= last_jump;
                    if (past_jumps && remaining < config.tail_tolerance)
                        || k + 1 >= config.max_terms as u64
                    {
                        if remaining >= config.tail_tolerance {
                            warn!(
                                terms = k + 1,
                                remaining, "geometric sum hit the term cap before its tail vanished"
                            );
                        }
                        // Mass of {x ≥ k} is ratio^k
                        total = total + value.scale(ratio.powf(k as f64));
                        return Ok(total);
                    }
                    total = total + value.scale(self.mass(k));
                    k += 1;
                }
            }
            Law::Uniform { lo, hi } => {
                let mut cuts: Vec<f64> = breakpoints
                    .iter()
                    .copied()
                    .filter(|b| lo < b && b < hi)
                    .collect();
                cuts.push(*lo);
                cuts.push(*hi);
                cuts.sort_by(|a, b| a.total_cmp(b));
                cuts.dedup();

                let n = config.quadrature_nodes;
                let width = hi - lo;
                let mut total = ENNReal::ZERO;
                for piece in cuts.windows(2) {
                    let (a, b) = (piece[0], piece[1]);
                    let step = (b - a) / n as f64;
                    let weight = step / width;
                    for j in 0..n {
                        let x = a + (j as f64 + 0.5) * step;
                        total = total + f(Value::Real(x))?.scale(weight);
                    }
                }
                Ok(total)
            }
        }
    }
}

impl fmt::Display for Law {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Law::Atoms(weights) => write!(f, "atoms{:?}", weights),
            Law::Geometric { ratio } => write!(f, "geometric(ratio={})", ratio),
            Law::Uniform { lo, hi } => write!(f, "uniform[{}, {}]", lo, hi),
        }
    }
}
