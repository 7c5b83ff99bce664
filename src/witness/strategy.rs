//! Strategies that propose coordinate values to the witness search.
//!
//! The recursion only needs *some* value of `X_k` keeping the lower bound
//! alive; it does not say which. A strategy turns that existence statement
//! into a finite, ordered list of candidates. The search accepts the first
//! candidate that works, so the order decides which witness is produced.

use std::fmt;

use crate::config::ExtensionConfig;
use crate::law::Law;
use crate::point::Value;
use crate::window::Index;

/// Proposes candidate values for one coordinate.
pub trait SelectionStrategy {
    /// Candidates for coordinate `index`, distributed as `law`, given the
    /// places where the functions under study jump on that coordinate.
    fn candidates(
        &self,
        index: Index,
        law: &Law,
        breakpoints: &[f64],
        config: &ExtensionConfig,
    ) -> Vec<Value>;

    /// Human-readable name for this strategy
    fn name(&self) -> &str;
}

// ============================================================================
// BUILT-IN STRATEGIES
// ============================================================================

/// Enumerate a countable space in increasing order.
///
/// Atoms of zero mass are skipped: no lower bound on an integral can be
/// carried by them. Geometric laws are enumerated up to
/// `config.max_candidates`. Interval laws get no candidates.
pub struct Enumerate;

impl SelectionStrategy for Enumerate {
    fn candidates(
        &self,
        _index: Index,
        law: &Law,
        _breakpoints: &[f64],
        config: &ExtensionConfig,
    ) -> Vec<Value> {
        match law {
            Law::Atoms(weights) => weights
                .iter()
                .enumerate()
                .filter(|(_, w)| **w > 0.0)
                .map(|(k, _)| Value::Nat(k as u64))
                .take(config.max_candidates)
                .collect(),
            Law::Geometric { .. } => (0..config.max_candidates as u64).map(Value::Nat).collect(),
            Law::Uniform { .. } => Vec::new(),
        }
    }

    fn name(&self) -> &str {
        "enumerate"
    }
}

/// Search an interval coordinate.
///
/// First the midpoints of the pieces cut out by the breakpoints (every
/// value a piecewise-constant function can take is represented there), then
/// the midpoints of successively halved dyadic cells, coarse to fine, down to
/// `config.bisection_depth` levels.
pub struct Bisection;

impl SelectionStrategy for Bisection {
    fn candidates(
        &self,
        _index: Index,
        law: &Law,
        breakpoints: &[f64],
        config: &ExtensionConfig,
    ) -> Vec<Value> {
        let (lo, hi) = match law {
            Law::Uniform { lo, hi } => (*lo, *hi),
            _ => return Vec::new(),
        };

        let mut cuts: Vec<f64> = breakpoints
            .iter()
            .copied()
            .filter(|b| lo < *b && *b < hi)
            .collect();
        cuts.push(lo);
        cuts.push(hi);
        cuts.sort_by(|a, b| a.total_cmp(b));
        cuts.dedup();

        let mut out: Vec<f64> = cuts.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect();
        for depth in 1..=config.bisection_depth {
            let cells = 1u64 << depth;
            let width = (hi - lo) / cells as f64;
            // Odd multiples of half a cell are new at this depth
            for j in 0..cells {
                let x = lo + (j as f64 + 0.5) * width;
                if !out.contains(&x) {
                    out.push(x);
                }
            }
            if out.len() >= config.max_candidates {
                break;
            }
        }
        out.truncate(config.max_candidates);
        out.into_iter().map(Value::Real).collect()
    }

    fn name(&self) -> &str {
        "bisection"
    }
}

/// Pick [`Enumerate`] or [`Bisection`] from the shape of the law.
pub struct LawDefault;

impl SelectionStrategy for LawDefault {
    fn candidates(
        &self,
        index: Index,
        law: &Law,
        breakpoints: &[f64],
        config: &ExtensionConfig,
    ) -> Vec<Value> {
        if law.space().is_countable() {
            Enumerate.candidates(index, law, breakpoints, config)
        } else {
            Bisection.candidates(index, law, breakpoints, config)
        }
    }

    fn name(&self) -> &str {
        "law-default"
    }
}

/// Candidates supplied by the caller, for coordinate spaces the built-in
/// strategies know nothing about.
pub struct Oracle<F> {
    name: String,
    propose: F,
}

impl<F> Oracle<F>
where
    F: Fn(Index, &Law, &[f64]) -> Vec<Value>,
{
    pub fn new(name: impl Into<String>, propose: F) -> Self {
        Self {
            name: name.into(),
            propose,
        }
    }
}

impl<F> SelectionStrategy for Oracle<F>
where
    F: Fn(Index, &Law, &[f64]) -> Vec<Value>,
{
    fn candidates(
        &self,
        index: Index,
        law: &Law,
        breakpoints: &[f64],
        config: &ExtensionConfig,
    ) -> Vec<Value> {
        let mut out = (self.propose)(index, law, breakpoints);
        out.truncate(config.max_candidates);
        out
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> fmt::Debug for Oracle<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Oracle")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
