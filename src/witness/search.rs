//! The level-by-level witness construction.

use tracing::{debug, trace};

use crate::config::ExtensionConfig;
use crate::error::{MeasureError, MeasureResult};
use crate::family::ProjectiveFamily;
use crate::marginal::{Integrand, Marginalizer};
use crate::point::{Assignment, Value};
use crate::semiring::ENNReal;
use crate::window::Index;

use super::sequence::AntitoneSequence;
use super::strategy::{LawDefault, SelectionStrategy};
use super::types::{tail_window, StepRecord};

/// A lazily constructed point `y` such that, for every inspected `n`,
/// `marginal(Icc(k, N(n)), f_n)(y) ≥ ε` at every level `k` reached so far.
///
/// Iterating yields the coordinates `y_0, y_1, …` one at a time. The
/// iterator never ends on its own; it stops after the first error.
pub struct Witness<'a> {
    marginalizer: Marginalizer<'a>,
    terms: Vec<Box<dyn Integrand + 'a>>,
    /// `N(n)`: the largest coordinate term `n` reads
    horizons: Vec<Option<Index>>,
    epsilon: ENNReal,
    bound: ENNReal,
    strategy: Box<dyn SelectionStrategy + 'a>,
    prefix: Vec<Value>,
    history: Vec<StepRecord>,
    failed: bool,
}

impl<'a> Witness<'a> {
    /// Start a search for a point keeping every `∫ f_n` above `epsilon`.
    ///
    /// Fails with an invariant violation when `epsilon` is not a positive
    /// finite number, when the sequence bound is infinite, or when the
    /// expectations `∫ f_n` for `n ≤ horizon` exceed the bound, increase,
    /// or drop below `epsilon`.
    pub fn new(
        sequence: &'a dyn AntitoneSequence,
        marginalizer: Marginalizer<'a>,
        epsilon: ENNReal,
    ) -> MeasureResult<Self> {
        let horizon = marginalizer.config().horizon;
        Self::over_terms(sequence, marginalizer, epsilon, horizon)
    }

    /// As [`Witness::new`], inspecting the terms `0..=horizon` instead of
    /// the configured horizon.
    pub fn over_terms(
        sequence: &'a dyn AntitoneSequence,
        marginalizer: Marginalizer<'a>,
        epsilon: ENNReal,
        horizon: usize,
    ) -> MeasureResult<Self> {
        let tol = marginalizer.config().tolerance;

        if !epsilon.is_finite() || epsilon == ENNReal::ZERO {
            return Err(MeasureError::invariant(format!(
                "the lower bound must be positive and finite, got {}",
                epsilon
            )));
        }
        let bound = sequence.bound();
        if !bound.is_finite() {
            return Err(MeasureError::invariant(
                "the sequence must be uniformly bounded by a finite constant",
            ));
        }

        let mut terms = Vec::with_capacity(horizon + 1);
        let mut horizons = Vec::with_capacity(horizon + 1);
        let mut previous: Option<ENNReal> = None;
        for n in 0..=horizon {
            let term = sequence.term(n)?;
            let total = marginalizer.expectation(term.as_ref())?;
            check_bounded(n, total, bound, tol)?;
            if let Some(prev) = previous {
                check_antitone(n, total, prev, tol)?;
            }
            if total.to_f64() < epsilon.to_f64() - tol {
                return Err(MeasureError::invariant(format!(
                    "∫ f_{} = {} is below the lower bound {}",
                    n, total, epsilon
                )));
            }
            previous = Some(total);
            horizons.push(term.support().max());
            terms.push(term);
        }
        debug!(terms = terms.len(), %epsilon, %bound, "witness search initialised");

        Ok(Self {
            marginalizer,
            terms,
            horizons,
            epsilon,
            bound,
            strategy: Box::new(LawDefault),
            prefix: Vec::new(),
            history: Vec::new(),
            failed: false,
        })
    }

    /// Replace the candidate strategy. Only affects levels not yet reached.
    pub fn with_strategy(mut self, strategy: impl SelectionStrategy + 'a) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    /// Coordinates fixed so far
    pub fn prefix(&self) -> &[Value] {
        &self.prefix
    }

    /// The next coordinate to be fixed
    pub fn level(&self) -> Index {
        self.prefix.len() as Index
    }

    pub fn point(&self) -> Assignment {
        Assignment::from_prefix(&self.prefix)
    }

    pub fn history(&self) -> &[StepRecord] {
        &self.history
    }

    pub fn epsilon(&self) -> ENNReal {
        self.epsilon
    }

    /// Extend the witness to at least `depth` coordinates.
    pub fn take_prefix(&mut self, depth: usize) -> MeasureResult<Assignment> {
        while self.prefix.len() < depth {
            self.step()?;
        }
        Ok(self.point())
    }

    /// Fix the next coordinate.
    pub fn step(&mut self) -> MeasureResult<Value> {
        let result = self.advance();
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    fn config(&self) -> &'a ExtensionConfig {
        self.marginalizer.config()
    }

    fn advance(&mut self) -> MeasureResult<Value> {
        if self.failed {
            return Err(MeasureError::extension(
                "the witness search already failed and cannot be resumed",
            ));
        }
        let config = self.config();
        let tol = config.tolerance;
        let level = self.level();
        let family = self.marginalizer.family();
        let law = family.law(level);
        let space = family.space(level);
        let base = self.point();

        let mut breakpoints: Vec<f64> = self
            .terms
            .iter()
            .flat_map(|f| f.breakpoints(level))
            .collect();
        breakpoints.sort_by(|a, b| a.total_cmp(b));
        breakpoints.dedup();

        let candidates: Vec<Value> = self
            .strategy
            .candidates(level, law, &breakpoints, config)
            .into_iter()
            .filter(|v| space.admits(*v))
            .take(config.max_candidates)
            .collect();

        let mut best: Option<ENNReal> = None;
        for (tried, candidate) in candidates.iter().enumerate() {
            let point = base.with(level, *candidate);
            let lowest = self.lowest_section(level, &point)?;
            trace!(level, %candidate, %lowest, "witness candidate");

            if lowest.to_f64() >= self.epsilon.to_f64() - tol {
                let slack = lowest.saturating_sub(self.epsilon);
                debug!(level, value = %candidate, tried = tried + 1, %slack, "witness level fixed");
                self.history.push(StepRecord {
                    level,
                    value: *candidate,
                    candidates_tried: tried + 1,
                    strategy: self.strategy.name().to_string(),
                    slack,
                });
                self.prefix.push(*candidate);
                return Ok(*candidate);
            }
            best = Some(best.map_or(lowest, |b| b.max(lowest)));
        }

        Err(MeasureError::extension(format!(
            "no value of coordinate {} among {} candidates from `{}` keeps every section above {} (best {})",
            level,
            candidates.len(),
            self.strategy.name(),
            self.epsilon,
            best.map_or_else(|| "none".to_string(), |b| b.to_string())
        )))
    }

    /// `min_n marginal(Icc(level+1, N(n)), f_n)(point)`, checking the bound
    /// and antitonicity along the way.
    fn lowest_section(&self, level: Index, point: &Assignment) -> MeasureResult<ENNReal> {
        let tol = self.config().tolerance;
        let mut lowest = ENNReal::TOP;
        let mut previous: Option<ENNReal> = None;
        for (n, (term, horizon)) in self.terms.iter().zip(&self.horizons).enumerate() {
            let window = tail_window(level + 1, *horizon);
            let value = self.marginalizer.integrate(&window, term.as_ref(), point)?;
            check_bounded(n, value, self.bound, tol)?;
            if let Some(prev) = previous {
                check_antitone(n, value, prev, tol)?;
            }
            previous = Some(value);
            lowest = lowest.min(value);
        }
        Ok(lowest)
    }
}

impl Iterator for Witness<'_> {
    type Item = MeasureResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        Some(self.step())
    }
}

impl std::iter::FusedIterator for Witness<'_> {}

fn check_bounded(n: usize, value: ENNReal, bound: ENNReal, tol: f64) -> MeasureResult<()> {
    if value.to_f64() > bound.to_f64() + tol {
        return Err(MeasureError::invariant(format!(
            "term {} reaches {}, above the declared bound {}",
            n, value, bound
        )));
    }
    Ok(())
}

fn check_antitone(n: usize, value: ENNReal, previous: ENNReal, tol: f64) -> MeasureResult<()> {
    if value.to_f64() > previous.to_f64() + tol {
        return Err(MeasureError::invariant(format!(
            "the sequence is not decreasing: term {} gives {} after {}",
            n, value, previous
        )));
    }
    Ok(())
}
