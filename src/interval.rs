//! Measurable subsets of a single coordinate.
//!
//! An [`IntervalSet`] is a finite disjoint union of half-open intervals
//! `[lo, hi)` of the extended real line. The family is closed under union,
//! intersection and complement, so it forms an algebra; on countable spaces
//! a natural number `k` is the interval `[k, k + 1)`.

use std::fmt;

/// A finite union of half-open intervals, kept sorted, disjoint and merged.
#[derive(Clone, PartialEq, Default)]
pub struct IntervalSet {
    /// Invariant: `lo < hi` for each piece, pieces sorted and separated by
    /// gaps of positive length.
    pieces: Vec<(f64, f64)>,
}

impl IntervalSet {
    /// ∅
    pub fn empty() -> Self {
        Self::default()
    }

    /// The whole line
    pub fn full() -> Self {
        Self {
            pieces: vec![(f64::NEG_INFINITY, f64::INFINITY)],
        }
    }

    /// `[lo, hi)`; empty unless `lo < hi` (NaN bounds give ∅)
    pub fn interval(lo: f64, hi: f64) -> Self {
        if lo < hi {
            Self {
                pieces: vec![(lo, hi)],
            }
        } else {
            Self::empty()
        }
    }

    /// `{k}` on a countable coordinate
    pub fn point(k: u64) -> Self {
        Self::interval(k as f64, k as f64 + 1.0)
    }

    /// `{x : x ≥ k}` on a countable coordinate
    pub fn at_least(k: u64) -> Self {
        Self::interval(k as f64, f64::INFINITY)
    }

    /// `{x : x < bound}`
    pub fn below(bound: f64) -> Self {
        Self::interval(f64::NEG_INFINITY, bound)
    }

    /// A finite set of naturals
    pub fn points(ks: impl IntoIterator<Item = u64>) -> Self {
        Self::from_pieces(
            ks.into_iter()
                .map(|k| (k as f64, k as f64 + 1.0))
                .collect(),
        )
    }

    /// Normalise arbitrary pieces: drop empty ones, sort, merge overlaps.
    pub fn from_pieces(mut pieces: Vec<(f64, f64)>) -> Self {
        pieces.retain(|(lo, hi)| lo < hi);
        pieces.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut merged: Vec<(f64, f64)> = Vec::with_capacity(pieces.len());
        for (lo, hi) in pieces {
            match merged.last_mut() {
                Some(last) if lo <= last.1 => last.1 = last.1.max(hi),
                _ => merged.push((lo, hi)),
            }
        }
        Self { pieces: merged }
    }

    pub fn pieces(&self) -> &[(f64, f64)] {
        &self.pieces
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.pieces == [(f64::NEG_INFINITY, f64::INFINITY)]
    }

    pub fn contains(&self, x: f64) -> bool {
        self.pieces.iter().any(|&(lo, hi)| lo <= x && x < hi)
    }

    pub fn union(&self, other: &IntervalSet) -> IntervalSet {
        let mut pieces = self.pieces.clone();
        pieces.extend_from_slice(&other.pieces);
        Self::from_pieces(pieces)
    }

    pub fn intersection(&self, other: &IntervalSet) -> IntervalSet {
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.pieces.len() && j < other.pieces.len() {
            let (a_lo, a_hi) = self.pieces[i];
            let (b_lo, b_hi) = other.pieces[j];
            let lo = a_lo.max(b_lo);
            let hi = a_hi.min(b_hi);
            if lo < hi {
                out.push((lo, hi));
            }
            if a_hi < b_hi {
                i += 1;
            } else {
                j += 1;
            }
        }
        Self { pieces: out }
    }

    pub fn complement(&self) -> IntervalSet {
        let mut out = Vec::with_capacity(self.pieces.len() + 1);
        let mut cursor = f64::NEG_INFINITY;
        for &(lo, hi) in &self.pieces {
            if cursor < lo {
                out.push((cursor, lo));
            }
            cursor = hi;
        }
        if cursor < f64::INFINITY {
            out.push((cursor, f64::INFINITY));
        }
        Self { pieces: out }
    }

    pub fn difference(&self, other: &IntervalSet) -> IntervalSet {
        self.intersection(&other.complement())
    }

    pub fn is_subset(&self, other: &IntervalSet) -> bool {
        self.difference(other).is_empty()
    }

    /// Finite endpoints, in increasing order. These are the only places
    /// where the indicator of the set can jump.
    pub fn endpoints(&self) -> Vec<f64> {
        self.pieces
            .iter()
            .flat_map(|&(lo, hi)| [lo, hi])
            .filter(|x| x.is_finite())
            .collect()
    }
}

impl fmt::Debug for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pieces.is_empty() {
            return write!(f, "∅");
        }
        for (i, (lo, hi)) in self.pieces.iter().enumerate() {
            if i > 0 {
                write!(f, " ∪ ")?;
            }
            write!(f, "[{}, {})", lo, hi)?;
        }
        Ok(())
    }
}
