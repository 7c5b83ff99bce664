//! Core types for the witness search.

use crate::point::{Assignment, Value};
use crate::semiring::ENNReal;
use crate::window::{Index, Window};

/// What happened at one level of the witness recursion.
#[derive(Clone, Debug, PartialEq)]
pub struct StepRecord {
    /// The coordinate fixed at this level
    pub level: Index,
    /// The value chosen for it
    pub value: Value,
    /// How many candidates were evaluated before one was accepted
    pub candidates_tried: usize,
    /// Name of the strategy that proposed the value
    pub strategy: String,
    /// `min_n marginal(Icc(level+1, N(n)), f_n)` at the extended prefix,
    /// minus `ε`
    pub slack: ENNReal,
}

/// Outcome of the downward-continuity check along a decreasing sequence.
#[derive(Clone, Debug, PartialEq)]
pub enum Continuity {
    /// Contents converge to zero
    Vanishes {
        /// `content(A_n)` for the inspected terms
        contents: Vec<ENNReal>,
    },
    /// Contents stay above `epsilon`, and a point lying in every inspected
    /// term was constructed
    Persists {
        /// The lower bound the recursion preserved
        epsilon: ENNReal,
        /// `content(A_n)` for the inspected terms
        contents: Vec<ENNReal>,
        /// The materialised prefix of the witness point
        witness: Assignment,
    },
}

impl Continuity {
    pub fn vanishes(&self) -> bool {
        matches!(self, Continuity::Vanishes { .. })
    }

    pub fn contents(&self) -> &[ENNReal] {
        match self {
            Continuity::Vanishes { contents } | Continuity::Persists { contents, .. } => contents,
        }
    }

    pub fn witness(&self) -> Option<&Assignment> {
        match self {
            Continuity::Vanishes { .. } => None,
            Continuity::Persists { witness, .. } => Some(witness),
        }
    }
}

/// `Icc(from, N)`, or the empty window when `N` is absent or below `from`.
pub(crate) fn tail_window(from: Index, last: Option<Index>) -> Window {
    match last {
        Some(last) if last >= from => Window::icc(from, last),
        _ => Window::empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_window() {
        assert_eq!(tail_window(2, Some(4)), Window::icc(2, 4));
        assert!(tail_window(5, Some(4)).is_empty());
        assert!(tail_window(0, None).is_empty());
    }
}
