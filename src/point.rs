//! Coordinate values and (partial) points of the product space.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{MeasureError, MeasureResult};
use crate::window::{Index, Window};

/// A value of a single coordinate space `X_n`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    /// An element of a countable space (`{0..n-1}` or ℕ)
    Nat(u64),
    /// A point of a real interval
    Real(f64),
}

impl Value {
    /// Position on the real line, used for interval membership.
    pub fn position(self) -> f64 {
        match self {
            Value::Nat(k) => k as f64,
            Value::Real(x) => x,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nat(k) => write!(f, "{}", k),
            Value::Real(x) => write!(f, "{}", x),
        }
    }
}

/// A partial assignment: one value for each index of a finite window.
///
/// A full point of the product is never materialised. Every measurable
/// function used here reads finitely many coordinates, so an assignment
/// covering those coordinates stands for every full point extending it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Assignment {
    values: BTreeMap<Index, Value>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// The assignment `i ↦ values[i]` on `[0, values.len())`.
    pub fn from_prefix(values: &[Value]) -> Self {
        Self {
            values: values
                .iter()
                .enumerate()
                .map(|(i, v)| (i as Index, *v))
                .collect(),
        }
    }

    pub fn get(&self, index: Index) -> Option<Value> {
        self.values.get(&index).copied()
    }

    /// Look up a coordinate that a computation cannot proceed without.
    pub fn require(&self, index: Index) -> MeasureResult<Value> {
        self.get(index).ok_or_else(|| {
            MeasureError::domain(format!(
                "coordinate {} is not assigned (assigned: {})",
                index,
                self.domain()
            ))
        })
    }

    pub fn insert(&mut self, index: Index, value: Value) -> Option<Value> {
        self.values.insert(index, value)
    }

    /// A copy with one coordinate overwritten.
    pub fn with(&self, index: Index, value: Value) -> Self {
        let mut next = self.clone();
        next.insert(index, value);
        next
    }

    /// Overwrite the coordinates assigned in `other`: `update(x, S, y)`
    /// where `S` is the domain of `other`.
    pub fn update(&self, other: &Assignment) -> Self {
        let mut next = self.clone();
        for (&i, &v) in &other.values {
            next.values.insert(i, v);
        }
        next
    }

    /// Keep only the coordinates inside `window`.
    pub fn restrict(&self, window: &Window) -> Self {
        Self {
            values: self
                .values
                .iter()
                .filter(|(i, _)| window.contains(**i))
                .map(|(&i, &v)| (i, v))
                .collect(),
        }
    }

    /// The window of assigned coordinates
    pub fn domain(&self) -> Window {
        self.values.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Index, Value)> + '_ {
        self.values.iter().map(|(&i, &v)| (i, v))
    }
}

impl FromIterator<(Index, Value)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (Index, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_and_restrict() {
        let x = Assignment::from_prefix(&[Value::Nat(1), Value::Nat(2), Value::Nat(3)]);
        let y: Assignment = [(1, Value::Nat(9)), (5, Value::Nat(0))].into_iter().collect();

        let z = x.update(&y);
        assert_eq!(z.get(0), Some(Value::Nat(1)));
        assert_eq!(z.get(1), Some(Value::Nat(9)));
        assert_eq!(z.get(5), Some(Value::Nat(0)));
        assert_eq!(z.domain(), [0, 1, 2, 5].into_iter().collect());

        let r = z.restrict(&Window::prefix(2));
        assert_eq!(r.len(), 2);
        assert_eq!(r.get(2), None);
    }

    #[test]
    fn test_require_missing_is_domain_error() {
        let x = Assignment::new();
        assert!(matches!(x.require(3), Err(MeasureError::Domain(_))));
    }
}
