//! Coordinates and finite windows of coordinates.
//!
//! A window is a finite subset of ℕ. Windows are stored as
//! `RoaringTreemap`s, so unions and subset tests stay cheap even for the
//! long prefixes the witness search walks through.

use std::fmt;

use roaring::RoaringTreemap;

/// A coordinate of the infinite product.
pub type Index = u64;

/// A finite set of coordinates.
#[derive(Clone, PartialEq, Default)]
pub struct Window {
    indices: RoaringTreemap,
}

impl Eq for Window {}

impl Window {
    /// The empty window
    pub fn empty() -> Self {
        Self::default()
    }

    /// `{i}`
    pub fn singleton(index: Index) -> Self {
        let mut indices = RoaringTreemap::new();
        indices.insert(index);
        Self { indices }
    }

    /// `[0, n)`
    pub fn prefix(n: u64) -> Self {
        (0..n).collect()
    }

    /// `[a, b]`, empty when `a > b`
    pub fn icc(a: Index, b: Index) -> Self {
        if a > b {
            return Self::empty();
        }
        (a..=b).collect()
    }

    pub fn insert(&mut self, index: Index) -> bool {
        self.indices.insert(index)
    }

    pub fn contains(&self, index: Index) -> bool {
        self.indices.contains(index)
    }

    pub fn len(&self) -> usize {
        self.indices.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Largest index, `None` for the empty window
    pub fn max(&self) -> Option<Index> {
        self.indices.max()
    }

    pub fn min(&self) -> Option<Index> {
        self.indices.min()
    }

    /// Indices in increasing order
    pub fn iter(&self) -> impl Iterator<Item = Index> + '_ {
        self.indices.iter()
    }

    pub fn union(&self, other: &Window) -> Window {
        Window {
            indices: &self.indices | &other.indices,
        }
    }

    pub fn intersection(&self, other: &Window) -> Window {
        Window {
            indices: &self.indices & &other.indices,
        }
    }

    pub fn difference(&self, other: &Window) -> Window {
        Window {
            indices: &self.indices - &other.indices,
        }
    }

    pub fn is_subset(&self, other: &Window) -> bool {
        self.indices.is_subset(&other.indices)
    }

    pub fn is_disjoint(&self, other: &Window) -> bool {
        self.indices.is_disjoint(&other.indices)
    }

    /// True when the window is `[0, n)` for some `n`.
    pub fn is_prefix(&self) -> bool {
        match self.max() {
            None => true,
            Some(max) => self.len() as u64 == max + 1,
        }
    }
}

impl FromIterator<Index> for Window {
    fn from_iter<I: IntoIterator<Item = Index>>(iter: I) -> Self {
        Window {
            indices: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, index) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", index)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert!(Window::empty().is_empty());
        assert_eq!(Window::prefix(3), [0, 1, 2].into_iter().collect());
        assert_eq!(Window::icc(2, 4), [2, 3, 4].into_iter().collect());
        assert!(Window::icc(5, 4).is_empty());
        assert_eq!(Window::singleton(7).max(), Some(7));
    }

    #[test]
    fn test_set_algebra() {
        let a: Window = [0, 1, 2].into_iter().collect();
        let b: Window = [2, 3].into_iter().collect();

        assert_eq!(a.union(&b), Window::prefix(4));
        assert_eq!(a.intersection(&b), Window::singleton(2));
        assert_eq!(a.difference(&b), Window::prefix(2));
        assert!(Window::prefix(2).is_subset(&a));
        assert!(!b.is_subset(&a));
        assert!(Window::prefix(2).is_disjoint(&b));
    }

    #[test]
    fn test_is_prefix_and_display() {
        assert!(Window::empty().is_prefix());
        assert!(Window::prefix(5).is_prefix());
        assert!(!Window::icc(1, 3).is_prefix());
        assert_eq!(format!("{}", Window::icc(1, 3)), "{1, 2, 3}");
    }
}
