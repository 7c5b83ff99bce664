//! Cylinder sets and the rectangles that generate them.
//!
//! A cylinder `Cylinder(S, A)` is the set of full points whose restriction to
//! the finite window `S` lies in `A ⊆ ∏_{n∈S} X_n`. The sets `A` used here are
//! [`Region`]s: finite unions of measurable rectangles. Rectangles form a
//! semiring (closed under intersection, differences split into finitely many
//! disjoint rectangles), and regions the algebra it generates.
//!
//! # Representation
//!
//! A [`Rect`] stores only its constrained sides; a coordinate without a side
//! is unconstrained. Reindexing a cylinder onto a larger window is therefore
//! free: the preimage of `A` under the projection `∏_{T} X_n → ∏_{S} X_n`
//! is described by the same rectangles.
//!
//! Two representations `(S, A)` and `(T, B)` denote the same cylinder iff
//! their pullbacks to `S ∪ T` coincide. [`Cylinder::same_set`] decides this
//! exactly: both sides are normalised against the coordinate spaces and the
//! symmetric difference is tested for emptiness in the boolean semiring.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{MeasureError, MeasureResult};
use crate::interval::IntervalSet;
use crate::law::Space;
use crate::point::Assignment;
use crate::semiring::OrderedSemiring;
use crate::window::{Index, Window};

// ============================================================================
// RECTANGLES
// ============================================================================

/// A measurable rectangle `∏_i side_i`; unlisted coordinates are whole.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Rect {
    sides: BTreeMap<Index, IntervalSet>,
}

impl Rect {
    /// The whole product
    pub fn full() -> Self {
        Self::default()
    }

    /// Constrain coordinate `index` to `set` (intersecting with any side
    /// already present).
    pub fn with_side(mut self, index: Index, set: IntervalSet) -> Self {
        let side = match self.sides.remove(&index) {
            Some(existing) => existing.intersection(&set),
            None => set,
        };
        if !side.is_full() {
            self.sides.insert(index, side);
        }
        self
    }

    /// Replace a side outright.
    fn replace_side(&self, index: Index, set: IntervalSet) -> Self {
        let mut next = self.clone();
        if set.is_full() {
            next.sides.remove(&index);
        } else {
            next.sides.insert(index, set);
        }
        next
    }

    /// The side on coordinate `index` (the whole line when unconstrained)
    pub fn side(&self, index: Index) -> IntervalSet {
        self.sides
            .get(&index)
            .cloned()
            .unwrap_or_else(IntervalSet::full)
    }

    pub fn sides(&self) -> impl Iterator<Item = (Index, &IntervalSet)> + '_ {
        self.sides.iter().map(|(&i, s)| (i, s))
    }

    /// Coordinates the rectangle constrains
    pub fn support(&self) -> Window {
        self.sides.keys().copied().collect()
    }

    /// True when some side is empty. A rectangle whose sides are nonempty as
    /// subsets of the line may still miss a coordinate space; see
    /// [`Rect::normalize`].
    pub fn is_trivially_empty(&self) -> bool {
        self.sides.values().any(IntervalSet::is_empty)
    }

    pub fn contains(&self, point: &Assignment) -> MeasureResult<bool> {
        for (&i, side) in &self.sides {
            if !side.contains(point.require(i)?.position()) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn intersect(&self, other: &Rect) -> Rect {
        other
            .sides
            .iter()
            .fold(self.clone(), |acc, (&i, s)| acc.with_side(i, s.clone()))
    }

    /// `self \ other` as disjoint rectangles.
    pub fn difference(&self, other: &Rect) -> Vec<Rect> {
        if self.is_trivially_empty() {
            return Vec::new();
        }
        let mut pieces = Vec::new();
        let mut core = self.clone();
        for (&i, other_side) in &other.sides {
            let side = core.side(i);
            let outside = side.difference(other_side);
            if !outside.is_empty() {
                pieces.push(core.replace_side(i, outside));
            }
            let inside = side.intersection(other_side);
            if inside.is_empty() {
                return pieces;
            }
            core = core.replace_side(i, inside);
        }
        // What is left of the core lies inside `other`
        pieces
    }

    /// Intersect every side with its coordinate space in canonical form.
    pub fn normalize(&self, space_of: &dyn Fn(Index) -> Space) -> Rect {
        let mut sides = BTreeMap::new();
        for (&i, side) in &self.sides {
            let space = space_of(i);
            let normal = space.normalize(side);
            if normal != space.normalize(&IntervalSet::full()) {
                sides.insert(i, normal);
            }
        }
        Rect { sides }
    }

    /// Product of `weight(i, side_i)` over the constrained sides, in any
    /// semiring. Unconstrained coordinates contribute `1`.
    pub fn weigh<S, W>(&self, mut weight: W) -> MeasureResult<S>
    where
        S: OrderedSemiring,
        W: FnMut(Index, &IntervalSet) -> MeasureResult<S>,
    {
        let mut acc = S::one();
        for (&i, side) in &self.sides {
            acc = acc.mul(&weight(i, side)?);
            if acc.is_zero() {
                break;
            }
        }
        Ok(acc)
    }

    /// Fix the coordinates assigned in `point`: `None` when the point falls
    /// outside the rectangle, otherwise the rectangle on the remaining
    /// coordinates.
    pub fn section(&self, point: &Assignment) -> Option<Rect> {
        let mut sides = BTreeMap::new();
        for (&i, side) in &self.sides {
            match point.get(i) {
                Some(v) if !side.contains(v.position()) => return None,
                Some(_) => {}
                None => {
                    sides.insert(i, side.clone());
                }
            }
        }
        Some(Rect { sides })
    }
}

// ============================================================================
// REGIONS
// ============================================================================

/// A finite union of rectangles: a measurable subset of a finite product.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Region {
    rects: Vec<Rect>,
}

impl Region {
    /// ∅
    pub fn empty() -> Self {
        Self::default()
    }

    /// The whole product
    pub fn full() -> Self {
        Self::from_rect(Rect::full())
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self::from_rects(vec![rect])
    }

    pub fn from_rects(rects: Vec<Rect>) -> Self {
        Self {
            rects: rects
                .into_iter()
                .filter(|r| !r.is_trivially_empty())
                .collect(),
        }
    }

    /// A single box `∏ sides`
    pub fn boxed(sides: impl IntoIterator<Item = (Index, IntervalSet)>) -> Self {
        Self::from_rect(
            sides
                .into_iter()
                .fold(Rect::full(), |r, (i, s)| r.with_side(i, s)),
        )
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Coordinates constrained by some rectangle
    pub fn support(&self) -> Window {
        self.rects
            .iter()
            .fold(Window::empty(), |w, r| w.union(&r.support()))
    }

    pub fn contains(&self, point: &Assignment) -> MeasureResult<bool> {
        for rect in &self.rects {
            if rect.contains(point)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn union(&self, other: &Region) -> Region {
        let mut rects = self.rects.clone();
        rects.extend(other.rects.iter().cloned());
        Region { rects }
    }

    pub fn intersection(&self, other: &Region) -> Region {
        Region::from_rects(
            self.rects
                .iter()
                .flat_map(|a| other.rects.iter().map(move |b| a.intersect(b)))
                .collect(),
        )
    }

    pub fn difference(&self, other: &Region) -> Region {
        let mut pieces = self.rects.clone();
        for cut in &other.rects {
            pieces = pieces.iter().flat_map(|p| p.difference(cut)).collect();
        }
        Region { rects: pieces }
    }

    pub fn complement(&self) -> Region {
        Region::full().difference(self)
    }

    /// The same set as a union of pairwise disjoint rectangles.
    pub fn disjoint_rects(&self) -> Vec<Rect> {
        let mut out: Vec<Rect> = Vec::with_capacity(self.rects.len());
        for rect in &self.rects {
            let mut pieces = vec![rect.clone()];
            for placed in &out {
                pieces = pieces.iter().flat_map(|p| p.difference(placed)).collect();
                if pieces.is_empty() {
                    break;
                }
            }
            out.extend(pieces);
        }
        out
    }

    /// Σ over disjoint rectangles of Π over their sides of `weight`.
    pub fn weigh<S, W>(&self, mut weight: W) -> MeasureResult<S>
    where
        S: OrderedSemiring,
        W: FnMut(Index, &IntervalSet) -> MeasureResult<S>,
    {
        let mut acc = S::zero();
        for rect in self.disjoint_rects() {
            acc = acc.add(&rect.weigh(&mut weight)?);
        }
        Ok(acc)
    }

    pub fn normalize(&self, space_of: &dyn Fn(Index) -> Space) -> Region {
        Region::from_rects(self.rects.iter().map(|r| r.normalize(space_of)).collect())
    }

    /// Whether the region has an element once every side is read inside its
    /// coordinate space.
    pub fn is_empty_in(&self, space_of: &dyn Fn(Index) -> Space) -> bool {
        let normal = self.normalize(space_of);
        let inhabited = normal.rects.iter().any(|r| {
            r.weigh::<bool, _>(|_, side| Ok(!side.is_empty()))
                .unwrap_or(false)
        });
        !inhabited
    }

    /// Fix the coordinates assigned in `point`.
    pub fn section(&self, point: &Assignment) -> Region {
        Region {
            rects: self.rects.iter().filter_map(|r| r.section(point)).collect(),
        }
    }

    /// Finite endpoints of all sides on coordinate `index`.
    pub fn breakpoints(&self, index: Index) -> Vec<f64> {
        let mut points: Vec<f64> = self
            .rects
            .iter()
            .filter_map(|r| r.sides.get(&index))
            .flat_map(IntervalSet::endpoints)
            .collect();
        points.sort_by(|a, b| a.total_cmp(b));
        points.dedup();
        points
    }
}

// ============================================================================
// CYLINDERS
// ============================================================================

/// `Cylinder(S, A)`: full points whose restriction to `S` lies in `A`.
#[derive(Clone, Debug, PartialEq)]
pub struct Cylinder {
    window: Window,
    region: Region,
}

impl Cylinder {
    /// `cylinder(S, A)`. Fails with a domain error when `A` constrains a
    /// coordinate outside `S`.
    pub fn new(window: Window, region: Region) -> MeasureResult<Self> {
        let support = region.support();
        if !support.is_subset(&window) {
            return Err(MeasureError::domain(format!(
                "region constrains coordinates {} outside the window {}",
                support.difference(&window),
                window
            )));
        }
        Ok(Self { window, region })
    }

    /// `cylinder(∅, *)`, the whole product space
    pub fn whole() -> Self {
        Self {
            window: Window::empty(),
            region: Region::full(),
        }
    }

    /// The empty cylinder
    pub fn empty() -> Self {
        Self {
            window: Window::empty(),
            region: Region::empty(),
        }
    }

    /// A box cylinder over the window of its sides.
    pub fn boxed(sides: impl IntoIterator<Item = (Index, IntervalSet)>) -> Self {
        let region = Region::boxed(sides);
        Self {
            window: region.support(),
            region,
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn contains(&self, point: &Assignment) -> MeasureResult<bool> {
        self.region.contains(point)
    }

    /// The same cylinder over `target ⊇ S`, through the preimage of `A`
    /// under the projection onto `S`.
    pub fn reindex(&self, target: &Window) -> MeasureResult<Cylinder> {
        if !self.window.is_subset(target) {
            return Err(MeasureError::domain(format!(
                "cannot reindex from {} to {}: the target window must contain the source",
                self.window, target
            )));
        }
        Ok(Cylinder {
            window: target.clone(),
            region: self.region.clone(),
        })
    }

    fn common_window(&self, other: &Cylinder) -> Window {
        self.window.union(&other.window)
    }

    pub fn intersect(&self, other: &Cylinder) -> Cylinder {
        Cylinder {
            window: self.common_window(other),
            region: self.region.intersection(&other.region),
        }
    }

    pub fn union(&self, other: &Cylinder) -> Cylinder {
        Cylinder {
            window: self.common_window(other),
            region: self.region.union(&other.region),
        }
    }

    pub fn difference(&self, other: &Cylinder) -> Cylinder {
        Cylinder {
            window: self.common_window(other),
            region: self.region.difference(&other.region),
        }
    }

    pub fn complement(&self) -> Cylinder {
        Cylinder {
            window: self.window.clone(),
            region: self.region.complement(),
        }
    }

    /// Whether the cylinder has no points.
    pub fn is_empty_in(&self, space_of: &dyn Fn(Index) -> Space) -> bool {
        self.region.is_empty_in(space_of)
    }

    pub fn is_disjoint_from(&self, other: &Cylinder, space_of: &dyn Fn(Index) -> Space) -> bool {
        self.intersect(other).is_empty_in(space_of)
    }

    pub fn is_subset_of(&self, other: &Cylinder, space_of: &dyn Fn(Index) -> Space) -> bool {
        self.difference(other).is_empty_in(space_of)
    }

    /// Whether `(S, A)` and `(T, B)` denote the same subset of the product.
    pub fn same_set(&self, other: &Cylinder, space_of: &dyn Fn(Index) -> Space) -> bool {
        self.is_subset_of(other, space_of) && other.is_subset_of(self, space_of)
    }
}

impl fmt::Display for Cylinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cyl[{}](", self.window)?;
        if self.region.rects.is_empty() {
            write!(f, "∅")?;
        }
        for (k, rect) in self.region.rects.iter().enumerate() {
            if k > 0 {
                write!(f, " ∪ ")?;
            }
            write!(f, "<")?;
            for (j, (i, side)) in rect.sides().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "x{} ∈ {}", i, side)?;
            }
            write!(f, ">")?;
        }
        write!(f, ")")
    }
}

// ============================================================================
// TESTS
// ============================================================================
