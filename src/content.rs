//! The content of a cylinder.
//!
//! `content(cylinder(S, A)) = μ_S(A)`. Content is finitely additive on the
//! cylinder algebra; countable additivity is what the witness search in
//! [`crate::witness`] establishes.

use tracing::trace;

use crate::cylinder::Cylinder;
use crate::error::{MeasureError, MeasureResult};
use crate::family::ProjectiveFamily;
use crate::law::Space;
use crate::semiring::ENNReal;
use crate::window::{Index, Window};

/// Content on cylinders, read off a projective family.
pub struct ContentFunction<'a, F: ProjectiveFamily + ?Sized> {
    family: &'a F,
    tolerance: f64,
}

impl<'a, F: ProjectiveFamily + ?Sized> ContentFunction<'a, F> {
    pub fn new(family: &'a F, tolerance: f64) -> Self {
        Self { family, tolerance }
    }

    pub fn family(&self) -> &'a F {
        self.family
    }

    fn space_of(&self) -> impl Fn(Index) -> Space + 'a {
        let family = self.family;
        move |i| family.space(i)
    }

    /// `μ_S(A)`
    pub fn content(&self, cylinder: &Cylinder) -> MeasureResult<ENNReal> {
        let value = self.family.measure(cylinder.window(), cylinder.region())?;
        trace!(%cylinder, %value, "content");
        Ok(value)
    }

    /// Whether two cylinders denote the same set; when they do, their
    /// contents must agree or the family is not projective.
    pub fn check_well_defined(&self, a: &Cylinder, b: &Cylinder) -> MeasureResult<bool> {
        if !a.same_set(b, &self.space_of()) {
            return Ok(false);
        }
        let ca = self.content(a)?;
        let cb = self.content(b)?;
        if !ca.approx_eq(cb, self.tolerance) {
            return Err(MeasureError::invariant(format!(
                "{} and {} denote the same set but have contents {} and {}",
                a, b, ca, cb
            )));
        }
        Ok(true)
    }

    /// `content(a ∪ b) = content(a) + content(b)` for disjoint cylinders.
    pub fn check_additivity(&self, a: &Cylinder, b: &Cylinder) -> MeasureResult<()> {
        if !a.is_disjoint_from(b, &self.space_of()) {
            return Err(MeasureError::domain(format!(
                "{} and {} overlap; additivity is stated for disjoint cylinders",
                a, b
            )));
        }
        let joint = self.content(&a.union(b))?;
        let split = self.content(a)? + self.content(b)?;
        if !joint.approx_eq(split, self.tolerance) {
            return Err(MeasureError::invariant(format!(
                "content is not additive: {} vs {} + {}",
                joint,
                self.content(a)?,
                self.content(b)?
            )));
        }
        Ok(())
    }

    /// Compare a cylinder's content with that of its reindexing onto
    /// `target`.
    pub fn check_reindexing(&self, cylinder: &Cylinder, target: &Window) -> MeasureResult<()> {
        let moved = cylinder.reindex(target)?;
        self.family.check_projectivity(
            cylinder.window(),
            moved.window(),
            cylinder.region(),
            self.tolerance,
        )
    }
}
