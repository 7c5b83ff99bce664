//! The product measure on the infinite product.
//!
//! [`ProductMeasure`] is the extension of cylinder content to the σ-algebra
//! the cylinders generate. On cylinders it *is* content; countable unions
//! are measured through disjoint pieces, decreasing intersections through
//! the continuity check of [`crate::witness`], and arbitrary sets through
//! the outer measure over a supplied family of cylinder covers.

use tracing::debug;

use crate::config::ExtensionConfig;
use crate::content::ContentFunction;
use crate::cylinder::{Cylinder, Region};
use crate::error::{MeasureError, MeasureResult};
use crate::family::{ProductFamily, ProjectiveFamily};
use crate::marginal::{Integrand, Marginalizer};
use crate::semiring::ENNReal;
use crate::window::Window;
use crate::witness::{downward_continuity, AntitoneSequence, Continuity};

/// `⨂_n μ_n` on `∏_n X_n`.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductMeasure {
    family: ProductFamily,
    config: ExtensionConfig,
}

impl ProductMeasure {
    /// Extend the content of `family` to a measure.
    ///
    /// Validates the configuration and checks that every coordinate law
    /// (the explicit ones and the tail) has total mass one, so the content of
    /// the whole space is one.
    pub fn build(family: ProductFamily, config: ExtensionConfig) -> MeasureResult<Self> {
        config.validate()?;

        let explicit = family.explicit_len() as u64;
        for i in 0..=explicit {
            let law = family.law(i);
            let total = law.measure(&family.space(i).support())?;
            if !total.approx_eq(ENNReal::ONE, config.tolerance) {
                return Err(MeasureError::invariant(format!(
                    "coordinate {} has total mass {} under {}",
                    i, total, law
                )));
            }
        }

        let measure = Self { family, config };
        let whole = measure.measure(&Cylinder::whole())?;
        if !whole.approx_eq(ENNReal::ONE, measure.config.tolerance) {
            return Err(MeasureError::invariant(format!(
                "the whole space has content {}",
                whole
            )));
        }
        debug!(
            explicit_laws = explicit,
            tail = %measure.family.tail(),
            "product measure built"
        );
        Ok(measure)
    }

    pub fn family(&self) -> &ProductFamily {
        &self.family
    }

    pub fn config(&self) -> &ExtensionConfig {
        &self.config
    }

    pub fn content(&self) -> ContentFunction<'_, ProductFamily> {
        ContentFunction::new(&self.family, self.config.tolerance)
    }

    pub fn marginalizer(&self) -> Marginalizer<'_> {
        Marginalizer::new(&self.family, &self.config)
    }

    /// The measure of a cylinder, equal to its content.
    pub fn measure(&self, cylinder: &Cylinder) -> MeasureResult<ENNReal> {
        self.content().content(cylinder)
    }

    /// The measure of `⋃ cylinders`.
    ///
    /// The union is cut into disjoint pieces `A_k \ (A_0 ∪ … ∪ A_{k-1})`
    /// whose contents are summed. The sum must match the content of the
    /// union and stay below `Σ content(A_k)`; either failure is an
    /// extension error.
    pub fn measure_union(&self, cylinders: &[Cylinder]) -> MeasureResult<ENNReal> {
        let tol = self.config.tolerance;
        let mut covered = Cylinder::empty();
        let mut disjoint = ENNReal::ZERO;
        let mut separate = ENNReal::ZERO;
        for cylinder in cylinders {
            let piece = cylinder.difference(&covered);
            disjoint = disjoint + self.measure(&piece)?;
            separate = separate + self.measure(cylinder)?;
            covered = covered.union(cylinder);
        }

        let joint = self.measure(&covered)?;
        if !joint.approx_eq(disjoint, tol) {
            return Err(MeasureError::extension(format!(
                "disjoint pieces of the union sum to {} but the union has content {}",
                disjoint, joint
            )));
        }
        if disjoint.to_f64() > separate.to_f64() + tol {
            return Err(MeasureError::extension(format!(
                "union measure {} exceeds the sum {} of its parts",
                disjoint, separate
            )));
        }
        Ok(disjoint)
    }

    /// Run the continuity check along a decreasing sequence.
    pub fn continuity(&self, sequence: &dyn AntitoneSequence) -> MeasureResult<Continuity> {
        let verdict = downward_continuity(sequence, self.marginalizer())?;
        debug!(vanishes = verdict.vanishes(), "downward continuity");
        Ok(verdict)
    }

    /// `lim ∫ f_n` along a decreasing sequence.
    ///
    /// Fails with [`MeasureError::Undetermined`] when the contents are still
    /// falling at the horizon cap.
    pub fn measure_decreasing(&self, sequence: &dyn AntitoneSequence) -> MeasureResult<ENNReal> {
        Ok(match self.continuity(sequence)? {
            Continuity::Vanishes { .. } => ENNReal::ZERO,
            Continuity::Persists { epsilon, .. } => epsilon,
        })
    }

    /// `inf Σ_k content(A_k)` over the supplied covers `(A_k)`.
    ///
    /// With no covers the infimum is over the empty set, `∞`.
    pub fn outer_measure(&self, covers: &[Vec<Cylinder>]) -> MeasureResult<ENNReal> {
        let mut best = ENNReal::TOP;
        for cover in covers {
            let mut total = ENNReal::ZERO;
            for cylinder in cover {
                total = total + self.measure(cylinder)?;
            }
            best = best.min(total);
        }
        Ok(best)
    }

    /// `∫ f` over the product.
    pub fn integrate(&self, f: &dyn Integrand) -> MeasureResult<ENNReal> {
        self.marginalizer().expectation(f)
    }

    /// The pushforward onto the coordinates in `window`.
    pub fn project(&self, window: &Window) -> WindowMeasure<'_> {
        WindowMeasure {
            measure: self,
            window: window.clone(),
        }
    }
}

/// `μ ∘ π_S⁻¹`, a measure on `∏_{n∈S} X_n`.
#[derive(Clone, Debug)]
pub struct WindowMeasure<'a> {
    measure: &'a ProductMeasure,
    window: Window,
}

impl WindowMeasure<'_> {
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// The measure of a region on the window. Regions constraining other
    /// coordinates are a domain error.
    pub fn measure(&self, region: &Region) -> MeasureResult<ENNReal> {
        let cylinder = Cylinder::new(self.window.clone(), region.clone())?;
        self.measure.measure(&cylinder)
    }
}
