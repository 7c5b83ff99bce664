//! Checking that a product measure projects onto its finite products.
//!
//! For a window `S` the pushforward of `⨂_n μ_n` along the projection onto
//! `∏_{n∈S} X_n` must be `⨂_{n∈S} μ_n`. The checker computes the left side
//! numerically, by integrating the indicator of `cylinder(S, A)` coordinate
//! by coordinate with closed-form sections switched off, and the right side
//! directly as a product of one-dimensional measures over disjoint boxes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::cylinder::{Cylinder, Rect, Region};
use crate::error::{MeasureError, MeasureResult};
use crate::extension::ProductMeasure;
use crate::family::ProjectiveFamily;
use crate::interval::IntervalSet;
use crate::law::Space;
use crate::marginal::{Indicator, Marginalizer};
use crate::semiring::ENNReal;
use crate::window::Window;

/// A probe on which the pushforward and the finite product disagree.
#[derive(Clone, Debug)]
pub struct Violation {
    pub window: Window,
    pub region: Region,
    /// `μ(π_S⁻¹(A))`, by iterated integration
    pub pushforward: ENNReal,
    /// `(⨂_{n∈S} μ_n)(A)`, in closed form
    pub product: ENNReal,
}

/// Result of checking one or more windows
#[derive(Clone, Debug)]
pub enum CheckResult {
    /// Every probe agreed
    Satisfied,
    /// Some probes disagreed
    Violated(Vec<Violation>),
}

impl CheckResult {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, CheckResult::Satisfied)
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            CheckResult::Satisfied => &[],
            CheckResult::Violated(vs) => vs,
        }
    }

    fn from_violations(violations: Vec<Violation>) -> Self {
        if violations.is_empty() {
            CheckResult::Satisfied
        } else {
            CheckResult::Violated(violations)
        }
    }
}

/// Compares a product measure with its finite-dimensional products.
pub struct ProjectiveLimitChecker<'a> {
    measure: &'a ProductMeasure,
}

impl<'a> ProjectiveLimitChecker<'a> {
    pub fn new(measure: &'a ProductMeasure) -> Self {
        Self { measure }
    }

    /// Compare both sides on every probe region over `window`.
    ///
    /// A probe that constrains a coordinate outside `window` is a domain
    /// error; disagreement beyond the configured tolerance is a violation.
    pub fn check_window(&self, window: &Window, probes: &[Region]) -> MeasureResult<CheckResult> {
        let family = self.measure.family();
        let config = self.measure.config().clone().with_exact_sections(false);
        let marginalizer = Marginalizer::new(family, &config);

        let mut violations = Vec::new();
        for region in probes {
            let cylinder = Cylinder::new(window.clone(), region.clone())?;
            let pushforward = marginalizer.expectation(&Indicator::new(cylinder))?;
            let product = region.weigh(|i, side| family.law(i).measure(side))?;
            if !pushforward.approx_eq(product, config.tolerance) {
                violations.push(Violation {
                    window: window.clone(),
                    region: region.clone(),
                    pushforward,
                    product,
                });
            }
        }
        debug!(
            %window,
            probes = probes.len(),
            violations = violations.len(),
            "projective limit checked"
        );
        Ok(CheckResult::from_violations(violations))
    }

    /// `count` random regions over `window`, reproducible from `seed`.
    ///
    /// Each region is a box, or a union of two boxes, with one side per
    /// coordinate of the window drawn to suit that coordinate's space.
    pub fn random_probes(&self, window: &Window, count: usize, seed: u64) -> Vec<Region> {
        let family = self.measure.family();
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                let pieces = if rng.random_bool(0.3) { 2 } else { 1 };
                Region::from_rects(
                    (0..pieces)
                        .map(|_| {
                            window.iter().fold(Rect::full(), |rect, i| {
                                rect.with_side(i, random_side(&mut rng, &family.space(i)))
                            })
                        })
                        .collect(),
                )
            })
            .collect()
    }

    /// Check each window on `count` random probes.
    pub fn check_windows(
        &self,
        windows: &[Window],
        count: usize,
        seed: u64,
    ) -> MeasureResult<CheckResult> {
        if count == 0 {
            return Err(MeasureError::invalid_parameter("count", "must be > 0"));
        }
        let mut violations = Vec::new();
        for (k, window) in windows.iter().enumerate() {
            let probes = self.random_probes(window, count, seed.wrapping_add(k as u64));
            if let CheckResult::Violated(found) = self.check_window(window, &probes)? {
                violations.extend(found);
            }
        }
        Ok(CheckResult::from_violations(violations))
    }
}

fn random_side(rng: &mut impl Rng, space: &Space) -> IntervalSet {
    match *space {
        Space::Finite(n) => IntervalSet::points((0..n).filter(|_| rng.random_bool(0.5))),
        Space::Naturals => {
            let k = rng.random_range(0..8u64);
            match rng.random_range(0..3) {
                0 => IntervalSet::point(k),
                1 => IntervalSet::at_least(k),
                _ => IntervalSet::interval(k as f64, (k + rng.random_range(1..4u64)) as f64),
            }
        }
        Space::Interval { lo, hi } => {
            let a = lo + (hi - lo) * rng.random::<f64>();
            let b = lo + (hi - lo) * rng.random::<f64>();
            IntervalSet::interval(a.min(b), a.max(b))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtensionConfig;
    use crate::family::ProductFamily;
    use crate::law::Law;

    fn mixed() -> ProductMeasure {
        let family = ProductFamily::new(
            vec![Law::coin(), Law::geometric_half(), Law::unit_lebesgue()],
            Law::uniform_finite(3),
        )
        .unwrap();
        ProductMeasure::build(family, ExtensionConfig::default()).unwrap()
    }

    #[test]
    fn test_probes_are_reproducible() {
        let measure = mixed();
        let checker = ProjectiveLimitChecker::new(&measure);
        let window = Window::prefix(4);
        let a = checker.random_probes(&window, 5, 7);
        let b = checker.random_probes(&window, 5, 7);
        assert_eq!(a, b);
        assert!(a.iter().all(|r| r.support().is_subset(&window)));
    }

    #[test]
    fn test_product_measure_passes() {
        let measure = mixed();
        let checker = ProjectiveLimitChecker::new(&measure);
        let result = checker
            .check_windows(&[Window::prefix(3), Window::icc(1, 4)], 8, 42)
            .unwrap();
        assert!(result.is_satisfied(), "{:?}", result.violations());
    }

    #[test]
    fn test_probe_outside_window_is_domain_error() {
        let measure = mixed();
        let checker = ProjectiveLimitChecker::new(&measure);
        let probe = Region::boxed([(9, IntervalSet::point(0))]);
        assert!(matches!(
            checker.check_window(&Window::prefix(2), &[probe]),
            Err(MeasureError::Domain(_))
        ));
    }
}
