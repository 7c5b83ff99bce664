//! Integrating out a window of coordinates.
//!
//! `marginal(S, f)(x) = ∫ f(update(x, S, ·)) dμ_S` integrates a non-negative
//! function over the coordinates in `S`, holding every other coordinate at
//! its value in `x`. Under a product family the integral is iterated one
//! coordinate at a time (Fubini), each coordinate with its own law.
//!
//! The result of marginalizing is again an [`Integrand`], supported on the
//! coordinates that were not integrated out, so marginals compose:
//! `marginal(S ∪ T, f) = marginal(S, marginal(T, f))` for disjoint `S`, `T`.
//!
//! Indicators of cylinders integrate in closed form (the measure of a
//! section of the region) unless `exact_sections` is switched off in the
//! configuration, in which case they go through quadrature like any other
//! function.

use std::collections::BTreeMap;

use crate::config::ExtensionConfig;
use crate::cylinder::Cylinder;
use crate::error::{MeasureError, MeasureResult};
use crate::family::{ProductFamily, ProjectiveFamily};
use crate::point::Assignment;
use crate::semiring::ENNReal;
use crate::window::{Index, Window};

// ============================================================================
// INTEGRANDS
// ============================================================================

/// A non-negative measurable function on the product space that reads only
/// finitely many coordinates.
pub trait Integrand {
    /// The coordinates the function depends on
    fn support(&self) -> Window;

    /// Value at a point assigning (at least) every coordinate of the support
    fn eval(&self, point: &Assignment) -> MeasureResult<ENNReal>;

    /// Places on coordinate `index` where the function may jump
    fn breakpoints(&self, _index: Index) -> Vec<f64> {
        Vec::new()
    }

    /// Closed form of `∫ f(update(point, window, ·)) dμ_window`, when known.
    fn section(
        &self,
        _window: &Window,
        _point: &Assignment,
        _family: &ProductFamily,
    ) -> Option<MeasureResult<ENNReal>> {
        None
    }
}

impl<T: Integrand + ?Sized> Integrand for Box<T> {
    fn support(&self) -> Window {
        (**self).support()
    }

    fn eval(&self, point: &Assignment) -> MeasureResult<ENNReal> {
        (**self).eval(point)
    }

    fn breakpoints(&self, index: Index) -> Vec<f64> {
        (**self).breakpoints(index)
    }

    fn section(
        &self,
        window: &Window,
        point: &Assignment,
        family: &ProductFamily,
    ) -> Option<MeasureResult<ENNReal>> {
        (**self).section(window, point, family)
    }
}

/// `1_C` for a cylinder `C`.
#[derive(Clone, Debug)]
pub struct Indicator {
    cylinder: Cylinder,
}

impl Indicator {
    pub fn new(cylinder: Cylinder) -> Self {
        Self { cylinder }
    }

    pub fn cylinder(&self) -> &Cylinder {
        &self.cylinder
    }
}

impl Integrand for Indicator {
    fn support(&self) -> Window {
        self.cylinder.window().clone()
    }

    fn eval(&self, point: &Assignment) -> MeasureResult<ENNReal> {
        Ok(if self.cylinder.contains(point)? {
            ENNReal::ONE
        } else {
            ENNReal::ZERO
        })
    }

    fn breakpoints(&self, index: Index) -> Vec<f64> {
        self.cylinder.region().breakpoints(index)
    }

    fn section(
        &self,
        window: &Window,
        point: &Assignment,
        family: &ProductFamily,
    ) -> Option<MeasureResult<ENNReal>> {
        let fixed = self.cylinder.window().difference(window);
        let section = self.cylinder.region().section(&point.restrict(&fixed));
        let loose = section.support().difference(window);
        if !loose.is_empty() {
            return Some(Err(MeasureError::domain(format!(
                "coordinates {} are neither assigned nor integrated out",
                loose
            ))));
        }
        Some(family.measure(&section.support(), &section))
    }
}

/// A constant function.
#[derive(Clone, Copy, Debug)]
pub struct Constant(pub ENNReal);

impl Integrand for Constant {
    fn support(&self) -> Window {
        Window::empty()
    }

    fn eval(&self, _point: &Assignment) -> MeasureResult<ENNReal> {
        Ok(self.0)
    }
}

/// A closure over a declared window of coordinates.
///
/// The closure returns a plain float; NaN is reported as a measurability
/// error and a negative value as a domain error.
pub struct FnIntegrand<F> {
    support: Window,
    function: F,
    breakpoints: BTreeMap<Index, Vec<f64>>,
}

impl<F> FnIntegrand<F>
where
    F: Fn(&Assignment) -> f64,
{
    pub fn new(support: Window, function: F) -> Self {
        Self {
            support,
            function,
            breakpoints: BTreeMap::new(),
        }
    }

    /// Declare where the function jumps on coordinate `index`.
    pub fn with_breakpoints(mut self, index: Index, points: Vec<f64>) -> Self {
        self.breakpoints.insert(index, points);
        self
    }
}

impl<F> Integrand for FnIntegrand<F>
where
    F: Fn(&Assignment) -> f64,
{
    fn support(&self) -> Window {
        self.support.clone()
    }

    fn eval(&self, point: &Assignment) -> MeasureResult<ENNReal> {
        for i in self.support.iter() {
            point.require(i)?;
        }
        let value = (self.function)(point);
        ENNReal::new(value).map_err(|e| match e {
            MeasureError::Measurability(_) => MeasureError::measurability(format!(
                "function on {} is undefined at {:?}",
                self.support, point
            )),
            other => other,
        })
    }

    fn breakpoints(&self, index: Index) -> Vec<f64> {
        self.breakpoints.get(&index).cloned().unwrap_or_default()
    }
}

// ============================================================================
// MARGINALIZER
// ============================================================================

/// Integrates functions against a product family.
#[derive(Clone, Copy)]
pub struct Marginalizer<'a> {
    family: &'a ProductFamily,
    config: &'a ExtensionConfig,
}

impl<'a> Marginalizer<'a> {
    pub fn new(family: &'a ProductFamily, config: &'a ExtensionConfig) -> Self {
        Self { family, config }
    }

    pub fn family(&self) -> &'a ProductFamily {
        self.family
    }

    pub fn config(&self) -> &'a ExtensionConfig {
        self.config
    }

    /// `marginal(S, f)` as a function of the remaining coordinates.
    pub fn marginal<'f>(&self, window: &Window, f: &'f dyn Integrand) -> Marginalized<'f>
    where
        'a: 'f,
    {
        Marginalized {
            marginalizer: *self,
            window: window.clone(),
            inner: f,
        }
    }

    /// `∫ f` over the whole product.
    pub fn expectation(&self, f: &dyn Integrand) -> MeasureResult<ENNReal> {
        self.integrate(&f.support(), f, &Assignment::new())
    }

    /// `marginal(window, f)(point)`.
    pub fn integrate(
        &self,
        window: &Window,
        f: &dyn Integrand,
        point: &Assignment,
    ) -> MeasureResult<ENNReal> {
        let support = f.support();
        let missing = support.difference(window).difference(&point.domain());
        if !missing.is_empty() {
            return Err(MeasureError::domain(format!(
                "marginal over {} needs coordinates {} of the point",
                window, missing
            )));
        }

        // Coordinates outside the support integrate to a factor of one
        let active = window.intersection(&support);
        if active.is_empty() {
            return f.eval(point);
        }
        if self.config.exact_sections {
            if let Some(result) = f.section(&active, point, self.family) {
                return result;
            }
        }
        let coords: Vec<Index> = active.iter().collect();
        self.iterate(&coords, f, point)
    }

    fn iterate(
        &self,
        coords: &[Index],
        f: &dyn Integrand,
        point: &Assignment,
    ) -> MeasureResult<ENNReal> {
        match coords.split_first() {
            None => f.eval(point),
            Some((&i, rest)) => {
                let breakpoints = f.breakpoints(i);
                self.family.law(i).integrate(
                    &mut |v| self.iterate(rest, f, &point.with(i, v)),
                    &breakpoints,
                    self.config,
                )
            }
        }
    }
}

/// `marginal(S, f)`: an integrand on the coordinates of `f` outside `S`.
pub struct Marginalized<'f> {
    marginalizer: Marginalizer<'f>,
    window: Window,
    inner: &'f dyn Integrand,
}

impl Marginalized<'_> {
    pub fn window(&self) -> &Window {
        &self.window
    }
}

impl Integrand for Marginalized<'_> {
    fn support(&self) -> Window {
        self.inner.support().difference(&self.window)
    }

    fn eval(&self, point: &Assignment) -> MeasureResult<ENNReal> {
        self.marginalizer.integrate(&self.window, self.inner, point)
    }

    fn breakpoints(&self, index: Index) -> Vec<f64> {
        if self.window.contains(index) {
            Vec::new()
        } else {
            self.inner.breakpoints(index)
        }
    }

    fn section(
        &self,
        window: &Window,
        point: &Assignment,
        family: &ProductFamily,
    ) -> Option<MeasureResult<ENNReal>> {
        let combined = window.union(&self.window);
        self.inner.section(&combined, point, family)
    }
}

// ============================================================================
// TESTS
// ============================================================================
