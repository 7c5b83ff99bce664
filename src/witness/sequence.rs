//! Antitone sequences of functions fed to the witness search.

use crate::cylinder::Cylinder;
use crate::error::{MeasureError, MeasureResult};
use crate::marginal::{Indicator, Integrand};
use crate::semiring::ENNReal;

/// A sequence `f_0 ≥ f_1 ≥ …` of non-negative functions, each reading a
/// finite window of coordinates and all bounded by [`AntitoneSequence::bound`].
pub trait AntitoneSequence {
    /// The `n`-th function
    fn term(&self, n: usize) -> MeasureResult<Box<dyn Integrand + '_>>;

    /// A finite uniform upper bound on every term
    fn bound(&self) -> ENNReal;
}

/// Indicators of a decreasing sequence of cylinders `A_0 ⊇ A_1 ⊇ …`.
pub struct CylinderSequence<'a> {
    generator: Box<dyn Fn(usize) -> MeasureResult<Cylinder> + 'a>,
}

impl<'a> CylinderSequence<'a> {
    /// `A_n = generator(n)`
    pub fn from_fn<G>(generator: G) -> Self
    where
        G: Fn(usize) -> MeasureResult<Cylinder> + 'a,
    {
        Self {
            generator: Box::new(generator),
        }
    }

    /// A finite decreasing list, continued by repeating its last element.
    pub fn from_vec(cylinders: Vec<Cylinder>) -> Self {
        Self::from_fn(move |n| {
            let last = cylinders.len().checked_sub(1).ok_or_else(|| {
                MeasureError::domain("a cylinder sequence needs at least one term")
            })?;
            Ok(cylinders[n.min(last)].clone())
        })
    }

    pub fn cylinder(&self, n: usize) -> MeasureResult<Cylinder> {
        (self.generator)(n)
    }
}

impl AntitoneSequence for CylinderSequence<'_> {
    fn term(&self, n: usize) -> MeasureResult<Box<dyn Integrand + '_>> {
        Ok(Box::new(Indicator::new(self.cylinder(n)?)))
    }

    fn bound(&self) -> ENNReal {
        ENNReal::ONE
    }
}
