//! Kolmogorov: product probability measures on countable products
//!
//! Given a probability law `μ_n` on each coordinate space `X_n`, this crate
//! builds the product measure `⨂_n μ_n` on `∏_n X_n` the way the Kolmogorov
//! extension theorem does: cylinder sets carry a finitely additive content
//! read off the finite products, and a witness construction shows the
//! content is continuous from above, so it extends to a measure.
//!
//! # Key Concepts
//!
//! - **Window**: A finite set of coordinates
//! - **Cylinder**: The set of points whose restriction to a window lies in a
//!   measurable region of the finite product
//! - **Content**: `content(cylinder(S, A)) = μ_S(A)`
//! - **Marginal**: Integrating a function over the coordinates of a window
//! - **Witness**: A point built coordinate by coordinate that lies in every
//!   term of a decreasing sequence whose contents stay bounded below

pub mod check;
pub mod config;
pub mod content;
pub mod cylinder;
pub mod error;
pub mod extension;
pub mod family;
pub mod interval;
pub mod law;
pub mod marginal;
pub mod point;
pub mod semiring;
pub mod window;
pub mod witness;

pub use check::{CheckResult, ProjectiveLimitChecker, Violation};
pub use config::ExtensionConfig;
pub use content::ContentFunction;
pub use cylinder::{Cylinder, Rect, Region};
pub use error::{MeasureError, MeasureResult};
pub use extension::{ProductMeasure, WindowMeasure};
pub use family::{JointTable, ProductFamily, ProjectiveFamily, TabulatedFamily};
pub use interval::IntervalSet;
pub use law::{Law, Space};
pub use marginal::{Constant, FnIntegrand, Indicator, Integrand, Marginalized, Marginalizer};
pub use point::{Assignment, Value};
pub use semiring::{ENNReal, OrderedSemiring};
pub use window::{Index, Window};
pub use witness::{
    downward_continuity, AntitoneSequence, Bisection, Continuity, CylinderSequence, Enumerate,
    LawDefault, Oracle, SelectionStrategy, StepRecord, Witness,
};

/// Build the product measure of `family` with the default configuration.
pub fn build(family: ProductFamily) -> MeasureResult<ProductMeasure> {
    ProductMeasure::build(family, ExtensionConfig::default())
}

/// The pushforward of `measure` onto `window`.
pub fn project<'a>(measure: &'a ProductMeasure, window: &Window) -> WindowMeasure<'a> {
    measure.project(window)
}
