//! Numeric configuration for integration, witness search and checking.

use crate::error::{MeasureError, MeasureResult};

/// Configuration shared by the marginalizer, the witness search and the
/// projective-limit checker.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionConfig {
    /// Absolute slack for comparisons between extended reals
    pub tolerance: f64,
    /// A countable law is summed until the remaining mass drops below this
    pub tail_tolerance: f64,
    /// Hard cap on the number of terms summed for a countable law
    pub max_terms: usize,
    /// Midpoint-rule nodes per piece of an interval law
    pub quadrature_nodes: usize,
    /// Number of sequence terms inspected when a statement ranges over all `n`
    pub horizon: usize,
    /// Largest horizon a continuity check may double up to while the
    /// contents are still falling
    pub horizon_cap: usize,
    /// Coordinate candidates tried per witness level
    pub max_candidates: usize,
    /// Dyadic refinement levels tried on interval coordinates
    pub bisection_depth: u32,
    /// Coordinates materialised when a continuity check produces a witness
    pub witness_depth: usize,
    /// Integrate cylinder indicators in closed form rather than by quadrature
    pub exact_sections: bool,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-9,
            tail_tolerance: 1e-12,
            max_terms: 4096,
            quadrature_nodes: 4,
            horizon: 48,
            horizon_cap: 512,
            max_candidates: 256,
            bisection_depth: 6,
            witness_depth: 8,
            exact_sections: true,
        }
    }
}

impl ExtensionConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// A short horizon for quick checks
    pub fn quick() -> Self {
        Self {
            horizon: 16,
            horizon_cap: 256,
            max_candidates: 64,
            bisection_depth: 4,
            witness_depth: 4,
            ..Self::default()
        }
    }

    /// The default settings
    pub fn standard() -> Self {
        Self::default()
    }

    /// A long horizon and finer quadrature
    pub fn thorough() -> Self {
        Self {
            quadrature_nodes: 8,
            horizon: 64,
            horizon_cap: 2048,
            max_candidates: 1024,
            bisection_depth: 10,
            witness_depth: 16,
            ..Self::default()
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_tail_tolerance(mut self, tail_tolerance: f64) -> Self {
        self.tail_tolerance = tail_tolerance;
        self
    }

    pub fn with_max_terms(mut self, max_terms: usize) -> Self {
        self.max_terms = max_terms;
        self
    }

    pub fn with_quadrature_nodes(mut self, nodes: usize) -> Self {
        self.quadrature_nodes = nodes;
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_horizon_cap(mut self, cap: usize) -> Self {
        self.horizon_cap = cap;
        self
    }

    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }

    pub fn with_bisection_depth(mut self, depth: u32) -> Self {
        self.bisection_depth = depth;
        self
    }

    pub fn with_witness_depth(mut self, depth: usize) -> Self {
        self.witness_depth = depth;
        self
    }

    pub fn with_exact_sections(mut self, exact: bool) -> Self {
        self.exact_sections = exact;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> MeasureResult<()> {
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(MeasureError::invalid_parameter(
                "tolerance",
                "must be finite and >= 0",
            ));
        }
        if !(self.tail_tolerance.is_finite() && self.tail_tolerance > 0.0) {
            return Err(MeasureError::invalid_parameter(
                "tail_tolerance",
                "must be finite and > 0",
            ));
        }
        if self.max_terms == 0 {
            return Err(MeasureError::invalid_parameter("max_terms", "must be > 0"));
        }
        if self.quadrature_nodes == 0 {
            return Err(MeasureError::invalid_parameter(
                "quadrature_nodes",
                "must be > 0",
            ));
        }
        if self.horizon == 0 {
            return Err(MeasureError::invalid_parameter("horizon", "must be > 0"));
        }
        if self.horizon_cap < self.horizon {
            return Err(MeasureError::invalid_parameter(
                "horizon_cap",
                "must be >= horizon",
            ));
        }
        if self.max_candidates == 0 {
            return Err(MeasureError::invalid_parameter(
                "max_candidates",
                "must be > 0",
            ));
        }
        if self.bisection_depth > 30 {
            return Err(MeasureError::invalid_parameter(
                "bisection_depth",
                "must be <= 30",
            ));
        }
        Ok(())
    }
}
