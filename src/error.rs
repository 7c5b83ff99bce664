//! Error types for measure construction.
//!
//! Precondition failures are reported as soon as they are detected and are
//! never coerced into a default numeric value. Overflow is not an error:
//! extended reals saturate (see [`crate::semiring::ENNReal`]).

use thiserror::Error;

/// Result type for every fallible operation in the crate.
pub type MeasureResult<T> = Result<T, MeasureError>;

/// Errors raised while building or querying a product measure.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum MeasureError {
    /// A cylinder was requested over a window inconsistent with its defining
    /// set, a reindexing would shrink the window, or a point lacks a
    /// coordinate the computation needs.
    #[error("domain error: {0}")]
    Domain(String),

    /// A function or predicate handed to content or marginalization does not
    /// produce a well-defined measurable value.
    #[error("measurability error: {0}")]
    Measurability(String),

    /// The marginal family is not projective, or the hypotheses of the
    /// witness recursion (bound, antitonicity, lower bound) do not hold.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The content failed the σ-additivity the witness search guarantees.
    #[error("extension error: {0}")]
    Extension(String),

    /// The contents of a decreasing sequence were still falling when the
    /// horizon cap was reached, so no verdict on the limit was given.
    #[error("limit undetermined: {0}")]
    Undetermined(String),

    /// A configuration value is out of range.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl MeasureError {
    pub fn domain(msg: impl Into<String>) -> Self {
        MeasureError::Domain(msg.into())
    }

    pub fn measurability(msg: impl Into<String>) -> Self {
        MeasureError::Measurability(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        MeasureError::InvariantViolation(msg.into())
    }

    pub fn extension(msg: impl Into<String>) -> Self {
        MeasureError::Extension(msg.into())
    }

    pub fn undetermined(msg: impl Into<String>) -> Self {
        MeasureError::Undetermined(msg.into())
    }

    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        MeasureError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// True for the three precondition kinds (domain, measurability,
    /// invariant) that a well-formed call can legitimately produce.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            MeasureError::Domain(_)
                | MeasureError::Measurability(_)
                | MeasureError::InvariantViolation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = MeasureError::domain("window {0} is not contained in {1}");
        assert_eq!(
            err.to_string(),
            "domain error: window {0} is not contained in {1}"
        );

        let err = MeasureError::invalid_parameter("horizon", "must be > 0");
        assert_eq!(err.to_string(), "invalid parameter 'horizon': must be > 0");
    }

    #[test]
    fn test_precondition_kinds() {
        assert!(MeasureError::domain("x").is_precondition());
        assert!(MeasureError::measurability("x").is_precondition());
        assert!(MeasureError::invariant("x").is_precondition());
        assert!(!MeasureError::extension("x").is_precondition());
        assert!(!MeasureError::undetermined("x").is_precondition());
    }
}
