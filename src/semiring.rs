//! Ordered semirings used to weigh rectangles and integrate.
//!
//! A semiring (S, ⊕, ⊗, 0, 1) provides:
//! - Additive monoid (S, ⊕, 0)
//! - Multiplicative monoid (S, ⊗, 1)
//! - Multiplication distributes over addition
//! - 0 annihilates: 0 ⊗ x = x ⊗ 0 = 0
//!
//! Two instances matter here. `bool` (∨, ∧) decides whether a union of
//! rectangles is empty; [`ENNReal`] (+, ·) on `[0, ∞]` measures it. The same
//! sum-of-products code serves both.

use std::cmp::Ordering;
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};
use std::iter::Sum;
use std::ops::{Add, Mul};

use crate::error::{MeasureError, MeasureResult};

/// An ordered semiring.
pub trait OrderedSemiring: Clone + Debug + PartialEq + PartialOrd {
    /// Additive identity: x ⊕ 0 = 0 ⊕ x = x
    fn zero() -> Self;

    /// Multiplicative identity: x ⊗ 1 = 1 ⊗ x = x
    fn one() -> Self;

    /// Semiring addition (⊕)
    fn add(&self, other: &Self) -> Self;

    /// Semiring multiplication (⊗)
    fn mul(&self, other: &Self) -> Self;

    /// Check if this is the additive identity
    fn is_zero(&self) -> bool {
        self == &Self::zero()
    }

    /// Check if this is the multiplicative identity
    fn is_one(&self) -> bool {
        self == &Self::one()
    }

    /// ⊕ over an iterator
    fn sum_all<I: IntoIterator<Item = Self>>(items: I) -> Self {
        items.into_iter().fold(Self::zero(), |acc, x| acc.add(&x))
    }

    /// ⊗ over an iterator
    fn product_all<I: IntoIterator<Item = Self>>(items: I) -> Self {
        items.into_iter().fold(Self::one(), |acc, x| acc.mul(&x))
    }
}

// ============================================================================
// Boolean Semiring
// ============================================================================

impl OrderedSemiring for bool {
    #[inline]
    fn zero() -> Self {
        false
    }

    #[inline]
    fn one() -> Self {
        true
    }

    #[inline]
    fn add(&self, other: &Self) -> Self {
        *self || *other // OR
    }

    #[inline]
    fn mul(&self, other: &Self) -> Self {
        *self && *other // AND
    }
}

// ============================================================================
// Extended non-negative reals
// ============================================================================

/// A value in `[0, ∞]` with saturating arithmetic.
///
/// Invariant: the wrapped float is never NaN and never negative. `∞ + x = ∞`,
/// `∞ · 0 = 0` and truncated subtraction `a - b = max(a - b, 0)` with
/// `∞ - ∞ = 0`.
#[derive(Clone, Copy, Default)]
pub struct ENNReal(f64);

impl ENNReal {
    pub const ZERO: ENNReal = ENNReal(0.0);
    pub const ONE: ENNReal = ENNReal(1.0);
    pub const TOP: ENNReal = ENNReal(f64::INFINITY);

    /// Wrap a float. NaN is a measurability failure, a negative value a
    /// domain failure.
    pub fn new(value: f64) -> MeasureResult<Self> {
        if value.is_nan() {
            return Err(MeasureError::measurability(
                "value is NaN, not a measurable non-negative quantity",
            ));
        }
        if value < 0.0 {
            return Err(MeasureError::domain(format!(
                "value {} is negative, expected [0, ∞]",
                value
            )));
        }
        // Normalise -0.0
        Ok(ENNReal(value + 0.0))
    }

    /// Wrap a float, clamping negatives (rounding residue) to zero.
    /// NaN still fails.
    pub fn clamped(value: f64) -> MeasureResult<Self> {
        if value.is_nan() {
            return Err(MeasureError::measurability("value is NaN"));
        }
        Ok(ENNReal(value.max(0.0)))
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn is_top(self) -> bool {
        self.0.is_infinite()
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Truncated subtraction.
    pub fn saturating_sub(self, other: ENNReal) -> ENNReal {
        if self.is_top() {
            return if other.is_top() { ENNReal::ZERO } else { ENNReal::TOP };
        }
        ENNReal((self.0 - other.0).max(0.0))
    }

    pub fn min(self, other: ENNReal) -> ENNReal {
        if self <= other {
            self
        } else {
            other
        }
    }

    pub fn max(self, other: ENNReal) -> ENNReal {
        if self >= other {
            self
        } else {
            other
        }
    }

    /// Multiply by a finite non-negative scalar (a probability weight).
    pub fn scale(self, weight: f64) -> ENNReal {
        if weight <= 0.0 || weight.is_nan() {
            return ENNReal::ZERO;
        }
        if self.0 == 0.0 {
            return ENNReal::ZERO;
        }
        ENNReal(self.0 * weight)
    }

    /// `|self - other| <= tolerance`, with `∞` only close to `∞`.
    pub fn approx_eq(self, other: ENNReal, tolerance: f64) -> bool {
        match (self.is_top(), other.is_top()) {
            (true, true) => true,
            (false, false) => (self.0 - other.0).abs() <= tolerance,
            _ => false,
        }
    }
}

impl OrderedSemiring for ENNReal {
    #[inline]
    fn zero() -> Self {
        ENNReal::ZERO
    }

    #[inline]
    fn one() -> Self {
        ENNReal::ONE
    }

    #[inline]
    fn add(&self, other: &Self) -> Self {
        ENNReal(self.0 + other.0)
    }

    #[inline]
    fn mul(&self, other: &Self) -> Self {
        if self.0 == 0.0 || other.0 == 0.0 {
            ENNReal::ZERO
        } else {
            ENNReal(self.0 * other.0)
        }
    }
}

impl Add for ENNReal {
    type Output = ENNReal;

    fn add(self, rhs: ENNReal) -> ENNReal {
        OrderedSemiring::add(&self, &rhs)
    }
}

impl Mul for ENNReal {
    type Output = ENNReal;

    fn mul(self, rhs: ENNReal) -> ENNReal {
        OrderedSemiring::mul(&self, &rhs)
    }
}

impl Sum for ENNReal {
    fn sum<I: Iterator<Item = ENNReal>>(iter: I) -> ENNReal {
        ENNReal::sum_all(iter)
    }
}

// NaN is excluded by construction, so the float order is total.
impl PartialEq for ENNReal {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for ENNReal {}

impl PartialOrd for ENNReal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ENNReal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for ENNReal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl Debug for ENNReal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_top() {
            write!(f, "∞")
        } else {
            write!(f, "{:?}", self.0)
        }
    }
}

impl fmt::Display for ENNReal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_top() {
            write!(f, "∞")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_semiring() {
        // Addition is OR
        assert!(!false.add(&false));
        assert!(false.add(&true));
        assert!(true.add(&true));

        // Multiplication is AND
        assert!(!false.mul(&true));
        assert!(true.mul(&true));

        assert!(bool::zero().is_zero());
        assert!(bool::one().is_one());
    }

    #[test]
    fn test_saturating_arithmetic() {
        let two = ENNReal::new(2.0).unwrap();

        assert_eq!(ENNReal::TOP + two, ENNReal::TOP);
        assert_eq!(ENNReal::TOP * ENNReal::ZERO, ENNReal::ZERO);
        assert_eq!(ENNReal::ZERO * ENNReal::TOP, ENNReal::ZERO);
        assert_eq!(ENNReal::TOP * two, ENNReal::TOP);
        assert_eq!(ENNReal::TOP.saturating_sub(ENNReal::TOP), ENNReal::ZERO);
        assert_eq!(ENNReal::TOP.saturating_sub(two), ENNReal::TOP);
        assert_eq!(ENNReal::ONE.saturating_sub(two), ENNReal::ZERO);
        assert_eq!(ENNReal::TOP.scale(0.0), ENNReal::ZERO);
    }

    #[test]
    fn test_rejects_nan_and_negative() {
        assert!(matches!(
            ENNReal::new(f64::NAN),
            Err(MeasureError::Measurability(_))
        ));
        assert!(matches!(ENNReal::new(-1.0), Err(MeasureError::Domain(_))));
        assert_eq!(ENNReal::clamped(-1e-18).unwrap(), ENNReal::ZERO);
        assert_eq!(ENNReal::new(-0.0).unwrap(), ENNReal::ZERO);
    }

    #[test]
    fn test_sum_and_order() {
        let values = [0.25, 0.5, 0.125].map(|v| ENNReal::new(v).unwrap());
        let total: ENNReal = values.iter().copied().sum();
        assert!(total.approx_eq(ENNReal::new(0.875).unwrap(), 1e-15));

        assert!(ENNReal::ZERO < ENNReal::ONE);
        assert!(ENNReal::ONE < ENNReal::TOP);
        assert_eq!(ENNReal::ONE.max(ENNReal::TOP), ENNReal::TOP);
        assert!(!ENNReal::ONE.approx_eq(ENNReal::TOP, 1e9));
    }
}
