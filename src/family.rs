//! Projective families of finite-dimensional marginals.
//!
//! A projective family assigns a probability measure `μ_S` to every finite
//! window `S`, consistently: for `S ⊆ T`, pushing `μ_T` forward onto `S`
//! gives `μ_S`. Consistency is what makes the content of a cylinder
//! independent of the window it is written over.
//!
//! - [`ProductFamily`] is the family `μ_S = ⨂_{n∈S} μ_n` of independent
//!   coordinates; it is projective by construction.
//! - [`TabulatedFamily`] lists joint probability tables on finitely many
//!   windows over finite spaces; its consistency is checked when it is built.

use std::collections::BTreeMap;

use crate::cylinder::Region;
use crate::error::{MeasureError, MeasureResult};
use crate::law::{Law, Space, MASS_TOLERANCE};
use crate::point::{Assignment, Value};
use crate::semiring::ENNReal;
use crate::window::{Index, Window};

/// A consistent family of marginals `(μ_S)` indexed by finite windows.
pub trait ProjectiveFamily {
    /// The coordinate space `X_index`
    fn space(&self, index: Index) -> Space;

    /// `μ_S(A)` for a region `A` on the window `S`.
    fn measure(&self, window: &Window, region: &Region) -> MeasureResult<ENNReal>;

    /// Check `μ_T(reindex(A)) = μ_S(A)` for `S ⊆ T`.
    fn check_projectivity(
        &self,
        small: &Window,
        large: &Window,
        region: &Region,
        tolerance: f64,
    ) -> MeasureResult<()> {
        if !small.is_subset(large) {
            return Err(MeasureError::domain(format!(
                "projectivity compares {} with {}, which does not contain it",
                small, large
            )));
        }
        let on_small = self.measure(small, region)?;
        let on_large = self.measure(large, region)?;
        if !on_small.approx_eq(on_large, tolerance) {
            return Err(MeasureError::invariant(format!(
                "marginals disagree: μ_{}(A) = {} but μ_{}(A) = {}",
                small, on_small, large, on_large
            )));
        }
        Ok(())
    }
}

fn check_region_in_window(window: &Window, region: &Region) -> MeasureResult<()> {
    let support = region.support();
    if !support.is_subset(window) {
        return Err(MeasureError::domain(format!(
            "region constrains {} outside the window {}",
            support.difference(window),
            window
        )));
    }
    Ok(())
}

// ============================================================================
// PRODUCT FAMILY
// ============================================================================

/// Independent coordinates: explicit laws for a prefix of indices, then one
/// law repeated for every later index.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductFamily {
    laws: Vec<Law>,
    tail: Law,
}

impl ProductFamily {
    /// `μ_n = laws[n]` for `n < laws.len()`, `μ_n = tail` afterwards.
    pub fn new(laws: Vec<Law>, tail: Law) -> MeasureResult<Self> {
        for (n, law) in laws.iter().enumerate() {
            law.validate().map_err(|e| match e {
                MeasureError::InvariantViolation(msg) => {
                    MeasureError::invariant(format!("coordinate {}: {}", n, msg))
                }
                other => other,
            })?;
        }
        tail.validate()?;
        Ok(Self { laws, tail })
    }

    /// Every coordinate distributed as `law`.
    pub fn iid(law: Law) -> MeasureResult<Self> {
        Self::new(Vec::new(), law)
    }

    pub fn law(&self, index: Index) -> &Law {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.laws.get(i))
            .unwrap_or(&self.tail)
    }

    pub fn tail(&self) -> &Law {
        &self.tail
    }

    /// Number of explicitly listed laws
    pub fn explicit_len(&self) -> usize {
        self.laws.len()
    }
}

impl ProjectiveFamily for ProductFamily {
    fn space(&self, index: Index) -> Space {
        self.law(index).space()
    }

    fn measure(&self, window: &Window, region: &Region) -> MeasureResult<ENNReal> {
        check_region_in_window(window, region)?;
        region.weigh(|i, side| self.law(i).measure(side))
    }
}

// ============================================================================
// TABULATED FAMILY
// ============================================================================

/// A joint probability table on a window of finite coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct JointTable {
    window: Window,
    /// Outcome (values in increasing index order) → probability
    probabilities: BTreeMap<Vec<u64>, f64>,
}

impl JointTable {
    pub fn new(window: Window, probabilities: BTreeMap<Vec<u64>, f64>) -> Self {
        Self {
            window,
            probabilities,
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn outcome_point(&self, outcome: &[u64]) -> Assignment {
        self.window
            .iter()
            .zip(outcome)
            .map(|(i, &k)| (i, Value::Nat(k)))
            .collect()
    }

    /// Push the table forward onto `sub ⊆ window`.
    fn marginal(&self, sub: &Window) -> BTreeMap<Vec<u64>, f64> {
        let keep: Vec<bool> = self.window.iter().map(|i| sub.contains(i)).collect();
        let mut out: BTreeMap<Vec<u64>, f64> = BTreeMap::new();
        for (outcome, &p) in &self.probabilities {
            let projected: Vec<u64> = outcome
                .iter()
                .zip(&keep)
                .filter(|(_, k)| **k)
                .map(|(v, _)| *v)
                .collect();
            *out.entry(projected).or_insert(0.0) += p;
        }
        out
    }
}

/// Explicit joint tables on finitely many windows of finite coordinates.
///
/// Coordinates at or beyond `cardinalities.len()` are one-point spaces.
#[derive(Clone, Debug)]
pub struct TabulatedFamily {
    cardinalities: Vec<u64>,
    tables: Vec<JointTable>,
}

impl TabulatedFamily {
    /// Build and validate: every table is a probability table on its
    /// window, and every two tables agree on the coordinates they share.
    pub fn new(cardinalities: Vec<u64>, tables: Vec<JointTable>) -> MeasureResult<Self> {
        if let Some(n) = cardinalities.iter().position(|&c| c == 0) {
            return Err(MeasureError::domain(format!(
                "coordinate {} has an empty space",
                n
            )));
        }
        let family = Self {
            cardinalities,
            tables,
        };
        for table in &family.tables {
            family.validate_table(table)?;
        }
        for (a, first) in family.tables.iter().enumerate() {
            for second in &family.tables[a + 1..] {
                family.check_agreement(first, second)?;
            }
        }
        Ok(family)
    }

    pub fn tables(&self) -> &[JointTable] {
        &self.tables
    }

    fn cardinality(&self, index: Index) -> u64 {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.cardinalities.get(i))
            .copied()
            .unwrap_or(1)
    }

    fn validate_table(&self, table: &JointTable) -> MeasureResult<()> {
        let arity = table.window.len();
        let mut total = 0.0;
        for (outcome, &p) in &table.probabilities {
            if outcome.len() != arity {
                return Err(MeasureError::domain(format!(
                    "outcome {:?} has {} values but the window {} has {} coordinates",
                    outcome,
                    outcome.len(),
                    table.window,
                    arity
                )));
            }
            for (i, &k) in table.window.iter().zip(outcome) {
                if k >= self.cardinality(i) {
                    return Err(MeasureError::domain(format!(
                        "value {} is not in the space of coordinate {}",
                        k, i
                    )));
                }
            }
            if !(p.is_finite() && p >= 0.0) {
                return Err(MeasureError::invariant(format!(
                    "outcome {:?} on {} has probability {}",
                    outcome, table.window, p
                )));
            }
            total += p;
        }
        if (total - 1.0).abs() > MASS_TOLERANCE {
            return Err(MeasureError::invariant(format!(
                "table on {} has total mass {}, expected 1",
                table.window, total
            )));
        }
        Ok(())
    }

    fn check_agreement(&self, first: &JointTable, second: &JointTable) -> MeasureResult<()> {
        let shared = first.window.intersection(&second.window);
        let a = first.marginal(&shared);
        let b = second.marginal(&shared);
        for outcome in a.keys().chain(b.keys()) {
            let pa = a.get(outcome).copied().unwrap_or(0.0);
            let pb = b.get(outcome).copied().unwrap_or(0.0);
            if (pa - pb).abs() > MASS_TOLERANCE {
                return Err(MeasureError::invariant(format!(
                    "windows {} and {} disagree on {} = {:?}: {} vs {}",
                    first.window, second.window, shared, outcome, pa, pb
                )));
            }
        }
        Ok(())
    }
}

impl ProjectiveFamily for TabulatedFamily {
    fn space(&self, index: Index) -> Space {
        Space::Finite(self.cardinality(index))
    }

    fn measure(&self, window: &Window, region: &Region) -> MeasureResult<ENNReal> {
        check_region_in_window(window, region)?;
        if window.is_empty() {
            let whole = region.contains(&Assignment::new())?;
            return Ok(if whole { ENNReal::ONE } else { ENNReal::ZERO });
        }
        // Smallest table whose window covers S; any covering table gives
        // the same answer once consistency has been checked.
        let table = self
            .tables
            .iter()
            .filter(|t| window.is_subset(&t.window))
            .min_by_key(|t| t.window.len())
            .ok_or_else(|| {
                MeasureError::domain(format!("no tabulated window covers {}", window))
            })?;
        let mut total = 0.0;
        for (outcome, &p) in &table.probabilities {
            if p > 0.0 && region.contains(&table.outcome_point(outcome))? {
                total += p;
            }
        }
        ENNReal::clamped(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::IntervalSet;

    fn table(window: &[Index], entries: &[(&[u64], f64)]) -> JointTable {
        JointTable::new(
            window.iter().copied().collect(),
            entries.iter().map(|(o, p)| (o.to_vec(), *p)).collect(),
        )
    }

    #[test]
    fn test_product_family_laws() {
        let family =
            ProductFamily::new(vec![Law::coin()], Law::geometric_half()).unwrap();
        assert_eq!(family.law(0), &Law::coin());
        assert_eq!(family.law(5), &Law::geometric_half());
        assert_eq!(family.space(0), Space::Finite(2));
        assert_eq!(family.space(1), Space::Naturals);
    }

    #[test]
    fn test_product_family_rejects_bad_law() {
        let err = ProductFamily::new(vec![Law::Atoms(vec![0.7, 0.7])], Law::coin()).unwrap_err();
        assert!(matches!(err, MeasureError::InvariantViolation(ref m) if m.contains("coordinate 0")));
    }

    #[test]
    fn test_product_measure_of_box() {
        let family = ProductFamily::iid(Law::coin()).unwrap();
        let region = Region::boxed([(0, IntervalSet::point(0)), (2, IntervalSet::point(1))]);
        let window: Window = [0, 1, 2].into_iter().collect();
        let m = family.measure(&window, &region).unwrap();
        assert!(m.approx_eq(ENNReal::new(0.25).unwrap(), 1e-12));

        assert!(family
            .check_projectivity(&Window::prefix(3), &Window::prefix(6), &region, 1e-12)
            .is_ok());
    }

    #[test]
    fn test_measure_rejects_region_outside_window() {
        let family = ProductFamily::iid(Law::coin()).unwrap();
        let region = Region::boxed([(4, IntervalSet::point(0))]);
        assert!(matches!(
            family.measure(&Window::prefix(2), &region),
            Err(MeasureError::Domain(_))
        ));
    }

    #[test]
    fn test_tabulated_consistent_family() {
        // Two perfectly correlated fair coins
        let family = TabulatedFamily::new(
            vec![2, 2],
            vec![
                table(&[0], &[(&[0], 0.5), (&[1], 0.5)]),
                table(&[0, 1], &[(&[0, 0], 0.5), (&[1, 1], 0.5)]),
            ],
        )
        .unwrap();

        let same = Region::from_rects(vec![
            crate::cylinder::Rect::full()
                .with_side(0, IntervalSet::point(0))
                .with_side(1, IntervalSet::point(0)),
            crate::cylinder::Rect::full()
                .with_side(0, IntervalSet::point(1))
                .with_side(1, IntervalSet::point(1)),
        ]);
        let m = family.measure(&Window::prefix(2), &same).unwrap();
        assert!(m.approx_eq(ENNReal::ONE, 1e-12));

        let first = Region::boxed([(0, IntervalSet::point(1))]);
        assert!(family
            .check_projectivity(&Window::prefix(1), &Window::prefix(2), &first, 1e-12)
            .is_ok());
    }

    #[test]
    fn test_tabulated_inconsistent_family() {
        let err = TabulatedFamily::new(
            vec![2, 2],
            vec![
                table(&[0], &[(&[0], 0.5), (&[1], 0.5)]),
                table(&[0, 1], &[(&[0, 0], 0.9), (&[1, 1], 0.1)]),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, MeasureError::InvariantViolation(_)));
    }

    #[test]
    fn test_tabulated_uncovered_window() {
        let family =
            TabulatedFamily::new(vec![2], vec![table(&[0], &[(&[0], 1.0)])]).unwrap();
        let err = family
            .measure(&Window::singleton(1), &Region::full())
            .unwrap_err();
        assert!(matches!(err, MeasureError::Domain(_)));
    }
}
