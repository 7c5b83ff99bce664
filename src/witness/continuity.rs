//! Continuity from above along a decreasing sequence of cylinders.

use tracing::debug;

use crate::error::{MeasureError, MeasureResult};
use crate::marginal::Marginalizer;
use crate::semiring::ENNReal;

use super::search::Witness;
use super::sequence::AntitoneSequence;
use super::types::Continuity;

/// Decide whether `∫ f_n` tends to zero along an antitone sequence.
///
/// The expectations of the terms `0..=H` are computed and checked to
/// decrease within the bound, starting from `H = horizon`. If `∫ f_H` is
/// within tolerance of zero the sequence [`Continuity::Vanishes`]. If the
/// expectations have settled, `∫ f_{H/2} - ∫ f_H ≤ tolerance`, the value
/// `∫ f_H` is taken as `ε`. Otherwise `H` doubles up to `horizon_cap`, and a
/// sequence still falling there is [`MeasureError::Undetermined`].
///
/// Once `ε` is fixed a witness is built against the terms `0..=H` and
/// checked against every term up to `2H`. A witness below `ε` on a term it
/// was built against is an extension error: the family is not countably
/// additive on this sequence. One leaving a later term means the limit was
/// read too early and is reported as undetermined.
pub fn downward_continuity(
    sequence: &dyn AntitoneSequence,
    marginalizer: Marginalizer<'_>,
) -> MeasureResult<Continuity> {
    let config = marginalizer.config();
    let tol = config.tolerance;

    let mut contents: Vec<ENNReal> = Vec::with_capacity(config.horizon + 1);
    let mut deepest: Option<u64> = None;
    let mut horizon = config.horizon;
    let limit = loop {
        extend_contents(sequence, &marginalizer, &mut contents, &mut deepest, horizon)?;
        let limit = contents[horizon];
        if limit.to_f64() <= tol {
            debug!(terms = contents.len(), "contents vanish");
            return Ok(Continuity::Vanishes { contents });
        }
        let halfway = contents[horizon / 2];
        if halfway.to_f64() - limit.to_f64() <= tol {
            break limit;
        }
        if horizon >= config.horizon_cap {
            return Err(MeasureError::undetermined(format!(
                "contents still fall from {} at term {} to {} at term {}",
                halfway,
                horizon / 2,
                limit,
                horizon
            )));
        }
        horizon = horizon.saturating_mul(2).min(config.horizon_cap);
    };

    let checked = horizon.saturating_mul(2);
    let mut later = Vec::with_capacity(checked - horizon);
    for n in horizon + 1..=checked {
        let term = sequence.term(n)?;
        deepest = deepest.max(term.support().max());
        later.push(term);
    }

    let depth = config
        .witness_depth
        .max(deepest.map_or(0, |d| d as usize + 1));
    let mut witness = Witness::over_terms(sequence, marginalizer, limit, horizon)?;
    let point = witness.take_prefix(depth)?;

    for n in 0..=horizon {
        let value = sequence.term(n)?.eval(&point)?;
        if value.to_f64() < limit.to_f64() - tol {
            return Err(MeasureError::extension(format!(
                "the witness {:?} gives f_{} = {}, below the preserved bound {}",
                point, n, value, limit
            )));
        }
    }
    for (n, term) in (horizon + 1..).zip(&later) {
        let value = term.eval(&point)?;
        if value.to_f64() < limit.to_f64() - tol {
            return Err(MeasureError::undetermined(format!(
                "the witness built on terms up to {} gives f_{} = {}, below {}",
                horizon, n, value, limit
            )));
        }
    }
    debug!(%limit, horizon, depth, "contents persist; witness verified");

    Ok(Continuity::Persists {
        epsilon: limit,
        contents,
        witness: point,
    })
}

/// Push `∫ f_n` onto `contents` for every `n ≤ horizon` not yet computed.
fn extend_contents(
    sequence: &dyn AntitoneSequence,
    marginalizer: &Marginalizer<'_>,
    contents: &mut Vec<ENNReal>,
    deepest: &mut Option<u64>,
    horizon: usize,
) -> MeasureResult<()> {
    let tol = marginalizer.config().tolerance;
    let bound = sequence.bound();
    for n in contents.len()..=horizon {
        let term = sequence.term(n)?;
        let value = marginalizer.expectation(term.as_ref())?;
        if value.to_f64() > bound.to_f64() + tol {
            return Err(MeasureError::invariant(format!(
                "∫ f_{} = {} exceeds the bound {}",
                n, value, bound
            )));
        }
        if let Some(prev) = contents.last() {
            if value.to_f64() > prev.to_f64() + tol {
                return Err(MeasureError::invariant(format!(
                    "contents increase from {} to {} at term {}",
                    prev, value, n
                )));
            }
        }
        *deepest = (*deepest).max(term.support().max());
        contents.push(value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtensionConfig;
    use crate::cylinder::Cylinder;
    use crate::family::ProductFamily;
    use crate::interval::IntervalSet;
    use crate::law::Law;
    use crate::point::Value;
    use crate::witness::sequence::CylinderSequence;

    #[test]
    fn test_geometric_tail_vanishes() {
        let family = ProductFamily::iid(Law::geometric_half()).unwrap();
        let config = ExtensionConfig::default();
        let m = Marginalizer::new(&family, &config);
        let seq =
            CylinderSequence::from_fn(|n| Ok(Cylinder::boxed([(0, IntervalSet::at_least(n as u64))])));
        let result = downward_continuity(&seq, m).unwrap();
        assert!(result.vanishes());
        assert_eq!(result.contents().len(), config.horizon + 1);
        assert!(result.contents()[3].approx_eq(ENNReal::new(0.125).unwrap(), 1e-12));
    }

    fn tail_from(threshold: fn(usize) -> u64) -> CylinderSequence<'static> {
        CylinderSequence::from_fn(move |n| Ok(Cylinder::boxed([(0, IntervalSet::at_least(threshold(n)))])))
    }

    #[test]
    fn test_geometric_tail_vanishes_on_short_horizon() {
        let family = ProductFamily::iid(Law::geometric_half()).unwrap();
        let config = ExtensionConfig::quick();
        let m = Marginalizer::new(&family, &config);
        let result = downward_continuity(&tail_from(|n| n as u64), m).unwrap();
        assert!(result.vanishes());
        assert!(result.contents().len() > config.horizon + 1);
    }

    #[test]
    fn test_slow_geometric_tail_vanishes() {
        let family = ProductFamily::iid(Law::Geometric { ratio: 0.9 }).unwrap();
        let config = ExtensionConfig::default();
        let m = Marginalizer::new(&family, &config);
        let result = downward_continuity(&tail_from(|n| n as u64), m).unwrap();
        assert!(result.vanishes());
        assert!(result.witness().is_none());
    }

    #[test]
    fn test_still_falling_at_cap_is_undetermined() {
        let family = ProductFamily::iid(Law::geometric_half()).unwrap();
        let config = ExtensionConfig::quick();
        let m = Marginalizer::new(&family, &config);
        let seq = tail_from(|n| (n as f64).sqrt().floor() as u64);
        let err = downward_continuity(&seq, m).unwrap_err();
        assert!(matches!(err, MeasureError::Undetermined(_)));
    }

    #[test]
    fn test_drop_after_horizon_is_undetermined() {
        let family = ProductFamily::iid(Law::coin()).unwrap();
        let config = ExtensionConfig::quick();
        let m = Marginalizer::new(&family, &config);
        // Whole up to the horizon, then {x_0 = 1}: the witness picks x_0 = 0
        let seq = CylinderSequence::from_fn(|n| {
            Ok(if n <= 16 {
                Cylinder::whole()
            } else {
                Cylinder::boxed([(0, IntervalSet::point(1))])
            })
        });
        let err = downward_continuity(&seq, m).unwrap_err();
        assert!(matches!(err, MeasureError::Undetermined(_)));
    }

    #[test]
    fn test_constant_event_persists() {
        let family = ProductFamily::iid(Law::coin()).unwrap();
        let config = ExtensionConfig::quick();
        let m = Marginalizer::new(&family, &config);
        let seq = CylinderSequence::from_vec(vec![
            Cylinder::whole(),
            Cylinder::boxed([(0, IntervalSet::point(0))]),
        ]);
        match downward_continuity(&seq, m).unwrap() {
            Continuity::Persists { epsilon, witness, .. } => {
                assert!(epsilon.approx_eq(ENNReal::new(0.5).unwrap(), 1e-12));
                assert_eq!(witness.get(0), Some(Value::Nat(0)));
                assert!(witness.len() >= config.witness_depth);
            }
            other => panic!("expected a witness, got {:?}", other),
        }
    }
}
