//! Property tests for the marginalizer
//!
//! Tests key properties:
//! - marginal(∅, f) = f
//! - the marginal of an indicator over its whole window is the content,
//!   whether computed in closed form or by quadrature
//! - marginal(S ∪ T, f) = marginal(S, marginal(T, f)) for disjoint S, T
//! - marginals are monotone in f


use generators::{arb_light_family, arb_point, arb_region, arb_small_window, arb_window, MAX_INDEX};
use kolmogorov::{
    Assignment, ContentFunction, Cylinder, ExtensionConfig, FnIntegrand, Indicator, Integrand,
    Marginalizer, ProductFamily, Window,
};
use proptest::prelude::*;

const TOL: f64 = 1e-9;

/// Quadrature settings for these tests. Indicators are piecewise constant
/// and constant past their last breakpoint, so a coarse tail loses nothing.
fn config() -> ExtensionConfig {
    ExtensionConfig::default()
        .with_tail_tolerance(1e-6)
        .with_quadrature_nodes(2)
}

/// A bounded smooth function of the coordinates in `window`
fn wave(window: Window) -> FnIntegrand<impl Fn(&Assignment) -> f64> {
    let support = window.clone();
    FnIntegrand::new(support, move |p: &Assignment| {
        window
            .iter()
            .map(|i| {
                let x = p.get(i).map_or(0.0, |v| v.position());
                1.0 + (x + i as f64).sin()
            })
            .product()
    })
}

/// A family, two disjoint windows and a point on every coordinate
fn arb_split() -> impl Strategy<Value = (ProductFamily, Window, Window, Assignment)> {
    (arb_light_family(), arb_small_window(), arb_small_window()).prop_flat_map(|(family, s, t)| {
        let t = t.difference(&s);
        let point = arb_point(&family, &Window::prefix(MAX_INDEX));
        (Just(family), Just(s), Just(t), point)
    })
}

/// A family and two regions over one window
fn arb_region_pair() -> impl Strategy<Value = (ProductFamily, Cylinder, Cylinder)> {
    (arb_light_family(), arb_window()).prop_flat_map(|(family, window)| {
        let a = arb_region(&family, &window);
        let b = arb_region(&family, &window);
        (Just(family), Just(window), a, b).prop_map(|(family, window, a, b)| {
            let first = Cylinder::new(window.clone(), a).expect("region lies in its window");
            let second = Cylinder::new(window, b).expect("region lies in its window");
            (family, first, second)
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Integrating out nothing changes nothing
    #[test]
    fn empty_window_is_identity((family, s, _t, point) in arb_split()) {
        let config = config();
        let m = Marginalizer::new(&family, &config);
        let f = wave(s);
        let g = m.marginal(&Window::empty(), &f);
        prop_assert_eq!(g.eval(&point).unwrap(), f.eval(&point).unwrap());
    }

    /// ∫ 1_C = content(C), in closed form and by quadrature
    #[test]
    fn indicator_integrates_to_content((family, a, _b) in arb_region_pair()) {
        let expected = ContentFunction::new(&family, TOL).content(&a).unwrap();
        for exact in [true, false] {
            let config = config().with_exact_sections(exact);
            let m = Marginalizer::new(&family, &config);
            let got = m.expectation(&Indicator::new(a.clone())).unwrap();
            prop_assert!(got.approx_eq(expected, TOL), "exact={} got={} expected={}", exact, got, expected);
        }
    }

    /// Iterated marginals compose over disjoint windows
    #[test]
    fn marginals_compose((family, s, t, point) in arb_split()) {
        let config = config();
        let m = Marginalizer::new(&family, &config);
        let f = wave(s.union(&t).union(&Window::singleton(0)));

        let both = m.marginal(&s.union(&t), &f);
        let inner = m.marginal(&t, &f);
        let nested = m.marginal(&s, &inner);

        let a = both.eval(&point).unwrap();
        let b = nested.eval(&point).unwrap();
        prop_assert!(a.approx_eq(b, 1e-9 * (1.0 + a.to_f64())), "{} vs {}", a, b);
    }

    /// f ≤ g pointwise gives marginal f ≤ marginal g
    #[test]
    fn marginal_is_monotone((family, a, b) in arb_region_pair()) {
        let config = config().with_exact_sections(false);
        let m = Marginalizer::new(&family, &config);
        let small = Indicator::new(a.intersect(&b));
        let large = Indicator::new(a.union(&b));
        let lo = m.integrate(a.window(), &small, &Assignment::new()).unwrap();
        let hi = m.integrate(a.window(), &large, &Assignment::new()).unwrap();
        prop_assert!(lo.to_f64() <= hi.to_f64() + TOL);
    }
}
