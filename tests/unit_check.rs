//! Unit tests for the projective-limit checker and the extension operations

use std::collections::BTreeMap;

use kolmogorov::{
    build, CheckResult, ContentFunction, Cylinder, ENNReal, ExtensionConfig, IntervalSet,
    JointTable, Law, MeasureError, ProductFamily, ProductMeasure, ProjectiveFamily,
    ProjectiveLimitChecker, Rect, Region, TabulatedFamily, Window,
};

fn mixed() -> ProductMeasure {
    let family = ProductFamily::new(
        vec![Law::bernoulli(0.25), Law::geometric_half(), Law::unit_lebesgue()],
        Law::Uniform { lo: -1.0, hi: 1.0 },
    )
    .unwrap();
    build(family).unwrap()
}

#[test]
fn test_checker_accepts_hand_written_probes() {
    let measure = mixed();
    let checker = ProjectiveLimitChecker::new(&measure);
    let window = Window::prefix(4);
    let probes = vec![
        Region::full(),
        Region::empty(),
        Region::boxed([(0, IntervalSet::point(1)), (2, IntervalSet::interval(0.1, 0.35))]),
        Region::from_rects(vec![
            Rect::full().with_side(1, IntervalSet::at_least(2)),
            Rect::full()
                .with_side(1, IntervalSet::points([0, 3]))
                .with_side(3, IntervalSet::interval(-0.5, 0.25)),
        ]),
    ];
    let result = checker.check_window(&window, &probes).unwrap();
    assert!(result.is_satisfied(), "{:?}", result.violations());
}

#[test]
fn test_checker_random_windows() {
    let measure = mixed();
    let checker = ProjectiveLimitChecker::new(&measure);
    let windows = [Window::prefix(2), Window::icc(1, 3), Window::singleton(5)];
    let result = checker.check_windows(&windows, 16, 2024).unwrap();
    assert!(matches!(result, CheckResult::Satisfied));
    assert!(matches!(
        checker.check_windows(&windows, 0, 1),
        Err(MeasureError::InvalidParameter { .. })
    ));
}

#[test]
fn test_union_matches_inclusion_exclusion() {
    let measure = mixed();
    let a = Cylinder::boxed([(2, IntervalSet::interval(0.0, 0.5))]);
    let b = Cylinder::boxed([(2, IntervalSet::interval(0.25, 0.75))]);
    let c = Cylinder::boxed([(0, IntervalSet::point(1))]);
    let got = measure.measure_union(&[a.clone(), b.clone(), c.clone()]).unwrap();

    let ab = 0.75;
    let expected = ab + 0.25 - ab * 0.25;
    assert!(got.approx_eq(ENNReal::new(expected).unwrap(), 1e-12));

    // Subadditive against the separate contents
    let separate: ENNReal = [a, b, c].iter().map(|x| measure.measure(x).unwrap()).sum();
    assert!(got <= separate);
}

#[test]
fn test_outer_measure_of_countable_cover() {
    let measure = build(ProductFamily::iid(Law::geometric_half()).unwrap()).unwrap();
    // {x_0 ≥ 1} covered point by point, and in one piece
    let pointwise: Vec<Cylinder> = (1..60)
        .map(|k| Cylinder::boxed([(0, IntervalSet::point(k))]))
        .collect();
    let single = vec![Cylinder::boxed([(0, IntervalSet::at_least(1))])];
    let got = measure.outer_measure(&[pointwise, single]).unwrap();
    assert!(got.approx_eq(ENNReal::new(0.5).unwrap(), 1e-12));
}

#[test]
fn test_tabulated_family_agrees_with_product() {
    let product = ProductFamily::new(vec![Law::coin(), Law::bernoulli(0.25)], Law::coin()).unwrap();
    let p = [[0.5 * 0.75, 0.5 * 0.25], [0.5 * 0.75, 0.5 * 0.25]];
    let mut joint = BTreeMap::new();
    for (x, row) in p.iter().enumerate() {
        for (y, &mass) in row.iter().enumerate() {
            joint.insert(vec![x as u64, y as u64], mass);
        }
    }
    let tabulated = TabulatedFamily::new(
        vec![2, 2],
        vec![JointTable::new(Window::prefix(2), joint)],
    )
    .unwrap();

    let region = Region::boxed([(1, IntervalSet::point(1))]);
    let a = tabulated.measure(&Window::prefix(2), &region).unwrap();
    let b = product.measure(&Window::prefix(2), &region).unwrap();
    assert!(a.approx_eq(b, 1e-12));

    let content = ContentFunction::new(&tabulated, 1e-12);
    let cyl = Cylinder::new(Window::prefix(2), region).unwrap();
    assert!(content.content(&cyl).unwrap().approx_eq(ENNReal::new(0.25).unwrap(), 1e-12));
}

#[test]
fn test_inconsistent_tables_are_rejected() {
    let mut pair = BTreeMap::new();
    pair.insert(vec![0, 0], 0.5);
    pair.insert(vec![1, 1], 0.5);
    let mut single = BTreeMap::new();
    single.insert(vec![0], 0.9);
    single.insert(vec![1], 0.1);
    let result = TabulatedFamily::new(
        vec![2, 2],
        vec![
            JointTable::new(Window::prefix(2), pair),
            JointTable::new(Window::singleton(0), single),
        ],
    );
    assert!(matches!(result, Err(MeasureError::InvariantViolation(_))));
}

#[test]
fn test_config_presets_build() {
    let family = ProductFamily::iid(Law::coin()).unwrap();
    for config in [
        ExtensionConfig::quick(),
        ExtensionConfig::standard(),
        ExtensionConfig::thorough(),
    ] {
        let measure = ProductMeasure::build(family.clone(), config).unwrap();
        assert_eq!(measure.measure(&Cylinder::whole()).unwrap(), ENNReal::ONE);
    }
    let bad = ExtensionConfig::default().with_tolerance(f64::NAN);
    assert!(matches!(
        ProductMeasure::build(family, bad),
        Err(MeasureError::InvalidParameter { .. })
    ));
}
