//! Property tests for the cylinder algebra
//!
//! Set operations on cylinders are checked pointwise: a generated point is in
//! the union, intersection, difference or complement exactly when the
//! boolean combination of its memberships says so.


use generators::{arb_cylinder_pair, arb_family, arb_nested_windows, arb_point, arb_region};
use kolmogorov::{Assignment, Cylinder, Index, OrderedSemiring, ProductFamily, ProjectiveFamily};
use proptest::prelude::*;

/// Two cylinders and a point assigning every coordinate either reads
fn arb_cylinders_and_point() -> impl Strategy<Value = (ProductFamily, Cylinder, Cylinder, Assignment)> {
    arb_cylinder_pair().prop_flat_map(|(family, a, b)| {
        let window = a.window().union(b.window());
        let point = arb_point(&family, &window);
        (Just(family), Just(a), Just(b), point)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Union, intersection and difference agree with boolean logic
    #[test]
    fn boolean_operations_are_pointwise((_family, a, b, point) in arb_cylinders_and_point()) {
        let in_a = a.contains(&point).unwrap();
        let in_b = b.contains(&point).unwrap();
        prop_assert_eq!(a.union(&b).contains(&point).unwrap(), in_a || in_b);
        prop_assert_eq!(a.intersect(&b).contains(&point).unwrap(), in_a && in_b);
        prop_assert_eq!(a.difference(&b).contains(&point).unwrap(), in_a && !in_b);
        prop_assert_eq!(a.complement().contains(&point).unwrap(), !in_a);
    }

    /// Disjointification keeps the set and makes the pieces disjoint
    #[test]
    fn disjoint_rects_partition_the_region((_family, a, _b, point) in arb_cylinders_and_point()) {
        let pieces = a.region().disjoint_rects();
        let hits = pieces
            .iter()
            .filter(|r| r.contains(&point).unwrap())
            .count();
        prop_assert!(hits <= 1);
        prop_assert_eq!(hits == 1, a.contains(&point).unwrap());
    }

    /// Reindexing onto a larger window denotes the same set
    #[test]
    fn reindex_preserves_membership(
        (family, small, large, region, point) in (arb_family(), arb_nested_windows())
            .prop_flat_map(|(family, (small, large))| {
                let region = arb_region(&family, &small);
                let point = arb_point(&family, &large);
                (Just(family), Just(small), Just(large), region, point)
            })
    ) {
        let cyl = Cylinder::new(small, region).unwrap();
        let moved = cyl.reindex(&large).unwrap();
        prop_assert_eq!(cyl.contains(&point).unwrap(), moved.contains(&point).unwrap());
        let space_of = |i: Index| family.space(i);
        prop_assert!(cyl.same_set(&moved, &space_of));
    }

    /// A cylinder and its complement are disjoint and cover the space
    #[test]
    fn complement_is_disjoint((family, a, _b) in arb_cylinder_pair()) {
        let space_of = |i: Index| family.space(i);
        let complement = a.complement();
        prop_assert!(a.is_disjoint_from(&complement, &space_of));
        prop_assert!(Cylinder::whole().is_subset_of(&a.union(&complement), &space_of));
    }

    /// Emptiness in the boolean semiring matches the measure being zero only
    /// in one direction: empty regions have measure zero
    #[test]
    fn empty_regions_weigh_zero((family, a, b) in arb_cylinder_pair()) {
        let space_of = |i: Index| family.space(i);
        let meet = a.intersect(&b);
        if meet.is_empty_in(&space_of) {
            let weight = family.measure(meet.window(), meet.region()).unwrap();
            prop_assert!(weight.is_zero());
        }
    }
}
