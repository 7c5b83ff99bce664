//! Fuzz the cylinder algebra
//!
//! Bytes are read as a small program building cylinders over a mixed
//! product family. Content must never panic and must stay in [0, 1].

#![no_main]

use kolmogorov::{build, Cylinder, IntervalSet, Law, ProductFamily};
use libfuzzer_sys::fuzz_target;

fn side(kind: u8, a: u8, b: u8) -> IntervalSet {
    let (lo, hi) = (a.min(b) as f64 / 32.0, a.max(b) as f64 / 32.0);
    match kind % 4 {
        0 => IntervalSet::point((a % 8) as u64),
        1 => IntervalSet::at_least((a % 8) as u64),
        2 => IntervalSet::interval(lo, hi),
        _ => IntervalSet::interval(lo, hi).complement(),
    }
}

fuzz_target!(|data: &[u8]| {
    let family = match ProductFamily::new(
        vec![Law::coin(), Law::geometric_half(), Law::unit_lebesgue()],
        Law::uniform_finite(3),
    ) {
        Ok(family) => family,
        Err(_) => return,
    };
    let measure = match build(family) {
        Ok(measure) => measure,
        Err(_) => return,
    };

    let mut current = Cylinder::whole();
    for chunk in data.chunks_exact(4).take(32) {
        let index = (chunk[0] % 6) as u64;
        let next = Cylinder::boxed([(index, side(chunk[1], chunk[2], chunk[3]))]);
        current = match chunk[0] / 64 {
            0 => current.union(&next),
            1 => current.intersect(&next),
            2 => current.difference(&next),
            _ => current.complement().union(&next),
        };
        // Content never panics and stays a probability
        if let Ok(value) = measure.measure(&current) {
            assert!(value.to_f64() <= 1.0 + 1e-9);
        }
    }
});
