//! Witness construction for the Kolmogorov extension
//!
//! Content on cylinders is finitely additive by construction. To extend it
//! to a measure it must also be continuous from above at the empty set: if
//! `A_0 ⊇ A_1 ⊇ …` are cylinders with `content(A_n) ≥ ε > 0` for every `n`,
//! then `⋂ A_n` is not empty. This module makes that statement constructive
//! for product families.
//!
//! # Key Concepts
//!
//! - **Antitone sequence**: Functions `f_0 ≥ f_1 ≥ …`, each reading finitely
//!   many coordinates, all below one finite bound. Indicators of a decreasing
//!   sequence of cylinders are the main example
//! - **Horizon `N(n)`**: The largest coordinate `f_n` reads
//! - **Section**: `marginal(Icc(k, N(n)), f_n)` evaluated at a prefix
//!   `y_0, …, y_{k-1}`; the integral of `f_n` over everything not yet fixed
//! - **Witness**: A point `y` built one coordinate at a time, keeping every
//!   section at least `ε` at every level
//! - **Strategy**: How candidates for the next coordinate are proposed
//!
//! # The Recursion
//!
//! Suppose every section at level `k` is at least `ε`. For a candidate value
//! `c` of coordinate `k`, the sections at level `k + 1` decrease in `n`, so
//! they have a pointwise limit `g(c)`. Integrating `c` out of `g` gives the
//! limit of the level-`k` sections, which is at least `ε` by monotone
//! convergence. Hence some `c` has `g(c) ≥ ε`, and every section at level
//! `k + 1` stays at least `ε` there.
//!
//! The argument says such a `c` exists but not where. The search replaces
//! the choice with a deterministic [`SelectionStrategy`]: countable spaces
//! are enumerated in order, interval spaces are probed at the pieces cut by
//! the breakpoints of the functions and then by dyadic bisection. Statements
//! over all `n` are checked on the terms `0..=horizon` of the configuration;
//! the continuity check doubles that horizon while the contents still fall.
//!
//! Once coordinate `k` exceeds `N(n)` the section of `f_n` is `f_n` itself,
//! so the witness lies in every `A_n` it has grown past.

mod continuity;
mod search;
mod sequence;
mod strategy;
mod types;

pub use continuity::downward_continuity;
pub use search::Witness;
pub use sequence::{AntitoneSequence, CylinderSequence};
pub use strategy::{Bisection, Enumerate, LawDefault, Oracle, SelectionStrategy};
pub use types::{Continuity, StepRecord};
