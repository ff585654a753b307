//! Objectives: how solutions are scored and compared.
//!
//! An [`Objective`] computes a fitness from scratch and defines the algebra
//! operators use for incremental deltas. All built-in objectives use the
//! lexicographic [`Fitness`].

mod capacitated;
mod directed;
mod fitness;
mod tour;

use std::cmp::Ordering;
use std::fmt::Debug;

pub use capacitated::CapacitatedObjective;
pub use directed::DirectedTourObjective;
pub use fitness::Fitness;
pub use tour::TourObjective;

/// Scores solutions of type `S` for problems of type `P`.
pub trait Objective<P, S> {
    /// The fitness value type.
    type Fitness: Copy + Debug + PartialEq;

    /// Short name used in logs.
    fn name(&self) -> &str;

    /// The neutral element of [`Objective::add`].
    fn zero(&self) -> Self::Fitness;

    /// A fitness worse than any reachable value.
    fn infinite(&self) -> Self::Fitness;

    /// Computes the fitness of `solution` from scratch.
    fn calculate(&self, problem: &P, solution: &S) -> Self::Fitness;

    /// Combines two fitness values.
    fn add(&self, a: Self::Fitness, b: Self::Fitness) -> Self::Fitness;

    /// Difference `a - b`.
    fn subtract(&self, a: Self::Fitness, b: Self::Fitness) -> Self::Fitness;

    /// Orders two fitness values; `Less` means `a` is better.
    fn compare(&self, a: Self::Fitness, b: Self::Fitness) -> Ordering;

    /// Returns `true` for the zero-cost case.
    fn is_zero(&self, fitness: Self::Fitness) -> bool;

    /// Returns `true` if deltas cannot be derived from local edge changes,
    /// forcing operators to recompute fitness from scratch.
    fn is_non_continuous(&self) -> bool {
        false
    }

    /// Returns `true` if `a` is strictly better than `b`.
    fn is_better(&self, a: Self::Fitness, b: Self::Fitness) -> bool {
        self.compare(a, b) == Ordering::Less
    }
}
