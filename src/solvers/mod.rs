//! Solver composition: capability traits and generic drivers.
//!
//! Construction heuristics implement [`Solver`], improvement moves implement
//! [`Operator`], shakes implement [`Perturber`] and recombination implements
//! [`CrossOverOperator`]. The drivers ([`IterativeSolver`], [`VnsSolver`],
//! [`GeneticSolver`]) are generic over all three of problem, objective and
//! solution and only talk to these traits.
//!
//! Randomness always comes in as `&mut dyn RngCore`; nothing in the crate
//! draws from a global generator.

mod genetic;
mod iterative;
mod vns;

use rand::RngCore;

use crate::error::Result;
use crate::objective::Objective;

pub use genetic::GeneticSolver;
pub use iterative::{IterativeOperator, IterativeSolver};
pub use vns::VnsSolver;

/// Result of one operator application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOutcome<F> {
    /// `true` if the solution was changed for the better.
    pub improved: bool,
    /// Fitness change (new minus old); the objective's zero when unchanged.
    pub delta: F,
}

impl<F> MoveOutcome<F> {
    /// An applied improving move.
    pub fn improved(delta: F) -> Self {
        Self {
            improved: true,
            delta,
        }
    }

    /// No move was applied.
    pub fn unchanged(zero: F) -> Self {
        Self {
            improved: false,
            delta: zero,
        }
    }
}

/// Produces a solution from scratch.
pub trait Solver<P, O: Objective<P, S>, S> {
    /// Name used in logs, for example `"RAN"` or `"ITER_[10xRAN]"`.
    fn name(&self) -> String;

    /// Builds a solution and returns it with its fitness.
    fn solve(&self, problem: &P, objective: &O, rng: &mut dyn RngCore) -> Result<(S, O::Fitness)>;
}

/// Improves a solution in place.
///
/// An operator that finds no improving move returns
/// [`MoveOutcome::unchanged`] and leaves the solution untouched.
pub trait Operator<P, O: Objective<P, S>, S> {
    /// Name used in logs.
    fn name(&self) -> String;

    /// Tries to improve `solution`.
    fn apply(
        &self,
        problem: &P,
        objective: &O,
        solution: &mut S,
        rng: &mut dyn RngCore,
    ) -> Result<MoveOutcome<O::Fitness>>;
}

/// Randomly disturbs a solution with a strength that grows with `level`.
pub trait Perturber<P, O: Objective<P, S>, S> {
    /// Name used in logs.
    fn name(&self) -> String;

    /// Perturbs `solution` in place and reports the fitness change.
    fn perturb(
        &self,
        problem: &P,
        objective: &O,
        solution: &mut S,
        level: usize,
        rng: &mut dyn RngCore,
    ) -> Result<MoveOutcome<O::Fitness>>;
}

/// Combines two parents into one offspring.
pub trait CrossOverOperator<P, O: Objective<P, S>, S> {
    /// Name used in logs.
    fn name(&self) -> String;

    /// Builds an offspring of `parent1` and `parent2`.
    fn apply(
        &self,
        problem: &P,
        objective: &O,
        parent1: &S,
        parent2: &S,
        rng: &mut dyn RngCore,
    ) -> Result<(S, O::Fitness)>;
}

/// Stop predicate of an [`IterativeSolver`]: iteration, problem, objective,
/// best solution and its fitness.
pub type StopCondition<P, O, S, F> = Box<dyn Fn(usize, &P, &O, &S, F) -> bool>;

/// Stop predicate of a [`VnsSolver`]: iteration, level, problem, objective,
/// best solution and its fitness.
pub type VnsStopCondition<P, O, S, F> = Box<dyn Fn(usize, usize, &P, &O, &S, F) -> bool>;
