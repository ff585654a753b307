//! Local search operators.
//!
//! Single-tour operators work on a [`Tour`](crate::models::Tour) of a
//! [`TspProblem`](crate::models::TspProblem):
//!
//! - [`Local1Shift`] — move single visits to their best position
//! - [`RandomExchange`] — VNS shake swapping random visit pairs
//! - [`HillClimbing3Opt`] — first-improvement 3-opt
//!
//! Inter-tour operators work on two tours of a
//! [`CapacitatedSolution`], always respecting capacity and never moving the
//! first visit of a tour:
//!
//! - [`RelocateOperator`] — move one visit
//! - [`ExchangeOperator`] — swap one visit each
//! - [`MultiRelocateOperator`] — move a chain of visits
//! - [`MultiExchangeOperator`] — swap two chains of visits
//!
//! Candidate positions come from the nearest-neighbour cache, so one pass
//! costs O(visits × k) rather than O(visits²).

mod exchange;
mod multi_exchange;
mod multi_relocate;
mod one_shift;
mod random_exchange;
mod relocate;
mod three_opt;

use rand::{Rng, RngCore};

use crate::error::Result;
use crate::models::{CapacitatedProblem, CapacitatedSolution, Tour};
use crate::objective::{Fitness, Objective};
use crate::solvers::MoveOutcome;

pub use exchange::ExchangeOperator;
pub use multi_exchange::MultiExchangeOperator;
pub use multi_relocate::MultiRelocateOperator;
pub use one_shift::Local1Shift;
pub use random_exchange::RandomExchange;
pub use relocate::RelocateOperator;
pub use three_opt::{sequence_weight, three_opt_improve, HillClimbing3Opt};

/// Smallest weight decrease accepted as an improvement.
pub const EPSILON: f64 = 1e-9;

/// An improving move between tours `t1` and `t2` of a capacitated solution.
///
/// Visits are taken from `t1`; an operator that also supports moves within
/// one tour accepts `t1 == t2`.
pub trait InterTourOperator<O>
where
    O: Objective<CapacitatedProblem, CapacitatedSolution, Fitness = Fitness>,
{
    /// Name used in logs.
    fn name(&self) -> String;

    /// Returns `true` if the operator accepts `t1 == t2`.
    fn supports_same_tour(&self) -> bool {
        false
    }

    /// Applies the best improving move between `t1` and `t2`, if any.
    fn apply_pair(
        &self,
        problem: &CapacitatedProblem,
        objective: &O,
        solution: &mut CapacitatedSolution,
        t1: usize,
        t2: usize,
    ) -> Result<MoveOutcome<Fitness>>;
}

/// Runs `op` over every ordered tour pair, or over one random pair.
pub(crate) fn apply_to_pairs<O, T>(
    op: &T,
    problem: &CapacitatedProblem,
    objective: &O,
    solution: &mut CapacitatedSolution,
    all_pairs: bool,
    rng: &mut dyn RngCore,
) -> Result<MoveOutcome<Fitness>>
where
    O: Objective<CapacitatedProblem, CapacitatedSolution, Fitness = Fitness>,
    T: InterTourOperator<O> + ?Sized,
{
    let n = solution.len();
    let same = op.supports_same_tour();
    let mut outcome = MoveOutcome::unchanged(objective.zero());

    if all_pairs {
        for t1 in 0..n {
            for t2 in 0..n {
                if t1 == t2 && !same {
                    continue;
                }
                let step = op.apply_pair(problem, objective, solution, t1, t2)?;
                if step.improved {
                    outcome.improved = true;
                    outcome.delta = objective.add(outcome.delta, step.delta);
                }
            }
        }
        return Ok(outcome);
    }

    if n == 0 || (n < 2 && !same) {
        return Ok(outcome);
    }
    let t1 = rng.random_range(0..n);
    let t2 = if same {
        rng.random_range(0..n)
    } else {
        (t1 + rng.random_range(1..n)) % n
    };
    op.apply_pair(problem, objective, solution, t1, t2)
}

/// Applies a move on tours `t1` and `t2` whose edge delta is `delta`.
///
/// For non-continuous objectives the move is tried on a copy and only kept
/// when the recomputed fitness improves. Either way a failing `apply`
/// leaves both tours as they were.
pub(crate) fn commit<O, F>(
    problem: &CapacitatedProblem,
    objective: &O,
    solution: &mut CapacitatedSolution,
    (t1, t2): (usize, usize),
    delta: f64,
    apply: F,
) -> Result<MoveOutcome<Fitness>>
where
    O: Objective<CapacitatedProblem, CapacitatedSolution, Fitness = Fitness>,
    F: FnOnce(&mut CapacitatedSolution) -> Result<()>,
{
    if objective.is_non_continuous() {
        let before = objective.calculate(problem, solution);
        let mut candidate = solution.clone();
        apply(&mut candidate)?;
        let change = objective.subtract(objective.calculate(problem, &candidate), before);
        if !objective.is_better(change, objective.zero()) {
            return Ok(MoveOutcome::unchanged(objective.zero()));
        }
        *solution = candidate;
        return Ok(MoveOutcome::improved(change));
    }

    let saved = (
        solution.tour(t1).clone(),
        solution.load(t1).clone(),
        solution.tour(t2).clone(),
        solution.load(t2).clone(),
    );
    if let Err(e) = apply(solution) {
        let (tour1, load1, tour2, load2) = saved;
        *solution.tour_mut(t1).0 = tour1;
        *solution.tour_mut(t1).1 = load1;
        *solution.tour_mut(t2).0 = tour2;
        *solution.tour_mut(t2).1 = load2;
        return Err(e);
    }
    tracing::trace!(event = "move", t1, t2, delta);
    Ok(MoveOutcome::improved(Fitness::from_weight(delta)))
}

/// Visit following `visit` in a closed tour.
#[inline]
pub(crate) fn succ(tour: &Tour, visit: usize) -> usize {
    tour.next(visit).unwrap_or(visit)
}

/// Visit preceding `visit` in a closed tour.
#[inline]
pub(crate) fn pred(tour: &Tour, visit: usize) -> usize {
    tour.prev(visit).unwrap_or(visit)
}

/// A chain of consecutive visits with its travel weight in both directions.
#[derive(Debug, Clone)]
pub(crate) struct Chain {
    pub visits: Vec<usize>,
    pub forward: f64,
    pub backward: f64,
}

impl Chain {
    pub fn head(&self) -> usize {
        self.visits[0]
    }

    pub fn tail(&self) -> usize {
        self.visits[self.visits.len() - 1]
    }
}

/// Chains of `min..=max` visits starting at `start` in a closed tour,
/// shortest first. Chains never wrap past the tour's first visit.
pub(crate) fn chains_from(
    problem: &CapacitatedProblem,
    tour: &Tour,
    start: usize,
    min: usize,
    max: usize,
) -> Vec<Chain> {
    let mut out = Vec::new();
    let mut chain = Chain {
        visits: vec![start],
        forward: 0.0,
        backward: 0.0,
    };
    loop {
        if chain.visits.len() >= min {
            out.push(chain.clone());
        }
        if chain.visits.len() >= max {
            break;
        }
        let last = chain.tail();
        let next = succ(tour, last);
        if next == tour.first() {
            break;
        }
        chain.forward += problem.weight(last, next);
        chain.backward += problem.weight(next, last);
        chain.visits.push(next);
    }
    out
}

/// Inserts `visits` after `after`, in order.
pub(crate) fn insert_chain(tour: &mut Tour, after: usize, visits: &[usize]) -> Result<()> {
    let mut pred = after;
    for &v in visits {
        tour.insert_after(pred, v)?;
        pred = v;
    }
    Ok(())
}
