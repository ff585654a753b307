//! Visit exchange between two tours.
//!
//! # Algorithm
//!
//! For every visit `v` of the first tour and every nearest neighbour `u`
//! of `v` in the second tour, swaps the two positions when that lowers the
//! summed weight and both tours keep their capacity.
//!
//! # Complexity
//!
//! O(n·k) per tour pair.

use rand::RngCore;

use super::{apply_to_pairs, commit, pred, succ, InterTourOperator, EPSILON};
use crate::error::Result;
use crate::models::{CapacitatedProblem, CapacitatedSolution};
use crate::objective::{Fitness, Objective};
use crate::solvers::{MoveOutcome, Operator};

#[derive(Debug, Clone, Copy)]
struct ExchangeMove {
    v: usize,
    u: usize,
    delta: f64,
}

/// Swaps one visit of each tour.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExchangeOperator {
    all_pairs: bool,
}

impl ExchangeOperator {
    /// Exchange on one random tour pair per application.
    pub fn new() -> Self {
        Self::default()
    }

    /// Visits every ordered tour pair per application.
    pub fn with_all_pairs(mut self, all_pairs: bool) -> Self {
        self.all_pairs = all_pairs;
        self
    }

    /// Name used in logs.
    pub fn name(&self) -> String {
        if self.all_pairs {
            "EX_ALL".into()
        } else {
            "EX".into()
        }
    }

    fn best_move(
        problem: &CapacitatedProblem,
        solution: &CapacitatedSolution,
        t1: usize,
        t2: usize,
    ) -> Option<ExchangeMove> {
        let w = |a: usize, b: usize| problem.weight(a, b);
        let nearest = problem.nearest_neighbours();
        let (tour1, tour2) = (solution.tour(t1), solution.tour(t2));

        let mut best = None;
        let mut best_delta = -EPSILON;
        for v in tour1.iter().skip(1) {
            let (p1, s1) = (pred(tour1, v), succ(tour1, v));
            for &u in nearest.get(v) {
                if u == tour2.first() || !tour2.contains(u) {
                    continue;
                }
                let (p2, s2) = (pred(tour2, u), succ(tour2, u));
                let delta = w(p1, u) + w(u, s1) - w(p1, v) - w(v, s1) + w(p2, v) + w(v, s2)
                    - w(p2, u)
                    - w(u, s2);
                if delta >= best_delta {
                    continue;
                }
                if !problem.can_swap(solution.load(t1), &[v], &[u])
                    || !problem.can_swap(solution.load(t2), &[u], &[v])
                {
                    continue;
                }
                best_delta = delta;
                best = Some(ExchangeMove { v, u, delta });
            }
        }
        best
    }
}

impl<O> InterTourOperator<O> for ExchangeOperator
where
    O: Objective<CapacitatedProblem, CapacitatedSolution, Fitness = Fitness>,
{
    fn name(&self) -> String {
        ExchangeOperator::name(self)
    }

    fn apply_pair(
        &self,
        problem: &CapacitatedProblem,
        objective: &O,
        solution: &mut CapacitatedSolution,
        t1: usize,
        t2: usize,
    ) -> Result<MoveOutcome<Fitness>> {
        if t1 == t2 {
            return Ok(MoveOutcome::unchanged(objective.zero()));
        }
        let Some(mv) = Self::best_move(problem, solution, t1, t2) else {
            return Ok(MoveOutcome::unchanged(objective.zero()));
        };
        commit(problem, objective, solution, (t1, t2), mv.delta, |s| {
            let ((tour1, load1), (tour2, load2)) = s.pair_mut(t1, t2);
            let p1 = pred(tour1, mv.v);
            let p2 = pred(tour2, mv.u);
            tour1.remove(mv.v)?;
            tour2.remove(mv.u)?;
            tour1.insert_after(p1, mv.u)?;
            tour2.insert_after(p2, mv.v)?;
            problem.remove_from_load(load1, mv.v);
            problem.add_to_load(load1, mv.u);
            problem.remove_from_load(load2, mv.u);
            problem.add_to_load(load2, mv.v);
            Ok(())
        })
    }
}

impl<O> Operator<CapacitatedProblem, O, CapacitatedSolution> for ExchangeOperator
where
    O: Objective<CapacitatedProblem, CapacitatedSolution, Fitness = Fitness>,
{
    fn name(&self) -> String {
        ExchangeOperator::name(self)
    }

    fn apply(
        &self,
        problem: &CapacitatedProblem,
        objective: &O,
        solution: &mut CapacitatedSolution,
        rng: &mut dyn RngCore,
    ) -> Result<MoveOutcome<Fitness>> {
        apply_to_pairs(self, problem, objective, solution, self.all_pairs, rng)
    }
}
