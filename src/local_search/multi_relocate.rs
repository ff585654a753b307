//! Chain relocation between two tours.
//!
//! # Algorithm
//!
//! For every chain of `min..=max` consecutive visits of the first tour,
//! tries to insert it next to the nearest neighbours of its two end visits
//! in the second tour, in both orientations. The best weight decrease that
//! fits the second tour's capacity is applied.
//!
//! # Complexity
//!
//! O(n·max·k) per tour pair.

use rand::RngCore;

use super::{
    apply_to_pairs, chains_from, commit, insert_chain, pred, succ, InterTourOperator, EPSILON,
};
use crate::error::Result;
use crate::models::{CapacitatedProblem, CapacitatedSolution};
use crate::objective::{Fitness, Objective};
use crate::solvers::{MoveOutcome, Operator};

#[derive(Debug, Clone)]
struct ChainMove {
    visits: Vec<usize>,
    after: usize,
    delta: f64,
}

/// Moves a chain of `min..=max` visits to another tour.
///
/// # Examples
///
/// ```
/// use u_tour::local_search::MultiRelocateOperator;
///
/// let op = MultiRelocateOperator::new(2, 5);
/// assert_eq!(op.name(), "MULTI_RELOC_2_5");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MultiRelocateOperator {
    min: usize,
    max: usize,
    all_pairs: bool,
}

impl MultiRelocateOperator {
    /// Relocates chains of `min..=max` visits (`min` is at least one).
    pub fn new(min: usize, max: usize) -> Self {
        let min = min.max(1);
        Self {
            min,
            max: max.max(min),
            all_pairs: false,
        }
    }

    /// Visits every ordered tour pair per application.
    pub fn with_all_pairs(mut self, all_pairs: bool) -> Self {
        self.all_pairs = all_pairs;
        self
    }

    /// Name used in logs.
    pub fn name(&self) -> String {
        format!("MULTI_RELOC_{}_{}", self.min, self.max)
    }

    fn best_move(
        &self,
        problem: &CapacitatedProblem,
        solution: &CapacitatedSolution,
        t1: usize,
        t2: usize,
    ) -> Option<ChainMove> {
        let w = |a: usize, b: usize| problem.weight(a, b);
        let nearest = problem.nearest_neighbours();
        let (source, target) = (solution.tour(t1), solution.tour(t2));

        let mut best: Option<ChainMove> = None;
        let mut best_delta = -EPSILON;
        for start in source.iter().skip(1) {
            let p = pred(source, start);
            for chain in chains_from(problem, source, start, self.min, self.max) {
                if !problem.can_add(solution.load(t2), &chain.visits) {
                    // a longer chain may still fit when costs are negative
                    continue;
                }
                let (head, tail) = (chain.head(), chain.tail());
                let s = succ(source, tail);
                let removal = w(p, head) + chain.forward + w(tail, s) - w(p, s);

                for &n in nearest.get(head).iter().chain(nearest.get(tail)) {
                    if !target.contains(n) {
                        continue;
                    }
                    for q in [n, pred(target, n)] {
                        let t = succ(target, q);
                        let forward = w(q, head) + chain.forward + w(tail, t) - w(q, t);
                        let backward = w(q, tail) + chain.backward + w(head, t) - w(q, t);
                        let (insertion, reversed) = if backward < forward {
                            (backward, true)
                        } else {
                            (forward, false)
                        };
                        let delta = insertion - removal;
                        if delta < best_delta {
                            best_delta = delta;
                            let mut visits = chain.visits.clone();
                            if reversed {
                                visits.reverse();
                            }
                            best = Some(ChainMove {
                                visits,
                                after: q,
                                delta,
                            });
                        }
                    }
                }
            }
        }
        best
    }
}

impl<O> InterTourOperator<O> for MultiRelocateOperator
where
    O: Objective<CapacitatedProblem, CapacitatedSolution, Fitness = Fitness>,
{
    fn name(&self) -> String {
        MultiRelocateOperator::name(self)
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
        let Some(mv) = self.best_move(problem, solution, t1, t2) else {
            return Ok(MoveOutcome::unchanged(objective.zero()));
        };
        commit(problem, objective, solution, (t1, t2), mv.delta, |s| {
            let ((source, source_load), (target, target_load)) = s.pair_mut(t1, t2);
            for &v in &mv.visits {
                source.remove(v)?;
                problem.remove_from_load(source_load, v);
                problem.add_to_load(target_load, v);
            }
            insert_chain(target, mv.after, &mv.visits)
        })
    }
}

impl<O> Operator<CapacitatedProblem, O, CapacitatedSolution> for MultiRelocateOperator
where
    O: Objective<CapacitatedProblem, CapacitatedSolution, Fitness = Fitness>,
{
    fn name(&self) -> String {
        MultiRelocateOperator::name(self)
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
