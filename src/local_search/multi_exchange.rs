//! Chain exchange between two tours.
//!
//! # Algorithm
//!
//! For every chain X of `min..=max` visits of the first tour and every
//! chain Y of `min..=max` visits of the second tour that starts at a
//! nearest neighbour of X's head, puts Y where X was and X where Y was.
//! With reversal enabled each chain enters its new tour in whichever
//! orientation is cheaper. The best weight decrease that keeps both tours
//! within capacity is applied.
//!
//! With `min = max = 1` and no reversal this is [`ExchangeOperator`].
//!
//! [`ExchangeOperator`]: super::ExchangeOperator
//!
//! # Complexity
//!
//! O(n·max²·k) per tour pair.

use rand::RngCore;

use super::{
    apply_to_pairs, chains_from, commit, insert_chain, pred, succ, Chain, InterTourOperator,
    EPSILON,
};
use crate::error::Result;
use crate::models::{CapacitatedProblem, CapacitatedSolution};
use crate::objective::{Fitness, Objective};
use crate::solvers::{MoveOutcome, Operator};

#[derive(Debug, Clone)]
struct SwapMove {
    /// Chain leaving the first tour, oriented as it enters the second.
    x: Vec<usize>,
    /// Chain leaving the second tour, oriented as it enters the first.
    y: Vec<usize>,
    p1: usize,
    p2: usize,
    delta: f64,
}

/// Exchanges two chains of `min..=max` visits between tours.
///
/// # Examples
///
/// ```
/// use u_tour::local_search::MultiExchangeOperator;
///
/// let op = MultiExchangeOperator::new(1, 10)
///     .with_reversed(true)
///     .with_all_pairs(true);
/// assert_eq!(op.name(), "MULTI_EX_1_10_R_ALL");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MultiExchangeOperator {
    min: usize,
    max: usize,
    reversed: bool,
    all_pairs: bool,
}

impl MultiExchangeOperator {
    /// Exchanges chains of `min..=max` visits (`min` is at least one).
    pub fn new(min: usize, max: usize) -> Self {
        let min = min.max(1);
        Self {
            min,
            max: max.max(min),
            reversed: false,
            all_pairs: false,
        }
    }

    /// Also tries chains in reversed orientation.
    pub fn with_reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    /// Visits every ordered tour pair per application.
    pub fn with_all_pairs(mut self, all_pairs: bool) -> Self {
        self.all_pairs = all_pairs;
        self
    }

    /// Name used in logs.
    pub fn name(&self) -> String {
        let mut name = format!("MULTI_EX_{}_{}", self.min, self.max);
        if self.reversed {
            name.push_str("_R");
        }
        if self.all_pairs {
            name.push_str("_ALL");
        }
        name
    }

    /// Cheapest way to put `chain` between `before` and `after`.
    fn placement(
        &self,
        problem: &CapacitatedProblem,
        chain: &Chain,
        before: usize,
        after: usize,
    ) -> (f64, bool) {
        let w = |a: usize, b: usize| problem.weight(a, b);
        let forward = w(before, chain.head()) + chain.forward + w(chain.tail(), after);
        if !self.reversed {
            return (forward, false);
        }
        let backward = w(before, chain.tail()) + chain.backward + w(chain.head(), after);
        if backward < forward {
            (backward, true)
        } else {
            (forward, false)
        }
    }

    fn best_move(
        &self,
        problem: &CapacitatedProblem,
        solution: &CapacitatedSolution,
        t1: usize,
        t2: usize,
    ) -> Option<SwapMove> {
        let w = |a: usize, b: usize| problem.weight(a, b);
        let nearest = problem.nearest_neighbours();
        let (tour1, tour2) = (solution.tour(t1), solution.tour(t2));
        let (load1, load2) = (solution.load(t1), solution.load(t2));

        let mut best: Option<SwapMove> = None;
        let mut best_delta = -EPSILON;
        for start in tour1.iter().skip(1) {
            let p1 = pred(tour1, start);
            let xs = chains_from(problem, tour1, start, self.min, self.max);
            for &u in nearest.get(start) {
                if u == tour2.first() || !tour2.contains(u) {
                    continue;
                }
                let p2 = pred(tour2, u);
                let ys = chains_from(problem, tour2, u, self.min, self.max);
                for x in &xs {
                    let s1 = succ(tour1, x.tail());
                    let old1 = w(p1, x.head()) + x.forward + w(x.tail(), s1);
                    for y in &ys {
                        let s2 = succ(tour2, y.tail());
                        let old2 = w(p2, y.head()) + y.forward + w(y.tail(), s2);
                        let (new1, y_reversed) = self.placement(problem, y, p1, s1);
                        let (new2, x_reversed) = self.placement(problem, x, p2, s2);
                        let delta = new1 + new2 - old1 - old2;
                        if delta >= best_delta {
                            continue;
                        }
                        if !problem.can_swap(load1, &x.visits, &y.visits)
                            || !problem.can_swap(load2, &y.visits, &x.visits)
                        {
                            continue;
                        }
                        best_delta = delta;
                        let mut xv = x.visits.clone();
                        if x_reversed {
                            xv.reverse();
                        }
                        let mut yv = y.visits.clone();
                        if y_reversed {
                            yv.reverse();
                        }
                        best = Some(SwapMove {
                            x: xv,
                            y: yv,
                            p1,
                            p2,
                            delta,
                        });
                    }
                }
            }
        }
        best
    }
}

impl<O> InterTourOperator<O> for MultiExchangeOperator
where
    O: Objective<CapacitatedProblem, CapacitatedSolution, Fitness = Fitness>,
{
    fn name(&self) -> String {
        MultiExchangeOperator::name(self)
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
            let ((tour1, load1), (tour2, load2)) = s.pair_mut(t1, t2);
            for &v in &mv.x {
                tour1.remove(v)?;
                problem.remove_from_load(load1, v);
                problem.add_to_load(load2, v);
            }
            for &v in &mv.y {
                tour2.remove(v)?;
                problem.remove_from_load(load2, v);
                problem.add_to_load(load1, v);
            }
            insert_chain(tour1, mv.p1, &mv.y)?;
            insert_chain(tour2, mv.p2, &mv.x)
        })
    }
}

impl<O> Operator<CapacitatedProblem, O, CapacitatedSolution> for MultiExchangeOperator
where
    O: Objective<CapacitatedProblem, CapacitatedSolution, Fitness = Fitness>,
{
    fn name(&self) -> String {
        MultiExchangeOperator::name(self)
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
