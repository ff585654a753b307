//! Visit relocation between (or within) tours.
//!
//! # Algorithm
//!
//! For every visit `v` of the source tour (except its first visit) the
//! removal gain `w(p,v) + w(v,s) - w(p,s)` is weighed against inserting `v`
//! next to one of its nearest neighbours in the target tour, either after
//! the neighbour or before it. The best negative change is applied if the
//! target tour has capacity for `v`. With source and target the same tour
//! this is an Or-opt move of length one.
//!
//! # Complexity
//!
//! O(n·k) per tour pair, k = nearest-neighbour count.

use rand::RngCore;

use super::{apply_to_pairs, commit, pred, succ, InterTourOperator, EPSILON};
use crate::error::Result;
use crate::models::{CapacitatedProblem, CapacitatedSolution};
use crate::objective::{Fitness, Objective};
use crate::solvers::{MoveOutcome, Operator};

#[derive(Debug, Clone, Copy)]
struct RelocateMove {
    visit: usize,
    after: usize,
    delta: f64,
}

/// Moves one visit to its best nearest-neighbour position.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::local_search::{InterTourOperator, RelocateOperator};
/// use u_tour::models::{CapacitatedProblem, CapacitatedSolution, Tour};
/// use u_tour::objective::CapacitatedObjective;
///
/// let points = [(0.0, 0.0), (1.0, 0.0), (10.0, 0.5), (0.0, 1.0), (10.0, 0.0), (11.0, 0.0)];
/// let problem = CapacitatedProblem::new(WeightMatrix::from_points(&points));
/// let mut solution = CapacitatedSolution::new();
/// solution.push(&problem, Tour::new([0, 1, 2, 3], Some(0)).unwrap());
/// solution.push(&problem, Tour::new([4, 5], Some(4)).unwrap());
///
/// let outcome = RelocateOperator::new()
///     .apply_pair(&problem, &CapacitatedObjective, &mut solution, 0, 1)
///     .unwrap();
/// assert!(outcome.improved);
/// assert!(outcome.delta.weight < 0.0);
/// assert_eq!(solution.tour_of(2), Some(1));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RelocateOperator {
    same_tour: bool,
    all_pairs: bool,
}

impl Default for RelocateOperator {
    fn default() -> Self {
        Self::new()
    }
}

impl RelocateOperator {
    /// Relocate between a random tour pair, same-tour moves allowed.
    pub fn new() -> Self {
        Self {
            same_tour: true,
            all_pairs: false,
        }
    }

    /// Allows or forbids moves within one tour.
    pub fn with_same_tour(mut self, same_tour: bool) -> Self {
        self.same_tour = same_tour;
        self
    }

    /// Visits every ordered tour pair per application instead of one random
    /// pair.
    pub fn with_all_pairs(mut self, all_pairs: bool) -> Self {
        self.all_pairs = all_pairs;
        self
    }

    /// Name used in logs.
    pub fn name(&self) -> String {
        if self.all_pairs {
            "RELOC_ALL".into()
        } else {
            "RELOC".into()
        }
    }

    fn best_move(
        problem: &CapacitatedProblem,
        solution: &CapacitatedSolution,
        t1: usize,
        t2: usize,
    ) -> Option<RelocateMove> {
        let w = |a: usize, b: usize| problem.weight(a, b);
        let nearest = problem.nearest_neighbours();
        let source = solution.tour(t1);
        let target = solution.tour(t2);
        let same = t1 == t2;

        let mut best: Option<RelocateMove> = None;
        let mut best_delta = -EPSILON;
        for v in source.iter().skip(1) {
            if !same && !problem.can_add(solution.load(t2), &[v]) {
                continue;
            }
            let p = pred(source, v);
            let s = succ(source, v);
            let removal = w(p, v) + w(v, s) - w(p, s);

            for &n in nearest.get(v) {
                if !target.contains(n) || n == v {
                    continue;
                }
                for q in [n, pred(target, n)] {
                    if same && (q == v || q == p) {
                        continue;
                    }
                    let t = succ(target, q);
                    let delta = w(q, v) + w(v, t) - w(q, t) - removal;
                    if delta < best_delta {
                        best_delta = delta;
                        best = Some(RelocateMove {
                            visit: v,
                            after: q,
                            delta,
                        });
                    }
                }
            }
        }
        best
    }
}

impl<O> InterTourOperator<O> for RelocateOperator
where
    O: Objective<CapacitatedProblem, CapacitatedSolution, Fitness = Fitness>,
{
    fn name(&self) -> String {
        RelocateOperator::name(self)
    }

    fn supports_same_tour(&self) -> bool {
        self.same_tour
    }

    fn apply_pair(
        &self,
        problem: &CapacitatedProblem,
        objective: &O,
        solution: &mut CapacitatedSolution,
        t1: usize,
        t2: usize,
    ) -> Result<MoveOutcome<Fitness>> {
        if t1 == t2 && !self.same_tour {
            return Ok(MoveOutcome::unchanged(objective.zero()));
        }
        let Some(mv) = Self::best_move(problem, solution, t1, t2) else {
            return Ok(MoveOutcome::unchanged(objective.zero()));
        };
        commit(problem, objective, solution, (t1, t2), mv.delta, |s| {
            if t1 == t2 {
                return s.tour_mut(t1).0.shift_after(mv.visit, mv.after);
            }
            let ((source, source_load), (target, target_load)) = s.pair_mut(t1, t2);
            source.remove(mv.visit)?;
            target.insert_after(mv.after, mv.visit)?;
            problem.remove_from_load(source_load, mv.visit);
            problem.add_to_load(target_load, mv.visit);
            Ok(())
        })
    }
}

impl<O> Operator<CapacitatedProblem, O, CapacitatedSolution> for RelocateOperator
where
    O: Objective<CapacitatedProblem, CapacitatedSolution, Fitness = Fitness>,
{
    fn name(&self) -> String {
        RelocateOperator::name(self)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::WeightMatrix;
    use crate::local_search::testing::{assert_partition, misplaced};
    use crate::models::Tour;
    use crate::objective::CapacitatedObjective;
    use crate::random::create_rng;

    #[test]
    fn test_moves_misplaced_visit_with_exact_delta() {
        let (problem, mut solution) = misplaced();
        let before = CapacitatedObjective.calculate(&problem, &solution);
        let outcome = RelocateOperator::new()
            .apply_pair(&problem, &CapacitatedObjective, &mut solution, 0, 1)
            .expect("apply");
        let after = CapacitatedObjective.calculate(&problem, &solution);

        assert!(outcome.improved);
        assert!(outcome.delta.weight < 0.0);
        assert!((outcome.delta.weight - (after.weight - before.weight)).abs() < 1e-9);
        assert_eq!(after.customers, before.customers);
        let b = solution.tour(1);
        assert!(b.next(4) == Some(2) || b.prev(4) == Some(2));
        assert_eq!(solution.tour(0).to_vec(), vec![0, 1, 3]);
        assert_partition(&problem, &solution);
    }

    #[test]
    fn test_respects_capacity() {
        let (problem, solution) = misplaced();
        let problem = problem
            .with_visit_weights(vec![1.0; 6])
            .expect("valid")
            .with_max_weight(2.0);
        let mut solution = {
            let mut s = CapacitatedSolution::new();
            for t in solution.tours() {
                s.push(&problem, t.clone());
            }
            s
        };
        let before = solution.clone();
        let outcome = RelocateOperator::new()
            .apply_pair(&problem, &CapacitatedObjective, &mut solution, 0, 1)
            .expect("apply");
        assert!(!outcome.improved);
        assert_eq!(solution, before);
    }

    #[test]
    fn test_loads_follow_moves() {
        let (problem, _) = misplaced();
        let problem = problem.with_visit_weights(vec![1.0; 6]).expect("valid");
        let mut solution = CapacitatedSolution::new();
        solution.push(&problem, Tour::new([0, 1, 2, 3], Some(0)).expect("valid"));
        solution.push(&problem, Tour::new([4, 5], Some(4)).expect("valid"));
        RelocateOperator::new()
            .apply_pair(&problem, &CapacitatedObjective, &mut solution, 0, 1)
            .expect("apply");
        assert_eq!(solution.load(0).weight, 3.0);
        assert_eq!(solution.load(1).weight, 3.0);
    }

    #[test]
    fn test_same_tour_move() {
        let points: Vec<(f64, f64)> = (0..5).map(|i| (i as f64, 0.0)).collect();
        let problem = CapacitatedProblem::new(WeightMatrix::from_points(&points));
        let mut solution = CapacitatedSolution::new();
        solution.push(&problem, Tour::new([0, 2, 1, 3, 4], Some(0)).expect("valid"));
        let before = CapacitatedObjective.calculate(&problem, &solution);
        let outcome = RelocateOperator::new()
            .apply_pair(&problem, &CapacitatedObjective, &mut solution, 0, 0)
            .expect("apply");
        let after = CapacitatedObjective.calculate(&problem, &solution);
        assert!(outcome.improved);
        assert!((outcome.delta.weight - (after.weight - before.weight)).abs() < 1e-9);
        assert_eq!(solution.tour(0).first(), 0);
    }

    #[test]
    fn test_same_tour_disabled() {
        let points: Vec<(f64, f64)> = (0..5).map(|i| (i as f64, 0.0)).collect();
        let problem = CapacitatedProblem::new(WeightMatrix::from_points(&points));
        let mut solution = CapacitatedSolution::new();
        solution.push(&problem, Tour::new([0, 2, 1, 3, 4], Some(0)).expect("valid"));
        let outcome = RelocateOperator::new()
            .with_same_tour(false)
            .apply(&problem, &CapacitatedObjective, &mut solution, &mut create_rng(1))
            .expect("apply");
        assert!(!outcome.improved);
    }

    #[test]
    fn test_all_pairs_operator() {
        let (problem, mut solution) = misplaced();
        let before = CapacitatedObjective.calculate(&problem, &solution);
        let outcome = RelocateOperator::new()
            .with_all_pairs(true)
            .apply(&problem, &CapacitatedObjective, &mut solution, &mut create_rng(1))
            .expect("apply");
        let after = CapacitatedObjective.calculate(&problem, &solution);
        assert!(outcome.improved);
        assert!((outcome.delta.weight - (after.weight - before.weight)).abs() < 1e-9);
        assert_partition(&problem, &solution);
    }

    #[test]
    fn test_name() {
        assert_eq!(RelocateOperator::new().name(), "RELOC");
        assert_eq!(RelocateOperator::new().with_all_pairs(true).name(), "RELOC_ALL");
    }
}
