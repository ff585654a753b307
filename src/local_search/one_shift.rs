//! Single-visit shift (Or-opt with segment length one).
//!
//! # Algorithm
//!
//! For every visit, computes the gain of removing it and the cost of
//! reinserting it after every other visit, and moves it to the best
//! position when that lowers the tour weight. Passes repeat until one
//! makes no move. Edge weights are read in travel direction, so the
//! operator is exact on asymmetric matrices.
//!
//! # Complexity
//!
//! O(n²) per pass.

use rand::RngCore;

use super::EPSILON;
use crate::error::Result;
use crate::models::{Tour, TspProblem};
use crate::objective::{Fitness, Objective};
use crate::solvers::{MoveOutcome, Operator};

/// Moves single visits to their best position until no move improves.
///
/// The first visit and a fixed last visit never move.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::local_search::Local1Shift;
/// use u_tour::models::{Tour, TspProblem};
/// use u_tour::objective::TourObjective;
/// use u_tour::random::create_rng;
/// use u_tour::solvers::Operator;
///
/// let weights = WeightMatrix::from_points(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]);
/// let problem = TspProblem::new(weights, 0, None).unwrap();
/// let mut tour = Tour::new([0, 2, 1, 3], None).unwrap();
/// let outcome = Local1Shift
///     .apply(&problem, &TourObjective, &mut tour, &mut create_rng(0))
///     .unwrap();
/// assert!(outcome.improved);
/// assert_eq!(tour.to_vec(), vec![0, 1, 2, 3]);
/// assert_eq!(outcome.delta.weight, -2.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Local1Shift;

impl Local1Shift {
    /// Shifts visits of `tour` until a local optimum; returns the weight
    /// change.
    pub fn improve(problem: &TspProblem, tour: &mut Tour) -> Result<f64> {
        let fixed_end = tour.last().filter(|&l| l != tour.first());
        let mut total = 0.0;

        loop {
            let mut moved = false;
            let visits = tour.to_vec();
            for &v in &visits {
                if v == tour.first() || Some(v) == fixed_end {
                    continue;
                }
                if let Some((after, delta)) = best_shift(problem, tour, v, fixed_end) {
                    tour.shift_after(v, after)?;
                    total += delta;
                    moved = true;
                }
            }
            if !moved {
                break;
            }
        }
        Ok(total)
    }
}

/// Best position to move `v` to, with its weight change.
fn best_shift(
    problem: &TspProblem,
    tour: &Tour,
    v: usize,
    fixed_end: Option<usize>,
) -> Option<(usize, f64)> {
    let w = |a: usize, b: usize| problem.weight(a, b);
    let p = tour.prev(v)?;
    let s = tour.next(v);
    let removal = w(p, v) + s.map_or(0.0, |s| w(v, s) - w(p, s));

    let mut best: Option<(usize, f64)> = None;
    let mut best_delta = -EPSILON;
    for q in tour {
        if q == v || q == p || Some(q) == fixed_end {
            continue;
        }
        let t = tour.next(q);
        let insertion = w(q, v) + t.map_or(0.0, |t| w(v, t) - w(q, t));
        let delta = insertion - removal;
        if delta < best_delta {
            best_delta = delta;
            best = Some((q, delta));
        }
    }
    best
}

impl<O> Operator<TspProblem, O, Tour> for Local1Shift
where
    O: Objective<TspProblem, Tour, Fitness = Fitness>,
{
    fn name(&self) -> String {
        "LOCAL_1SHIFT".into()
    }

    fn apply(
        &self,
        problem: &TspProblem,
        objective: &O,
        tour: &mut Tour,
        _rng: &mut dyn RngCore,
    ) -> Result<MoveOutcome<Fitness>> {
        if objective.is_non_continuous() {
            let before = objective.calculate(problem, tour);
            let mut candidate = tour.clone();
            Self::improve(problem, &mut candidate)?;
            let change = objective.subtract(objective.calculate(problem, &candidate), before);
            if !objective.is_better(change, objective.zero()) {
                return Ok(MoveOutcome::unchanged(objective.zero()));
            }
            *tour = candidate;
            return Ok(MoveOutcome::improved(change));
        }

        let delta = Self::improve(problem, tour)?;
        if delta < -EPSILON {
            Ok(MoveOutcome::improved(Fitness::from_weight(delta)))
        } else {
            Ok(MoveOutcome::unchanged(objective.zero()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::WeightMatrix;
    use crate::objective::TourObjective;
    use crate::random::create_rng;

    fn circle(n: usize) -> WeightMatrix {
        let points: Vec<(f64, f64)> = (0..n)
            .map(|i| {
                let a = i as f64 / n as f64 * std::f64::consts::TAU;
                (a.cos() * 10.0, a.sin() * 10.0)
            })
            .collect();
        WeightMatrix::from_points(&points)
    }

    #[test]
    fn test_delta_matches_recalculation() {
        let p = TspProblem::new(circle(9), 0, Some(0)).expect("valid");
        let mut tour = Tour::new([0, 4, 2, 7, 1, 8, 3, 6, 5], Some(0)).expect("valid");
        let before = TourObjective::weight(&p, &tour);
        let outcome = Local1Shift
            .apply(&p, &TourObjective, &mut tour, &mut create_rng(0))
            .expect("apply");
        let after = TourObjective::weight(&p, &tour);
        assert!(outcome.improved);
        assert!((outcome.delta.weight - (after - before)).abs() < 1e-9);
        assert_eq!(tour.count(), 9);
        assert_eq!(tour.first(), 0);
    }

    #[test]
    fn test_optimal_is_unchanged() {
        let p = TspProblem::new(circle(6), 0, Some(0)).expect("valid");
        let mut tour = Tour::new(0..6, Some(0)).expect("valid");
        let outcome = Local1Shift
            .apply(&p, &TourObjective, &mut tour, &mut create_rng(0))
            .expect("apply");
        assert!(!outcome.improved);
        assert_eq!(tour.to_vec(), (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn test_fixed_last_never_moves() {
        let points: Vec<(f64, f64)> = (0..5).map(|i| (i as f64, 0.0)).collect();
        let p = TspProblem::new(WeightMatrix::from_points(&points), 0, Some(2)).expect("valid");
        let mut tour = Tour::new([0, 4, 3, 1, 2], Some(2)).expect("valid");
        Local1Shift::improve(&p, &mut tour).expect("improve");
        assert_eq!(tour.first(), 0);
        assert_eq!(tour.tail(), 2);
        assert_eq!(tour.count(), 5);
    }

    #[test]
    fn test_asymmetric() {
        // cheap only in the direction 0 -> 1 -> 2 -> 0
        let mut weights = WeightMatrix::uniform(3, 10.0);
        weights.set(0, 1, 1.0);
        weights.set(1, 2, 1.0);
        weights.set(2, 0, 1.0);
        let p = TspProblem::new(weights, 0, Some(0)).expect("valid");
        let mut tour = Tour::new([0, 2, 1], Some(0)).expect("valid");
        let delta = Local1Shift::improve(&p, &mut tour).expect("improve");
        assert_eq!(tour.to_vec(), vec![0, 1, 2]);
        assert!((delta + 27.0).abs() < 1e-9);
    }
}
