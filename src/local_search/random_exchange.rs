//! Random visit exchange, the shake of VNS construction.

use rand::{Rng, RngCore};

use crate::error::Result;
use crate::models::{Tour, TspProblem};
use crate::objective::Objective;
use crate::solvers::{MoveOutcome, Perturber};

/// Swaps `level` random pairs of visits (at most one swap per movable
/// visit). The first visit and a fixed last visit stay in place.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::local_search::RandomExchange;
/// use u_tour::models::{Tour, TspProblem};
/// use u_tour::objective::TourObjective;
/// use u_tour::random::create_rng;
/// use u_tour::solvers::Perturber;
///
/// let problem = TspProblem::new(WeightMatrix::uniform(6, 1.0), 0, Some(0)).unwrap();
/// let mut tour = Tour::new(0..6, Some(0)).unwrap();
/// RandomExchange
///     .perturb(&problem, &TourObjective, &mut tour, 2, &mut create_rng(4))
///     .unwrap();
/// assert_eq!(tour.first(), 0);
/// assert_eq!(tour.count(), 6);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomExchange;

impl<O: Objective<TspProblem, Tour>> Perturber<TspProblem, O, Tour> for RandomExchange {
    fn name(&self) -> String {
        "RANDOM_EX".into()
    }

    fn perturb(
        &self,
        problem: &TspProblem,
        objective: &O,
        tour: &mut Tour,
        level: usize,
        rng: &mut dyn RngCore,
    ) -> Result<MoveOutcome<O::Fitness>> {
        let mut sequence = tour.to_vec();
        let fixed_end = tour.last().filter(|&l| l != tour.first()).is_some();
        let end = if fixed_end {
            sequence.len() - 1
        } else {
            sequence.len()
        };
        // positions 1..end may move
        if end < 3 {
            return Ok(MoveOutcome::unchanged(objective.zero()));
        }

        let before = objective.calculate(problem, tour);
        for _ in 0..level.clamp(1, end - 1) {
            let a = rng.random_range(1..end);
            let mut b = rng.random_range(1..end - 1);
            if b >= a {
                b += 1;
            }
            sequence.swap(a, b);
        }
        *tour = Tour::new(sequence, tour.last())?;

        let after = objective.calculate(problem, tour);
        Ok(MoveOutcome {
            improved: objective.is_better(after, before),
            delta: objective.subtract(after, before),
        })
    }
}
