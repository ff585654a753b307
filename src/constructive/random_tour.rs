//! Random tour construction.

use rand::RngCore;

use crate::error::Result;
use crate::models::{Tour, TspProblem};
use crate::objective::Objective;
use crate::random::shuffle;
use crate::solvers::Solver;

/// Builds a uniformly random tour over the problem's visits.
///
/// The first visit and a fixed last visit keep their places; everything in
/// between is shuffled. Used as the restart point of VNS construction.
///
/// # Examples
///
/// ```
/// use u_tour::constructive::RandomSolver;
/// use u_tour::distance::WeightMatrix;
/// use u_tour::models::TspProblem;
/// use u_tour::objective::TourObjective;
/// use u_tour::random::create_rng;
/// use u_tour::solvers::Solver;
///
/// let problem = TspProblem::new(WeightMatrix::uniform(5, 1.0), 0, Some(4)).unwrap();
/// let (tour, fitness) = RandomSolver
///     .solve(&problem, &TourObjective, &mut create_rng(3))
///     .unwrap();
/// assert_eq!(tour.first(), 0);
/// assert_eq!(tour.tail(), 4);
/// assert_eq!(fitness.customers, 5);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSolver;

impl RandomSolver {
    /// Draws a random tour without evaluating it.
    pub fn build(problem: &TspProblem, rng: &mut dyn RngCore) -> Result<Tour> {
        let first = problem.first();
        let last = problem.last();
        let mut middle: Vec<usize> = problem
            .visits()
            .iter()
            .copied()
            .filter(|&v| v != first && Some(v) != last)
            .collect();
        shuffle(&mut middle, rng);

        let mut sequence = Vec::with_capacity(middle.len() + 2);
        sequence.push(first);
        sequence.extend(middle);
        Tour::new(sequence, last)
    }
}

impl<O: Objective<TspProblem, Tour>> Solver<TspProblem, O, Tour> for RandomSolver {
    fn name(&self) -> String {
        "RAN".into()
    }

    fn solve(
        &self,
        problem: &TspProblem,
        objective: &O,
        rng: &mut dyn RngCore,
    ) -> Result<(Tour, O::Fitness)> {
        let tour = Self::build(problem, rng)?;
        let fitness = objective.calculate(problem, &tour);
        Ok((tour, fitness))
    }
}
