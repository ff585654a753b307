//! Nearest-neighbour tour construction.
//!
//! Builds a tour greedily: starting from the first visit, always append the
//! closest unvisited visit. Candidates come from the problem's
//! nearest-neighbour cache; when every cached neighbour is already visited
//! the whole remaining set is scanned.
//!
//! # Complexity
//!
//! O(n·k) with a warm cache, O(n²) worst case.

use rand::RngCore;

use crate::error::Result;
use crate::models::{Tour, TspProblem};
use crate::objective::Objective;
use crate::solvers::Solver;

/// Greedy nearest-neighbour construction. Deterministic for a given
/// problem.
///
/// # Examples
///
/// ```
/// use u_tour::constructive::NearestNeighbourSolver;
/// use u_tour::distance::WeightMatrix;
/// use u_tour::models::TspProblem;
/// use u_tour::objective::TourObjective;
/// use u_tour::random::create_rng;
/// use u_tour::solvers::Solver;
///
/// let weights = WeightMatrix::from_points(&[(0.0, 0.0), (3.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
/// let problem = TspProblem::new(weights, 0, None).unwrap();
/// let (tour, fitness) = NearestNeighbourSolver
///     .solve(&problem, &TourObjective, &mut create_rng(0))
///     .unwrap();
/// assert_eq!(tour.to_vec(), vec![0, 2, 3, 1]);
/// assert_eq!(fitness.weight, 3.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighbourSolver;

impl NearestNeighbourSolver {
    /// Builds the greedy tour.
    pub fn build(problem: &TspProblem) -> Result<Tour> {
        let first = problem.first();
        let last = problem.last();
        let size = problem.weights().size();
        let nearest = problem.nearest_neighbours();

        let mut visited = vec![false; size];
        visited[first] = true;
        if let Some(l) = last {
            visited[l] = true;
        }
        let mut remaining = problem.visits().iter().filter(|&&v| !visited[v]).count();

        let mut sequence = vec![first];
        let mut current = first;
        while remaining > 0 {
            let cached = nearest.get(current).iter().copied().find(|&v| !visited[v]);
            let next = match cached {
                Some(v) => Some(v),
                None => {
                    let open: Vec<usize> = problem
                        .visits()
                        .iter()
                        .copied()
                        .filter(|&v| !visited[v])
                        .collect();
                    problem.weights().nearest_neighbor(current, &open)
                }
            };
            let Some(next) = next else {
                break;
            };
            visited[next] = true;
            remaining -= 1;
            sequence.push(next);
            current = next;
        }
        Tour::new(sequence, last)
    }
}

impl<O: Objective<TspProblem, Tour>> Solver<TspProblem, O, Tour> for NearestNeighbourSolver {
    fn name(&self) -> String {
        "NN".into()
    }

    fn solve(
        &self,
        problem: &TspProblem,
        objective: &O,
        _rng: &mut dyn RngCore,
    ) -> Result<(Tour, O::Fitness)> {
        let tour = Self::build(problem)?;
        let fitness = objective.calculate(problem, &tour);
        Ok((tour, fitness))
    }
}
