//! Solution types for capacitated problems and the solved-tour output.

use serde::{Deserialize, Serialize};

use super::{CapacitatedProblem, Tour, TourLoad};
use crate::objective::Fitness;

/// A set of closed tours with their running loads.
///
/// Loads are kept in step with the tours by every operator; a visit
/// appears in at most one tour.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::models::{CapacitatedProblem, CapacitatedSolution, Tour};
///
/// let problem = CapacitatedProblem::new(WeightMatrix::uniform(4, 1.0));
/// let mut solution = CapacitatedSolution::new();
/// solution.push(&problem, Tour::new([0, 1], Some(0)).unwrap());
/// solution.push(&problem, Tour::new([2, 3], Some(2)).unwrap());
/// assert_eq!(solution.len(), 2);
/// assert_eq!(solution.tour_of(3), Some(1));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapacitatedSolution {
    tours: Vec<Tour>,
    loads: Vec<TourLoad>,
}

impl CapacitatedSolution {
    /// Creates a solution without tours.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tour, computing its load.
    pub fn push(&mut self, problem: &CapacitatedProblem, tour: Tour) {
        self.loads.push(problem.load_of(&tour));
        self.tours.push(tour);
    }

    /// Number of tours.
    pub fn len(&self) -> usize {
        self.tours.len()
    }

    /// Returns `true` if there are no tours.
    pub fn is_empty(&self) -> bool {
        self.tours.is_empty()
    }

    /// All tours.
    pub fn tours(&self) -> &[Tour] {
        &self.tours
    }

    /// The tour at `index`.
    pub fn tour(&self, index: usize) -> &Tour {
        &self.tours[index]
    }

    /// The load of the tour at `index`.
    pub fn load(&self, index: usize) -> &TourLoad {
        &self.loads[index]
    }

    /// Mutable access to a tour and its load together.
    pub(crate) fn tour_mut(&mut self, index: usize) -> (&mut Tour, &mut TourLoad) {
        (&mut self.tours[index], &mut self.loads[index])
    }

    /// Mutable access to two different tours and their loads.
    pub(crate) fn pair_mut(
        &mut self,
        a: usize,
        b: usize,
    ) -> ((&mut Tour, &mut TourLoad), (&mut Tour, &mut TourLoad)) {
        debug_assert_ne!(a, b);
        let (tours_lo, tours_hi) = self.tours.split_at_mut(a.max(b));
        let (loads_lo, loads_hi) = self.loads.split_at_mut(a.max(b));
        let low = (&mut tours_lo[a.min(b)], &mut loads_lo[a.min(b)]);
        let high = (&mut tours_hi[0], &mut loads_hi[0]);
        if a < b {
            (low, high)
        } else {
            (high, low)
        }
    }

    /// Index of the tour serving `visit`, if any.
    pub fn tour_of(&self, visit: usize) -> Option<usize> {
        self.tours.iter().position(|t| t.contains(visit))
    }

    /// Number of served visits (the depot is not counted).
    pub fn served(&self, problem: &CapacitatedProblem) -> usize {
        self.tours
            .iter()
            .flat_map(|t| t.iter())
            .filter(|&v| problem.contains(v))
            .count()
    }

    /// Visits of `problem` that are not in any tour.
    pub fn unassigned(&self, problem: &CapacitatedProblem) -> Vec<usize> {
        problem
            .visits()
            .iter()
            .copied()
            .filter(|&v| self.tour_of(v).is_none())
            .collect()
    }
}

/// A solution together with its fitness.
#[derive(Debug, Clone, PartialEq)]
pub struct Solved<S, F> {
    /// The solution.
    pub solution: S,
    /// Its fitness under the objective it was solved for.
    pub fitness: F,
}

impl<S, F> Solved<S, F> {
    /// Pairs a solution with its fitness.
    pub fn new(solution: S, fitness: F) -> Self {
        Self { solution, fitness }
    }
}

/// The solved visit order handed to route-geometry consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourResult {
    /// Visit indices in tour order.
    pub visits: Vec<usize>,
    /// Total weight of the tour.
    pub weight: f64,
    /// Number of visits served.
    pub customers: i32,
}

impl From<&Solved<Tour, Fitness>> for TourResult {
    fn from(solved: &Solved<Tour, Fitness>) -> Self {
        Self {
            visits: solved.solution.to_vec(),
            weight: solved.fitness.weight,
            customers: solved.fitness.customers,
        }
    }
}
