//! Travel-weight objective for single tours.

use std::cmp::Ordering;

use super::{Fitness, Objective};
use crate::models::{Tour, TspProblem};

/// Sum of edge weights along the tour, closing edge included for closed
/// tours. `customers` is the number of visits in the tour.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::models::{Tour, TspProblem};
/// use u_tour::objective::{Objective, TourObjective};
///
/// let weights = WeightMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
/// let problem = TspProblem::new(weights, 0, Some(0)).unwrap();
/// let tour = Tour::new([0, 1], Some(0)).unwrap();
/// let fitness = TourObjective.calculate(&problem, &tour);
/// assert_eq!(fitness.customers, 2);
/// assert_eq!(fitness.weight, 2.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TourObjective;

impl TourObjective {
    /// Total weight of `tour` under `problem`'s matrix.
    pub fn weight(problem: &TspProblem, tour: &Tour) -> f64 {
        tour.pairs().map(|p| problem.weight(p.from, p.to)).sum()
    }
}

impl Objective<TspProblem, Tour> for TourObjective {
    type Fitness = Fitness;

    fn name(&self) -> &str {
        "TSP"
    }

    fn zero(&self) -> Fitness {
        Fitness::ZERO
    }

    fn infinite(&self) -> Fitness {
        Fitness::INFINITE
    }

    fn calculate(&self, problem: &TspProblem, solution: &Tour) -> Fitness {
        Fitness::new(solution.count() as i32, Self::weight(problem, solution))
    }

    fn add(&self, a: Fitness, b: Fitness) -> Fitness {
        a + b
    }

    fn subtract(&self, a: Fitness, b: Fitness) -> Fitness {
        a - b
    }

    fn compare(&self, a: Fitness, b: Fitness) -> Ordering {
        a.compare(&b)
    }

    fn is_zero(&self, fitness: Fitness) -> bool {
        fitness.weight == 0.0 && fitness.customers == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::WeightMatrix;

    fn problem(last: Option<usize>) -> TspProblem {
        let weights = WeightMatrix::from_rows(vec![
            vec![0.0, 1.0, 4.0],
            vec![2.0, 0.0, 1.0],
            vec![3.0, 5.0, 0.0],
        ])
        .expect("valid");
        TspProblem::new(weights, 0, last).expect("valid")
    }

    #[test]
    fn test_closed_includes_return() {
        let p = problem(Some(0));
        let t = Tour::new([0, 1, 2], Some(0)).expect("valid");
        assert_eq!(TourObjective.calculate(&p, &t), Fitness::new(3, 5.0));
    }

    #[test]
    fn test_open_excludes_return() {
        let p = problem(None);
        let t = Tour::new([0, 1, 2], None).expect("valid");
        assert_eq!(TourObjective.calculate(&p, &t), Fitness::new(3, 2.0));
    }

    #[test]
    fn test_singleton() {
        let p = problem(Some(0));
        let t = Tour::singleton(0, Some(0));
        assert_eq!(TourObjective.calculate(&p, &t), Fitness::new(1, 0.0));
    }

    #[test]
    fn test_is_zero_needs_no_customers() {
        let o = TourObjective;
        assert!(o.is_zero(Fitness::ZERO));
        assert!(o.is_zero(o.zero()));
        assert!(!o.is_zero(Fitness::new(1, 0.0)));
        assert!(!o.is_zero(Fitness::new(0, 1.0)));
    }

    #[test]
    fn test_is_better() {
        let o = TourObjective;
        assert!(o.is_better(Fitness::new(3, 1.0), Fitness::new(3, 2.0)));
        assert!(!o.is_non_continuous());
        assert_eq!(o.name(), "TSP");
    }
}
