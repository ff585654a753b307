//! Objective for capacitated multi-tour solutions.

use std::cmp::Ordering;

use super::{Fitness, Objective};
use crate::models::{CapacitatedProblem, CapacitatedSolution, Tour};

/// Served visits and the summed weight of all (closed) tours.
///
/// Visits left unassigned lower `customers`, so any solution serving more
/// visits beats a cheaper one serving fewer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapacitatedObjective;

impl CapacitatedObjective {
    /// Weight of a single tour, closing edge included.
    pub fn tour_weight(problem: &CapacitatedProblem, tour: &Tour) -> f64 {
        tour.pairs().map(|p| problem.weight(p.from, p.to)).sum()
    }

    /// Number of visits of `problem` missing from `fitness`.
    pub fn unassigned(problem: &CapacitatedProblem, fitness: Fitness) -> usize {
        problem.count().saturating_sub(fitness.customers.max(0) as usize)
    }
}

impl Objective<CapacitatedProblem, CapacitatedSolution> for CapacitatedObjective {
    type Fitness = Fitness;

    fn name(&self) -> &str {
        "CVRP"
    }

    fn zero(&self) -> Fitness {
        Fitness::ZERO
    }

    fn infinite(&self) -> Fitness {
        Fitness::INFINITE
    }

    fn calculate(&self, problem: &CapacitatedProblem, solution: &CapacitatedSolution) -> Fitness {
        let weight = solution
            .tours()
            .iter()
            .map(|t| Self::tour_weight(problem, t))
            .sum();
        Fitness::new(solution.served(problem) as i32, weight)
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

    #[test]
    fn test_calculate() {
        let p = CapacitatedProblem::new(WeightMatrix::uniform(5, 1.0));
        let mut s = CapacitatedSolution::new();
        s.push(&p, Tour::new([0, 1, 2], Some(0)).expect("valid"));
        s.push(&p, Tour::new([3], Some(3)).expect("valid"));
        let f = CapacitatedObjective.calculate(&p, &s);
        assert_eq!(f, Fitness::new(4, 3.0));
        assert_eq!(CapacitatedObjective::unassigned(&p, f), 1);
    }

    #[test]
    fn test_more_served_beats_cheaper() {
        let p = CapacitatedProblem::new(WeightMatrix::uniform(3, 1.0));
        let mut full = CapacitatedSolution::new();
        full.push(&p, Tour::new([0, 1, 2], Some(0)).expect("valid"));
        let mut partial = CapacitatedSolution::new();
        partial.push(&p, Tour::new([0], Some(0)).expect("valid"));
        let o = CapacitatedObjective;
        assert!(o.is_better(o.calculate(&p, &full), o.calculate(&p, &partial)));
    }
}
