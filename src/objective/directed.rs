//! Objective for directed tours with turn penalties.

use std::cmp::Ordering;

use super::{Fitness, Objective};
use crate::models::{DirectedId, DirectedTspProblem, Tour};

/// Scores tours of packed directed ids.
///
/// Each element is decoded in the order arrival, departure, id, turn. The
/// weight is the travel weight from the previous departure to the current
/// arrival plus the penalty of the current turn, for every element, plus
/// the edge from the last departure back to the first arrival when the
/// problem is closed.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::models::{DirectedId, DirectedTspProblem, Tour};
/// use u_tour::objective::{DirectedTourObjective, Objective};
///
/// let problem = DirectedTspProblem::new(WeightMatrix::uniform(4, 1.0), [0.0, 2.0, 2.0, 0.0], 0, Some(0)).unwrap();
/// let tour = Tour::new([DirectedId::pack(0, 0), DirectedId::pack(1, 3)], Some(DirectedId::pack(0, 0))).unwrap();
/// let fitness = DirectedTourObjective.calculate(&problem, &tour);
/// assert_eq!(fitness.customers, 2);
/// assert_eq!(fitness.weight, 2.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectedTourObjective;

impl Objective<DirectedTspProblem, Tour> for DirectedTourObjective {
    type Fitness = Fitness;

    fn name(&self) -> &str {
        "STSP"
    }

    fn zero(&self) -> Fitness {
        Fitness::ZERO
    }

    fn infinite(&self) -> Fitness {
        Fitness::INFINITE
    }

    fn calculate(&self, problem: &DirectedTspProblem, solution: &Tour) -> Fitness {
        let weights = problem.weights();
        let penalties = problem.turn_penalties();

        let mut weight = 0.0;
        let mut previous_departure = None;
        let mut first_arrival = None;
        for directed in solution {
            let DirectedId {
                arrival,
                departure,
                id: _,
                turn,
            } = DirectedId::unpack(directed);

            match previous_departure {
                Some(from) => weight += weights.get(from, arrival),
                None => first_arrival = Some(arrival),
            }
            weight += penalties[turn];
            previous_departure = Some(departure);
        }

        if problem.is_closed() {
            if let (Some(from), Some(to)) = (previous_departure, first_arrival) {
                weight += weights.get(from, to);
            }
        }

        Fitness::new(solution.count() as i32, weight)
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

    fn problem(last: Option<usize>) -> DirectedTspProblem {
        // 2 visits: sides 0/1 and 2/3
        let mut wm = WeightMatrix::uniform(4, 10.0);
        wm.set(1, 2, 1.0);
        wm.set(3, 0, 2.0);
        DirectedTspProblem::new(wm, [0.0, 0.5, 0.25, 1.0], 0, last).expect("valid")
    }

    #[test]
    fn test_closed_with_penalties() {
        let p = problem(Some(0));
        // 0 arrives at 0 departs at 1 (turn 1), 1 arrives at 2 departs at 3 (turn 1)
        let first = DirectedId::pack(0, 1);
        let t = Tour::new([first, DirectedId::pack(1, 1)], Some(first)).expect("valid");
        let f = DirectedTourObjective.calculate(&p, &t);
        assert_eq!(f.customers, 2);
        assert_eq!(f.weight, 1.0 + 2.0 + 0.5 + 0.5);
    }

    #[test]
    fn test_open_skips_closing_edge() {
        let p = problem(None);
        let t = Tour::new([DirectedId::pack(0, 1), DirectedId::pack(1, 1)], None).expect("valid");
        let f = DirectedTourObjective.calculate(&p, &t);
        assert_eq!(f.weight, 1.0 + 0.5 + 0.5);
    }

    #[test]
    fn test_agrees_with_best_turns() {
        let p = problem(Some(0));
        let directed = p.best_turns(&[0, 1]);
        let first = directed[0];
        let t = Tour::new(directed, Some(first)).expect("valid");
        let f = DirectedTourObjective.calculate(&p, &t);
        assert_eq!(f.weight, 4.0);
    }

    #[test]
    fn test_zero_requires_no_customers() {
        assert!(DirectedTourObjective.is_zero(Fitness::ZERO));
        assert!(!DirectedTourObjective.is_zero(Fitness::new(1, 0.0)));
    }
}
