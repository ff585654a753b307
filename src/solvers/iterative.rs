//! Repeat-and-keep-best drivers.

use rand::RngCore;
use tracing::{debug, info};

use super::{MoveOutcome, Operator, Solver, StopCondition};
use crate::error::{Result, TourError};
use crate::objective::Objective;

/// Runs an inner solver up to `max_iterations` times, polishing each run
/// with the configured operators and keeping the best result.
///
/// # Examples
///
/// ```
/// use u_tour::constructive::RandomSolver;
/// use u_tour::distance::WeightMatrix;
/// use u_tour::local_search::Local1Shift;
/// use u_tour::models::{Tour, TspProblem};
/// use u_tour::objective::{Fitness, TourObjective};
/// use u_tour::random::create_rng;
/// use u_tour::solvers::{IterativeSolver, Solver};
///
/// let points: Vec<(f64, f64)> = (0..6).map(|i| (i as f64, 0.0)).collect();
/// let problem = TspProblem::new(WeightMatrix::from_points(&points), 0, Some(0)).unwrap();
///
/// let solver = IterativeSolver::<TspProblem, TourObjective, Tour>::new(Box::new(RandomSolver), 10)
///     .with_operator(Box::new(Local1Shift))
///     .with_stop(Box::new(
///         |_: usize, _: &TspProblem, _: &TourObjective, _: &Tour, f: Fitness| f.weight <= 10.0,
///     ));
/// assert_eq!(solver.name(), "ITER_[10xRAN_LOCAL_1SHIFT]");
///
/// let (tour, fitness) = solver.solve(&problem, &TourObjective, &mut create_rng(3)).unwrap();
/// assert_eq!(tour.count(), 6);
/// assert!(fitness.weight >= 10.0);
/// ```
pub struct IterativeSolver<P, O: Objective<P, S>, S> {
    solver: Box<dyn Solver<P, O, S>>,
    max_iterations: usize,
    operators: Vec<Box<dyn Operator<P, O, S>>>,
    stop: Option<StopCondition<P, O, S, O::Fitness>>,
}

impl<P, O: Objective<P, S>, S> IterativeSolver<P, O, S> {
    /// Wraps `solver`, running it up to `max_iterations` times.
    pub fn new(solver: Box<dyn Solver<P, O, S>>, max_iterations: usize) -> Self {
        Self {
            solver,
            max_iterations,
            operators: Vec::new(),
            stop: None,
        }
    }

    /// Adds an operator applied to every run's result, in insertion order.
    pub fn with_operator(mut self, operator: Box<dyn Operator<P, O, S>>) -> Self {
        self.operators.push(operator);
        self
    }

    /// Stops early once `stop` returns `true` for the best solution so far.
    pub fn with_stop(mut self, stop: StopCondition<P, O, S, O::Fitness>) -> Self {
        self.stop = Some(stop);
        self
    }
}

impl<P, O: Objective<P, S>, S> Solver<P, O, S> for IterativeSolver<P, O, S> {
    fn name(&self) -> String {
        let mut name = format!("ITER_[{}x{}", self.max_iterations, self.solver.name());
        for op in &self.operators {
            name.push('_');
            name.push_str(&op.name());
        }
        name.push(']');
        name
    }

    fn solve(&self, problem: &P, objective: &O, rng: &mut dyn RngCore) -> Result<(S, O::Fitness)> {
        info!(event = "solve_start", solver = %self.name(), max_iterations = self.max_iterations);

        let mut best: Option<(S, O::Fitness)> = None;
        for i in 0..self.max_iterations {
            let (mut solution, mut fitness) = self.solver.solve(problem, objective, rng)?;
            let mut improved = false;
            for op in &self.operators {
                improved |= op.apply(problem, objective, &mut solution, rng)?.improved;
            }
            if improved {
                fitness = objective.calculate(problem, &solution);
            }

            let replace = match &best {
                Some((_, best_fitness)) => objective.is_better(fitness, *best_fitness),
                None => true,
            };
            if replace {
                debug!(event = "improved", iteration = i, fitness = ?fitness);
                best = Some((solution, fitness));
            }

            if let (Some(stop), Some((solution, fitness))) = (&self.stop, &best) {
                if stop(i, problem, objective, solution, *fitness) {
                    debug!(event = "stopped", iteration = i);
                    break;
                }
            }
        }

        let best = best.ok_or_else(|| {
            TourError::Config("iterative solver needs at least one iteration".into())
        })?;
        info!(event = "solve_end", solver = %self.name(), fitness = ?best.1);
        Ok(best)
    }
}

/// Applies an operator repeatedly, summing the deltas of improving runs.
pub struct IterativeOperator<P, O: Objective<P, S>, S> {
    operator: Box<dyn Operator<P, O, S>>,
    max_iterations: usize,
    stop_on_fail: bool,
}

impl<P, O: Objective<P, S>, S> IterativeOperator<P, O, S> {
    /// Applies `operator` up to `max_iterations` times. With `stop_on_fail`
    /// the loop ends at the first application that does not improve.
    pub fn new(operator: Box<dyn Operator<P, O, S>>, max_iterations: usize, stop_on_fail: bool) -> Self {
        Self {
            operator,
            max_iterations,
            stop_on_fail,
        }
    }
}

impl<P, O: Objective<P, S>, S> Operator<P, O, S> for IterativeOperator<P, O, S> {
    fn name(&self) -> String {
        format!("ITER_[{}x{}]", self.max_iterations, self.operator.name())
    }

    fn apply(
        &self,
        problem: &P,
        objective: &O,
        solution: &mut S,
        rng: &mut dyn RngCore,
    ) -> Result<MoveOutcome<O::Fitness>> {
        let mut outcome = MoveOutcome::unchanged(objective.zero());
        for _ in 0..self.max_iterations {
            let step = self.operator.apply(problem, objective, solution, rng)?;
            if step.improved {
                outcome.improved = true;
                outcome.delta = objective.add(outcome.delta, step.delta);
            } else if self.stop_on_fail {
                break;
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;
    use crate::solvers::testing::{Distance, RandomStart, Step, Target};

    #[test]
    fn test_keeps_best_of_runs() {
        let solver = IterativeSolver::new(Box::new(RandomStart), 50);
        let mut rng = create_rng(1);
        let (x, f) = solver.solve(&Target(0), &Distance, &mut rng).expect("solve");
        assert_eq!(f, x.abs() as f64);
        assert!(f < 20.0);
    }

    #[test]
    fn test_operator_polishes_runs() {
        let polish = IterativeOperator::new(Box::new(Step), 1000, true);
        let solver = IterativeSolver::new(Box::new(RandomStart), 3).with_operator(Box::new(polish));
        let mut rng = create_rng(7);
        let (x, f) = solver.solve(&Target(5), &Distance, &mut rng).expect("solve");
        assert_eq!(x, 5);
        assert_eq!(f, 0.0);
    }

    #[test]
    fn test_stop_condition() {
        let solver = IterativeSolver::new(Box::new(RandomStart), 1000).with_stop(Box::new(
            |i: usize, _: &Target, _: &Distance, _: &i64, _: f64| i >= 2,
        ));
        let mut rng = create_rng(3);
        assert!(solver.solve(&Target(0), &Distance, &mut rng).is_ok());
    }

    #[test]
    fn test_zero_iterations_is_error() {
        let solver = IterativeSolver::new(Box::new(RandomStart), 0);
        let mut rng = create_rng(3);
        assert!(solver.solve(&Target(0), &Distance, &mut rng).is_err());
    }

    #[test]
    fn test_iterative_operator_sums_deltas() {
        let op = IterativeOperator::new(Box::new(Step), 3, true);
        let mut rng = create_rng(0);
        let mut x = 10;
        let outcome = op.apply(&Target(0), &Distance, &mut x, &mut rng).expect("apply");
        assert!(outcome.improved);
        assert_eq!(outcome.delta, -3.0);
        assert_eq!(x, 7);
    }

    #[test]
    fn test_iterative_operator_stops_on_fail() {
        let op = IterativeOperator::new(Box::new(Step), 10, true);
        let mut rng = create_rng(0);
        let mut x = 2;
        let outcome = op.apply(&Target(0), &Distance, &mut x, &mut rng).expect("apply");
        assert_eq!(outcome.delta, -2.0);
        assert_eq!(x, 0);
    }

    #[test]
    fn test_names() {
        let op = IterativeOperator::new(Box::new(Step), 3, true);
        assert_eq!(op.name(), "ITER_[3xSTEP]");
        let solver = IterativeSolver::new(Box::new(RandomStart), 2).with_operator(Box::new(op));
        assert_eq!(solver.name(), "ITER_[2xRAND_ITER_[3xSTEP]]");
    }
}
