//! Variable Neighbourhood Search driver.
//!
//! # Algorithm
//!
//! 1. Generate an initial solution and apply local search.
//! 2. Set the level `l = 1`.
//! 3. Until the stop predicate holds:
//!    a. **Shake**: perturb a copy of the incumbent with strength `l`.
//!    b. **Local search**: improve the copy to a local optimum.
//!    c. **Move or not**: if the copy beats the incumbent, keep it and reset
//!    `l = 1`; otherwise `l = l + 1`.
//!
//! # Reference
//!
//! Mladenović, N. & Hansen, P. (1997). "Variable neighborhood search",
//! *Computers & Operations Research* 24(11), 1097-1100.

use rand::RngCore;
use tracing::{debug, info, trace};

use super::{Operator, Perturber, Solver, VnsStopCondition};
use crate::error::Result;
use crate::objective::Objective;

/// Basic VNS over a generator, a perturber and a local search operator.
pub struct VnsSolver<P, O: Objective<P, S>, S> {
    generator: Box<dyn Solver<P, O, S>>,
    perturber: Box<dyn Perturber<P, O, S>>,
    local_search: Box<dyn Operator<P, O, S>>,
    stop: VnsStopCondition<P, O, S, O::Fitness>,
}

impl<P, O: Objective<P, S>, S: Clone> VnsSolver<P, O, S> {
    /// Creates a VNS solver.
    pub fn new(
        generator: Box<dyn Solver<P, O, S>>,
        perturber: Box<dyn Perturber<P, O, S>>,
        local_search: Box<dyn Operator<P, O, S>>,
        stop: VnsStopCondition<P, O, S, O::Fitness>,
    ) -> Self {
        Self {
            generator,
            perturber,
            local_search,
            stop,
        }
    }

    /// Creates a VNS solver that stops once the level exceeds `level_max`
    /// or the incumbent reaches the objective's zero.
    pub fn with_level_max(
        generator: Box<dyn Solver<P, O, S>>,
        perturber: Box<dyn Perturber<P, O, S>>,
        local_search: Box<dyn Operator<P, O, S>>,
        level_max: usize,
    ) -> Self
    where
        P: 'static,
        O: 'static,
        S: 'static,
    {
        Self::new(
            generator,
            perturber,
            local_search,
            Box::new(move |_: usize, level: usize, _: &P, objective: &O, _: &S, fitness: O::Fitness| {
                level > level_max || objective.is_zero(fitness)
            }),
        )
    }
}

impl<P, O: Objective<P, S>, S: Clone> Solver<P, O, S> for VnsSolver<P, O, S> {
    fn name(&self) -> String {
        format!(
            "VNS_[{}_{}_{}]",
            self.generator.name(),
            self.perturber.name(),
            self.local_search.name()
        )
    }

    fn solve(&self, problem: &P, objective: &O, rng: &mut dyn RngCore) -> Result<(S, O::Fitness)> {
        let (mut best, mut best_fitness) = self.generator.solve(problem, objective, rng)?;
        if self
            .local_search
            .apply(problem, objective, &mut best, rng)?
            .improved
        {
            best_fitness = objective.calculate(problem, &best);
        }

        let mut level = 1;
        let mut iteration = 0;
        while !(self.stop)(iteration, level, problem, objective, &best, best_fitness) {
            let mut candidate = best.clone();
            self.perturber
                .perturb(problem, objective, &mut candidate, level, rng)?;
            self.local_search
                .apply(problem, objective, &mut candidate, rng)?;
            let fitness = objective.calculate(problem, &candidate);

            if objective.is_better(fitness, best_fitness) {
                debug!(event = "improved", iteration, level, fitness = ?fitness);
                best = candidate;
                best_fitness = fitness;
                level = 1;
            } else {
                trace!(event = "plateau", iteration, level);
                level += 1;
            }
            iteration += 1;
        }

        info!(event = "vns_end", iterations = iteration, fitness = ?best_fitness);
        Ok((best, best_fitness))
    }
}
