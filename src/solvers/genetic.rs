//! Generational genetic driver.
//!
//! 1. Generate `population_size` individuals with the inner solver.
//! 2. Each generation: copy the elite, then fill the population with
//!    offspring of tournament-selected parents, optionally mutated.
//! 3. Stop after `max_generations` or `stagnation_limit` generations
//!    without a new best.

use rand::{Rng, RngCore};
use tracing::{debug, info};

use super::{CrossOverOperator, Operator, Solver};
use crate::config::GaConfig;
use crate::error::Result;
use crate::objective::Objective;

/// Genetic algorithm over a generator, a crossover and an optional mutation.
pub struct GeneticSolver<P, O: Objective<P, S>, S> {
    generator: Box<dyn Solver<P, O, S>>,
    crossover: Box<dyn CrossOverOperator<P, O, S>>,
    mutation: Option<Box<dyn Operator<P, O, S>>>,
    config: GaConfig,
}

impl<P, O: Objective<P, S>, S: Clone> GeneticSolver<P, O, S> {
    /// Creates a genetic solver. Fails if `config` is invalid.
    pub fn new(
        generator: Box<dyn Solver<P, O, S>>,
        crossover: Box<dyn CrossOverOperator<P, O, S>>,
        config: GaConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            generator,
            crossover,
            mutation: None,
            config,
        })
    }

    /// Applies `mutation` to offspring with the configured mutation rate.
    pub fn with_mutation(mut self, mutation: Box<dyn Operator<P, O, S>>) -> Self {
        self.mutation = Some(mutation);
        self
    }

    fn sort(objective: &O, population: &mut [(S, O::Fitness)]) {
        population.sort_by(|a, b| objective.compare(a.1, b.1));
    }

    /// Index of the best of `tournament_size` random individuals.
    fn tournament(&self, objective: &O, population: &[(S, O::Fitness)], rng: &mut dyn RngCore) -> usize {
        let mut best = rng.random_range(0..population.len());
        for _ in 1..self.config.tournament_size {
            let candidate = rng.random_range(0..population.len());
            if objective.is_better(population[candidate].1, population[best].1) {
                best = candidate;
            }
        }
        best
    }
}

impl<P, O: Objective<P, S>, S: Clone> Solver<P, O, S> for GeneticSolver<P, O, S> {
    fn name(&self) -> String {
        format!(
            "GA_[{}x{}_{}]",
            self.config.population_size,
            self.generator.name(),
            self.crossover.name()
        )
    }

    fn solve(&self, problem: &P, objective: &O, rng: &mut dyn RngCore) -> Result<(S, O::Fitness)> {
        let config = &self.config;
        info!(
            event = "solve_start",
            solver = %self.name(),
            population = config.population_size,
            generations = config.max_generations,
        );

        let mut population = Vec::with_capacity(config.population_size);
        for _ in 0..config.population_size {
            population.push(self.generator.solve(problem, objective, rng)?);
        }
        Self::sort(objective, &mut population);
        let mut best = population[0].clone();

        let mut stagnation = 0;
        let mut generations = 0;
        for generation in 0..config.max_generations {
            generations = generation + 1;
            let mut next: Vec<(S, O::Fitness)> = population[..config.elite_count].to_vec();

            while next.len() < config.population_size {
                let i = self.tournament(objective, &population, rng);
                let mut j = self.tournament(objective, &population, rng);
                if j == i {
                    j = (i + 1 + rng.random_range(0..population.len() - 1)) % population.len();
                }

                let (mut child, mut fitness) = if rng.random::<f64>() < config.crossover_rate {
                    self.crossover
                        .apply(problem, objective, &population[i].0, &population[j].0, rng)?
                } else {
                    population[i].clone()
                };

                if let Some(mutation) = &self.mutation {
                    if rng.random::<f64>() < config.mutation_rate
                        && mutation.apply(problem, objective, &mut child, rng)?.improved
                    {
                        fitness = objective.calculate(problem, &child);
                    }
                }
                next.push((child, fitness));
            }

            Self::sort(objective, &mut next);
            population = next;

            if objective.is_better(population[0].1, best.1) {
                best = population[0].clone();
                stagnation = 0;
                debug!(event = "improved", generation, fitness = ?best.1);
            } else {
                stagnation += 1;
            }

            if config.stagnation_limit > 0 && stagnation >= config.stagnation_limit {
                debug!(event = "stagnated", generation);
                break;
            }
        }

        info!(event = "solve_end", solver = %self.name(), generations, fitness = ?best.1);
        Ok(best)
    }
}
