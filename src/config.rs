//! Solver configuration.
//!
//! Every section has defaults, so a TOML file only needs the values it
//! changes:
//!
//! ```
//! use u_tour::config::SolverConfig;
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     seed = 7
//!
//!     [ga]
//!     population_size = 40
//!
//!     [eax]
//!     selection = "multiple_random"
//! "#).unwrap();
//!
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.ga.population_size, 40);
//! assert_eq!(config.vns.level_max, 1000);
//! config.validate().unwrap();
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constructive::{Overlap, SeedHeuristic};
use crate::error::{Result, TourError};
use crate::ga::CycleSelection;

/// Top-level configuration for the default solver compositions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Seed of the random generator.
    pub seed: u64,
    /// Neighbours kept per visit by the nearest-neighbour cache.
    pub nearest_neighbours: usize,
    /// Candidates kept per seed by the seeded-tour pool.
    pub pool_size: usize,
    /// VNS construction settings.
    pub vns: VnsConfig,
    /// Genetic driver settings.
    pub ga: GaConfig,
    /// Edge assembly crossover settings.
    pub eax: EaxConfig,
    /// Seeded cheapest insertion settings.
    pub seeded: SeededConfig,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            nearest_neighbours: 10,
            pool_size: 100,
            vns: VnsConfig::default(),
            ga: GaConfig::default(),
            eax: EaxConfig::default(),
            seeded: SeededConfig::default(),
        }
    }
}

impl SolverConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the nearest-neighbour count.
    pub fn with_nearest_neighbours(mut self, k: usize) -> Self {
        self.nearest_neighbours = k;
        self
    }

    /// Replaces the VNS settings.
    pub fn with_vns(mut self, vns: VnsConfig) -> Self {
        self.vns = vns;
        self
    }

    /// Replaces the genetic settings.
    pub fn with_ga(mut self, ga: GaConfig) -> Self {
        self.ga = ga;
        self
    }

    /// Replaces the crossover settings.
    pub fn with_eax(mut self, eax: EaxConfig) -> Self {
        self.eax = eax;
        self
    }

    /// Replaces the seeded insertion settings.
    pub fn with_seeded(mut self, seeded: SeededConfig) -> Self {
        self.seeded = seeded;
        self
    }

    /// Checks that all settings are usable.
    pub fn validate(&self) -> Result<()> {
        if self.nearest_neighbours == 0 {
            return Err(TourError::Config("nearest_neighbours must be positive".into()));
        }
        if self.pool_size == 0 {
            return Err(TourError::Config("pool_size must be positive".into()));
        }
        self.vns.validate()?;
        self.ga.validate()?;
        self.eax.validate()?;
        self.seeded.validate()
    }
}

/// VNS construction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VnsConfig {
    /// Independent VNS runs; the best one is kept.
    pub max_iterations: usize,
    /// The VNS stops once the perturbation level exceeds this.
    pub level_max: usize,
}

impl Default for VnsConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            level_max: 1000,
        }
    }
}

impl VnsConfig {
    /// Sets the number of VNS runs.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the maximum perturbation level.
    pub fn with_level_max(mut self, level_max: usize) -> Self {
        self.level_max = level_max;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(TourError::Config("vns.max_iterations must be positive".into()));
        }
        Ok(())
    }
}

/// Genetic driver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Individuals per generation.
    pub population_size: usize,
    /// Maximum number of generations.
    pub max_generations: usize,
    /// Best individuals copied unchanged into the next generation.
    pub elite_count: usize,
    /// Individuals drawn per tournament.
    pub tournament_size: usize,
    /// Probability of recombining instead of cloning a parent.
    pub crossover_rate: f64,
    /// Probability of applying the mutation operator to an offspring.
    pub mutation_rate: f64,
    /// Generations without improvement before stopping (0 disables).
    pub stagnation_limit: usize,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            max_generations: 50,
            elite_count: 2,
            tournament_size: 3,
            crossover_rate: 1.0,
            mutation_rate: 0.1,
            stagnation_limit: 10,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the generation limit.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the elite count.
    pub fn with_elite_count(mut self, n: usize) -> Self {
        self.elite_count = n;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the stagnation limit.
    pub fn with_stagnation_limit(mut self, n: usize) -> Self {
        self.stagnation_limit = n;
        self
    }

    /// Checks that the settings are usable.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(TourError::Config("ga.population_size must be at least 2".into()));
        }
        if self.elite_count >= self.population_size {
            return Err(TourError::Config(format!(
                "ga.elite_count ({}) must be below population_size ({})",
                self.elite_count, self.population_size
            )));
        }
        if self.tournament_size == 0 {
            return Err(TourError::Config("ga.tournament_size must be positive".into()));
        }
        for (name, rate) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(TourError::Config(format!(
                    "ga.{name} must be in [0, 1], got {rate}"
                )));
            }
        }
        Ok(())
    }
}

/// Edge assembly crossover settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EaxConfig {
    /// Offspring attempts per crossover.
    pub max_offspring: usize,
    /// How AB-cycles are picked for each attempt.
    pub selection: CycleSelection,
    /// Restrict sub-tour merges to nearest neighbours first.
    pub nearest_neighbour_merge: bool,
}

impl Default for EaxConfig {
    fn default() -> Self {
        Self {
            max_offspring: 30,
            selection: CycleSelection::SingleRandom,
            nearest_neighbour_merge: true,
        }
    }
}

impl EaxConfig {
    fn validate(&self) -> Result<()> {
        if self.max_offspring == 0 {
            return Err(TourError::Config("eax.max_offspring must be positive".into()));
        }
        Ok(())
    }
}

/// Seeded cheapest insertion and capacitated solve settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeededConfig {
    /// How each new tour picks its seed.
    pub seed_heuristic: SeedHeuristic,
    /// Which visits a growing tour may not claim.
    pub overlap: Overlap,
    /// Share of the unassigned visits the seed's initial tour may take.
    pub initial_fraction: f64,
    /// Relative growth of a tour between inter-tour improvement bursts.
    pub improvement_fraction: f64,
    /// Insertion runs; the best is kept.
    pub runs: usize,
    /// Longest chain exchanged when polishing each run.
    pub polish_chain: usize,
    /// Longest chain exchanged when polishing the best run.
    pub final_chain: usize,
}

impl Default for SeededConfig {
    fn default() -> Self {
        Self {
            seed_heuristic: SeedHeuristic::default(),
            overlap: Overlap::default(),
            initial_fraction: 0.03,
            improvement_fraction: 0.25,
            runs: 20,
            polish_chain: 10,
            final_chain: 20,
        }
    }
}

impl SeededConfig {
    /// Sets the seed heuristic.
    pub fn with_seed_heuristic(mut self, heuristic: SeedHeuristic) -> Self {
        self.seed_heuristic = heuristic;
        self
    }

    /// Sets the overlap strategy.
    pub fn with_overlap(mut self, overlap: Overlap) -> Self {
        self.overlap = overlap;
        self
    }

    /// Sets the number of insertion runs.
    pub fn with_runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    fn validate(&self) -> Result<()> {
        for (name, fraction) in [
            ("initial_fraction", self.initial_fraction),
            ("improvement_fraction", self.improvement_fraction),
        ] {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(TourError::Config(format!(
                    "seeded.{name} must be in (0, 1], got {fraction}"
                )));
            }
        }
        if self.runs == 0 {
            return Err(TourError::Config("seeded.runs must be positive".into()));
        }
        if self.polish_chain == 0 || self.final_chain == 0 {
            return Err(TourError::Config("seeded chain lengths must be positive".into()));
        }
        Ok(())
    }
}
