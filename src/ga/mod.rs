//! Genetic recombination for single tours.
//!
//! - [`EaxOperator`] — edge assembly crossover over closed tours
//! - [`CycleSelection`] — AB-cycle selection strategy
//!
//! The population loop itself is [`GeneticSolver`](crate::solvers::GeneticSolver).

mod eax;

pub use eax::{CycleSelection, EaxOperator};
