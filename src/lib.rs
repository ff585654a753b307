//! # u-tour
//!
//! Tour optimization library: single tours over symmetric or asymmetric
//! weight matrices, directed tours with turn penalties, and capacitated
//! multi-tour problems.
//!
//! ## Modules
//!
//! - [`models`] — Tours, problems, capacity loads, solutions
//! - [`distance`] — Weight matrix and nearest-neighbour cache
//! - [`objective`] — Objectives and the lexicographic [`Fitness`](objective::Fitness)
//! - [`constructive`] — Random, nearest-neighbour and seeded cheapest insertion
//! - [`local_search`] — Single-tour shifts, 3-opt, relocate and exchange moves
//! - [`cycles`] — Alternating-cycle decomposition for asymmetric tours
//! - [`ga`] — Edge assembly crossover
//! - [`solvers`] — Solver, operator and perturber traits with the iterative,
//!   VNS and genetic drivers
//! - [`solve`] — Default compositions for each problem kind
//! - [`config`] — Serde/TOML solver configuration
//! - [`random`] — Seeded generator construction
//! - [`error`] — Error type

pub mod config;
pub mod constructive;
pub mod cycles;
pub mod distance;
pub mod error;
pub mod ga;
pub mod local_search;
pub mod models;
pub mod objective;
pub mod random;
pub mod solve;
pub mod solvers;

pub use error::{Result, TourError};
