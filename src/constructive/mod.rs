//! Construction heuristics.
//!
//! - [`RandomSolver`] — uniformly random tour, the VNS restart point
//! - [`NearestNeighbourSolver`] — greedy nearest-neighbour tour, O(n·k)
//! - [`SeededCheapestInsertion`] — capacitated tours grown from seeds by
//!   cheapest insertion, polished by inter-tour operators
//!
//! Seeded insertion is steered by a [`SeedHeuristic`], an [`Overlap`]
//! strategy and the problem's [`SeededTourPool`].

mod nearest_neighbor;
mod overlap;
mod pool;
mod random_tour;
mod seed;
mod seeded;

pub use nearest_neighbor::NearestNeighbourSolver;
pub use overlap::Overlap;
pub use pool::SeededTourPool;
pub use random_tour::RandomSolver;
pub use seed::SeedHeuristic;
pub use seeded::SeededCheapestInsertion;
