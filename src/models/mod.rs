//! Problem and solution models.
//!
//! [`Tour`] is the mutable visit sequence every operator works on.
//! [`TspProblem`] describes a single tour, [`CapacitatedProblem`] a set of
//! capacity-limited tours and [`DirectedTspProblem`] a tour whose visits are
//! entered and left through one of two sides.

mod capacity;
mod directed;
mod location;
mod problem;
mod solution;
mod tour;

pub use capacity::{CapacitatedProblem, CapacityConstraint, TourLoad, DEFAULT_POOL_SIZE};
pub use directed::{DirectedId, DirectedTspProblem, TurnPenalties, TURNS};
pub use location::{Coordinate, LocationError, LocationErrorCode, MatrixInput};
pub use problem::{TspProblem, DEFAULT_NEAREST_NEIGHBOURS};
pub use solution::{CapacitatedSolution, Solved, TourResult};
pub use tour::{Pair, Pairs, Tour, TourIter, NOT_SET};
