//! Travel weights and nearest-neighbour candidate lists.

mod matrix;
mod nearest;

pub use matrix::WeightMatrix;
pub use nearest::NearestNeighbourCache;
