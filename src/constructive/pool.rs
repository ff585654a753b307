//! Candidate members for seeded tours.

use crate::distance::NearestNeighbourCache;
use crate::models::CapacitatedProblem;

/// For every potential seed, the served visits closest to it.
///
/// Seeded cheapest insertion grows its initial tour from this list, so the
/// first members of a new tour are always near its seed.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::models::CapacitatedProblem;
///
/// let weights = WeightMatrix::from_points(&[(0.0, 0.0), (1.0, 0.0), (9.0, 0.0), (2.0, 0.0)]);
/// let problem = CapacitatedProblem::new(weights).with_pool_size(2);
/// assert_eq!(problem.seeded_pool().get(0), &[1, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct SeededTourPool {
    candidates: NearestNeighbourCache,
}

impl SeededTourPool {
    /// Builds the pool with `size` candidates per seed.
    pub fn build(problem: &CapacitatedProblem, size: usize) -> Self {
        tracing::debug!(
            event = "seeded_pool_built",
            visits = problem.count(),
            size = size
        );
        Self {
            candidates: NearestNeighbourCache::build(problem.weights(), size, |v| {
                problem.contains(v)
            }),
        }
    }

    /// Candidates for `seed`, closest first.
    pub fn get(&self, seed: usize) -> &[usize] {
        self.candidates.get(seed)
    }

    /// Candidates kept per seed.
    pub fn size(&self) -> usize {
        self.candidates.k()
    }
}
