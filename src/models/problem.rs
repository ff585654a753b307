//! Single-tour problem over a weight matrix.

use std::sync::OnceLock;

use crate::distance::{NearestNeighbourCache, WeightMatrix};
use crate::error::{Result, TourError};

/// Default number of neighbours kept per visit.
pub const DEFAULT_NEAREST_NEIGHBOURS: usize = 10;

/// A travelling-salesman instance: one tour over a set of eligible visits.
///
/// The tour starts at `first`. `last == Some(first)` asks for a closed tour,
/// `Some(other)` fixes the end of an open tour and `None` leaves the end
/// free. The nearest-neighbour cache is built on first use and frozen.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::models::TspProblem;
///
/// let weights = WeightMatrix::from_rows(vec![
///     vec![0.0, 1.0, 2.0],
///     vec![1.0, 0.0, 1.0],
///     vec![2.0, 1.0, 0.0],
/// ]).unwrap();
/// let problem = TspProblem::new(weights, 0, Some(0)).unwrap();
/// assert!(problem.is_closed());
/// assert_eq!(problem.count(), 3);
/// assert_eq!(problem.nearest_neighbours().get(0), &[1, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct TspProblem {
    weights: WeightMatrix,
    first: usize,
    last: Option<usize>,
    visits: Vec<usize>,
    eligible: Vec<bool>,
    nearest_k: usize,
    nearest: OnceLock<NearestNeighbourCache>,
    wide_nearest: OnceLock<NearestNeighbourCache>,
}

impl TspProblem {
    /// Creates a problem over every index of `weights`.
    pub fn new(weights: WeightMatrix, first: usize, last: Option<usize>) -> Result<Self> {
        let size = weights.size();
        for (name, index) in [("first", Some(first)), ("last", last)] {
            if let Some(i) = index {
                if i >= size {
                    return Err(TourError::Argument(format!(
                        "{name} visit {i} is outside the {size}x{size} matrix"
                    )));
                }
            }
        }
        Ok(Self {
            weights,
            first,
            last,
            visits: (0..size).collect(),
            eligible: vec![true; size],
            nearest_k: DEFAULT_NEAREST_NEIGHBOURS,
            nearest: OnceLock::new(),
            wide_nearest: OnceLock::new(),
        })
    }

    /// Restricts the problem to a subset of the matrix indices.
    ///
    /// The subset must contain `first` and, if set, `last`.
    pub fn with_visits<I: IntoIterator<Item = usize>>(mut self, visits: I) -> Result<Self> {
        let size = self.weights.size();
        let mut eligible = vec![false; size];
        for v in visits {
            if v >= size {
                return Err(TourError::Argument(format!(
                    "visit {v} is outside the {size}x{size} matrix"
                )));
            }
            eligible[v] = true;
        }
        if !eligible[self.first] {
            return Err(TourError::Argument(format!(
                "first visit {} is not an eligible visit",
                self.first
            )));
        }
        if let Some(last) = self.last {
            if !eligible[last] {
                return Err(TourError::Argument(format!(
                    "last visit {last} is not an eligible visit"
                )));
            }
        }
        self.visits = (0..size).filter(|&v| eligible[v]).collect();
        self.eligible = eligible;
        self.nearest = OnceLock::new();
        self.wide_nearest = OnceLock::new();
        Ok(self)
    }

    /// Sets how many neighbours the nearest-neighbour cache keeps.
    pub fn with_nearest_neighbours(mut self, k: usize) -> Self {
        self.nearest_k = k;
        self.nearest = OnceLock::new();
        self.wide_nearest = OnceLock::new();
        self
    }

    /// The travel-weight matrix.
    pub fn weights(&self) -> &WeightMatrix {
        &self.weights
    }

    /// Travel weight from `from` to `to`.
    #[inline]
    pub fn weight(&self, from: usize, to: usize) -> f64 {
        self.weights.get(from, to)
    }

    /// The fixed start.
    pub fn first(&self) -> usize {
        self.first
    }

    /// The fixed end, if any.
    pub fn last(&self) -> Option<usize> {
        self.last
    }

    /// Returns `true` if tours for this problem return to `first`.
    pub fn is_closed(&self) -> bool {
        self.last == Some(self.first)
    }

    /// Eligible visits in ascending order.
    pub fn visits(&self) -> &[usize] {
        &self.visits
    }

    /// Number of eligible visits.
    pub fn count(&self) -> usize {
        self.visits.len()
    }

    /// Returns `true` if `visit` must be part of a solution.
    pub fn contains(&self, visit: usize) -> bool {
        self.eligible.get(visit).copied().unwrap_or(false)
    }

    /// Nearest eligible neighbours per visit, built once on first access.
    pub fn nearest_neighbours(&self) -> &NearestNeighbourCache {
        self.nearest.get_or_init(|| {
            tracing::debug!(
                event = "nearest_neighbours_built",
                visits = self.visits.len(),
                k = self.nearest_k
            );
            NearestNeighbourCache::build(&self.weights, self.nearest_k, |v| self.contains(v))
        })
    }

    /// A nearest-neighbour cache keeping at least `k` neighbours per visit.
    ///
    /// Returns the regular cache when it is wide enough; otherwise a second
    /// cache is built once, sized by the first `k` requested.
    pub fn nearest_neighbours_at_least(&self, k: usize) -> &NearestNeighbourCache {
        if self.nearest_k >= k {
            return self.nearest_neighbours();
        }
        self.wide_nearest.get_or_init(|| {
            tracing::debug!(
                event = "nearest_neighbours_built",
                visits = self.visits.len(),
                k
            );
            NearestNeighbourCache::build(&self.weights, k, |v| self.contains(v))
        })
    }
}
