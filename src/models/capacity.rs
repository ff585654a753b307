//! Capacitated multi-tour problem.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::{Coordinate, Tour, DEFAULT_NEAREST_NEIGHBOURS};
use crate::constructive::SeededTourPool;
use crate::distance::{NearestNeighbourCache, WeightMatrix};
use crate::error::{Result, TourError};

/// Default number of candidates kept per seed in the seeded-tour pool.
pub const DEFAULT_POOL_SIZE: usize = 100;

const LOAD_EPSILON: f64 = 1e-9;

/// A named per-tour limit on a summed per-visit quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityConstraint {
    /// Metric name (for example `"weight"` or `"volume"`).
    pub metric: String,
    /// Maximum summed cost per tour.
    pub max: f64,
    /// Cost per visit, indexed by visit.
    pub costs: Vec<f64>,
}

impl CapacityConstraint {
    /// Creates a new constraint.
    pub fn new(metric: impl Into<String>, max: f64, costs: Vec<f64>) -> Self {
        Self {
            metric: metric.into(),
            max,
            costs,
        }
    }
}

/// Running totals of one tour against the problem's capacity limits.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TourLoad {
    /// Summed visit weight.
    pub weight: f64,
    /// Summed cost per capacity constraint, in declaration order.
    pub quantities: Vec<f64>,
}

/// A capacitated problem: visits are split over several closed tours whose
/// loads must stay within `max_weight` and every [`CapacityConstraint`].
///
/// Without a depot each tour starts at its own seed visit; with a depot every
/// tour starts and ends there.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::models::CapacitatedProblem;
///
/// let problem = CapacitatedProblem::new(WeightMatrix::uniform(5, 1.0))
///     .with_visit_weights(vec![1.0; 5]).unwrap()
///     .with_max_weight(2.0);
///
/// let mut load = problem.empty_load();
/// problem.add_to_load(&mut load, 0);
/// assert!(problem.can_add(&load, &[1]));
/// problem.add_to_load(&mut load, 1);
/// assert!(!problem.can_add(&load, &[2]));
/// ```
#[derive(Debug, Clone)]
pub struct CapacitatedProblem {
    weights: WeightMatrix,
    visit_weights: Option<Vec<f64>>,
    max_weight: f64,
    constraints: Vec<CapacityConstraint>,
    visits: Vec<usize>,
    eligible: Vec<bool>,
    depot: Option<usize>,
    locations: Option<Vec<Coordinate>>,
    nearest_k: usize,
    pool_size: usize,
    nearest: OnceLock<NearestNeighbourCache>,
    pool: OnceLock<SeededTourPool>,
}

impl CapacitatedProblem {
    /// Creates an unconstrained problem over every matrix index.
    pub fn new(weights: WeightMatrix) -> Self {
        let size = weights.size();
        Self {
            weights,
            visit_weights: None,
            max_weight: f64::INFINITY,
            constraints: Vec::new(),
            visits: (0..size).collect(),
            eligible: vec![true; size],
            depot: None,
            locations: None,
            nearest_k: DEFAULT_NEAREST_NEIGHBOURS,
            pool_size: DEFAULT_POOL_SIZE,
            nearest: OnceLock::new(),
            pool: OnceLock::new(),
        }
    }

    fn check_len(&self, what: &str, len: usize) -> Result<()> {
        if len != self.weights.size() {
            return Err(TourError::Argument(format!(
                "{what} has {len} entries, expected {}",
                self.weights.size()
            )));
        }
        Ok(())
    }

    fn reset_caches(&mut self) {
        self.nearest = OnceLock::new();
        self.pool = OnceLock::new();
    }

    /// Sets the per-visit weights summed against `max_weight`.
    pub fn with_visit_weights(mut self, visit_weights: Vec<f64>) -> Result<Self> {
        self.check_len("visit weights", visit_weights.len())?;
        self.visit_weights = Some(visit_weights);
        self.reset_caches();
        Ok(self)
    }

    /// Sets the maximum summed visit weight per tour.
    pub fn with_max_weight(mut self, max_weight: f64) -> Self {
        self.max_weight = max_weight;
        self.reset_caches();
        self
    }

    /// Adds a capacity constraint.
    pub fn with_constraint(mut self, constraint: CapacityConstraint) -> Result<Self> {
        self.check_len(&format!("costs of '{}'", constraint.metric), constraint.costs.len())?;
        self.constraints.push(constraint);
        self.reset_caches();
        Ok(self)
    }

    /// Restricts the problem to a subset of the matrix indices.
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
        if let Some(depot) = self.depot {
            eligible[depot] = false;
        }
        self.visits = (0..size).filter(|&v| eligible[v]).collect();
        self.eligible = eligible;
        self.reset_caches();
        Ok(self)
    }

    /// Sets a depot every tour starts and ends at. The depot is not a visit.
    pub fn with_depot(mut self, depot: usize) -> Result<Self> {
        if depot >= self.weights.size() {
            return Err(TourError::Argument(format!(
                "depot {depot} is outside the matrix"
            )));
        }
        self.depot = Some(depot);
        self.eligible[depot] = false;
        self.visits.retain(|&v| v != depot);
        self.reset_caches();
        Ok(self)
    }

    /// Attaches a coordinate to every matrix index.
    pub fn with_locations(mut self, locations: Vec<Coordinate>) -> Result<Self> {
        self.check_len("locations", locations.len())?;
        self.locations = Some(locations);
        Ok(self)
    }

    /// Sets how many neighbours the nearest-neighbour cache keeps.
    pub fn with_nearest_neighbours(mut self, k: usize) -> Self {
        self.nearest_k = k;
        self.reset_caches();
        self
    }

    /// Sets how many candidates the seeded-tour pool keeps per seed.
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self.pool = OnceLock::new();
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

    /// Weight of a single visit, `0` when no visit weights were given.
    pub fn visit_weight(&self, visit: usize) -> f64 {
        self.visit_weights
            .as_ref()
            .and_then(|w| w.get(visit).copied())
            .unwrap_or(0.0)
    }

    /// Maximum summed visit weight per tour.
    pub fn max_weight(&self) -> f64 {
        self.max_weight
    }

    /// Declared capacity constraints.
    pub fn constraints(&self) -> &[CapacityConstraint] {
        &self.constraints
    }

    /// Visits to be served, ascending.
    pub fn visits(&self) -> &[usize] {
        &self.visits
    }

    /// Number of visits to be served.
    pub fn count(&self) -> usize {
        self.visits.len()
    }

    /// Returns `true` if `visit` must be served.
    pub fn contains(&self, visit: usize) -> bool {
        self.eligible.get(visit).copied().unwrap_or(false)
    }

    /// The depot, if any.
    pub fn depot(&self) -> Option<usize> {
        self.depot
    }

    /// Coordinate of `visit`, when locations were given.
    pub fn location(&self, visit: usize) -> Option<Coordinate> {
        self.locations.as_ref().and_then(|l| l.get(visit).copied())
    }

    /// Nearest served neighbours per visit, built once on first access.
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

    /// Candidate tour members per seed, built once on first access.
    pub fn seeded_pool(&self) -> &SeededTourPool {
        self.pool
            .get_or_init(|| SeededTourPool::build(self, self.pool_size))
    }

    /// A load with nothing assigned.
    pub fn empty_load(&self) -> TourLoad {
        TourLoad {
            weight: 0.0,
            quantities: vec![0.0; self.constraints.len()],
        }
    }

    /// Adds `visit` to `load`. The depot never adds load.
    pub fn add_to_load(&self, load: &mut TourLoad, visit: usize) {
        if !self.contains(visit) {
            return;
        }
        load.weight += self.visit_weight(visit);
        for (q, c) in load.quantities.iter_mut().zip(&self.constraints) {
            *q += c.costs[visit];
        }
    }

    /// Removes `visit` from `load`.
    pub fn remove_from_load(&self, load: &mut TourLoad, visit: usize) {
        if !self.contains(visit) {
            return;
        }
        load.weight -= self.visit_weight(visit);
        for (q, c) in load.quantities.iter_mut().zip(&self.constraints) {
            *q -= c.costs[visit];
        }
    }

    /// Load of an existing tour.
    pub fn load_of(&self, tour: &Tour) -> TourLoad {
        let mut load = self.empty_load();
        for v in tour {
            self.add_to_load(&mut load, v);
        }
        load
    }

    /// Returns `true` if `load` respects every limit.
    pub fn fits(&self, load: &TourLoad) -> bool {
        load.weight <= self.max_weight + LOAD_EPSILON
            && load
                .quantities
                .iter()
                .zip(&self.constraints)
                .all(|(q, c)| *q <= c.max + LOAD_EPSILON)
    }

    /// Returns `true` if `load` plus `visits` still fits.
    pub fn can_add(&self, load: &TourLoad, visits: &[usize]) -> bool {
        self.can_swap(load, &[], visits)
    }

    /// Returns `true` if `load` with `removed` taken out and `added` put in
    /// still fits.
    pub fn can_swap(&self, load: &TourLoad, removed: &[usize], added: &[usize]) -> bool {
        let mut next = load.clone();
        for &v in removed {
            self.remove_from_load(&mut next, v);
        }
        for &v in added {
            self.add_to_load(&mut next, v);
        }
        self.fits(&next)
    }
}
