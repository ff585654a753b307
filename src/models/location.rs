//! Matrix-calculation boundary: coordinates, per-location errors and the
//! finished weight matrix handed to the optimizer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::TspProblem;
use crate::distance::WeightMatrix;
use crate::error::{Result, TourError};

/// A geographic position attached to a visit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Why a location could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationErrorCode {
    /// The cause was not reported.
    Unknown,
    /// The location could not be matched to the network.
    NotResolved,
    /// The location was matched but cannot be reached from the others.
    NotRoutable,
}

/// Error record for one input location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationError {
    /// Error category.
    pub code: LocationErrorCode,
    /// Human readable description.
    pub message: String,
}

impl LocationError {
    /// Creates a new location error.
    pub fn new(code: LocationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// A finished weight matrix plus the locations that could not be resolved.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::models::{LocationError, LocationErrorCode, MatrixInput};
///
/// let input = MatrixInput::new(WeightMatrix::uniform(3, 1.0))
///     .with_error(1, LocationError::new(LocationErrorCode::NotResolved, "off-network"));
/// assert_eq!(input.resolved_visits(), vec![0, 2]);
///
/// let problem = input.into_problem(0, Some(0)).unwrap();
/// assert_eq!(problem.visits(), &[0, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct MatrixInput {
    weights: WeightMatrix,
    errors: BTreeMap<usize, LocationError>,
}

impl MatrixInput {
    /// Wraps a matrix without errors.
    pub fn new(weights: WeightMatrix) -> Self {
        Self {
            weights,
            errors: BTreeMap::new(),
        }
    }

    /// Records an error for the location at `index`.
    pub fn with_error(mut self, index: usize, error: LocationError) -> Self {
        self.errors.insert(index, error);
        self
    }

    /// The weight matrix.
    pub fn weights(&self) -> &WeightMatrix {
        &self.weights
    }

    /// Errors by location index.
    pub fn errors(&self) -> &BTreeMap<usize, LocationError> {
        &self.errors
    }

    /// Location indices without an error, ascending.
    pub fn resolved_visits(&self) -> Vec<usize> {
        (0..self.weights.size())
            .filter(|i| !self.errors.contains_key(i))
            .collect()
    }

    fn check_resolved(&self, role: &str, index: usize) -> Result<()> {
        match self.errors.get(&index) {
            Some(error) => Err(TourError::Argument(format!(
                "{role} location {index} could not be resolved ({:?}): {}",
                error.code, error.message
            ))),
            None => Ok(()),
        }
    }

    /// Builds a [`TspProblem`] over the resolved locations.
    ///
    /// Fails when `first` or `last` is one of the unresolved locations.
    pub fn into_problem(self, first: usize, last: Option<usize>) -> Result<TspProblem> {
        self.check_resolved("first", first)?;
        if let Some(last) = last {
            self.check_resolved("last", last)?;
        }
        let visits = self.resolved_visits();
        if !self.errors.is_empty() {
            tracing::warn!(
                event = "locations_unresolved",
                count = self.errors.len(),
                "unresolved locations are left out of the tour"
            );
        }
        TspProblem::new(self.weights, first, last)?.with_visits(visits)
    }
}
