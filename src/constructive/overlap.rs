//! Territory overlap between tours.

use serde::{Deserialize, Serialize};

use crate::models::{CapacitatedProblem, CapacitatedSolution, Coordinate, Tour};

/// Decides whether two tours share territory.
///
/// Seeded cheapest insertion only runs inter-tour operators between
/// overlapping tours, and never grows a tour into another tour's territory.
/// Problems without visit locations always overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overlap {
    /// Every pair of tours overlaps and every insertion is allowed.
    #[default]
    Always,
    /// Tours overlap when the bounding boxes of their locations intersect.
    BoundingBox,
}

#[derive(Debug, Clone, Copy)]
struct BoundingBox {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

impl BoundingBox {
    fn of(problem: &CapacitatedProblem, tour: &Tour) -> Option<Self> {
        let mut bbox: Option<Self> = None;
        for v in tour {
            let c = problem.location(v)?;
            bbox = Some(match bbox {
                None => Self {
                    min_lat: c.latitude,
                    max_lat: c.latitude,
                    min_lon: c.longitude,
                    max_lon: c.longitude,
                },
                Some(b) => Self {
                    min_lat: b.min_lat.min(c.latitude),
                    max_lat: b.max_lat.max(c.latitude),
                    min_lon: b.min_lon.min(c.longitude),
                    max_lon: b.max_lon.max(c.longitude),
                },
            });
        }
        bbox
    }

    fn contains(&self, c: Coordinate) -> bool {
        c.latitude >= self.min_lat
            && c.latitude <= self.max_lat
            && c.longitude >= self.min_lon
            && c.longitude <= self.max_lon
    }

    fn intersects(&self, other: &Self) -> bool {
        self.min_lat <= other.max_lat
            && other.min_lat <= self.max_lat
            && self.min_lon <= other.max_lon
            && other.min_lon <= self.max_lon
    }
}

impl Overlap {
    /// Returns `true` if tours `a` and `b` share territory.
    pub fn overlaps(&self, problem: &CapacitatedProblem, a: &Tour, b: &Tour) -> bool {
        match self {
            Self::Always => true,
            Self::BoundingBox => match (BoundingBox::of(problem, a), BoundingBox::of(problem, b)) {
                (Some(x), Some(y)) => x.intersects(&y),
                _ => true,
            },
        }
    }

    /// Returns `true` if `visit` may join tour `tour` of `solution`, i.e.
    /// it does not lie inside the territory of any other tour.
    pub fn allows(
        &self,
        problem: &CapacitatedProblem,
        solution: &CapacitatedSolution,
        tour: usize,
        visit: usize,
    ) -> bool {
        match self {
            Self::Always => true,
            Self::BoundingBox => {
                let Some(location) = problem.location(visit) else {
                    return true;
                };
                solution
                    .tours()
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| i != tour)
                    .filter_map(|(_, t)| BoundingBox::of(problem, t))
                    .all(|b| !b.contains(location))
            }
        }
    }
}
