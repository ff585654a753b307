//! Seed selection for new tours.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::models::CapacitatedProblem;

/// How seeded cheapest insertion picks the first visit of a new tour.
///
/// # Examples
///
/// ```
/// use u_tour::constructive::SeedHeuristic;
/// use u_tour::distance::WeightMatrix;
/// use u_tour::models::CapacitatedProblem;
/// use u_tour::random::create_rng;
///
/// let problem = CapacitatedProblem::new(WeightMatrix::uniform(4, 1.0));
/// let seed = SeedHeuristic::Random.select(&problem, &[1, 3], &mut create_rng(1));
/// assert!(matches!(seed, Some(1) | Some(3)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SeedHeuristic {
    /// Uniformly random unassigned visit.
    Random,
    /// Among `candidates` sampled unassigned visits, the one forming the
    /// tightest group with its `neighbours` closest unassigned visits.
    ///
    /// A group is scored by the mean weight over every ordered pair of its
    /// members, so both the distance to the candidate and the spread among
    /// the neighbours count.
    CloseNeighbours {
        /// Visits sampled per selection.
        candidates: usize,
        /// Neighbours averaged per candidate.
        neighbours: usize,
    },
}

impl Default for SeedHeuristic {
    fn default() -> Self {
        Self::CloseNeighbours {
            candidates: 20,
            neighbours: 5,
        }
    }
}

impl SeedHeuristic {
    /// Picks a seed from `unassigned`, `None` if it is empty.
    pub fn select(
        &self,
        problem: &CapacitatedProblem,
        unassigned: &[usize],
        rng: &mut dyn RngCore,
    ) -> Option<usize> {
        if unassigned.is_empty() {
            return None;
        }
        match *self {
            Self::Random => Some(unassigned[rng.random_range(0..unassigned.len())]),
            Self::CloseNeighbours {
                candidates,
                neighbours,
            } => {
                let mut open = vec![false; problem.weights().size()];
                for &v in unassigned {
                    open[v] = true;
                }
                let pool = problem.seeded_pool();

                let mut best: Option<(usize, f64)> = None;
                for _ in 0..candidates.max(1) {
                    let candidate = unassigned[rng.random_range(0..unassigned.len())];
                    let mut group = vec![candidate];
                    group.extend(
                        pool.get(candidate)
                            .iter()
                            .copied()
                            .filter(|&n| open[n])
                            .take(neighbours),
                    );
                    let score = pairwise_mean(problem, &group);
                    if best.map_or(true, |(_, s)| score < s) {
                        best = Some((candidate, score));
                    }
                }
                best.map(|(seed, _)| seed)
            }
        }
    }
}

/// Mean weight over the ordered pairs of `group`; `f64::MAX` below two
/// members.
fn pairwise_mean(problem: &CapacitatedProblem, group: &[usize]) -> f64 {
    if group.len() < 2 {
        return f64::MAX;
    }
    let mut sum = 0.0;
    for &a in group {
        for &b in group {
            if a != b {
                sum += problem.weight(a, b);
            }
        }
    }
    sum / (group.len() * (group.len() - 1)) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::WeightMatrix;
    use crate::random::create_rng;

    fn clustered() -> CapacitatedProblem {
        // 0..4 packed together, 4 and 5 far apart from everything
        let weights = WeightMatrix::from_points(&[
            (0.0, 0.0),
            (0.1, 0.0),
            (0.0, 0.1),
            (0.1, 0.1),
            (50.0, 0.0),
            (0.0, 90.0),
        ]);
        CapacitatedProblem::new(weights)
    }

    #[test]
    fn test_empty_unassigned() {
        let p = clustered();
        let mut rng = create_rng(1);
        assert_eq!(SeedHeuristic::Random.select(&p, &[], &mut rng), None);
        assert_eq!(SeedHeuristic::default().select(&p, &[], &mut rng), None);
    }

    #[test]
    fn test_close_neighbours_prefers_cluster() {
        let p = clustered();
        let heuristic = SeedHeuristic::CloseNeighbours {
            candidates: 50,
            neighbours: 2,
        };
        let all: Vec<usize> = (0..6).collect();
        for seed in 0..10 {
            let chosen = heuristic
                .select(&p, &all, &mut create_rng(seed))
                .expect("seed");
            assert!(chosen < 4, "picked outlier {chosen}");
        }
    }

    #[test]
    fn test_close_neighbours_prefers_tight_group() {
        // 1 and 2 sit on opposite sides of 0; 3, 4, 5 form an equilateral
        // triangle with slightly longer sides
        let weights = WeightMatrix::from_points(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (-1.0, 0.0),
            (100.0, 0.0),
            (101.1, 0.0),
            (100.55, 0.952_627_944),
        ]);
        let p = CapacitatedProblem::new(weights);
        let heuristic = SeedHeuristic::CloseNeighbours {
            candidates: 200,
            neighbours: 2,
        };
        let all: Vec<usize> = (0..6).collect();
        for seed in 0..5 {
            let chosen = heuristic
                .select(&p, &all, &mut create_rng(seed))
                .expect("seed");
            assert!(chosen >= 3, "picked spread group member {chosen}");
        }
        assert!((pairwise_mean(&p, &[0, 1, 2]) - 4.0 / 3.0).abs() < 1e-9);
        assert_eq!(pairwise_mean(&p, &[4]), f64::MAX);
    }

    #[test]
    fn test_random_is_reproducible() {
        let p = clustered();
        let all: Vec<usize> = (0..6).collect();
        let a = SeedHeuristic::Random.select(&p, &all, &mut create_rng(9));
        let b = SeedHeuristic::Random.select(&p, &all, &mut create_rng(9));
        assert_eq!(a, b);
    }
}
