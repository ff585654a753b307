//! Edge assembly crossover (EAX) for closed single tours.
//!
//! # Algorithm
//!
//! 1. `E_a` holds the successor of every visit in parent 1, `E_b` the
//!    predecessor of every visit in parent 2.
//! 2. AB-cycles alternate an `E_a` edge with a reversed `E_b` edge.
//! 3. Each offspring attempt picks AB-cycles, swaps their `E_a` edges for
//!    the `E_b` edges, and merges the resulting sub-tours, smallest first,
//!    by the cheapest 2-edge reconnection.
//! 4. The best complete offspring is kept.
//!
//! # Reference
//!
//! Nagata, Y. & Kobayashi, S. (1997). "Edge assembly crossover: A
//! high-power genetic algorithm for the traveling salesman problem",
//! *Proc. ICGA* 450-457.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::EaxConfig;
use crate::cycles::{AsymmetricAlternatingCycles, AsymmetricCycles, NOT_SET};
use crate::error::{Result, TourError};
use crate::models::{Tour, TspProblem};
use crate::objective::Objective;
use crate::solvers::CrossOverOperator;

/// Nearest neighbours tried per sub-tour visit when merging, independent of
/// the problem's configured neighbour count.
const MERGE_NEIGHBOURS: usize = 10;

/// Share of AB-cycles kept by [`CycleSelection::MultipleRandom`] is
/// `1 - MULTIPLE_RANDOM_DROP`.
const MULTIPLE_RANDOM_DROP: f64 = 0.25;

/// How AB-cycles are chosen for an offspring attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleSelection {
    /// One uniformly chosen cycle per attempt, never reused (EAX-1AB).
    #[default]
    SingleRandom,
    /// Every cycle independently with probability 0.75.
    MultipleRandom,
}

/// Edge assembly crossover.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::ga::EaxOperator;
/// use u_tour::models::{Tour, TspProblem};
/// use u_tour::objective::TourObjective;
/// use u_tour::random::create_rng;
/// use u_tour::solvers::CrossOverOperator;
///
/// let points: Vec<(f64, f64)> = (0..8).map(|i| ((i as f64).cos(), (i as f64).sin())).collect();
/// let problem = TspProblem::new(WeightMatrix::from_points(&points), 0, Some(0)).unwrap();
/// let p1 = Tour::new([0, 1, 2, 3, 4, 5, 6, 7], Some(0)).unwrap();
/// let p2 = Tour::new([0, 2, 1, 3, 5, 4, 6, 7], Some(0)).unwrap();
///
/// let eax = EaxOperator::default();
/// assert_eq!(eax.name(), "EAX_(SR30_NN)");
/// let mut rng = create_rng(42);
/// let (child, _) = eax.apply(&problem, &TourObjective, &p1, &p2, &mut rng).unwrap();
/// assert_eq!(child.count(), 8);
/// ```
#[derive(Debug, Clone)]
pub struct EaxOperator {
    max_offspring: usize,
    selection: CycleSelection,
    nearest_neighbour_merge: bool,
}

impl Default for EaxOperator {
    fn default() -> Self {
        Self::new(30, CycleSelection::SingleRandom, true)
    }
}

impl EaxOperator {
    /// Creates an operator making up to `max_offspring` attempts.
    pub fn new(max_offspring: usize, selection: CycleSelection, nearest_neighbour_merge: bool) -> Self {
        Self {
            max_offspring,
            selection,
            nearest_neighbour_merge,
        }
    }

    /// Creates an operator from configuration.
    pub fn from_config(config: &EaxConfig) -> Self {
        Self::new(
            config.max_offspring,
            config.selection,
            config.nearest_neighbour_merge,
        )
    }

    /// Name such as `EAX_(SR30_NN)`.
    pub fn name(&self) -> String {
        let strategy = match self.selection {
            CycleSelection::SingleRandom => "SR",
            CycleSelection::MultipleRandom => "MR",
        };
        let nn = if self.nearest_neighbour_merge { "_NN" } else { "" };
        format!("EAX_({strategy}{}{nn})", self.max_offspring)
    }

    fn select_cycles(&self, selectable: &mut Vec<usize>, rng: &mut dyn RngCore) -> Vec<usize> {
        match self.selection {
            CycleSelection::MultipleRandom => selectable
                .iter()
                .copied()
                .filter(|_| rng.random::<f64>() > MULTIPLE_RANDOM_DROP)
                .collect(),
            CycleSelection::SingleRandom => {
                if selectable.is_empty() {
                    Vec::new()
                } else {
                    let idx = rng.random_range(0..selectable.len());
                    vec![selectable.remove(idx)]
                }
            }
        }
    }

    /// Reconnects sub-tours until one cycle remains. Returns `false` if a
    /// sub-tour could not be merged.
    ///
    /// Each round joins the smallest sub-tour into another by the cheapest
    /// successor swap, so the bookkeeping per round is proportional to the
    /// smallest sub-tour.
    fn merge_subtours(&self, problem: &TspProblem, a: &mut AsymmetricCycles, members: &[usize]) -> bool {
        let nn = problem.nearest_neighbours_at_least(MERGE_NEIGHBOURS);
        let mut ignore = vec![false; a.len()];
        while a.cycle_count() > 1 {
            let Some(start) = a.smallest_cycle().and_then(|(id, _)| a.head(id)) else {
                return false;
            };
            let next = a.next_array();

            let mut v = start;
            loop {
                ignore[v] = true;
                v = next[v];
                if v == start || v == NOT_SET {
                    break;
                }
            }

            let mut best = f64::MAX;
            let mut selected: Option<(usize, usize)> = None;

            if self.nearest_neighbour_merge {
                let mut from = start;
                loop {
                    let to = next[from];
                    let w_from_to = problem.weight(from, to);
                    for &n in nn.nearest(from, MERGE_NEIGHBOURS) {
                        let n_to = next[n];
                        if n_to == NOT_SET || ignore[n] || ignore[n_to] {
                            continue;
                        }
                        let merge = problem.weight(from, n_to) + problem.weight(n, to)
                            - (w_from_to + problem.weight(n, n_to));
                        if best > merge {
                            best = merge;
                            selected = Some((from, n));
                        }
                    }
                    from = to;
                    if from == start {
                        break;
                    }
                }
            }

            if selected.is_none() {
                let (from, to) = (start, next[start]);
                for &c in members {
                    let c_to = next[c];
                    if c_to == NOT_SET || ignore[c] || ignore[c_to] {
                        continue;
                    }
                    let merge = problem.weight(from, c_to) + problem.weight(c, to)
                        - (problem.weight(from, to) + problem.weight(c, c_to));
                    if best > merge {
                        best = merge;
                        selected = Some((from, c));
                    }
                }
            }

            let mut v = start;
            loop {
                ignore[v] = false;
                v = next[v];
                if v == start || v == NOT_SET {
                    break;
                }
            }

            let Some((from1, from2)) = selected else {
                return false;
            };
            // from1 -> next[from2] and from2 -> next[from1]
            a.swap_successors(from1, from2);
        }
        true
    }

    /// Walks the successor array from the problem's first visit.
    fn materialize(problem: &TspProblem, next: &[usize]) -> Result<Tour> {
        let first = problem.first();
        let mut sequence = vec![first];
        let mut v = next[first];
        while v != NOT_SET && v != first && sequence.len() <= next.len() {
            sequence.push(v);
            v = next[v];
        }
        Tour::new(sequence, problem.last())
    }
}

impl<O: Objective<TspProblem, Tour>> CrossOverOperator<TspProblem, O, Tour> for EaxOperator {
    fn name(&self) -> String {
        EaxOperator::name(self)
    }

    fn apply(
        &self,
        problem: &TspProblem,
        objective: &O,
        parent1: &Tour,
        parent2: &Tour,
        rng: &mut dyn RngCore,
    ) -> Result<(Tour, O::Fitness)> {
        if !problem.is_closed() {
            return Err(TourError::Argument(
                "edge assembly crossover needs a closed problem".into(),
            ));
        }
        if !parent1.is_closed() || !parent2.is_closed() {
            return Err(TourError::Argument(
                "tours and problem have to be both closed".into(),
            ));
        }

        let size = problem.weights().size();
        let e_a = AsymmetricCycles::from_pairs(size, parent1.pairs());
        let mut e_b = vec![NOT_SET; size];
        for edge in parent2.pairs() {
            e_b[edge.to] = edge.from;
        }

        let mut ab = AsymmetricAlternatingCycles::new(size);
        for v in 0..size {
            if let Some(a) = e_a.next(v) {
                let b = e_b[a];
                if b != NOT_SET && b != v {
                    ab.add_edge(v, a, b);
                }
            }
        }
        let mut selectable: Vec<usize> = ab.cycles().keys().copied().collect();
        let members = parent1.to_vec();

        let mut best: Option<(Tour, O::Fitness)> = None;
        let mut attempts = 0;
        while attempts < self.max_offspring && !selectable.is_empty() {
            attempts += 1;
            let starts = self.select_cycles(&mut selectable, rng);

            // Along an AB-cycle c0, c1, .., each c(i+1) takes the parent-A
            // successor of c(i); that rotation is a chain of swaps with c0.
            let mut a = e_a.clone();
            for start in starts {
                let mut current = start;
                while let Some((_, to)) = ab.next(current) {
                    if to == start {
                        break;
                    }
                    a.swap_successors(start, to);
                    current = to;
                }
            }

            if !self.merge_subtours(problem, &mut a, &members) {
                trace!(event = "offspring_failed", attempt = attempts);
                continue;
            }
            let child = Self::materialize(problem, a.next_array())?;
            if child.count() != parent1.count() {
                trace!(event = "offspring_failed", attempt = attempts, count = child.count());
                continue;
            }

            let fitness = objective.calculate(problem, &child);
            let replace = match &best {
                Some((_, best_fitness)) => objective.is_better(fitness, *best_fitness),
                None => true,
            };
            if replace {
                best = Some((child, fitness));
            }
        }

        match best {
            Some(best) => Ok(best),
            None => {
                let parent = Self::materialize(problem, e_a.next_array())?;
                let fitness = objective.calculate(problem, &parent);
                Ok((parent, fitness))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::WeightMatrix;
    use crate::objective::TourObjective;
    use crate::random::create_rng;

    fn circle(n: usize) -> TspProblem {
        let points: Vec<(f64, f64)> = (0..n)
            .map(|i| {
                let a = i as f64 * std::f64::consts::TAU / n as f64;
                (a.cos() * 10.0, a.sin() * 10.0)
            })
            .collect();
        TspProblem::new(WeightMatrix::from_points(&points), 0, Some(0)).expect("valid")
    }

    fn is_permutation(tour: &Tour, n: usize) -> bool {
        let mut v = tour.to_vec();
        v.sort_unstable();
        v == (0..n).collect::<Vec<_>>()
    }

    #[test]
    fn test_identical_parents_keep_fitness() {
        let problem = circle(10);
        let parent = Tour::new([0, 3, 1, 4, 2, 5, 9, 7, 8, 6], Some(0)).expect("valid");
        let o = TourObjective;
        let mut rng = create_rng(1);
        let (child, f) = EaxOperator::default()
            .apply(&problem, &o, &parent, &parent, &mut rng)
            .expect("apply");
        assert_eq!(f, o.calculate(&problem, &parent));
        assert_eq!(child, parent);
    }

    #[test]
    fn test_offspring_is_complete_tour() {
        let problem = circle(12);
        let p1 = Tour::new([0, 5, 2, 7, 1, 9, 3, 11, 4, 8, 6, 10], Some(0)).expect("valid");
        let p2 = Tour::new([0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11], Some(0)).expect("valid");
        for selection in [CycleSelection::SingleRandom, CycleSelection::MultipleRandom] {
            for nn in [true, false] {
                let eax = EaxOperator::new(30, selection, nn);
                let mut rng = create_rng(5);
                let (child, f) = eax
                    .apply(&problem, &TourObjective, &p1, &p2, &mut rng)
                    .expect("apply");
                assert!(is_permutation(&child, 12));
                assert_eq!(child.first(), 0);
                assert!(child.is_closed());
                assert_eq!(f, TourObjective.calculate(&problem, &child));
            }
        }
    }

    #[test]
    fn test_single_ab_cycle_recovers_parent2() {
        // parent 1 is parent 2 with 4 and 5 swapped: one AB-cycle {3, 4, 5}
        let problem = circle(8);
        let p1 = Tour::new([0, 1, 2, 3, 5, 4, 6, 7], Some(0)).expect("valid");
        let p2 = Tour::new([0, 1, 2, 3, 4, 5, 6, 7], Some(0)).expect("valid");
        let mut rng = create_rng(9);
        let (child, f) = EaxOperator::default()
            .apply(&problem, &TourObjective, &p1, &p2, &mut rng)
            .expect("apply");
        assert_eq!(child, p2);
        assert_eq!(f, TourObjective.calculate(&problem, &p2));
    }

    #[test]
    fn test_merge_ignores_configured_neighbour_count() {
        let p1 = Tour::new([0, 5, 2, 7, 1, 9, 3, 11, 4, 8, 6, 10], Some(0)).expect("valid");
        let p2 = Tour::new([0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11], Some(0)).expect("valid");
        let wide = circle(12);
        let narrow = circle(12).with_nearest_neighbours(3);
        for seed in 0..5 {
            let eax = EaxOperator::new(30, CycleSelection::MultipleRandom, true);
            let (a, fa) = eax
                .apply(&wide, &TourObjective, &p1, &p2, &mut create_rng(seed))
                .expect("apply");
            let (b, fb) = eax
                .apply(&narrow, &TourObjective, &p1, &p2, &mut create_rng(seed))
                .expect("apply");
            assert_eq!(a, b);
            assert_eq!(fa, fb);
        }
        assert_eq!(narrow.nearest_neighbours().k(), 3);
    }

    #[test]
    fn test_open_tours_rejected() {
        let problem = TspProblem::new(WeightMatrix::uniform(4, 1.0), 0, None).expect("valid");
        let p = Tour::new([0, 1, 2, 3], None).expect("valid");
        let mut rng = create_rng(0);
        let result = EaxOperator::default().apply(&problem, &TourObjective, &p, &p, &mut rng);
        assert!(matches!(result, Err(TourError::Argument(_))));
    }

    #[test]
    fn test_mismatched_parent_rejected() {
        let problem = circle(4);
        let closed = Tour::new([0, 1, 2, 3], Some(0)).expect("valid");
        let open = Tour::new([0, 1, 2, 3], None).expect("valid");
        let mut rng = create_rng(0);
        let result = EaxOperator::default().apply(&problem, &TourObjective, &closed, &open, &mut rng);
        assert!(matches!(result, Err(TourError::Argument(_))));
    }

    #[test]
    fn test_names() {
        let op = EaxOperator::new(5, CycleSelection::MultipleRandom, false);
        assert_eq!(op.name(), "EAX_(MR5)");
        let as_trait = CrossOverOperator::<TspProblem, TourObjective, Tour>::name(&EaxOperator::default());
        assert_eq!(as_trait, "EAX_(SR30_NN)");
    }

    #[test]
    fn test_subset_problem() {
        // visits 1 and 4 are not part of the problem
        let points: Vec<(f64, f64)> = (0..7).map(|i| (i as f64, (i * i) as f64 % 5.0)).collect();
        let problem = TspProblem::new(WeightMatrix::from_points(&points), 0, Some(0))
            .expect("valid")
            .with_visits([0, 2, 3, 5, 6])
            .expect("valid");
        let p1 = Tour::new([0, 2, 3, 5, 6], Some(0)).expect("valid");
        let p2 = Tour::new([0, 5, 3, 6, 2], Some(0)).expect("valid");
        let mut rng = create_rng(3);
        let (child, _) = EaxOperator::default()
            .apply(&problem, &TourObjective, &p1, &p2, &mut rng)
            .expect("apply");
        let mut visits = child.to_vec();
        visits.sort_unstable();
        assert_eq!(visits, vec![0, 2, 3, 5, 6]);
    }
}
