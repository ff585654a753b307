//! 3-opt hill climbing.
//!
//! # Algorithm
//!
//! Cuts the sequence into A = `seq[..=i]`, B = `seq[i+1..=j]`,
//! C = `seq[j+1..=k]` and D = the rest (or the return to the start of a
//! closed tour) and evaluates the seven non-identity reconnections of B and
//! C, including the 2-opt moves as special cases. The first improving
//! reconnection found is applied and the search restarts.
//!
//! Reversed segments are priced from prefix sums of the backward edge
//! weights, so every move is evaluated in O(1) and exactly, also on
//! asymmetric matrices.
//!
//! # Complexity
//!
//! O(n³) per pass.
//!
//! # Reference
//!
//! Lin, S. (1965). "Computer Solutions of the Traveling Salesman Problem",
//! *Bell System Technical Journal* 44(10), 2245-2269.

use rand::RngCore;

use super::EPSILON;
use crate::constructive::RandomSolver;
use crate::distance::WeightMatrix;
use crate::error::Result;
use crate::models::{Tour, TspProblem};
use crate::objective::Objective;
use crate::solvers::{MoveOutcome, Operator, Solver};

/// Travel weight along `sequence`, including the return to its start when
/// `closed`.
pub fn sequence_weight(sequence: &[usize], closed: bool, weights: &WeightMatrix) -> f64 {
    let mut total: f64 = sequence.windows(2).map(|w| weights.get(w[0], w[1])).sum();
    if closed && sequence.len() > 1 {
        total += weights.get(sequence[sequence.len() - 1], sequence[0]);
    }
    total
}

/// Applies 3-opt to `sequence` until no reconnection improves it.
///
/// `sequence[0]` never moves; with `fixed_end` the final element stays
/// last too. Returns the improved sequence and its weight.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::local_search::{sequence_weight, three_opt_improve};
///
/// let wm = WeightMatrix::from_points(&[(0.0, 0.0), (2.0, 0.0), (3.0, 1.0), (1.0, 1.0)]);
/// let (improved, weight) = three_opt_improve(&[0, 2, 1, 3], true, false, &wm);
/// assert!(weight < sequence_weight(&[0, 2, 1, 3], true, &wm));
/// assert_eq!(improved[0], 0);
/// ```
pub fn three_opt_improve(
    sequence: &[usize],
    closed: bool,
    fixed_end: bool,
    weights: &WeightMatrix,
) -> (Vec<usize>, f64) {
    let mut current = sequence.to_vec();
    let n = current.len();
    let k_end = if fixed_end { n.saturating_sub(1) } else { n };
    if k_end < 3 {
        let weight = sequence_weight(&current, closed, weights);
        return (current, weight);
    }

    let mut improved = true;
    while improved {
        improved = false;
        let prefix = Prefix::new(&current, weights);

        'outer: for i in 0..k_end - 2 {
            for j in (i + 1)..k_end - 1 {
                for k in (j + 1)..k_end {
                    if let Some(next) = try_move(&current, closed, weights, &prefix, i, j, k) {
                        current = next;
                        improved = true;
                        break 'outer;
                    }
                }
            }
        }
    }

    let weight = sequence_weight(&current, closed, weights);
    (current, weight)
}

/// Prefix sums of edge weights in both travel directions.
struct Prefix {
    forward: Vec<f64>,
    backward: Vec<f64>,
}

impl Prefix {
    fn new(sequence: &[usize], weights: &WeightMatrix) -> Self {
        let mut forward = vec![0.0; sequence.len()];
        let mut backward = vec![0.0; sequence.len()];
        for p in 1..sequence.len() {
            forward[p] = forward[p - 1] + weights.get(sequence[p - 1], sequence[p]);
            backward[p] = backward[p - 1] + weights.get(sequence[p], sequence[p - 1]);
        }
        Self { forward, backward }
    }

    /// Weight of `seq[l..=r]` walked forwards and backwards.
    fn segment(&self, l: usize, r: usize) -> (f64, f64) {
        (
            self.forward[r] - self.forward[l],
            self.backward[r] - self.backward[l],
        )
    }
}

/// Tries the seven reconnections for cuts after `i`, `j` and `k`.
fn try_move(
    sequence: &[usize],
    closed: bool,
    weights: &WeightMatrix,
    prefix: &Prefix,
    i: usize,
    j: usize,
    k: usize,
) -> Option<Vec<usize>> {
    let w = |a: usize, b: usize| weights.get(a, b);
    let a = sequence[i];
    let (b0, b1) = (sequence[i + 1], sequence[j]);
    let (c0, c1) = (sequence[j + 1], sequence[k]);
    let d = if k + 1 < sequence.len() {
        Some(sequence[k + 1])
    } else if closed {
        Some(sequence[0])
    } else {
        None
    };
    let to_d = |x: usize| d.map_or(0.0, |d| w(x, d));

    let (bf, br) = prefix.segment(i + 1, j);
    let (cf, cr) = prefix.segment(j + 1, k);
    let old = w(a, b0) + bf + w(b1, c0) + cf + to_d(c1);

    let costs = [
        // 1: A B C' D
        w(a, b0) + bf + w(b1, c1) + cr + to_d(c0),
        // 2: A B' C D
        w(a, b1) + br + w(b0, c0) + cf + to_d(c1),
        // 3: A B' C' D
        w(a, b1) + br + w(b0, c1) + cr + to_d(c0),
        // 4: A C B D
        w(a, c0) + cf + w(c1, b0) + bf + to_d(b1),
        // 5: A C B' D
        w(a, c0) + cf + w(c1, b1) + br + to_d(b0),
        // 6: A C' B D
        w(a, c1) + cr + w(c0, b0) + bf + to_d(b1),
        // 7: A C' B' D
        w(a, c1) + cr + w(c0, b1) + br + to_d(b0),
    ];

    let mut best_delta = -EPSILON;
    let mut best_pattern = 0;
    for (p, cost) in costs.iter().enumerate() {
        let delta = cost - old;
        if delta < best_delta {
            best_delta = delta;
            best_pattern = p + 1;
        }
    }
    if best_pattern == 0 {
        return None;
    }

    let seg_b = &sequence[i + 1..=j];
    let seg_c = &sequence[j + 1..=k];
    let mut next = Vec::with_capacity(sequence.len());
    next.extend_from_slice(&sequence[..=i]);
    match best_pattern {
        1 => {
            next.extend_from_slice(seg_b);
            next.extend(seg_c.iter().rev());
        }
        2 => {
            next.extend(seg_b.iter().rev());
            next.extend_from_slice(seg_c);
        }
        3 => {
            next.extend(seg_b.iter().rev());
            next.extend(seg_c.iter().rev());
        }
        4 => {
            next.extend_from_slice(seg_c);
            next.extend_from_slice(seg_b);
        }
        5 => {
            next.extend_from_slice(seg_c);
            next.extend(seg_b.iter().rev());
        }
        6 => {
            next.extend(seg_c.iter().rev());
            next.extend_from_slice(seg_b);
        }
        _ => {
            next.extend(seg_c.iter().rev());
            next.extend(seg_b.iter().rev());
        }
    }
    next.extend_from_slice(&sequence[k + 1..]);
    Some(next)
}

/// 3-opt as an operator on TSP tours, and as a solver that improves a
/// random tour.
#[derive(Debug, Clone, Copy, Default)]
pub struct HillClimbing3Opt;

impl HillClimbing3Opt {
    /// Improves `tour` in place; returns `true` if it changed.
    pub fn improve(problem: &TspProblem, tour: &mut Tour) -> Result<bool> {
        let fixed_end = tour.last().is_some() && !tour.is_closed();
        let sequence = tour.to_vec();
        let before = sequence_weight(&sequence, tour.is_closed(), problem.weights());
        let (improved, after) =
            three_opt_improve(&sequence, tour.is_closed(), fixed_end, problem.weights());
        if after < before - EPSILON {
            *tour = Tour::new(improved, tour.last())?;
            return Ok(true);
        }
        Ok(false)
    }
}

impl<O: Objective<TspProblem, Tour>> Operator<TspProblem, O, Tour> for HillClimbing3Opt {
    fn name(&self) -> String {
        "3OHC".into()
    }

    fn apply(
        &self,
        problem: &TspProblem,
        objective: &O,
        tour: &mut Tour,
        _rng: &mut dyn RngCore,
    ) -> Result<MoveOutcome<O::Fitness>> {
        let before = objective.calculate(problem, tour);
        let mut candidate = tour.clone();
        if !Self::improve(problem, &mut candidate)? {
            return Ok(MoveOutcome::unchanged(objective.zero()));
        }
        let after = objective.calculate(problem, &candidate);
        if !objective.is_better(after, before) {
            return Ok(MoveOutcome::unchanged(objective.zero()));
        }
        *tour = candidate;
        Ok(MoveOutcome::improved(objective.subtract(after, before)))
    }
}

impl<O: Objective<TspProblem, Tour>> Solver<TspProblem, O, Tour> for HillClimbing3Opt {
    fn name(&self) -> String {
        "3OHC".into()
    }

    fn solve(
        &self,
        problem: &TspProblem,
        objective: &O,
        rng: &mut dyn RngCore,
    ) -> Result<(Tour, O::Fitness)> {
        let mut tour = RandomSolver::build(problem, rng)?;
        Self::improve(problem, &mut tour)?;
        let fitness = objective.calculate(problem, &tour);
        Ok((tour, fitness))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::TourObjective;
    use crate::random::create_rng;

    fn square() -> WeightMatrix {
        WeightMatrix::from_points(&[(1.0, 1.0), (1.0, -1.0), (-1.0, -1.0), (-1.0, 1.0)])
    }

    #[test]
    fn test_already_optimal() {
        let wm = square();
        let (improved, weight) = three_opt_improve(&[0, 1, 2, 3], true, false, &wm);
        assert_eq!(improved, vec![0, 1, 2, 3]);
        assert!((weight - 8.0).abs() < 1e-10);
    }

    #[test]
    fn test_uncrosses_square() {
        let wm = square();
        let (improved, weight) = three_opt_improve(&[0, 2, 1, 3], true, false, &wm);
        assert!((weight - 8.0).abs() < 1e-10);
        assert_eq!(improved[0], 0);
    }

    #[test]
    fn test_small_passthrough() {
        let wm = square();
        let (r, w) = three_opt_improve(&[0, 2], true, false, &wm);
        assert_eq!(r, vec![0, 2]);
        assert!(w > 0.0);
        let (r, _) = three_opt_improve(&[3], true, false, &wm);
        assert_eq!(r, vec![3]);
    }

    #[test]
    fn test_asymmetric_reversal_is_priced_exactly() {
        // forward around the ring is cheap, backward is expensive
        let n = 6;
        let mut wm = WeightMatrix::uniform(n, 100.0);
        for i in 0..n {
            wm.set(i, (i + 1) % n, 1.0);
            wm.set((i + 1) % n, i, 50.0);
        }
        let (improved, weight) = three_opt_improve(&[0, 1, 2, 3, 4, 5], true, false, &wm);
        assert_eq!(improved, vec![0, 1, 2, 3, 4, 5]);
        assert!((weight - 6.0).abs() < 1e-10);

        let (improved, weight) = three_opt_improve(&[0, 3, 2, 1, 4, 5], true, false, &wm);
        assert!((weight - sequence_weight(&improved, true, &wm)).abs() < 1e-10);
        assert!(weight <= sequence_weight(&[0, 3, 2, 1, 4, 5], true, &wm));
    }

    #[test]
    fn test_fixed_end_open() {
        let points: Vec<(f64, f64)> = (0..6).map(|i| (i as f64, 0.0)).collect();
        let wm = WeightMatrix::from_points(&points);
        let (improved, weight) = three_opt_improve(&[0, 3, 1, 4, 2, 5], false, true, &wm);
        assert_eq!(improved[0], 0);
        assert_eq!(improved[5], 5);
        assert!(weight < 13.0);
        assert!((weight - sequence_weight(&improved, false, &wm)).abs() < 1e-10);
    }

    #[test]
    fn test_preserves_visits() {
        let wm = WeightMatrix::from_points(&[
            (0.0, 0.0),
            (2.0, 3.0),
            (4.0, 1.0),
            (6.0, 4.0),
            (3.0, 5.0),
            (1.0, 4.0),
        ]);
        let (improved, _) = three_opt_improve(&[0, 1, 4, 2, 5, 3], true, false, &wm);
        let mut sorted = improved.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_operator_reports_delta() {
        let problem = TspProblem::new(square(), 0, Some(0)).expect("valid");
        let mut tour = Tour::new([0, 2, 1, 3], Some(0)).expect("valid");
        let before = TourObjective::weight(&problem, &tour);
        let outcome = HillClimbing3Opt
            .apply(&problem, &TourObjective, &mut tour, &mut create_rng(0))
            .expect("apply");
        assert!(outcome.improved);
        let after = TourObjective::weight(&problem, &tour);
        assert!((outcome.delta.weight - (after - before)).abs() < 1e-9);
    }

    #[test]
    fn test_solver() {
        let problem = TspProblem::new(square(), 0, Some(0)).expect("valid");
        let (tour, fitness) = HillClimbing3Opt
            .solve(&problem, &TourObjective, &mut create_rng(7))
            .expect("solve");
        assert_eq!(tour.count(), 4);
        assert!((fitness.weight - 8.0).abs() < 1e-10);
    }
}
