//! Seeded cheapest insertion for capacitated tours.
//!
//! # Algorithm
//!
//! Tours are built one after another until every visit is served or no
//! seed is left:
//!
//! 1. Pick a seed among the unassigned visits ([`SeedHeuristic`]). A seed
//!    that does not fit a tour on its own stays unassigned.
//! 2. Grow an initial tour from the seed's closest pool candidates, up to
//!    `initial_fraction` of the unassigned visits, and order it with 3-opt.
//! 3. Repeatedly insert the unassigned visit with the cheapest insertion
//!    cost that still fits the tour's capacity and territory.
//! 4. Whenever the tour has grown by `improvement_fraction`, and once when
//!    it is full, run the inter-tour operators between the new tour and
//!    every earlier tour it overlaps.

use rand::RngCore;
use tracing::debug;

use super::{Overlap, SeedHeuristic};
use crate::config::SeededConfig;
use crate::error::Result;
use crate::local_search::{
    succ, three_opt_improve, InterTourOperator, MultiExchangeOperator, MultiRelocateOperator,
    RelocateOperator,
};
use crate::models::{CapacitatedProblem, CapacitatedSolution, Tour};
use crate::objective::{Fitness, Objective};
use crate::solvers::Solver;

/// Seeded cheapest insertion construction.
///
/// # Examples
///
/// ```
/// use u_tour::config::SeededConfig;
/// use u_tour::constructive::SeededCheapestInsertion;
/// use u_tour::distance::WeightMatrix;
/// use u_tour::models::CapacitatedProblem;
/// use u_tour::objective::CapacitatedObjective;
/// use u_tour::random::create_rng;
///
/// let problem = CapacitatedProblem::new(WeightMatrix::uniform(5, 1.0))
///     .with_visit_weights(vec![1.0; 5]).unwrap()
///     .with_max_weight(2.0);
/// let sci = SeededCheapestInsertion::<CapacitatedObjective>::new(SeededConfig::default())
///     .with_default_operators();
/// let solution = sci
///     .build(&problem, &CapacitatedObjective, &mut create_rng(1))
///     .unwrap();
/// assert!(solution.len() >= 3);
/// assert!(solution.unassigned(&problem).is_empty());
/// ```
pub struct SeededCheapestInsertion<O> {
    config: SeededConfig,
    operators: Vec<Box<dyn InterTourOperator<O>>>,
}

impl<O> SeededCheapestInsertion<O>
where
    O: Objective<CapacitatedProblem, CapacitatedSolution, Fitness = Fitness>,
{
    /// Creates the construction without inter-tour operators.
    pub fn new(config: SeededConfig) -> Self {
        Self {
            config,
            operators: Vec::new(),
        }
    }

    /// Adds an inter-tour operator run between overlapping tours.
    pub fn with_operator(mut self, operator: Box<dyn InterTourOperator<O>>) -> Self {
        self.operators.push(operator);
        self
    }

    /// Adds chain relocation (2..5), relocation and reversed chain exchange
    /// (1..5).
    pub fn with_default_operators(self) -> Self {
        self.with_operator(Box::new(MultiRelocateOperator::new(2, 5)))
            .with_operator(Box::new(RelocateOperator::new()))
            .with_operator(Box::new(
                MultiExchangeOperator::new(1, 5).with_reversed(true),
            ))
    }

    /// Name used in logs.
    pub fn name(&self) -> String {
        let ops: Vec<String> = self.operators.iter().map(|op| op.name()).collect();
        if ops.is_empty() {
            "SCI".into()
        } else {
            format!("SCI_[{}]", ops.join("_"))
        }
    }

    /// Builds a solution. Visits that fit no tour are left unassigned.
    pub fn build(
        &self,
        problem: &CapacitatedProblem,
        objective: &O,
        rng: &mut dyn RngCore,
    ) -> Result<CapacitatedSolution> {
        let size = problem.weights().size();
        let mut open = vec![false; size];
        for &v in problem.visits() {
            open[v] = true;
        }
        let mut unassigned: Vec<usize> = problem.visits().to_vec();
        let mut solution = CapacitatedSolution::new();

        while let Some(seed) = self
            .config
            .seed_heuristic
            .select(problem, &unassigned, rng)
        {
            open[seed] = false;
            unassigned.retain(|&v| open[v]);

            let tour = match problem.depot() {
                Some(depot) => Tour::new([depot, seed], Some(depot))?,
                None => Tour::singleton(seed, Some(seed)),
            };
            if !problem.fits(&problem.load_of(&tour)) {
                debug!(event = "seed_rejected", seed);
                continue;
            }
            solution.push(problem, tour);
            let t = solution.len() - 1;

            self.grow_initial(problem, &mut solution, t, seed, &mut open, unassigned.len())?;
            unassigned.retain(|&v| open[v]);

            let mut next_burst = self.burst_size(solution.tour(t).count());
            while let Some((visit, after)) = self.cheapest(problem, &solution, t, &unassigned) {
                let (tour, load) = solution.tour_mut(t);
                tour.insert_after(after, visit)?;
                problem.add_to_load(load, visit);
                open[visit] = false;
                unassigned.retain(|&v| open[v]);

                if solution.tour(t).count() >= next_burst {
                    self.improve(problem, objective, &mut solution, t)?;
                    next_burst = self.burst_size(solution.tour(t).count());
                }
            }
            self.improve(problem, objective, &mut solution, t)?;
            debug!(
                event = "tour_built",
                tour = t,
                visits = solution.tour(t).count(),
                unassigned = unassigned.len()
            );
        }
        Ok(solution)
    }

    fn burst_size(&self, count: usize) -> usize {
        let next = (count as f64 * (1.0 + self.config.improvement_fraction)).ceil() as usize;
        next.max(count + 1)
    }

    /// Fills tour `t` from the seed's pool and orders it with 3-opt.
    fn grow_initial(
        &self,
        problem: &CapacitatedProblem,
        solution: &mut CapacitatedSolution,
        t: usize,
        seed: usize,
        open: &mut [bool],
        unassigned: usize,
    ) -> Result<()> {
        let target = (self.config.initial_fraction * unassigned as f64).ceil() as usize;
        let mut added = 0;
        for &c in problem.seeded_pool().get(seed) {
            if added >= target {
                break;
            }
            if !open[c]
                || !problem.can_add(solution.load(t), &[c])
                || !self.config.overlap.allows(problem, solution, t, c)
            {
                continue;
            }
            let (tour, load) = solution.tour_mut(t);
            let tail = tour.tail();
            tour.insert_after(tail, c)?;
            problem.add_to_load(load, c);
            open[c] = false;
            added += 1;
        }

        let tour = solution.tour(t);
        if tour.count() > 3 {
            let (sequence, _) = three_opt_improve(&tour.to_vec(), true, false, problem.weights());
            let ordered = Tour::new(sequence, tour.last())?;
            *solution.tour_mut(t).0 = ordered;
        }
        Ok(())
    }

    /// Cheapest feasible insertion of an unassigned visit into tour `t`.
    fn cheapest(
        &self,
        problem: &CapacitatedProblem,
        solution: &CapacitatedSolution,
        t: usize,
        unassigned: &[usize],
    ) -> Option<(usize, usize)> {
        let w = |a: usize, b: usize| problem.weight(a, b);
        let tour = solution.tour(t);
        let load = solution.load(t);

        let mut best: Option<(usize, usize, f64)> = None;
        for &c in unassigned {
            if !problem.can_add(load, &[c]) {
                continue;
            }
            let mut position: Option<(usize, f64)> = None;
            for q in tour {
                let s = succ(tour, q);
                let cost = w(q, c) + w(c, s) - w(q, s);
                if position.map_or(true, |(_, b)| cost < b) {
                    position = Some((q, cost));
                }
            }
            let Some((after, cost)) = position else {
                continue;
            };
            if best.map_or(true, |(_, _, b)| cost < b)
                && self.config.overlap.allows(problem, solution, t, c)
            {
                best = Some((c, after, cost));
            }
        }
        best.map(|(c, after, _)| (c, after))
    }

    /// Runs the inter-tour operators between tour `t` and every earlier
    /// overlapping tour until none improves.
    fn improve(
        &self,
        problem: &CapacitatedProblem,
        objective: &O,
        solution: &mut CapacitatedSolution,
        t: usize,
    ) -> Result<()> {
        if self.operators.is_empty() {
            return Ok(());
        }
        for other in 0..t {
            if !self
                .config
                .overlap
                .overlaps(problem, solution.tour(t), solution.tour(other))
            {
                continue;
            }
            loop {
                let mut improved = false;
                for op in &self.operators {
                    improved |= op.apply_pair(problem, objective, solution, t, other)?.improved;
                    improved |= op.apply_pair(problem, objective, solution, other, t)?.improved;
                }
                if !improved {
                    break;
                }
            }
        }
        Ok(())
    }
}

impl<O> Solver<CapacitatedProblem, O, CapacitatedSolution> for SeededCheapestInsertion<O>
where
    O: Objective<CapacitatedProblem, CapacitatedSolution, Fitness = Fitness>,
{
    fn name(&self) -> String {
        SeededCheapestInsertion::name(self)
    }

    fn solve(
        &self,
        problem: &CapacitatedProblem,
        objective: &O,
        rng: &mut dyn RngCore,
    ) -> Result<(CapacitatedSolution, Fitness)> {
        let solution = self.build(problem, objective, rng)?;
        let fitness = objective.calculate(problem, &solution);
        Ok((solution, fitness))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::WeightMatrix;
    use crate::models::{CapacityConstraint, Coordinate};
    use crate::objective::CapacitatedObjective;
    use crate::random::create_rng;

    fn sci() -> SeededCheapestInsertion<CapacitatedObjective> {
        SeededCheapestInsertion::new(SeededConfig::default()).with_default_operators()
    }

    fn grid(n: usize) -> Vec<(f64, f64)> {
        (0..n * n)
            .map(|i| ((i % n) as f64, (i / n) as f64))
            .collect()
    }

    fn assert_feasible(problem: &CapacitatedProblem, solution: &CapacitatedSolution) {
        let mut seen = vec![0; problem.weights().size()];
        for (i, tour) in solution.tours().iter().enumerate() {
            assert!(tour.is_closed());
            assert!(problem.fits(solution.load(i)));
            assert_eq!(solution.load(i), &problem.load_of(tour));
            for v in tour {
                seen[v] += 1;
            }
        }
        for &v in problem.visits() {
            assert!(seen[v] <= 1);
        }
    }

    #[test]
    fn test_uniform_split() {
        let problem = CapacitatedProblem::new(WeightMatrix::uniform(5, 1.0))
            .with_visit_weights(vec![1.0; 5])
            .expect("valid")
            .with_max_weight(2.0);
        let solution = sci()
            .build(&problem, &CapacitatedObjective, &mut create_rng(3))
            .expect("build");
        assert!(solution.len() >= 3);
        assert!(solution.unassigned(&problem).is_empty());
        assert_feasible(&problem, &solution);
    }

    #[test]
    fn test_grid_serves_everything() {
        let points = grid(6);
        let n = points.len();
        let problem = CapacitatedProblem::new(WeightMatrix::from_points(&points))
            .with_visit_weights(vec![1.0; n])
            .expect("valid")
            .with_max_weight(7.0);
        let (solution, fitness) = sci()
            .solve(&problem, &CapacitatedObjective, &mut create_rng(5))
            .expect("solve");
        assert_eq!(fitness.customers, n as i32);
        assert!(solution.len() >= 6);
        assert_feasible(&problem, &solution);
    }

    #[test]
    fn test_depot_starts_every_tour() {
        let points = grid(4);
        let n = points.len();
        let problem = CapacitatedProblem::new(WeightMatrix::from_points(&points))
            .with_depot(0)
            .expect("valid")
            .with_visit_weights(vec![1.0; n])
            .expect("valid")
            .with_max_weight(4.0);
        let (solution, fitness) = sci()
            .solve(&problem, &CapacitatedObjective, &mut create_rng(8))
            .expect("solve");
        assert_eq!(fitness.customers, 15);
        for tour in solution.tours() {
            assert_eq!(tour.first(), 0);
        }
        assert_feasible(&problem, &solution);
    }

    #[test]
    fn test_oversized_visit_left_unassigned() {
        let problem = CapacitatedProblem::new(WeightMatrix::uniform(4, 1.0))
            .with_visit_weights(vec![1.0, 1.0, 5.0, 1.0])
            .expect("valid")
            .with_max_weight(2.0);
        let (solution, fitness) = sci()
            .solve(&problem, &CapacitatedObjective, &mut create_rng(1))
            .expect("solve");
        assert_eq!(solution.unassigned(&problem), vec![2]);
        assert_eq!(CapacitatedObjective::unassigned(&problem, fitness), 1);
        assert_feasible(&problem, &solution);
    }

    #[test]
    fn test_named_constraint() {
        let costs = vec![2.0, 1.0, 1.0, 2.0, 1.0, 1.0];
        let problem = CapacitatedProblem::new(WeightMatrix::uniform(6, 1.0))
            .with_constraint(CapacityConstraint::new("volume", 3.0, costs))
            .expect("valid");
        let solution = sci()
            .build(&problem, &CapacitatedObjective, &mut create_rng(2))
            .expect("build");
        assert!(solution.len() >= 3);
        assert!(solution.unassigned(&problem).is_empty());
        assert_feasible(&problem, &solution);
    }

    #[test]
    fn test_same_seed_same_solution() {
        let points = grid(5);
        let n = points.len();
        let problem = CapacitatedProblem::new(WeightMatrix::from_points(&points))
            .with_visit_weights(vec![1.0; n])
            .expect("valid")
            .with_max_weight(6.0);
        let a = sci()
            .build(&problem, &CapacitatedObjective, &mut create_rng(4))
            .expect("build");
        let b = sci()
            .build(&problem, &CapacitatedObjective, &mut create_rng(4))
            .expect("build");
        assert_eq!(a, b);
    }

    #[test]
    fn test_bounding_box_overlap() {
        let points = grid(4);
        let n = points.len();
        let locations = points
            .iter()
            .map(|&(x, y)| Coordinate {
                latitude: y,
                longitude: x,
            })
            .collect();
        let problem = CapacitatedProblem::new(WeightMatrix::from_points(&points))
            .with_locations(locations)
            .expect("valid")
            .with_visit_weights(vec![1.0; n])
            .expect("valid")
            .with_max_weight(4.0);
        let config = SeededConfig::default().with_overlap(Overlap::BoundingBox);
        let solution = SeededCheapestInsertion::<CapacitatedObjective>::new(config)
            .with_default_operators()
            .build(&problem, &CapacitatedObjective, &mut create_rng(6))
            .expect("build");
        assert!(solution.unassigned(&problem).is_empty());
        assert_feasible(&problem, &solution);
    }

    #[test]
    fn test_name() {
        assert_eq!(
            SeededCheapestInsertion::<CapacitatedObjective>::new(SeededConfig::default()).name(),
            "SCI"
        );
        assert_eq!(
            sci().name(),
            "SCI_[MULTI_RELOC_2_5_RELOC_MULTI_EX_1_5_R]"
        );
    }
}
