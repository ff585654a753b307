//! Default solver compositions and solve entry points.
//!
//! - [`solve_tsp`] — genetic search with edge assembly crossover for closed
//!   tours, VNS construction for open ones
//! - [`solve_directed`] — the undirected tour, then the cheapest turn per
//!   visit
//! - [`solve_capacitated`] — repeated seeded cheapest insertion, each run
//!   and the best run polished by chain exchange
//!
//! Every entry point validates the [`SolverConfig`] and seeds its own
//! generator from `config.seed`, so equal inputs give equal tours.

use tracing::info;

use crate::config::SolverConfig;
use crate::constructive::{RandomSolver, SeededCheapestInsertion};
use crate::error::Result;
use crate::ga::EaxOperator;
use crate::local_search::{Local1Shift, MultiExchangeOperator, RandomExchange};
use crate::models::{
    CapacitatedProblem, CapacitatedSolution, DirectedTspProblem, Solved, Tour, TspProblem,
};
use crate::objective::{CapacitatedObjective, DirectedTourObjective, Fitness, Objective, TourObjective};
use crate::random::create_rng;
use crate::solvers::{GeneticSolver, IterativeOperator, IterativeSolver, Solver, VnsSolver};

type TspSolver = IterativeSolver<TspProblem, TourObjective, Tour>;
type CapacitatedSolver =
    IterativeSolver<CapacitatedProblem, CapacitatedObjective, CapacitatedSolution>;

/// VNS construction: up to `max_iterations` independent VNS runs over a
/// random start, a random-exchange shake and single-visit shifts, stopping
/// early once a run reaches the objective's zero.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::models::TspProblem;
/// use u_tour::objective::TourObjective;
/// use u_tour::random::create_rng;
/// use u_tour::solve::vns_construction;
/// use u_tour::solvers::Solver;
///
/// let points: Vec<(f64, f64)> = (0..6).map(|i| (i as f64, 0.0)).collect();
/// let problem = TspProblem::new(WeightMatrix::from_points(&points), 0, None).unwrap();
/// let (tour, fitness) = vns_construction(3, 20)
///     .solve(&problem, &TourObjective, &mut create_rng(1))
///     .unwrap();
/// assert_eq!(tour.to_vec(), vec![0, 1, 2, 3, 4, 5]);
/// assert_eq!(fitness.weight, 5.0);
/// ```
pub fn vns_construction(
    max_iterations: usize,
    level_max: usize,
) -> IterativeSolver<TspProblem, TourObjective, Tour> {
    let vns: VnsSolver<TspProblem, TourObjective, Tour> = VnsSolver::with_level_max(
        Box::new(RandomSolver),
        Box::new(RandomExchange),
        Box::new(Local1Shift),
        level_max,
    );
    TspSolver::new(Box::new(vns), max_iterations).with_stop(Box::new(
        |_: usize, _: &TspProblem, objective: &TourObjective, _: &Tour, fitness: Fitness| {
            objective.is_zero(fitness)
        },
    ))
}

/// Solves a single-tour problem.
///
/// Closed problems run a genetic search whose individuals are random tours
/// polished by single-visit shifts and recombined by [`EaxOperator`]; open
/// problems run [`vns_construction`].
///
/// # Examples
///
/// ```
/// use u_tour::config::SolverConfig;
/// use u_tour::distance::WeightMatrix;
/// use u_tour::models::TspProblem;
/// use u_tour::solve::solve_tsp;
///
/// let weights = WeightMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
/// let problem = TspProblem::new(weights, 0, Some(0)).unwrap();
/// let solved = solve_tsp(problem, &SolverConfig::default()).unwrap();
/// assert_eq!(solved.solution.to_vec(), vec![0, 1]);
/// assert_eq!(solved.fitness.weight, 2.0);
/// assert_eq!(solved.fitness.customers, 2);
/// ```
pub fn solve_tsp(problem: TspProblem, config: &SolverConfig) -> Result<Solved<Tour, Fitness>> {
    config.validate()?;
    let problem = problem.with_nearest_neighbours(config.nearest_neighbours);
    let mut rng = create_rng(config.seed);

    let solver: Box<dyn Solver<TspProblem, TourObjective, Tour>> = if problem.is_closed() {
        let generator =
            TspSolver::new(Box::new(RandomSolver), 1).with_operator(Box::new(Local1Shift));
        Box::new(
            GeneticSolver::<TspProblem, TourObjective, Tour>::new(
                Box::new(generator),
                Box::new(EaxOperator::from_config(&config.eax)),
                config.ga.clone(),
            )?
            .with_mutation(Box::new(Local1Shift)),
        )
    } else {
        Box::new(vns_construction(
            config.vns.max_iterations,
            config.vns.level_max,
        ))
    };

    info!(
        event = "solve_start",
        solver = %solver.name(),
        visits = problem.count(),
        closed = problem.is_closed()
    );
    let (tour, fitness) = solver.solve(&problem, &TourObjective, &mut rng)?;
    info!(event = "solve_end", fitness = %fitness);
    Ok(Solved::new(tour, fitness))
}

/// Solves a directed problem: the visit order comes from [`solve_tsp`] on
/// the undirected problem, then every visit gets its cheapest turn.
pub fn solve_directed(
    problem: &DirectedTspProblem,
    config: &SolverConfig,
) -> Result<Solved<Tour, Fitness>> {
    let order = solve_tsp(problem.undirected()?, config)?.solution.to_vec();
    let directed = problem.best_turns(&order);
    let last = if problem.is_closed() {
        directed.first().copied()
    } else if problem.last().is_some() {
        directed.last().copied()
    } else {
        None
    };
    let tour = Tour::new(directed, last)?;
    let fitness = DirectedTourObjective.calculate(problem, &tour);
    info!(event = "directed_end", fitness = %fitness);
    Ok(Solved::new(tour, fitness))
}

/// Solves a capacitated problem.
///
/// Seeded cheapest insertion runs `config.seeded.runs` times, each run
/// polished by reversed chain exchange of up to `polish_chain` visits over
/// all tour pairs. The best run is polished once more with chains of up to
/// `final_chain` visits and then with repeated `polish_chain` exchange until
/// it stops improving (at most 20 rounds).
///
/// Visits that fit no tour are left out; the returned fitness counts the
/// served visits.
pub fn solve_capacitated(
    problem: CapacitatedProblem,
    config: &SolverConfig,
) -> Result<Solved<CapacitatedSolution, Fitness>> {
    config.validate()?;
    let problem = problem
        .with_nearest_neighbours(config.nearest_neighbours)
        .with_pool_size(config.pool_size);
    let mut rng = create_rng(config.seed);
    let seeded = &config.seeded;

    let exchange = |max: usize| {
        MultiExchangeOperator::new(1, max)
            .with_reversed(true)
            .with_all_pairs(true)
    };
    let sci = SeededCheapestInsertion::<CapacitatedObjective>::new(seeded.clone())
        .with_default_operators();
    let construction = CapacitatedSolver::new(Box::new(sci), seeded.runs)
        .with_operator(Box::new(exchange(seeded.polish_chain)));
    let solver = CapacitatedSolver::new(Box::new(construction), 1)
        .with_operator(Box::new(exchange(seeded.final_chain)))
        .with_operator(Box::new(
            IterativeOperator::<CapacitatedProblem, CapacitatedObjective, CapacitatedSolution>::new(
                Box::new(exchange(seeded.polish_chain)),
                20,
                true,
            ),
        ));

    info!(
        event = "solve_start",
        solver = %solver.name(),
        visits = problem.count(),
        depot = ?problem.depot()
    );
    let (solution, fitness) = solver.solve(&problem, &CapacitatedObjective, &mut rng)?;
    info!(
        event = "solve_end",
        tours = solution.len(),
        unassigned = CapacitatedObjective::unassigned(&problem, fitness),
        fitness = %fitness
    );
    Ok(Solved::new(solution, fitness))
}
