use proptest::prelude::*;

use u_tour::config::{SeededConfig, SolverConfig};
use u_tour::distance::WeightMatrix;
use u_tour::models::CapacitatedProblem;
use u_tour::solve::solve_capacitated;

fn grid(n: usize) -> WeightMatrix {
    let points: Vec<(f64, f64)> = (0..n).map(|i| ((i % 5) as f64, (i / 5) as f64)).collect();
    WeightMatrix::from_points(&points)
}

fn config(seed: u64) -> SolverConfig {
    SolverConfig::default()
        .with_seed(seed)
        .with_seeded(SeededConfig::default().with_runs(2))
}

#[test]
fn depot_tours_start_at_depot() {
    let problem = CapacitatedProblem::new(grid(11))
        .with_visit_weights(vec![1.0; 11])
        .expect("valid")
        .with_max_weight(4.0)
        .with_depot(0)
        .expect("valid");
    let solved = solve_capacitated(problem, &config(1)).expect("solve");
    assert_eq!(solved.fitness.customers, 10);
    assert!(solved.solution.len() >= 3);
    for tour in solved.solution.tours() {
        assert_eq!(tour.first(), 0);
        assert!(tour.is_closed());
    }
}

#[test]
fn oversized_visit_is_unassigned() {
    let mut weights = vec![1.0; 8];
    weights[5] = 10.0;
    let problem = CapacitatedProblem::new(grid(8))
        .with_visit_weights(weights)
        .expect("valid")
        .with_max_weight(3.0);
    let solved = solve_capacitated(problem.clone(), &config(3)).expect("solve");
    assert_eq!(solved.fitness.customers, 7);
    assert_eq!(solved.solution.unassigned(&problem), vec![5]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn every_visit_served_once_within_capacity(
        n in 2usize..15,
        max in 1usize..5,
        seed in 0u64..1000,
    ) {
        let problem = CapacitatedProblem::new(grid(n))
            .with_visit_weights(vec![1.0; n])
            .expect("valid")
            .with_max_weight(max as f64);
        let solved = solve_capacitated(problem.clone(), &config(seed)).expect("solve");

        let mut seen = vec![0; n];
        for (i, tour) in solved.solution.tours().iter().enumerate() {
            prop_assert!(solved.solution.load(i).weight <= max as f64);
            for v in tour {
                seen[v] += 1;
            }
        }
        prop_assert!(seen.iter().all(|&c| c == 1));
        prop_assert_eq!(solved.fitness.customers, n as i32);
        prop_assert!(solved.solution.len() >= n.div_ceil(max));
    }
}
