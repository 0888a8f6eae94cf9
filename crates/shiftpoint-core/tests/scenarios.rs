//! Cross-solver scenarios: known partitions, optimality ordering and
//! agreement between the exact and divide-and-conquer formulations.

use approx::assert_relative_eq;
use shiftpoint_core::{
    classify_changepoints, AlgorithmInput, Case, Config, CostModel, Kernel, Solver,
};

fn gaussian_input(signal: Vec<f64>, penalization: f64, max_changepoints: usize) -> AlgorithmInput {
    let case = Case::synthetic("scenario", signal).unwrap();
    AlgorithmInput::new(
        case,
        CostModel::Gaussian,
        penalization,
        max_changepoints,
        Config::default(),
    )
    .unwrap()
}

/// Three noisy regimes generated from a fixed linear-congruential stream.
fn noisy_regimes() -> (Vec<f64>, Vec<usize>) {
    let mut state: u64 = 23;
    let mut uniform = || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };
    let mut signal = Vec::new();
    for &(block, level) in &[(40usize, 0.0), (40, 12.0), (40, -8.0)] {
        for _ in 0..block {
            signal.push(level + uniform() - 0.5);
        }
    }
    (signal, vec![40, 80])
}

#[test]
fn constant_signal_yields_no_changepoints() {
    let input = gaussian_input(vec![0.0; 6], 1.0, 5);
    for solver in [
        Solver::BinarySegmentation,
        Solver::PenalizedPartition,
        Solver::PenalizedPartitionPruned,
    ] {
        let solution = solver.solve(&input).unwrap();
        assert!(solution.changepoints.is_empty(), "{}", solver.id());
        assert_relative_eq!(solution.metrics.cost, 0.0, epsilon = 1e-12);
    }
}

#[test]
fn penalized_dp_and_greedy_agree_on_a_clean_shift() {
    let input = gaussian_input(vec![0.0, 0.0, 0.0, 10.0, 10.0, 10.0], 0.1, 5);
    let dp = Solver::PenalizedPartition.solve(&input).unwrap();
    assert_eq!(dp.changepoints, vec![3]);
    assert_relative_eq!(dp.metrics.cost, 0.1, epsilon = 1e-9);

    let greedy = Solver::BinarySegmentation.solve(&input).unwrap();
    assert_eq!(greedy.changepoints, dp.changepoints);
    assert_relative_eq!(greedy.metrics.cost, dp.metrics.cost, epsilon = 1e-9);
}

#[test]
fn segment_count_dp_recovers_the_exact_partition() {
    let signal = vec![
        1.0, 1.0, 1.0, 1.0, 1.0, 5.0, 5.0, 5.0, 5.0, 5.0, 1.0, 1.0, 1.0, 1.0, 1.0,
    ];
    let input = gaussian_input(signal, 0.0, 2);
    let solution = Solver::SegmentCountPartition.solve(&input).unwrap();
    assert_eq!(solution.changepoints, vec![5, 10]);
    assert_relative_eq!(solution.metrics.cost, 0.0, epsilon = 1e-9);
}

#[test]
fn changepoints_are_strictly_increasing_and_interior() {
    let (signal, _) = noisy_regimes();
    let n = signal.len();
    let input = gaussian_input(signal, 0.5, 4);
    for solver in Solver::ALL {
        let solution = solver.solve(&input).unwrap();
        for pair in solution.changepoints.windows(2) {
            assert!(pair[0] < pair[1], "{} not increasing", solver.id());
        }
        for &changepoint in &solution.changepoints {
            assert!(changepoint > 0 && changepoint < n, "{}", solver.id());
        }
    }
}

#[test]
fn solving_twice_is_deterministic() {
    let (signal, _) = noisy_regimes();
    let input = gaussian_input(signal, 0.5, 4);
    for solver in Solver::ALL {
        let first = solver.solve(&input).unwrap();
        let second = solver.solve(&input).unwrap();
        assert_eq!(first.changepoints, second.changepoints, "{}", solver.id());
        assert_eq!(first.metrics.cost, second.metrics.cost, "{}", solver.id());
    }
}

#[test]
fn dp_is_a_lower_bound_for_the_greedy_solver() {
    let (signal, _) = noisy_regimes();
    let input = gaussian_input(signal, 0.5, 4);
    let dp = Solver::PenalizedPartition.solve(&input).unwrap();
    let greedy = Solver::BinarySegmentation.solve(&input).unwrap();
    assert!(dp.metrics.cost <= greedy.metrics.cost + 1e-9);
}

#[test]
fn pruned_penalized_solver_matches_the_plain_one() {
    let (signal, _) = noisy_regimes();
    for model in [CostModel::Gaussian, CostModel::Exponential] {
        let shifted: Vec<f64> = match model {
            // The exponential cost expects positive observations.
            CostModel::Exponential => signal.iter().map(|v| v + 10.0).collect(),
            _ => signal.clone(),
        };
        let case = Case::synthetic("parity", shifted).unwrap();
        let input = AlgorithmInput::new(case, model, 0.5, 4, Config::default()).unwrap();
        let plain = Solver::PenalizedPartition.solve(&input).unwrap();
        let pruned = Solver::PenalizedPartitionPruned.solve(&input).unwrap();
        assert_eq!(plain.changepoints, pruned.changepoints);
        assert_relative_eq!(plain.metrics.cost, pruned.metrics.cost, epsilon = 1e-9);
    }
}

#[test]
fn reported_cost_decomposes_over_segments() {
    let (signal, _) = noisy_regimes();
    let n = signal.len();
    let input = gaussian_input(signal, 0.5, 4);
    for solver in [Solver::BinarySegmentation, Solver::PenalizedPartition] {
        let solution = solver.solve(&input).unwrap();
        let mut bounds = vec![0];
        bounds.extend(&solution.changepoints);
        bounds.push(n);
        let recomputed: f64 = bounds
            .windows(2)
            .map(|pair| input.cost.range_cost(pair[0], pair[1]))
            .sum::<f64>()
            + input.penalization * solution.changepoints.len() as f64;
        assert_relative_eq!(solution.metrics.cost, recomputed, epsilon = 1e-9);
    }
}

#[test]
fn divide_and_conquer_matches_the_exact_count_dp_on_kernel_cost() {
    let (signal, _) = noisy_regimes();
    let case = Case::synthetic("kernel_parity", signal).unwrap();
    let input = AlgorithmInput::new(
        case,
        CostModel::Kernel(Kernel::laplace(1e3)),
        0.0,
        3,
        Config::default(),
    )
    .unwrap();
    let exact = Solver::SegmentCountPartition.solve(&input).unwrap();
    let halved = Solver::DivideConquerPartition.solve(&input).unwrap();
    // The heuristic can never beat the exhaustive scan.
    assert!(halved.metrics.cost >= exact.metrics.cost - 1e-9);
    assert_relative_eq!(halved.metrics.cost, exact.metrics.cost, epsilon = 1e-9);
}

#[test]
fn recovered_changepoints_match_the_ground_truth() {
    let (signal, truth) = noisy_regimes();
    let input = gaussian_input(signal, 0.5, 4);
    let solution = Solver::PenalizedPartition.solve(&input).unwrap();
    let evaluation = classify_changepoints(&truth, &solution.changepoints, 10);
    assert_eq!(evaluation.correct, truth.len());
    assert_eq!(evaluation.not_found, 0);
}
