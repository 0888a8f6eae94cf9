//! Optimal partition under a penalized objective.
//!
//! `F[e] = min_{i < e} F[i] + c(i, e) + β·[i > 0]`, with `F[0] = 0`. The
//! plain variant scans every predecessor (O(n²)); the pruned variant keeps
//! a candidate list in the style of PELT and reaches near-linear time on
//! signals with many changepoints.

use crate::cost::CostModel;
use crate::solution::AlgorithmInput;

/// Walk the argmin chain back from the full prefix to recover the
/// changepoints in ascending order.
fn retrieve_changepoints(attained_best: &[usize]) -> Vec<usize> {
    let mut changepoints = Vec::new();
    let mut at = attained_best.len() - 1;
    while attained_best[at] != 0 {
        changepoints.push(attained_best[at]);
        at = attained_best[at];
    }
    changepoints.reverse();
    changepoints
}

/// Smallest-index argmin of the penalized recurrence over `candidates`.
///
/// The first segment is free: β is only charged for predecessors past 0.
fn best_predecessor(
    input: &AlgorithmInput,
    best_prefix: &[f64],
    candidates: impl Iterator<Item = usize>,
    end: usize,
    penalization: f64,
) -> (f64, usize) {
    let mut best = (f64::INFINITY, 0);
    for i in candidates {
        let charge = if i > 0 { penalization } else { 0.0 };
        let value = best_prefix[i] + input.cost.range_cost(i, end) + charge;
        if value < best.0 {
            best = (value, i);
        }
    }
    best
}

pub(crate) fn solve(input: &AlgorithmInput, penalization: f64) -> (Vec<usize>, f64) {
    let length = input.len() + 1;
    let mut best_prefix = vec![0.0; length];
    let mut attained_best = vec![0usize; length];

    for end in 1..length {
        let (value, argmin) = best_predecessor(input, &best_prefix, 0..end, end, penalization);
        best_prefix[end] = value;
        attained_best[end] = argmin;
    }

    (retrieve_changepoints(&attained_best), best_prefix[length - 1])
}

pub(crate) fn solve_pruned(input: &AlgorithmInput, penalization: f64) -> (Vec<usize>, f64) {
    let length = input.len() + 1;
    let k_term = pruning_term(input);
    let mut best_prefix = vec![0.0; length];
    let mut attained_best = vec![0usize; length];
    // Ascending order is preserved by retain + push, so the smallest-index
    // tie-break matches the unpruned scan.
    let mut candidates: Vec<usize> = vec![0];

    for end in 1..length {
        let (value, argmin) = best_predecessor(
            input,
            &best_prefix,
            candidates.iter().copied(),
            end,
            penalization,
        );
        best_prefix[end] = value;
        attained_best[end] = argmin;
        candidates
            .retain(|&i| best_prefix[i] + input.cost.range_cost(i, end) + k_term <= best_prefix[end]);
        candidates.push(end);
    }

    (retrieve_changepoints(&attained_best), best_prefix[length - 1])
}

/// Lower-bound correction applied while pruning. Only the Gaussian cost
/// has the additive-monotonicity bound; other costs prune conservatively.
pub(crate) fn pruning_term(input: &AlgorithmInput) -> f64 {
    match input.cost.model() {
        CostModel::Gaussian => -((input.len() + 1) as f64).ln(),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::case::Case;
    use crate::config::Config;

    use super::*;

    fn input(signal: Vec<f64>, model: CostModel, penalization: f64) -> AlgorithmInput {
        let case = Case::synthetic("penalized", signal).unwrap();
        AlgorithmInput::new(case, model, penalization, 50, Config::default()).unwrap()
    }

    #[test]
    fn finds_single_mean_shift() {
        let input = input(
            vec![0.0, 0.0, 0.0, 10.0, 10.0, 10.0],
            CostModel::Gaussian,
            0.1,
        );
        let (changepoints, cost) = solve(&input, input.penalization);
        assert_eq!(changepoints, vec![3]);
        assert_relative_eq!(cost, 0.1, epsilon = 1e-9);
    }

    #[test]
    fn first_segment_is_not_charged() {
        let input = input(vec![5.0; 8], CostModel::Gaussian, 2.0);
        let (changepoints, cost) = solve(&input, input.penalization);
        assert!(changepoints.is_empty());
        assert_relative_eq!(cost, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn pruned_matches_plain_on_gaussian() {
        let mut signal = Vec::new();
        for (block, level) in [(25, 0.0), (25, 6.0), (25, -3.0), (25, 6.0)] {
            signal.extend(std::iter::repeat(level).take(block));
        }
        // Deterministic ripple so segments are not exactly constant.
        for (index, value) in signal.iter_mut().enumerate() {
            *value += 0.25 * ((index % 5) as f64 - 2.0);
        }
        let input = input(signal, CostModel::Gaussian, 0.5);
        let (plain_changepoints, plain_cost) = solve(&input, input.penalization);
        let (pruned_changepoints, pruned_cost) = solve_pruned(&input, input.penalization);
        assert_eq!(plain_changepoints, pruned_changepoints);
        assert_relative_eq!(plain_cost, pruned_cost, epsilon = 1e-9);
        assert!(!plain_changepoints.is_empty());
    }

    #[test]
    fn pruned_matches_plain_on_exponential() {
        let mut signal = vec![0.5; 30];
        signal.extend(vec![4.0; 30]);
        let input = input(signal, CostModel::Exponential, 0.05);
        let (plain_changepoints, plain_cost) = solve(&input, input.penalization);
        let (pruned_changepoints, pruned_cost) = solve_pruned(&input, input.penalization);
        assert_eq!(plain_changepoints, pruned_changepoints);
        assert_relative_eq!(plain_cost, pruned_cost, epsilon = 1e-9);
    }

    #[test]
    fn single_point_signal_costs_its_range() {
        let input = input(vec![7.0], CostModel::Gaussian, 0.1);
        let (changepoints, cost) = solve(&input, input.penalization);
        assert!(changepoints.is_empty());
        assert_relative_eq!(cost, 0.0, epsilon = 1e-12);
    }
}
