//! Divide-and-conquer row computation for the count-in-state DP.
//!
//! When the cost satisfies the quadrangle inequality the optimal
//! predecessor `A[k][e]` is monotone non-decreasing in `e`, so each row can
//! be filled by recursing on endpoint halves while narrowing the
//! predecessor search window: the midpoint's argmin is the inclusive upper
//! bound for the left half and the lower bound for the right half. This
//! brings a row down to O(n log n).
//!
//! The kernel cost does not satisfy the inequality strictly, so the result
//! is a (strong) heuristic there rather than a proven optimum.

use crate::cost::CostFunction;
use crate::segment_count::{retrieve_changepoints, DpOutcome};
use crate::solution::AlgorithmInput;

pub(crate) fn solve(input: &AlgorithmInput, penalization: f64) -> DpOutcome {
    let length = input.len() + 1;
    let rows = input.max_changepoints + 1;
    let mut best_prefix = vec![vec![input.config.infinity; length]; rows];
    let mut backpointers = vec![vec![0usize; length]; rows];
    for end in 0..length {
        best_prefix[0][end] = input.cost.range_cost(0, end);
    }

    for row in 1..=input.max_changepoints {
        let (previous_rows, current_rows) = best_prefix.split_at_mut(row);
        compute_row(
            &input.cost,
            penalization,
            &previous_rows[row - 1],
            &mut current_rows[0],
            &mut backpointers[row],
            0,
            length,
            0,
            length,
        );
    }

    let cost = best_prefix[input.max_changepoints][length - 1];
    DpOutcome {
        changepoints: retrieve_changepoints(&backpointers, input.max_changepoints),
        cost,
        best_prefix,
        backpointers,
    }
}

/// Fill `row_best[el..er)` by recursing around the midpoint, searching
/// predecessors only inside `[search_low, search_high)`.
#[allow(clippy::too_many_arguments)]
fn compute_row(
    cost: &CostFunction,
    penalization: f64,
    previous_row: &[f64],
    row_best: &mut [f64],
    row_backpointers: &mut [usize],
    endpoint_low: usize,
    endpoint_high: usize,
    search_low: usize,
    search_high: usize,
) {
    let middle = (endpoint_low + endpoint_high) / 2;
    let mut best = (f64::INFINITY, search_low);
    for i in search_low..search_high.min(middle + 1) {
        let value = previous_row[i] + cost.range_cost(i, middle) + penalization;
        if value < best.0 {
            best = (value, i);
        }
    }
    row_best[middle] = best.0;
    row_backpointers[middle] = best.1;

    if middle > endpoint_low {
        compute_row(
            cost,
            penalization,
            previous_row,
            row_best,
            row_backpointers,
            endpoint_low,
            middle,
            search_low,
            best.1 + 1,
        );
    }
    if middle + 1 < endpoint_high {
        compute_row(
            cost,
            penalization,
            previous_row,
            row_best,
            row_backpointers,
            middle + 1,
            endpoint_high,
            best.1,
            search_high,
        );
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::case::Case;
    use crate::config::Config;
    use crate::cost::CostModel;
    use crate::segment_count;

    use super::*;

    fn input(signal: Vec<f64>, penalization: f64, max_changepoints: usize) -> AlgorithmInput {
        let case = Case::synthetic("divide_conquer", signal).unwrap();
        AlgorithmInput::new(
            case,
            CostModel::Gaussian,
            penalization,
            max_changepoints,
            Config::default(),
        )
        .unwrap()
    }

    fn plateau_signal() -> Vec<f64> {
        let mut signal = Vec::new();
        for (block, level) in [(15, 1.0), (15, 8.0), (15, -2.0), (15, 4.0)] {
            signal.extend(std::iter::repeat(level).take(block));
        }
        for (index, value) in signal.iter_mut().enumerate() {
            *value += 0.15 * ((index % 4) as f64 - 1.5);
        }
        signal
    }

    #[test]
    fn matches_the_full_scan_on_gaussian_cost() {
        let input = input(plateau_signal(), 0.2, 3);
        let full = segment_count::solve(&input, input.penalization);
        let halved = solve(&input, input.penalization);
        assert_eq!(full.changepoints, halved.changepoints);
        assert_relative_eq!(full.cost, halved.cost, epsilon = 1e-9);
    }

    #[test]
    fn objective_rows_agree_at_the_full_prefix() {
        let input = input(plateau_signal(), 0.0, 4);
        let n = input.len();
        let full = segment_count::solve(&input, input.penalization);
        let halved = solve(&input, input.penalization);
        for row in 0..=4 {
            assert_relative_eq!(
                full.best_prefix[row][n],
                halved.best_prefix[row][n],
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn exact_count_on_two_plateaus() {
        let signal = vec![
            1.0, 1.0, 1.0, 1.0, 1.0, 5.0, 5.0, 5.0, 5.0, 5.0, 1.0, 1.0, 1.0, 1.0, 1.0,
        ];
        let outcome = solve(&input(signal, 0.0, 2), 0.0);
        assert_eq!(outcome.changepoints, vec![5, 10]);
        assert_relative_eq!(outcome.cost, 0.0, epsilon = 1e-9);
    }
}
