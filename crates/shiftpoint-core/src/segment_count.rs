//! Optimal partition with the changepoint count in the DP state.
//!
//! `F[k][e]` is the best cost of partitioning `[0, e)` with exactly `k`
//! changepoints; `F[0][e] = c(0, e)` and
//! `F[k][e] = min_{i < e} F[k−1][i] + c(i, e) + β`. O(K·n²), with a pruned
//! variant that restricts the predecessor scan per row.
//!
//! β is charged on every cut so the objective stays comparable across the
//! penalized solvers.

use crate::solution::AlgorithmInput;

/// DP tables plus the recovered partition; the tables travel out with the
/// solution so the penalization selector can read the whole objective
/// curve without re-solving.
pub(crate) struct DpOutcome {
    pub changepoints: Vec<usize>,
    pub cost: f64,
    pub best_prefix: Vec<Vec<f64>>,
    pub backpointers: Vec<Vec<usize>>,
}

/// Allocate the tables and seed row 0 with whole-prefix costs.
fn initialize(input: &AlgorithmInput) -> (Vec<Vec<f64>>, Vec<Vec<usize>>) {
    let length = input.len() + 1;
    let rows = input.max_changepoints + 1;
    let mut best_prefix = vec![vec![input.config.infinity; length]; rows];
    let backpointers = vec![vec![0usize; length]; rows];
    for end in 0..length {
        best_prefix[0][end] = input.cost.range_cost(0, end);
    }
    (best_prefix, backpointers)
}

/// Recover the partition that uses exactly `changepoints_used` cuts by
/// descending the backpointer rows from the full prefix.
///
/// The walk stops early once the chain reaches prefix 0 or stops
/// shrinking, which keeps the output strictly increasing inside `(0, n)`
/// when the requested count exceeds what the signal supports.
pub(crate) fn retrieve_changepoints(
    backpointers: &[Vec<usize>],
    changepoints_used: usize,
) -> Vec<usize> {
    let mut changepoints = Vec::new();
    let mut at = backpointers[0].len() - 1;
    for row in (1..=changepoints_used).rev() {
        let previous = backpointers[row][at];
        if previous == 0 || previous >= at {
            break;
        }
        changepoints.push(previous);
        at = previous;
    }
    changepoints.reverse();
    changepoints
}

/// Smallest-index argmin of `F[k−1][i] + c(i, end) + β` over `candidates`.
fn best_predecessor(
    input: &AlgorithmInput,
    previous_row: &[f64],
    candidates: impl Iterator<Item = usize>,
    end: usize,
    penalization: f64,
) -> (f64, usize) {
    let mut best = (f64::INFINITY, 0);
    for i in candidates {
        let value = previous_row[i] + input.cost.range_cost(i, end) + penalization;
        if value < best.0 {
            best = (value, i);
        }
    }
    best
}

pub(crate) fn solve(input: &AlgorithmInput, penalization: f64) -> DpOutcome {
    let length = input.len() + 1;
    let (mut best_prefix, mut backpointers) = initialize(input);

    for row in 1..=input.max_changepoints {
        let (previous_rows, current_rows) = best_prefix.split_at_mut(row);
        let previous_row = &previous_rows[row - 1];
        for end in 1..length {
            let (value, argmin) =
                best_predecessor(input, previous_row, 0..end, end, penalization);
            current_rows[0][end] = value;
            backpointers[row][end] = argmin;
        }
    }

    let cost = best_prefix[input.max_changepoints][length - 1];
    DpOutcome {
        changepoints: retrieve_changepoints(&backpointers, input.max_changepoints),
        cost,
        best_prefix,
        backpointers,
    }
}

pub(crate) fn solve_pruned(input: &AlgorithmInput, penalization: f64) -> DpOutcome {
    let length = input.len() + 1;
    let k_term = crate::penalized::pruning_term(input);
    let (mut best_prefix, mut backpointers) = initialize(input);

    for row in 1..=input.max_changepoints {
        let (previous_rows, current_rows) = best_prefix.split_at_mut(row);
        let previous_row = &previous_rows[row - 1];
        let current_row = &mut current_rows[0];
        let mut candidates: Vec<usize> = vec![0];
        for end in 1..length {
            let (value, argmin) = best_predecessor(
                input,
                previous_row,
                candidates.iter().copied(),
                end,
                penalization,
            );
            current_row[end] = value;
            backpointers[row][end] = argmin;
            candidates.retain(|&i| {
                previous_row[i] + input.cost.range_cost(i, end) + k_term <= current_row[end]
            });
            candidates.push(end);
        }
    }

    let cost = best_prefix[input.max_changepoints][length - 1];
    DpOutcome {
        changepoints: retrieve_changepoints(&backpointers, input.max_changepoints),
        cost,
        best_prefix,
        backpointers,
    }
}
