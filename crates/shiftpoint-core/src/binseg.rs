//! Greedy binary segmentation.
//!
//! Expected O(n log n) runtime with an O(n²) worst case. The recursion is
//! driven by an explicit work stack so deep splits cannot exhaust the call
//! stack.

use crate::solution::AlgorithmInput;

/// Split `[start, end)` at the boundary minimizing
/// `c(start, p) + c(p, end) + β`, accept the split only when it beats
/// keeping the range whole, and recurse into both halves.
pub(crate) fn solve(input: &AlgorithmInput, penalization: f64) -> (Vec<usize>, f64) {
    let cost = &input.cost;
    let mut changepoints = Vec::new();
    let mut total_cost = 0.0;
    let mut pending = vec![(0usize, input.len())];

    while let Some((start, end)) = pending.pop() {
        let mut candidate: Option<(f64, usize)> = None;
        for position in (start + 1)..end {
            let split_cost =
                cost.range_cost(start, position) + cost.range_cost(position, end) + penalization;
            // Strict comparison keeps the earliest position on ties.
            if candidate.map_or(true, |(best, _)| split_cost < best) {
                candidate = Some((split_cost, position));
            }
        }
        match candidate {
            Some((split_cost, position)) if split_cost < cost.range_cost(start, end) => {
                changepoints.push(position);
                total_cost += penalization;
                pending.push((start, position));
                pending.push((position, end));
            }
            _ => total_cost += cost.range_cost(start, end),
        }
    }

    changepoints.sort_unstable();
    (changepoints, total_cost)
}
