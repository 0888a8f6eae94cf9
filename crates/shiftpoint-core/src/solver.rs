//! Solver selection and dispatch.

use std::time::Instant;

use tracing::debug;

use crate::binseg;
use crate::divide_conquer;
use crate::error::{ChangepointError, Result};
use crate::penalized;
use crate::segment_count;
use crate::solution::{AlgorithmInput, Solution, SolverMetrics};

/// The segmentation algorithms. All of them consume the same
/// [`AlgorithmInput`] and produce a [`Solution`]; they differ in objective
/// (penalized vs. exact changepoint count), optimality and running time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Solver {
    /// Greedy top-down splitting; fast, not optimal.
    BinarySegmentation,
    /// O(n²) DP on the penalized objective; optimal.
    PenalizedPartition,
    /// PELT-style pruned variant of the penalized DP.
    PenalizedPartitionPruned,
    /// O(K·n²) DP over exact changepoint counts; optimal.
    SegmentCountPartition,
    /// Candidate-pruned variant of the count DP.
    SegmentCountPartitionPruned,
    /// Monotone-argmin divide and conquer over the count DP rows;
    /// O(K·n log n), optimal only under the quadrangle inequality.
    DivideConquerPartition,
}

impl Solver {
    /// Every solver, in a stable order.
    pub const ALL: [Solver; 6] = [
        Solver::BinarySegmentation,
        Solver::PenalizedPartition,
        Solver::PenalizedPartitionPruned,
        Solver::SegmentCountPartition,
        Solver::SegmentCountPartitionPruned,
        Solver::DivideConquerPartition,
    ];

    /// Stable identifier used in output files and logs.
    pub fn id(&self) -> &'static str {
        match self {
            Self::BinarySegmentation => "binary_segmentation",
            Self::PenalizedPartition => "penalized_partition",
            Self::PenalizedPartitionPruned => "penalized_partition_pruned",
            Self::SegmentCountPartition => "segment_count_partition",
            Self::SegmentCountPartitionPruned => "segment_count_partition_pruned",
            Self::DivideConquerPartition => "divide_and_conquer_partition",
        }
    }

    /// Look a solver up by its identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|solver| solver.id() == id)
    }

    /// Solve with the penalization stored in the input.
    pub fn solve(&self, input: &AlgorithmInput) -> Result<Solution> {
        self.solve_with_penalization(input, input.penalization)
    }

    /// Solve with an explicit penalization, leaving the input untouched.
    /// The selector's binary search drives this directly.
    pub fn solve_with_penalization(
        &self,
        input: &AlgorithmInput,
        penalization: f64,
    ) -> Result<Solution> {
        if input.is_empty() {
            return Err(ChangepointError::InvalidInput("empty signal".to_string()));
        }
        if !penalization.is_finite() || penalization < 0.0 {
            return Err(ChangepointError::InvalidPenalization(penalization));
        }

        let started = Instant::now();
        let mut solution = match self {
            Self::BinarySegmentation => {
                let (changepoints, cost) = binseg::solve(input, penalization);
                Solution {
                    changepoints,
                    metrics: SolverMetrics::new(cost, self.id(), 0.0),
                }
            }
            Self::PenalizedPartition => {
                let (changepoints, cost) = penalized::solve(input, penalization);
                Solution {
                    changepoints,
                    metrics: SolverMetrics::new(cost, self.id(), 0.0),
                }
            }
            Self::PenalizedPartitionPruned => {
                let (changepoints, cost) = penalized::solve_pruned(input, penalization);
                Solution {
                    changepoints,
                    metrics: SolverMetrics::new(cost, self.id(), 0.0),
                }
            }
            Self::SegmentCountPartition => {
                dp_solution(segment_count::solve(input, penalization), self.id())
            }
            Self::SegmentCountPartitionPruned => {
                dp_solution(segment_count::solve_pruned(input, penalization), self.id())
            }
            Self::DivideConquerPartition => {
                dp_solution(divide_conquer::solve(input, penalization), self.id())
            }
        };
        solution.metrics.execution_time = started.elapsed().as_secs_f64();

        if !solution.metrics.cost.is_finite() {
            return Err(ChangepointError::NumericAnomaly {
                solver: self.id(),
                value: solution.metrics.cost,
            });
        }
        debug!(
            solver = self.id(),
            changepoints = solution.changepoints.len(),
            cost = solution.metrics.cost,
            seconds = solution.metrics.execution_time,
            "solve finished"
        );
        Ok(solution)
    }
}

fn dp_solution(outcome: segment_count::DpOutcome, solver: &'static str) -> Solution {
    let mut metrics = SolverMetrics::new(outcome.cost, solver, 0.0);
    metrics.best_prefix = Some(outcome.best_prefix);
    metrics.backpointers = Some(outcome.backpointers);
    Solution {
        changepoints: outcome.changepoints,
        metrics,
    }
}
