//! Input and output contracts shared by the solvers.

use crate::case::Case;
use crate::config::Config;
use crate::cost::{CostFunction, CostModel};
use crate::error::{ChangepointError, Result};

/// Everything a solver needs for one run. Owned by the caller; solvers
/// only borrow it while solving.
#[derive(Debug, Clone)]
pub struct AlgorithmInput {
    pub case: Case,
    pub cost: CostFunction,
    /// Per-changepoint charge β added to the objective.
    pub penalization: f64,
    /// Cap on the number of changepoints for the count-in-state solvers.
    pub max_changepoints: usize,
    pub config: Config,
}

impl AlgorithmInput {
    /// Validate the parameters and precompute the cost tables for `model`.
    pub fn new(
        case: Case,
        model: CostModel,
        penalization: f64,
        max_changepoints: usize,
        config: Config,
    ) -> Result<Self> {
        if !penalization.is_finite() || penalization < 0.0 {
            return Err(ChangepointError::InvalidPenalization(penalization));
        }
        let cost = CostFunction::precompute(model, case.signal(), &config)?;
        Ok(Self {
            case,
            cost,
            penalization,
            max_changepoints,
            config,
        })
    }

    /// Signal length.
    pub fn len(&self) -> usize {
        self.case.len()
    }

    pub fn is_empty(&self) -> bool {
        self.case.is_empty()
    }
}

/// Outcome of matching predicted changepoints against a ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    /// Predicted changepoints matched to a true one within the window.
    pub correct: usize,
    /// Predicted changepoints with no true counterpart.
    pub incorrect: usize,
    /// True changepoints no prediction accounted for.
    pub not_found: usize,
}

/// Per-run measurements attached to a [`Solution`].
#[derive(Debug, Clone)]
pub struct SolverMetrics {
    /// Objective value of the returned partition.
    pub cost: f64,
    /// Identifier of the solver that produced the solution.
    pub solver: &'static str,
    /// Wall-clock solve time in seconds.
    pub execution_time: f64,
    /// `F[k][e]` table of the count-in-state solvers; shared read-only
    /// with the penalization selector.
    pub best_prefix: Option<Vec<Vec<f64>>>,
    /// `A[k][e]` argmin table matching `best_prefix`.
    pub backpointers: Option<Vec<Vec<usize>>>,
    /// Filled in by the evaluator when a ground truth is available.
    pub evaluation: Option<Evaluation>,
}

impl SolverMetrics {
    pub fn new(cost: f64, solver: &'static str, execution_time: f64) -> Self {
        Self {
            cost,
            solver,
            execution_time,
            best_prefix: None,
            backpointers: None,
            evaluation: None,
        }
    }
}

/// A segmentation of the signal: strictly increasing changepoint indices
/// in `(0, n)` plus the metrics of the run. Immutable once returned.
#[derive(Debug, Clone)]
pub struct Solution {
    pub changepoints: Vec<usize>,
    pub metrics: SolverMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_penalization() {
        let case = Case::synthetic("case", vec![1.0, 2.0]).unwrap();
        let result = AlgorithmInput::new(case, CostModel::Gaussian, -1.0, 5, Config::default());
        assert!(matches!(
            result,
            Err(ChangepointError::InvalidPenalization(_))
        ));
    }

    #[test]
    fn precomputes_cost_on_construction() {
        let case = Case::synthetic("case", vec![1.0, 2.0, 3.0]).unwrap();
        let input =
            AlgorithmInput::new(case, CostModel::Gaussian, 0.5, 5, Config::default()).unwrap();
        assert_eq!(input.cost.signal_len(), 3);
        assert!(input.cost.range_cost(0, 3).is_finite());
    }
}
