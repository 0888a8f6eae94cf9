//! Offline changepoint detection for one-dimensional signals.
//!
//! This crate provides the detection engine: cost functions with O(1)
//! range queries, a family of segmentation solvers, penalization
//! selection, and evaluation against known changepoints.

mod binseg;
mod divide_conquer;
mod penalized;
mod segment_count;

pub mod case;
pub mod config;
pub mod cost;
pub mod error;
pub mod evaluate;
pub mod kernel;
pub mod selector;
pub mod solution;
pub mod solver;

// Re-exports for convenience
pub use case::{Case, CaseKind, PointLabel, DATE_FORMAT};
pub use config::Config;
pub use cost::{CostFunction, CostModel};
pub use error::{ChangepointError, Result};
pub use evaluate::classify_changepoints;
pub use kernel::{Kernel, DEFAULT_BANDWIDTH};
pub use selector::{Aggregation, PenalizationSelector};
pub use solution::{AlgorithmInput, Evaluation, Solution, SolverMetrics};
pub use solver::Solver;
