//! Error types for the changepoint detection engine.

use thiserror::Error;

/// Result type for detection operations.
pub type Result<T> = std::result::Result<T, ChangepointError>;

/// Error types for detection operations.
#[derive(Error, Debug)]
pub enum ChangepointError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Non-finite value at index {index}: {value}")]
    NonFiniteValue { index: usize, value: f64 },

    #[error("Invalid penalization {0}: must be non-negative and finite")]
    InvalidPenalization(f64),

    #[error("Numeric anomaly in solver '{solver}': objective evaluated to {value}")]
    NumericAnomaly { solver: &'static str, value: f64 },

    #[error("Penalization search did not converge within {iterations} iterations")]
    SelectorDiverged { iterations: usize },

    #[error("Mismatched metadata: {needed} timestamps needed, got {got}")]
    MismatchedMetadata { needed: usize, got: usize },
}
