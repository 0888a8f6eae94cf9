//! Range-cost functions with O(1) queries after precomputation.
//!
//! Every solver asks for O(n²) or more range costs, so each variant builds
//! prefix tables once and answers queries in constant time: prefix sums for
//! the scalar costs, a full Gram-matrix prefix for the kernel cost.

use crate::config::Config;
use crate::error::{ChangepointError, Result};
use crate::kernel::Kernel;

/// Cost-function selection handed to [`CostFunction::precompute`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CostModel {
    /// Maximum-likelihood cost for a change in mean at fixed variance.
    Gaussian,
    /// Cost for a change in the rate of an exponential process.
    Exponential,
    /// Kernel-based cost, sensitive to general distribution changes.
    Kernel(Kernel),
}

impl CostModel {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gaussian => "gaussian",
            Self::Exponential => "exponential",
            Self::Kernel(_) => "kernel",
        }
    }
}

#[derive(Debug, Clone)]
enum CostTables {
    Gaussian {
        prefix_sum: Vec<f64>,
        prefix_sum_squares: Vec<f64>,
    },
    Exponential {
        prefix_sum: Vec<f64>,
    },
    Kernel {
        kernel: Kernel,
        /// Prefix sums of the Gram diagonal.
        diagonal: Vec<f64>,
        /// Flattened (n+1)×(n+1) 2-D prefix of the Gram matrix.
        gram: Vec<f64>,
    },
}

/// A cost function bound to one signal.
///
/// Constructed only through [`CostFunction::precompute`], so a cost can
/// never be queried before its tables exist. Queries are read-only and the
/// value may be shared freely across solver runs.
#[derive(Debug, Clone)]
pub struct CostFunction {
    model: CostModel,
    tables: CostTables,
    length: usize,
    epsilon: f64,
    infinity: f64,
}

/// Left-to-right prefix sums of `mapping` over the signal; index 0 is 0.
fn accumulate(signal: &[f64], mapping: impl Fn(f64) -> f64) -> Vec<f64> {
    let mut prefix = Vec::with_capacity(signal.len() + 1);
    let mut running = 0.0;
    prefix.push(0.0);
    for &value in signal {
        running += mapping(value);
        prefix.push(running);
    }
    prefix
}

impl CostFunction {
    /// Validate the signal and build the prefix tables for `model`.
    ///
    /// Runs in O(n) for the scalar variants and O(n²) time and memory for
    /// the kernel variant.
    pub fn precompute(model: CostModel, signal: &[f64], config: &Config) -> Result<Self> {
        if signal.is_empty() {
            return Err(ChangepointError::InvalidInput("empty signal".to_string()));
        }
        if let Some((index, &value)) = signal.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ChangepointError::NonFiniteValue { index, value });
        }
        let tables = match model {
            CostModel::Gaussian => CostTables::Gaussian {
                prefix_sum: accumulate(signal, |x| x),
                prefix_sum_squares: accumulate(signal, |x| x * x),
            },
            CostModel::Exponential => CostTables::Exponential {
                prefix_sum: accumulate(signal, |x| x),
            },
            CostModel::Kernel(kernel) => {
                let (diagonal, gram) = precompute_gram(signal, &kernel);
                CostTables::Kernel {
                    kernel,
                    diagonal,
                    gram,
                }
            }
        };
        Ok(Self {
            model,
            tables,
            length: signal.len(),
            epsilon: config.epsilon,
            infinity: config.infinity,
        })
    }

    pub fn model(&self) -> &CostModel {
        &self.model
    }

    pub fn name(&self) -> &'static str {
        self.model.name()
    }

    /// Length of the signal the tables were built from.
    pub fn signal_len(&self) -> usize {
        self.length
    }

    /// Cost of treating `[start, end)` as a single regime.
    ///
    /// Empty ranges answer the infinity sentinel so the min-selection in
    /// the solvers never picks them.
    pub fn range_cost(&self, start: usize, end: usize) -> f64 {
        if end <= start {
            return self.infinity;
        }
        let length = (end - start) as f64;
        match &self.tables {
            CostTables::Gaussian {
                prefix_sum,
                prefix_sum_squares,
            } => {
                let inv_length = 1.0 / length;
                let linear_sum = prefix_sum[end] - prefix_sum[start];
                let square_sum = prefix_sum_squares[end] - prefix_sum_squares[start];
                inv_length * square_sum - inv_length * inv_length * linear_sum * linear_sum
            }
            CostTables::Exponential { prefix_sum } => {
                let sum = prefix_sum[end] - prefix_sum[start];
                length / sum.max(self.epsilon)
            }
            CostTables::Kernel { diagonal, gram, .. } => {
                let stride = self.length + 1;
                let block = gram[end * stride + end] - gram[start * stride + end]
                    - gram[end * stride + start]
                    + gram[start * stride + start];
                diagonal[end] - diagonal[start] - block / length
            }
        }
    }

    /// Kernel used by the cost, when there is one.
    pub fn kernel(&self) -> Option<&Kernel> {
        match &self.tables {
            CostTables::Kernel { kernel, .. } => Some(kernel),
            _ => None,
        }
    }
}

/// Build the diagonal prefix and the flattened 2-D prefix
/// `G[i][j] = Σ_{a<i, b<j} K(x_a, x_b)`.
fn precompute_gram(signal: &[f64], kernel: &Kernel) -> (Vec<f64>, Vec<f64>) {
    let n = signal.len();
    let stride = n + 1;
    let diagonal = accumulate(signal, |x| kernel.similarity(x, x));
    let mut gram = vec![0.0; stride * stride];
    for i in 0..n {
        for j in 0..n {
            gram[(i + 1) * stride + (j + 1)] = kernel.similarity(signal[i], signal[j])
                + gram[i * stride + (j + 1)]
                + gram[(i + 1) * stride + j]
                - gram[i * stride + j];
        }
    }
    (diagonal, gram)
}
