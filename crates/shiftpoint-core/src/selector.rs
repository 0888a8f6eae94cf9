//! Penalization selection.
//!
//! β is a free hyperparameter of every penalized formulation. The
//! selectors here guess a reasonable changepoint count from the objective
//! curve of a kernel-cost DP run and then realize it as a concrete β by
//! binary search over the greedy solver.

use tracing::{debug, info};

use crate::case::{Case, CaseKind};
use crate::config::Config;
use crate::cost::CostModel;
use crate::divide_conquer;
use crate::error::{ChangepointError, Result};
use crate::kernel::Kernel;
use crate::segment_count;
use crate::solution::AlgorithmInput;
use crate::solver::Solver;

/// How the silhouette selector folds a set of similarities into a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Mean,
    Median,
    Min,
    Max,
    /// Mean of squared values.
    SquaredMean,
    /// Nearest-rank percentile, `0 < p <= 100`.
    Percentile(u8),
}

impl Aggregation {
    pub fn apply(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        match self {
            Self::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Self::Median => median(values),
            Self::Min => values.iter().cloned().fold(f64::INFINITY, f64::min),
            Self::Max => values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            Self::SquaredMean => {
                values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64
            }
            Self::Percentile(p) => percentile(values, *p),
        }
    }
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

fn median(values: &[f64]) -> f64 {
    let sorted = sorted(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        0.5 * (sorted[mid - 1] + sorted[mid])
    } else {
        sorted[mid]
    }
}

fn percentile(values: &[f64], p: u8) -> f64 {
    let sorted = sorted(values);
    let rank = ((p as f64 / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// Strategy for choosing β and the changepoint cap of a case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PenalizationSelector {
    /// Fixed per-case-kind defaults, no signal inspection.
    Fixed,
    /// Guess the count at the elbow of the objective curve.
    Elbow,
    /// Score candidate counts by kernel silhouette.
    Silhouette {
        inner: Aggregation,
        signal: Aggregation,
    },
}

impl PenalizationSelector {
    /// Silhouette selector with the default (median, median) aggregations.
    pub fn silhouette() -> Self {
        Self::Silhouette {
            inner: Aggregation::Median,
            signal: Aggregation::Median,
        }
    }

    /// Choose `(penalization, max_changepoints)` for `case`.
    pub fn select(&self, case: &Case, config: &Config) -> Result<(f64, usize)> {
        match self {
            Self::Fixed => {
                let penalization = match case.kind() {
                    CaseKind::Synthetic => config.synthetic_penalization,
                    CaseKind::Real => config.real_penalization,
                };
                Ok((penalization, config.default_max_changepoints))
            }
            Self::Elbow | Self::Silhouette { .. } => self.select_from_curve(case, config),
        }
    }

    fn select_from_curve(&self, case: &Case, config: &Config) -> Result<(f64, usize)> {
        let changepoints_bound = config
            .changepoints_bound
            .min((case.len() as f64).sqrt().floor() as usize);
        let kernel = Kernel::default();
        let input = AlgorithmInput::new(
            case.clone(),
            CostModel::Kernel(kernel),
            0.0,
            changepoints_bound,
            *config,
        )?;
        let outcome = divide_conquer::solve(&input, 0.0);
        let length = input.len();
        let objective: Vec<f64> = outcome
            .best_prefix
            .iter()
            .map(|row| row[length])
            .collect();

        let guessed = match self {
            Self::Elbow => guess_elbow(&objective, config.elbow_tolerance),
            Self::Silhouette { inner, signal } => guess_silhouette(
                case.signal(),
                &kernel,
                &outcome.backpointers,
                &objective,
                *inner,
                *signal,
                config.epsilon,
            ),
            Self::Fixed => unreachable!("fixed policy handled in select"),
        };
        debug!(guessed, changepoints_bound, "selector guessed count");

        let penalization = realize_penalization(&input, guessed, config)?;
        info!(case = case.name(), penalization, guessed, "penalization selected");
        Ok((penalization, guessed))
    }
}

/// Scan the objective curve for the point where improvements flatten out.
///
/// `objective[k]` is the cost at exactly `k` changepoints. While the curve
/// is still dropping substantially the best guess trails the scan by one;
/// the scan stops once consecutive deltas look linear and the drop is no
/// longer substantial.
fn guess_elbow(objective: &[f64], tolerance: f64) -> usize {
    if objective.len() < 3 {
        return 0;
    }
    let bound = objective.len() - 1;
    let mut guess = 0;
    for k in 1..bound {
        let delta = objective[k - 1] - objective[k];
        let delta_next = objective[k] - objective[k + 1];
        let relatively_linear = delta < delta_next * tolerance;
        let decreasing_substantially = delta > objective[0] * (tolerance - 1.0);
        if decreasing_substantially {
            guess = k - 1;
        }
        if relatively_linear && !decreasing_substantially {
            return guess;
        }
    }
    bound - 1
}

/// Score every candidate count by how well its partition separates the
/// signal under the kernel, discounted by objective value and count.
#[allow(clippy::too_many_arguments)]
fn guess_silhouette(
    signal: &[f64],
    kernel: &Kernel,
    backpointers: &[Vec<usize>],
    objective: &[f64],
    inner: Aggregation,
    over_signal: Aggregation,
    epsilon: f64,
) -> usize {
    let bound = objective.len() - 1;
    if bound == 0 {
        return 0;
    }
    let silhouettes: Vec<f64> = (1..=bound)
        .map(|k| {
            let changepoints = segment_count::retrieve_changepoints(backpointers, k);
            partition_silhouette(signal, kernel, &changepoints, inner, over_signal)
        })
        .collect();
    let max_silhouette = silhouettes
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);
    let silhouette_scale = if max_silhouette.abs() < epsilon {
        1.0
    } else {
        max_silhouette
    };
    let min_objective = objective.iter().cloned().fold(f64::INFINITY, f64::min);

    let mut best = (f64::NEG_INFINITY, 1);
    for k in 1..=bound {
        let score = (silhouettes[k - 1] / silhouette_scale)
            * (min_objective / objective[k].max(epsilon))
            * (-(k as f64) / bound as f64).exp();
        if score > best.0 {
            best = (score, k);
        }
    }
    best.1
}

/// Mean silhouette-style separation of a partition: each point contrasts
/// its within-segment similarity against the best neighbouring segment.
fn partition_silhouette(
    signal: &[f64],
    kernel: &Kernel,
    changepoints: &[usize],
    inner: Aggregation,
    over_signal: Aggregation,
) -> f64 {
    let mut bounds = Vec::with_capacity(changepoints.len() + 2);
    bounds.push(0);
    bounds.extend_from_slice(changepoints);
    bounds.push(signal.len());

    let aggregate = |point: f64, start: usize, end: usize| -> f64 {
        let similarities: Vec<f64> = signal[start..end]
            .iter()
            .map(|&other| kernel.similarity(point, other))
            .collect();
        inner.apply(&similarities)
    };

    let mut scores = Vec::with_capacity(signal.len());
    for segment in 0..bounds.len() - 1 {
        let (start, end) = (bounds[segment], bounds[segment + 1]);
        for t in start..end {
            let own = aggregate(signal[t], start, end);
            let previous = if segment > 0 {
                aggregate(signal[t], bounds[segment - 1], start)
            } else {
                0.0
            };
            let next = if segment + 2 < bounds.len() {
                aggregate(signal[t], end, bounds[segment + 2])
            } else {
                0.0
            };
            let neighbour = previous.max(next);
            let denominator = own.max(neighbour);
            scores.push(if denominator > 0.0 {
                (own - neighbour) / denominator
            } else {
                0.0
            });
        }
    }
    over_signal.apply(&scores)
}

/// Binary-search the smallest β at which greedy segmentation produces at
/// most `target` changepoints. The bracket is `[0, n·c(0,n)]` and the
/// search must converge within its theoretical iteration budget.
fn realize_penalization(
    input: &AlgorithmInput,
    target: usize,
    config: &Config,
) -> Result<f64> {
    let length = input.len();
    let mut low = 0.0;
    let mut high = length as f64 * input.cost.range_cost(0, length);
    if high <= low {
        return Ok(low);
    }
    let budget = ((high - low) / config.epsilon).log2().ceil() as usize + 2;

    let mut iterations = 0;
    while high - low > config.epsilon {
        iterations += 1;
        if iterations > budget {
            return Err(ChangepointError::SelectorDiverged { iterations });
        }
        let middle = 0.5 * (low + high);
        let solution = Solver::BinarySegmentation.solve_with_penalization(input, middle)?;
        if solution.changepoints.len() > target {
            low = middle;
        } else {
            high = middle;
        }
    }
    Ok(low)
}
