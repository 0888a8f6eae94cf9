//! Per-case orchestration: selector, solver fan-out, evaluation and
//! persistence.

use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{info, warn};

use shiftpoint_core::{
    classify_changepoints, AlgorithmInput, Case, Config, CostModel, PenalizationSelector,
    Solution, Solver,
};

use crate::io::{write_changepoints, write_metrics};

/// What to run for each case.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub selector: PenalizationSelector,
    pub cost_model: CostModel,
    pub solvers: Vec<Solver>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            selector: PenalizationSelector::Fixed,
            cost_model: CostModel::Gaussian,
            solvers: Solver::ALL.to_vec(),
        }
    }
}

/// Solve one case with every configured solver and write the `.out` and
/// `.metrics` files into `out_dir`.
///
/// The cost tables are precomputed once and shared read-only across the
/// parallel solver runs.
pub fn run_case(
    case: &Case,
    ground_truth: Option<&[usize]>,
    out_dir: &Path,
    options: &RunOptions,
    config: &Config,
) -> Result<()> {
    let (penalization, max_changepoints) = options
        .selector
        .select(case, config)
        .context("selecting penalization")?;
    info!(
        case = case.name(),
        penalization,
        max_changepoints,
        cost_function = options.cost_model.name(),
        "solving case"
    );

    let input = AlgorithmInput::new(
        case.clone(),
        options.cost_model,
        penalization,
        max_changepoints,
        *config,
    )?;

    let mut solutions: Vec<(Solver, Solution)> = options
        .solvers
        .par_iter()
        .map(|solver| solver.solve(&input).map(|solution| (*solver, solution)))
        .collect::<shiftpoint_core::Result<_>>()?;

    for (solver, solution) in &mut solutions {
        if let Some(truth) = ground_truth {
            solution.metrics.evaluation = Some(classify_changepoints(
                truth,
                &solution.changepoints,
                config.window_threshold,
            ));
        }
        let out_path = out_dir.join(format!("{}_{}.out", case.name(), solver.id()));
        write_changepoints(&out_path, &solution.changepoints)?;
        info!(
            case = case.name(),
            solver = solver.id(),
            changepoints = solution.changepoints.len(),
            cost = solution.metrics.cost,
            seconds = solution.metrics.execution_time,
            "solver finished"
        );
    }

    let metrics_path = out_dir.join(format!("{}.metrics", case.name()));
    let solutions: Vec<Solution> = solutions.into_iter().map(|(_, solution)| solution).collect();
    write_metrics(&metrics_path, case, options.cost_model.name(), &solutions)?;
    Ok(())
}

/// Run a whole directory of cases, skipping (and logging) the ones that
/// fail so a single bad case does not abort the batch.
pub fn run_batch(
    cases: &[(Case, Option<Vec<usize>>)],
    out_dir: &Path,
    options: &RunOptions,
    config: &Config,
) -> usize {
    let mut failures = 0;
    for (case, ground_truth) in cases {
        if let Err(error) = run_case(case, ground_truth.as_deref(), out_dir, options, config) {
            warn!(case = case.name(), %error, "case failed");
            failures += 1;
        }
    }
    failures
}
