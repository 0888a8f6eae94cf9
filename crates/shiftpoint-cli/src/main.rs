//! Batch driver for the shiftpoint changepoint detection engine.
//!
//! Three subcommands: `generate` writes synthetic cases with known
//! changepoints, `run` solves a single case, and `batch` sweeps a case
//! directory, fanning the solvers of each case out over a thread pool.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use shiftpoint_core::{
    Case, CaseKind, Config, CostModel, Kernel, PenalizationSelector, DEFAULT_BANDWIDTH,
};

mod generator;
mod io;
mod runner;

use runner::RunOptions;

/// Detect changepoints in one-dimensional signals
#[derive(Parser, Debug)]
#[command(name = "shiftpoint")]
#[command(about = "Detect changepoints in one-dimensional signals")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate batches of synthetic cases with known changepoints
    Generate {
        /// Directory receiving generated/ and solutions/ subdirectories
        #[arg(long)]
        out_dir: PathBuf,

        /// Seed for the case generator
        #[arg(long, default_value_t = generator::DEFAULT_SEED)]
        seed: u64,

        /// Cases generated per signal family
        #[arg(long, default_value_t = 10)]
        cases_per_type: usize,

        /// Size of the smallest case; case i has size batch_size * (i + 1)
        #[arg(long, default_value_t = 1000)]
        batch_size: usize,
    },

    /// Solve a single case file
    Run {
        /// Path to the .in case file
        case: PathBuf,

        /// Treat the case as a real-world signal with a timestamp line
        #[arg(long)]
        real: bool,

        /// Ground-truth .out file to evaluate against
        #[arg(long)]
        truth: Option<PathBuf>,

        /// Output directory; defaults to the case's directory
        #[arg(long)]
        out_dir: Option<PathBuf>,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Solve every case in a directory
    Batch {
        /// Directory with a generated/ + solutions/ layout (synthetic) or
        /// flat .in files (real)
        cases_dir: PathBuf,

        /// Treat the cases as real-world signals
        #[arg(long)]
        real: bool,

        /// Output directory; defaults to <cases_dir>/output
        #[arg(long)]
        out_dir: Option<PathBuf>,

        #[command(flatten)]
        options: OptionArgs,
    },
}

#[derive(Args, Debug)]
struct OptionArgs {
    /// Strategy choosing the penalization and changepoint cap
    #[arg(long, value_enum, default_value_t = SelectorArg::Fixed)]
    selector: SelectorArg,

    /// Cost function to solve with
    #[arg(long, value_enum, default_value_t = CostArg::Gaussian)]
    cost: CostArg,

    /// Bandwidth of the kernel cost
    #[arg(long, default_value_t = DEFAULT_BANDWIDTH)]
    bandwidth: f64,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum SelectorArg {
    Fixed,
    Elbow,
    Silhouette,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum CostArg {
    Gaussian,
    Exponential,
    Kernel,
}

impl OptionArgs {
    fn run_options(&self) -> RunOptions {
        let selector = match self.selector {
            SelectorArg::Fixed => PenalizationSelector::Fixed,
            SelectorArg::Elbow => PenalizationSelector::Elbow,
            SelectorArg::Silhouette => PenalizationSelector::silhouette(),
        };
        let cost_model = match self.cost {
            CostArg::Gaussian => CostModel::Gaussian,
            CostArg::Exponential => CostModel::Exponential,
            CostArg::Kernel => CostModel::Kernel(Kernel::laplace(self.bandwidth)),
        };
        RunOptions {
            selector,
            cost_model,
            ..RunOptions::default()
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::default();

    match cli.command {
        Command::Generate {
            out_dir,
            seed,
            cases_per_type,
            batch_size,
        } => generator::generate_batch(&out_dir, seed, cases_per_type, batch_size),
        Command::Run {
            case,
            real,
            truth,
            out_dir,
            options,
        } => {
            let kind = if real { CaseKind::Real } else { CaseKind::Synthetic };
            let parsed = io::read_case(&case, kind)?;
            let ground_truth = truth.as_deref().map(io::read_ground_truth).transpose()?;
            let out_dir = match out_dir {
                Some(dir) => dir,
                None => match case.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                    _ => PathBuf::from("."),
                },
            };
            std::fs::create_dir_all(&out_dir).context("creating output directory")?;
            runner::run_case(
                &parsed,
                ground_truth.as_deref(),
                &out_dir,
                &options.run_options(),
                &config,
            )
        }
        Command::Batch {
            cases_dir,
            real,
            out_dir,
            options,
        } => {
            let kind = if real { CaseKind::Real } else { CaseKind::Synthetic };
            let cases = collect_cases(&cases_dir, kind)?;
            anyhow::ensure!(!cases.is_empty(), "no cases under {}", cases_dir.display());
            let out_dir = out_dir.unwrap_or_else(|| cases_dir.join("output"));
            std::fs::create_dir_all(&out_dir).context("creating output directory")?;
            let failures =
                runner::run_batch(&cases, &out_dir, &options.run_options(), &config);
            anyhow::ensure!(failures == 0, "{failures} case(s) failed");
            Ok(())
        }
    }
}

/// Collect `(case, ground truth)` pairs. Synthetic batches follow the
/// generator layout (`generated/*.in` + `solutions/*.out`); real batches
/// are flat directories of `.in` files.
fn collect_cases(cases_dir: &std::path::Path, kind: CaseKind) -> Result<Vec<(Case, Option<Vec<usize>>)>> {
    let input_dir = match kind {
        CaseKind::Synthetic => cases_dir.join("generated"),
        CaseKind::Real => cases_dir.to_path_buf(),
    };
    let mut cases = Vec::new();
    let entries = std::fs::read_dir(&input_dir)
        .with_context(|| format!("listing {}", input_dir.display()))?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().is_some_and(|extension| extension == "in"))
        .collect();
    paths.sort();

    for path in paths {
        let case = io::read_case(&path, kind)?;
        let ground_truth = match kind {
            CaseKind::Synthetic => {
                let truth_path = cases_dir
                    .join("solutions")
                    .join(format!("{}.out", case.name()));
                truth_path
                    .exists()
                    .then(|| io::read_ground_truth(&truth_path))
                    .transpose()?
            }
            CaseKind::Real => None,
        };
        cases.push((case, ground_truth));
    }
    Ok(cases)
}
