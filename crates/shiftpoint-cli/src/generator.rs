//! Synthetic case generation.
//!
//! Each family draws fresh distribution parameters at every changepoint,
//! so the generated signal switches regime exactly at the recorded
//! positions. Cases and their solutions are written as `.in`/`.out` pairs.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::distribution::{Exp, Normal, Uniform};
use tracing::info;

use crate::io::write_changepoints;

/// Seed used when the caller does not provide one.
pub const DEFAULT_SEED: u64 = 23;

/// Parameters of one generated case.
#[derive(Debug, Clone, Copy)]
pub struct CaseParameters {
    /// Length of the signal.
    pub size: usize,
    /// Number of changepoints to place.
    pub changepoints: usize,
    /// Fixed mean for the variance family.
    pub mu: f64,
    /// Fixed standard deviation for the mean and dependant families.
    pub sigma: f64,
    /// Bounds for the per-segment mean draw.
    pub mu_low: f64,
    pub mu_high: f64,
    /// Bounds for the per-segment standard deviation draw.
    pub sigma_low: f64,
    pub sigma_high: f64,
    /// Bounds for the per-segment exponential scale draw.
    pub lambda_low: f64,
    pub lambda_high: f64,
}

/// The regime-switching families the generator supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalFamily {
    /// Gaussian draws with a new mean per segment.
    Mean,
    /// Gaussian draws with a new standard deviation per segment.
    Variance,
    /// Exponential draws with a new scale per segment.
    Exponential,
    /// Autoregressive blend of previous values and fresh Gaussian draws.
    Dependant,
}

impl SignalFamily {
    pub const ALL: [SignalFamily; 4] = [
        SignalFamily::Mean,
        SignalFamily::Variance,
        SignalFamily::Exponential,
        SignalFamily::Dependant,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Variance => "variance",
            Self::Exponential => "exponential",
            Self::Dependant => "dependant",
        }
    }
}

/// Pick `changepoints` distinct interior positions and return the segment
/// lengths between them together with the sorted positions.
fn changepoint_layout(
    size: usize,
    changepoints: usize,
    rng: &mut StdRng,
) -> (Vec<usize>, Vec<usize>) {
    if size < 2 {
        return (vec![size], Vec::new());
    }
    let amount = changepoints.min(size - 1);
    let mut positions: Vec<usize> = rand::seq::index::sample(rng, size - 1, amount)
        .into_iter()
        .map(|index| index + 1)
        .collect();
    positions.sort_unstable();

    let mut gaps = Vec::with_capacity(positions.len() + 1);
    let mut previous = 0;
    for &position in &positions {
        gaps.push(position - previous);
        previous = position;
    }
    gaps.push(size - previous);
    (gaps, positions)
}

fn uniform_draw(low: f64, high: f64, rng: &mut StdRng) -> Result<f64> {
    if high <= low {
        return Ok(low);
    }
    let uniform = Uniform::new(low, high).context("building uniform distribution")?;
    Ok(uniform.sample(rng))
}

/// Generate a signal of `parameters.size` values whose regime switches at
/// each returned changepoint.
pub fn generate(
    family: SignalFamily,
    parameters: &CaseParameters,
    rng: &mut StdRng,
) -> Result<(Vec<f64>, Vec<usize>)> {
    let (gaps, changepoints) = changepoint_layout(parameters.size, parameters.changepoints, rng);
    let mut signal = Vec::with_capacity(parameters.size);

    match family {
        SignalFamily::Mean => {
            for &gap in &gaps {
                let mu = uniform_draw(parameters.mu_low, parameters.mu_high, rng)?;
                let normal = Normal::new(mu, parameters.sigma).context("building normal")?;
                signal.extend((0..gap).map(|_| normal.sample(rng)));
            }
        }
        SignalFamily::Variance => {
            for &gap in &gaps {
                let sigma = uniform_draw(parameters.sigma_low, parameters.sigma_high, rng)?;
                let normal = Normal::new(parameters.mu, sigma).context("building normal")?;
                signal.extend((0..gap).map(|_| normal.sample(rng)));
            }
        }
        SignalFamily::Exponential => {
            for &gap in &gaps {
                let scale = uniform_draw(parameters.lambda_low, parameters.lambda_high, rng)?;
                let exponential = Exp::new(1.0 / scale).context("building exponential")?;
                signal.extend((0..gap).map(|_| exponential.sample(rng)));
            }
        }
        SignalFamily::Dependant => {
            // Warm-up values consume the head of the first segment.
            signal.extend([0.0, 0.0, 0.0]);
            let blend = [0.5, 0.4, 0.099];
            let innovation_weight = 0.01;
            for (index, &gap) in gaps.iter().enumerate() {
                let gap = if index == 0 { gap.saturating_sub(3) } else { gap };
                let mu = uniform_draw(parameters.mu_low, parameters.mu_high, rng)?;
                let normal = Normal::new(mu, parameters.sigma).context("building normal")?;
                for _ in 0..gap {
                    let recent = blend[0] * signal[signal.len() - 1]
                        + blend[1] * signal[signal.len() - 2]
                        + blend[2] * signal[signal.len() - 3];
                    signal.push(recent + innovation_weight * normal.sample(rng));
                }
            }
            // The warm-up can overshoot when the first segment is shorter
            // than three samples.
            signal.truncate(parameters.size);
        }
    }
    Ok((signal, changepoints))
}

/// Generate `cases_per_type` cases per family with sizes
/// `batch_size·(i+1)`, writing `generated/<nn>_<family>.in` and
/// `solutions/<nn>_<family>.out` under `out_dir`.
pub fn generate_batch(
    out_dir: &Path,
    seed: u64,
    cases_per_type: usize,
    batch_size: usize,
) -> Result<()> {
    let generated_dir = out_dir.join("generated");
    let solutions_dir = out_dir.join("solutions");
    fs::create_dir_all(&generated_dir).context("creating generated directory")?;
    fs::create_dir_all(&solutions_dir).context("creating solutions directory")?;

    let mut rng = StdRng::seed_from_u64(seed);
    for case_index in 0..cases_per_type {
        let size = batch_size * (case_index + 1);

        let mu_low = rng.gen_range(-15.0..0.0);
        let mu_high = rng.gen_range(0.0..15.0);
        let sigma_high = rng.gen_range(2.0..8.0);
        let lambda_high = rng.gen_range(2.0..15.0);

        let base_amount = (size as f64).ln().ceil() as usize;
        let changepoints = rng.gen_range(base_amount / 2..=2 * base_amount);
        let parameters = CaseParameters {
            size,
            changepoints,
            mu: rng.gen_range(mu_low..mu_high),
            sigma: rng.gen_range(1.0..sigma_high),
            mu_low,
            mu_high,
            sigma_low: 1.0,
            sigma_high,
            lambda_low: 1.0,
            lambda_high,
        };

        for family in SignalFamily::ALL {
            let (signal, changepoints) = generate(family, &parameters, &mut rng)?;
            let stem = format!("{:02}_{}", case_index, family.name());
            let values = signal
                .iter()
                .map(f64::to_string)
                .collect::<Vec<_>>()
                .join(",");
            fs::write(generated_dir.join(format!("{stem}.in")), values + "\n")
                .context("writing case")?;
            write_changepoints(&solutions_dir.join(format!("{stem}.out")), &changepoints)?;
            info!(case = %stem, size, "generated case");
        }
    }
    Ok(())
}
