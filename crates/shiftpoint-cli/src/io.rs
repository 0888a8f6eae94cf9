//! Case and output file handling.
//!
//! A case file carries the signal as one comma-separated line; real-world
//! cases add a second line with one `%Y-%m-%d %H:%M` timestamp per value.
//! Ground truths are comma-separated changepoint indices. Results go to a
//! per-solver `.out` file and a per-case `.metrics` CSV.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use shiftpoint_core::{Case, CaseKind, Solution, DATE_FORMAT};

/// Column order of the `.metrics` file.
pub const METRICS_COLUMNS: [&str; 10] = [
    "name",
    "size",
    "cost_function",
    "solver",
    "changepoints",
    "cost",
    "execution_time",
    "right_changepoints",
    "wrong_changepoints",
    "not_found_changepoints",
];

/// Read a case file, taking the case name from the file stem.
pub fn read_case(path: &Path, kind: CaseKind) -> Result<Case> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading case file {}", path.display()))?;
    let mut lines = content.lines();
    let Some(values_line) = lines.next() else {
        bail!("case file {} is empty", path.display());
    };
    let signal = parse_values(values_line)
        .with_context(|| format!("parsing signal of {}", path.display()))?;

    let dates = match kind {
        CaseKind::Synthetic => None,
        CaseKind::Real => {
            let Some(dates_line) = lines.next() else {
                bail!("real case {} is missing its timestamp line", path.display());
            };
            Some(parse_dates(dates_line)
                .with_context(|| format!("parsing timestamps of {}", path.display()))?)
        }
    };

    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("case")
        .to_string();
    Ok(Case::new(name, kind, signal, dates)?)
}

/// Read the known changepoints of a synthetic case.
pub fn read_ground_truth(path: &Path) -> Result<Vec<usize>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading ground truth {}", path.display()))?;
    let line = content.lines().next().unwrap_or("").trim();
    if line.is_empty() {
        return Ok(Vec::new());
    }
    line.split(',')
        .map(|field| {
            field
                .trim()
                .parse::<usize>()
                .with_context(|| format!("parsing changepoint index '{}'", field.trim()))
        })
        .collect()
}

fn parse_values(line: &str) -> Result<Vec<f64>> {
    line.split(',')
        .map(|field| {
            field
                .trim()
                .parse::<f64>()
                .with_context(|| format!("parsing value '{}'", field.trim()))
        })
        .collect()
}

fn parse_dates(line: &str) -> Result<Vec<NaiveDateTime>> {
    line.split(',')
        .map(|field| {
            NaiveDateTime::parse_from_str(field.trim(), DATE_FORMAT)
                .with_context(|| format!("parsing timestamp '{}'", field.trim()))
        })
        .collect()
}

/// Write predicted changepoints as one comma-separated line.
pub fn write_changepoints(path: &Path, changepoints: &[usize]) -> Result<()> {
    let line = changepoints
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(",");
    fs::write(path, line + "\n").with_context(|| format!("writing {}", path.display()))
}

/// Write the per-case metrics CSV, one row per solver run.
pub fn write_metrics(path: &Path, case: &Case, cost_function: &str, solutions: &[Solution]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(METRICS_COLUMNS)?;
    for solution in solutions {
        let (right, wrong, missed) = match &solution.metrics.evaluation {
            Some(evaluation) => (
                evaluation.correct.to_string(),
                evaluation.incorrect.to_string(),
                evaluation.not_found.to_string(),
            ),
            None => (String::new(), String::new(), String::new()),
        };
        writer.write_record([
            case.name().to_string(),
            case.len().to_string(),
            cost_function.to_string(),
            solution.metrics.solver.to_string(),
            solution.changepoints.len().to_string(),
            solution.metrics.cost.to_string(),
            format!("{:.9}", solution.metrics.execution_time),
            right,
            wrong,
            missed,
        ])?;
    }
    writer
        .flush()
        .with_context(|| format!("flushing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use shiftpoint_core::{PointLabel, SolverMetrics};

    use super::*;

    #[test]
    fn reads_a_synthetic_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("03_mean.in");
        fs::write(&path, "1.0,2.5,-3.25\n").unwrap();
        let case = read_case(&path, CaseKind::Synthetic).unwrap();
        assert_eq!(case.name(), "03_mean");
        assert_eq!(case.signal(), &[1.0, 2.5, -3.25]);
        assert_eq!(case.label(2), PointLabel::Index(2));
    }

    #[test]
    fn reads_a_real_case_with_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("00_real.in");
        fs::write(&path, "60.0,61.5\n2022-01-01 00:00, 2022-01-01 00:01\n").unwrap();
        let case = read_case(&path, CaseKind::Real).unwrap();
        assert_eq!(case.len(), 2);
        assert!(matches!(case.label(0), PointLabel::Date(_)));
    }

    #[test]
    fn real_case_without_timestamps_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad_real.in");
        fs::write(&path, "60.0,61.5\n").unwrap();
        assert!(read_case(&path, CaseKind::Real).is_err());
    }

    #[test]
    fn ground_truth_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("03_mean.out");
        write_changepoints(&path, &[100, 250, 900]).unwrap();
        assert_eq!(read_ground_truth(&path).unwrap(), vec![100, 250, 900]);
    }

    #[test]
    fn empty_ground_truth_parses_to_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.out");
        fs::write(&path, "\n").unwrap();
        assert!(read_ground_truth(&path).unwrap().is_empty());
    }

    #[test]
    fn metrics_file_has_the_expected_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case.metrics");
        let case = Case::synthetic("case", vec![1.0, 2.0]).unwrap();
        let solution = Solution {
            changepoints: vec![1],
            metrics: SolverMetrics::new(0.5, "binary_segmentation", 0.001),
        };
        write_metrics(&path, &case, "gaussian", &[solution]).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        let header = written.lines().next().unwrap();
        assert_eq!(header, METRICS_COLUMNS.join(","));
        assert!(written.lines().nth(1).unwrap().starts_with("case,2,gaussian,binary_segmentation,1,0.5,"));
    }
}
