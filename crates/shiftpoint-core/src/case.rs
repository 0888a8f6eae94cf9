//! Case model: a named signal with optional per-point timestamps.

use chrono::NaiveDateTime;

use crate::error::{ChangepointError, Result};

/// Timestamp format used by real-world case files.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Origin of a case, which decides the fallback penalization policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseKind {
    /// Generated signal with known changepoints.
    Synthetic,
    /// Recorded signal; carries one timestamp per value.
    Real,
}

/// Typed per-point label: synthetic cases are labelled by sample index,
/// real cases by timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointLabel {
    Index(usize),
    Date(NaiveDateTime),
}

/// A signal to segment. Immutable after construction.
#[derive(Debug, Clone)]
pub struct Case {
    name: String,
    kind: CaseKind,
    signal: Vec<f64>,
    dates: Option<Vec<NaiveDateTime>>,
}

impl Case {
    /// Build a case, validating that the signal is non-empty, all values
    /// are finite, and timestamps (when present) align with the signal.
    pub fn new(
        name: impl Into<String>,
        kind: CaseKind,
        signal: Vec<f64>,
        dates: Option<Vec<NaiveDateTime>>,
    ) -> Result<Self> {
        if signal.is_empty() {
            return Err(ChangepointError::InvalidInput("empty signal".to_string()));
        }
        if let Some((index, &value)) = signal.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ChangepointError::NonFiniteValue { index, value });
        }
        if let Some(dates) = &dates {
            if dates.len() != signal.len() {
                return Err(ChangepointError::MismatchedMetadata {
                    needed: signal.len(),
                    got: dates.len(),
                });
            }
        }
        Ok(Self {
            name: name.into(),
            kind,
            signal,
            dates,
        })
    }

    /// Convenience constructor for synthetic cases without timestamps.
    pub fn synthetic(name: impl Into<String>, signal: Vec<f64>) -> Result<Self> {
        Self::new(name, CaseKind::Synthetic, signal, None)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CaseKind {
        self.kind
    }

    pub fn signal(&self) -> &[f64] {
        &self.signal
    }

    pub fn len(&self) -> usize {
        self.signal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signal.is_empty()
    }

    /// Label of the point at `index`.
    pub fn label(&self, index: usize) -> PointLabel {
        match &self.dates {
            Some(dates) => PointLabel::Date(dates[index]),
            None => PointLabel::Index(index),
        }
    }
}
