//! Classifier abstraction: the model stage of the trained pipeline.
//!
//! The pipeline only needs "preprocessed frame in, class probabilities out".
//! Concrete backends: `RandomForest` (rehosted in-process) and
//! `RemoteClassifier` (out-of-process scoring service).

use super::frame::Frame;
use super::PipelineError;

/// Tolerance for a probability row summing to 1.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Model stage abstraction (allows mocking).
pub trait Classifier: Send + Sync {
    /// Number of classes the model scores.
    fn n_classes(&self) -> usize;

    /// One probability row per input row, each `n_classes` wide.
    fn predict_proba(&self, frame: &Frame) -> Result<Vec<Vec<f64>>, PipelineError>;

    /// Short description for logs and the health endpoint.
    fn describe(&self) -> String;
}

/// Index of the largest probability. The first maximum wins on ties.
pub fn argmax(row: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &p) in row.iter().enumerate() {
        match best {
            Some((_, top)) if p <= top => {}
            _ => best = Some((idx, p)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Check one probability row: right width, finite, non-negative, sums to 1.
pub fn check_probabilities(row: &[f64], n_classes: usize) -> Result<(), PipelineError> {
    if row.len() != n_classes {
        return Err(PipelineError::ProbabilityWidth {
            found: row.len(),
            expected: n_classes,
        });
    }
    if let Some(bad) = row.iter().find(|p| !p.is_finite() || **p < 0.0) {
        return Err(PipelineError::InvalidProbabilities(format!(
            "entry {bad} is not a probability"
        )));
    }
    let sum: f64 = row.iter().sum();
    if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(PipelineError::InvalidProbabilities(format!(
            "row sums to {sum}"
        )));
    }
    Ok(())
}
