//! Prediction report: decoded class plus the ranked probability table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::pipeline::PipelineError;

/// One row of the probability table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassProbability {
    pub class: String,
    pub probability: f64,
    /// `probability` as a percentage with two decimals, e.g. `"43.75%"`.
    pub percent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    pub submission_id: Uuid,
    pub predicted: String,
    /// Every known class, most likely first.
    pub probabilities: Vec<ClassProbability>,
    pub generated_at: DateTime<Utc>,
}

pub fn format_percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

impl PredictionReport {
    /// Pair class names with their probabilities and rank them.
    ///
    /// Ties keep label-encoder order.
    pub fn new(
        submission_id: Uuid,
        predicted: String,
        classes: &[String],
        probabilities: &[f64],
    ) -> Result<Self, PipelineError> {
        if classes.len() != probabilities.len() {
            return Err(PipelineError::ProbabilityWidth {
                found: probabilities.len(),
                expected: classes.len(),
            });
        }

        let mut table: Vec<ClassProbability> = classes
            .iter()
            .zip(probabilities)
            .map(|(class, &probability)| ClassProbability {
                class: class.clone(),
                probability,
                percent: format_percent(probability),
            })
            .collect();
        table.sort_by(|a, b| b.probability.total_cmp(&a.probability));

        Ok(Self {
            submission_id,
            predicted,
            probabilities: table,
            generated_at: Utc::now(),
        })
    }
}
