//! The end-to-end trained pipeline: column adapters, then the classifier.

use serde::{Deserialize, Serialize};

use super::classifier::{argmax, check_probabilities, Classifier};
use super::frame::Frame;
use super::transform::{Adapter, Transformer};
use super::PipelineError;

/// One adapter bound to one input column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStep {
    pub column: String,
    pub adapter: Adapter,
}

/// Output of a single scoring pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    pub predictions: Vec<usize>,
    pub probabilities: Vec<Vec<f64>>,
}

pub struct TrainedPipeline {
    columns: Vec<String>,
    steps: Vec<PipelineStep>,
    classifier: Box<dyn Classifier>,
}

impl TrainedPipeline {
    pub fn new(columns: Vec<String>, steps: Vec<PipelineStep>, classifier: Box<dyn Classifier>) -> Self {
        Self {
            columns,
            steps,
            classifier,
        }
    }

    /// Input schema the pipeline was fitted on, in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    pub fn n_classes(&self) -> usize {
        self.classifier.n_classes()
    }

    pub fn describe(&self) -> String {
        self.classifier.describe()
    }

    /// Check the schema and run every adapter, in order.
    ///
    /// Returns the frame exactly as the classifier will see it.
    pub fn preprocess(&self, frame: &Frame) -> Result<Frame, PipelineError> {
        if frame.n_rows() == 0 {
            return Err(PipelineError::EmptyInput);
        }
        let mut frame = frame.select(&self.columns)?;
        for step in &self.steps {
            let values = frame.column_values(&step.column)?;
            let transformed = step.adapter.transform(&values)?;
            frame.set_column(&step.column, transformed)?;
        }
        Ok(frame)
    }

    /// Class probabilities, one validated row per input row.
    pub fn predict_proba(&self, frame: &Frame) -> Result<Vec<Vec<f64>>, PipelineError> {
        let prepared = self.preprocess(frame)?;
        let probabilities = self.classifier.predict_proba(&prepared)?;
        if probabilities.len() != prepared.n_rows() {
            return Err(PipelineError::InvalidProbabilities(format!(
                "{} rows scored for {} input rows",
                probabilities.len(),
                prepared.n_rows()
            )));
        }
        for row in &probabilities {
            check_probabilities(row, self.classifier.n_classes())?;
        }
        Ok(probabilities)
    }

    /// Predicted class index per input row.
    pub fn predict(&self, frame: &Frame) -> Result<Vec<usize>, PipelineError> {
        Ok(self.infer(frame)?.predictions)
    }

    /// `predict` and `predict_proba` from one scoring pass.
    pub fn infer(&self, frame: &Frame) -> Result<Inference, PipelineError> {
        let probabilities = self.predict_proba(frame)?;
        let predictions = probabilities
            .iter()
            .map(|row| {
                argmax(row).ok_or_else(|| {
                    PipelineError::InvalidProbabilities("empty probability row".into())
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Inference {
            predictions,
            probabilities,
        })
    }
}
