//! Submission handling for the survey form.
//!
//! Phases: Idle -> Validating -> {Incomplete | Predicting} -> {Success | Failed},
//! every path returning to Idle. Unavailable short-circuits Validating when
//! the artifacts never loaded.

use std::sync::Arc;

use uuid::Uuid;

use crate::models::{Field, SurveyForm, SurveyRecord};
use crate::pipeline::{LoadedArtifacts, PipelineError};
use crate::prediction::PredictionReport;

pub const INCOMPLETE_MESSAGE: &str = "Por favor, preencha todas as opções antes de calcular.";
pub const UNAVAILABLE_MESSAGE: &str =
    "Artefatos (pipeline/encoder) não carregados. Não é possível fazer previsões.";

pub fn failure_message(error: &impl std::fmt::Display) -> String {
    format!("Erro ao fazer a previsão: {error}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Validating,
    Incomplete,
    Predicting,
    Success,
    Failed,
    Unavailable,
}

impl FormPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormPhase::Idle => "idle",
            FormPhase::Validating => "validating",
            FormPhase::Incomplete => "incomplete",
            FormPhase::Predicting => "predicting",
            FormPhase::Success => "success",
            FormPhase::Failed => "failed",
            FormPhase::Unavailable => "unavailable",
        }
    }
}

/// Result of one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Incomplete { missing: Vec<Field> },
    Unavailable,
    Success(PredictionReport),
    Failed { message: String },
}

impl SubmitOutcome {
    /// Phase the submission ended in before returning to Idle.
    pub fn phase(&self) -> FormPhase {
        match self {
            SubmitOutcome::Incomplete { .. } => FormPhase::Incomplete,
            SubmitOutcome::Unavailable => FormPhase::Unavailable,
            SubmitOutcome::Success(_) => FormPhase::Success,
            SubmitOutcome::Failed { .. } => FormPhase::Failed,
        }
    }

    /// User-facing warning or error text, if any.
    pub fn message(&self) -> Option<String> {
        match self {
            SubmitOutcome::Incomplete { .. } => Some(INCOMPLETE_MESSAGE.to_string()),
            SubmitOutcome::Unavailable => Some(UNAVAILABLE_MESSAGE.to_string()),
            SubmitOutcome::Success(_) => None,
            SubmitOutcome::Failed { message } => Some(message.clone()),
        }
    }
}

/// Drives a submission from answers to a rendered outcome.
///
/// Holds the shared artifacts read-only; `submit` blocks for the duration of
/// inference and belongs on a blocking thread.
#[derive(Clone)]
pub struct FormController {
    artifacts: Option<Arc<LoadedArtifacts>>,
}

impl FormController {
    pub fn new(artifacts: Option<Arc<LoadedArtifacts>>) -> Self {
        Self { artifacts }
    }

    pub fn predictions_enabled(&self) -> bool {
        self.artifacts.is_some()
    }

    pub fn submit(&self, form: &SurveyForm) -> SubmitOutcome {
        let submission_id = Uuid::new_v4();
        let mut phase = FormPhase::Idle;
        let mut advance = |to: FormPhase| {
            tracing::debug!(%submission_id, from = phase.as_str(), to = to.as_str(), "Form transition");
            phase = to;
        };

        advance(FormPhase::Validating);
        let Some(artifacts) = self.artifacts.as_deref() else {
            advance(FormPhase::Unavailable);
            advance(FormPhase::Idle);
            tracing::warn!(%submission_id, "Submission rejected, artifacts not loaded");
            return SubmitOutcome::Unavailable;
        };

        let record = match form.to_record() {
            Ok(record) => record,
            Err(missing) => {
                advance(FormPhase::Incomplete);
                advance(FormPhase::Idle);
                tracing::info!(%submission_id, missing = missing.len(), "Submission incomplete");
                return SubmitOutcome::Incomplete { missing };
            }
        };

        advance(FormPhase::Predicting);
        let outcome = match predict(artifacts, &record, submission_id) {
            Ok(report) => {
                advance(FormPhase::Success);
                tracing::info!(%submission_id, predicted = %report.predicted, "Prediction complete");
                SubmitOutcome::Success(report)
            }
            Err(e) => {
                advance(FormPhase::Failed);
                tracing::error!(%submission_id, error = %e, "Prediction failed");
                SubmitOutcome::Failed {
                    message: failure_message(&e),
                }
            }
        };
        advance(FormPhase::Idle);
        outcome
    }
}

/// Score one record and decode the result.
pub fn predict(
    artifacts: &LoadedArtifacts,
    record: &SurveyRecord,
    submission_id: Uuid,
) -> Result<PredictionReport, PipelineError> {
    let frame = record.to_frame();
    let inference = artifacts.pipeline.infer(&frame)?;

    let predicted = artifacts
        .label_encoder
        .inverse_transform(&inference.predictions)?
        .into_iter()
        .next()
        .ok_or(PipelineError::EmptyInput)?;
    let probabilities = inference
        .probabilities
        .first()
        .ok_or(PipelineError::EmptyInput)?;

    PredictionReport::new(
        submission_id,
        predicted,
        artifacts.label_encoder.classes(),
        probabilities,
    )
}
