//! Shared application state.
//!
//! Built once at startup and wrapped in `Arc`. Artifacts are immutable after
//! loading, so request handlers only ever read.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::form::FormController;
use crate::models::SCHEMA_COLUMNS;
use crate::pipeline::{load_artifacts, ArtifactError, LoadedArtifacts};

/// Outcome of the startup artifact load.
pub enum ArtifactStatus {
    Ready(Arc<LoadedArtifacts>),
    Unavailable { reason: String },
}

pub struct CoreState {
    pub config: AppConfig,
    status: ArtifactStatus,
    controller: FormController,
    /// Completed submissions, any outcome.
    submissions: AtomicU64,
}

impl CoreState {
    pub fn new(config: AppConfig, status: ArtifactStatus) -> Self {
        let controller = match &status {
            ArtifactStatus::Ready(artifacts) => FormController::new(Some(Arc::clone(artifacts))),
            ArtifactStatus::Unavailable { .. } => FormController::new(None),
        };
        Self {
            config,
            status,
            controller,
            submissions: AtomicU64::new(0),
        }
    }

    /// Load artifacts from the configured paths. Failure is logged, not fatal.
    pub fn load(config: AppConfig) -> Self {
        let result = load_artifacts(
            &config.pipeline_path(),
            &config.encoder_path(),
            &SCHEMA_COLUMNS,
        );
        let status = match result {
            Ok(artifacts) => ArtifactStatus::Ready(Arc::new(artifacts)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load model artifacts, predictions disabled");
                e.into()
            }
        };
        Self::new(config, status)
    }

    pub fn status(&self) -> &ArtifactStatus {
        &self.status
    }

    pub fn predictions_enabled(&self) -> bool {
        matches!(self.status, ArtifactStatus::Ready(_))
    }

    /// Why predictions are disabled, if they are.
    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.status {
            ArtifactStatus::Ready(_) => None,
            ArtifactStatus::Unavailable { reason } => Some(reason),
        }
    }

    pub fn classifier_description(&self) -> Option<String> {
        match &self.status {
            ArtifactStatus::Ready(artifacts) => Some(artifacts.pipeline.describe()),
            ArtifactStatus::Unavailable { .. } => None,
        }
    }

    /// Cheap clone for moving into `spawn_blocking`.
    pub fn controller(&self) -> FormController {
        self.controller.clone()
    }

    pub fn record_submission(&self) -> u64 {
        self.submissions.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn submissions(&self) -> u64 {
        self.submissions.load(Ordering::Relaxed)
    }
}

impl From<ArtifactError> for ArtifactStatus {
    fn from(e: ArtifactError) -> Self {
        ArtifactStatus::Unavailable {
            reason: e.to_string(),
        }
    }
}
