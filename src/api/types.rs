//! Shared types for the HTTP layer.

use std::sync::Arc;

use crate::core_state::CoreState;
use crate::form::SubmitOutcome;
use crate::models::SurveyForm;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }

    /// Run one submission on the blocking pool.
    ///
    /// A panic inside inference surfaces as a failed outcome.
    pub async fn submit(&self, form: SurveyForm) -> SubmitOutcome {
        let controller = self.core.controller();
        let count = self.core.record_submission();
        tracing::debug!(count, "Submission received");

        match tokio::task::spawn_blocking(move || controller.submit(&form)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "Prediction task aborted");
                SubmitOutcome::Failed {
                    message: crate::form::failure_message(&e),
                }
            }
        }
    }
}
