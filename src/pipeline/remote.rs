//! Out-of-process scoring backend.
//!
//! Sends the preprocessed frame to an HTTP scoring service and reads back
//! class probabilities. Used when the fitted model cannot be rehosted and
//! stays behind its original runtime.
//!
//! Wire format:
//! - request: `POST {url}` with `{"columns": [...], "rows": [[...], ...]}`
//! - response: `{"probabilities": [[...], ...]}`, one row per input row

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::classifier::Classifier;
use super::frame::{Frame, Value};
use super::PipelineError;

/// Connect timeout for the scoring service.
const CONNECT_TIMEOUT_SECS: u64 = 5;

fn default_timeout_secs() -> u64 {
    30
}

/// Remote backend settings as written in the pipeline artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEndpoint {
    pub url: String,
    pub n_classes: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Serialize)]
struct ScoreRequest<'a> {
    columns: &'a [String],
    rows: &'a [Vec<Value>],
}

#[derive(Deserialize)]
struct ScoreResponse {
    probabilities: Vec<Vec<f64>>,
}

/// HTTP client for a remote scoring service.
pub struct RemoteClassifier {
    url: String,
    n_classes: usize,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl RemoteClassifier {
    pub fn new(url: &str, n_classes: usize, timeout_secs: u64) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PipelineError::RemoteRequest(e.to_string()))?;

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            n_classes,
            timeout_secs,
            client,
        })
    }

    pub fn from_endpoint(endpoint: &RemoteEndpoint) -> Result<Self, PipelineError> {
        Self::new(&endpoint.url, endpoint.n_classes, endpoint.timeout_secs)
    }

    async fn score(&self, frame: &Frame) -> Result<Vec<Vec<f64>>, PipelineError> {
        let body = ScoreRequest {
            columns: frame.columns(),
            rows: frame.rows(),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    PipelineError::RemoteUnreachable(self.url.clone())
                } else if e.is_timeout() {
                    PipelineError::RemoteRequest(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    PipelineError::RemoteRequest(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::RemoteStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ScoreResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::RemoteResponse(e.to_string()))?;

        if parsed.probabilities.len() != frame.n_rows() {
            return Err(PipelineError::RemoteResponse(format!(
                "{} probability rows for {} input rows",
                parsed.probabilities.len(),
                frame.n_rows()
            )));
        }
        Ok(parsed.probabilities)
    }
}

impl Classifier for RemoteClassifier {
    fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Must run on a blocking thread (`spawn_blocking`) when a runtime exists.
    fn predict_proba(&self, frame: &Frame) -> Result<Vec<Vec<f64>>, PipelineError> {
        block_on(self.score(frame))?
    }

    fn describe(&self) -> String {
        format!("remote({}, {} classes)", self.url, self.n_classes)
    }
}

/// Drive a future to completion from synchronous code.
///
/// Reuses the ambient runtime when called from a blocking thread, otherwise
/// spins up a throwaway current-thread runtime.
fn block_on<F: Future>(fut: F) -> Result<F::Output, PipelineError> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => Ok(handle.block_on(fut)),
        Err(_) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| PipelineError::RemoteRequest(e.to_string()))?;
            Ok(runtime.block_on(fut))
        }
    }
}
