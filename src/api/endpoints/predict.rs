//! JSON prediction endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::form::SubmitOutcome;
use crate::models::SurveyForm;
use crate::prediction::PredictionReport;

/// Flatten a JSON survey into form pairs. `null` means unanswered.
fn answer_pairs(payload: &serde_json::Value) -> Result<Vec<(String, String)>, ApiError> {
    let object = payload
        .as_object()
        .ok_or_else(|| ApiError::BadRequest("Expected a JSON object".into()))?;

    let mut pairs = Vec::with_capacity(object.len());
    for (key, value) in object {
        let raw = match value {
            serde_json::Value::Null => continue,
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(|i| i.to_string())
                .unwrap_or_else(|| n.to_string()),
            _ => {
                return Err(ApiError::BadRequest(format!(
                    "Field {key} must be a string or a number"
                )))
            }
        };
        pairs.push((key.clone(), raw));
    }
    Ok(pairs)
}

/// `POST /api/predict`: score one survey.
pub async fn predict(
    State(ctx): State<ApiContext>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<PredictionReport>, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let pairs = answer_pairs(&payload)?;

    let (form, errors) =
        SurveyForm::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    if !errors.is_empty() {
        return Err(ApiError::InvalidAnswers(errors));
    }

    match ctx.submit(form).await {
        SubmitOutcome::Success(report) => Ok(Json(report)),
        SubmitOutcome::Incomplete { missing } => Err(ApiError::Incomplete { missing }),
        SubmitOutcome::Unavailable => Err(ApiError::Unavailable),
        SubmitOutcome::Failed { message } => Err(ApiError::InferenceFailed(message)),
    }
}
