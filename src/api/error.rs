//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::form::{INCOMPLETE_MESSAGE, UNAVAILABLE_MESSAGE};
use crate::models::{Field, SchemaError};

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    /// Unanswered fields, for `INCOMPLETE` only.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<&'static str>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Invalid answers: {0:?}")]
    InvalidAnswers(Vec<SchemaError>),
    #[error("Survey incomplete")]
    Incomplete { missing: Vec<Field> },
    #[error("Predictions unavailable")]
    Unavailable,
    #[error("{0}")]
    InferenceFailed(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut missing = Vec::new();
        let (status, code, message) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail),
            ApiError::InvalidAnswers(errors) => (
                StatusCode::BAD_REQUEST,
                "INVALID_ANSWER",
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            ApiError::Incomplete { missing: fields } => {
                missing = fields.iter().map(Field::column).collect();
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "INCOMPLETE",
                    INCOMPLETE_MESSAGE.to_string(),
                )
            }
            ApiError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "PREDICTIONS_UNAVAILABLE",
                UNAVAILABLE_MESSAGE.to_string(),
            ),
            ApiError::InferenceFailed(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INFERENCE_FAILED",
                message,
            ),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                missing,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn json_of(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn incomplete_returns_422_with_missing_fields() {
        let response = ApiError::Incomplete {
            missing: vec![Field::Tue, Field::Calc],
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = json_of(response).await;
        assert_eq!(json["error"]["code"], "INCOMPLETE");
        assert_eq!(json["error"]["message"], INCOMPLETE_MESSAGE);
        assert_eq!(json["error"]["missing"], serde_json::json!(["tue", "calc"]));
    }

    #[tokio::test]
    async fn invalid_answers_return_400() {
        let response = ApiError::InvalidAnswers(vec![SchemaError::InvalidEnum {
            field: "mtrans".into(),
            value: "aviao".into(),
        }])
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_of(response).await;
        assert_eq!(json["error"]["code"], "INVALID_ANSWER");
        assert_eq!(json["error"]["message"], "Invalid value 'aviao' for mtrans");
        assert!(json["error"].get("missing").is_none());
    }

    #[tokio::test]
    async fn unavailable_returns_503() {
        let response = ApiError::Unavailable.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = json_of(response).await;
        assert_eq!(json["error"]["code"], "PREDICTIONS_UNAVAILABLE");
    }

    #[tokio::test]
    async fn inference_failure_exposes_message() {
        let response =
            ApiError::InferenceFailed("Erro ao fazer a previsão: boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_of(response).await;
        assert_eq!(json["error"]["message"], "Erro ao fazer a previsão: boom");
    }

    #[tokio::test]
    async fn bad_request_returns_400() {
        let response = ApiError::BadRequest("Expected a JSON object".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_of(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }
}
