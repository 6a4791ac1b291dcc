//! Application router.
//!
//! `/` serves the survey page, `/api/` the JSON endpoints. All responses
//! carry `Cache-Control: no-store` so a re-rendered result is never cached.

use std::sync::Arc;

use axum::http::header::CACHE_CONTROL;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the full application router.
pub fn app_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/options", get(endpoints::options::list))
        .route("/predict", post(endpoints::predict::predict));

    Router::new()
        .route("/", get(endpoints::page::show).post(endpoints::page::submit))
        .nest("/api", api)
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::core_state::ArtifactStatus;
    use crate::form::tests::spy_artifacts;
    use crate::pipeline::trained::tests::SpyClassifier;

    fn spy() -> SpyClassifier {
        SpyClassifier::new(vec![0.05, 0.1, 0.15, 0.1, 0.4, 0.1, 0.1])
    }

    fn ready_core(spy: &SpyClassifier) -> Arc<CoreState> {
        Arc::new(CoreState::new(
            AppConfig::default(),
            ArtifactStatus::Ready(Arc::new(spy_artifacts(spy))),
        ))
    }

    fn unavailable_core() -> Arc<CoreState> {
        Arc::new(CoreState::new(
            AppConfig::default(),
            ArtifactStatus::Unavailable {
                reason: "Artifact not found: ./pipeline_obesidade_completo_rf.json".into(),
            },
        ))
    }

    fn complete_survey() -> serde_json::Value {
        serde_json::json!({
            "nome": "João",
            "idade": 25,
            "genero": "masculino",
            "historico_familiar": "sim",
            "faf": 1,
            "mtrans": "moto",
            "scc": "nao",
            "tue": 1,
            "favc": "sim",
            "fcvc": 1,
            "caec": "as_vezes",
            "ch20": 2,
            "ncp": 1,
            "calc": "sempre"
        })
    }

    fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_form(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let body = to_bytes(response.into_body(), 256 * 1024).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    // ── JSON API ────────────────────────────────────────────

    #[tokio::test]
    async fn health_reports_ready() {
        let app = app_router(ready_core(&spy()));
        let response = app.oneshot(get("/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(CACHE_CONTROL).unwrap(), "no-store");
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["predictions_enabled"], true);
        assert_eq!(json["version"], crate::config::APP_VERSION);
        assert_eq!(json["classifier"], "spy");
    }

    #[tokio::test]
    async fn health_reports_degraded_without_artifacts() {
        let app = app_router(unavailable_core());
        let json = body_json(app.oneshot(get("/api/health")).await.unwrap()).await;
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["predictions_enabled"], false);
        assert!(json["detail"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn options_list_schema_in_order() {
        let app = app_router(unavailable_core());
        let json = body_json(app.oneshot(get("/api/options")).await.unwrap()).await;
        let fields = json["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 13);
        assert_eq!(fields[0]["name"], "idade");
        assert_eq!(fields[0]["control"], "number");
        assert_eq!(fields[0]["max"], 100);
        assert_eq!(fields[4]["name"], "mtrans");
        assert_eq!(fields[4]["section_title"], "Rotina Pessoal");
        assert_eq!(fields[4]["options"][1]["code"], "transporte_publico");
        assert_eq!(fields[4]["options"][1]["label"], "Transporte Público");
        assert_eq!(fields[11]["options"][0]["code"], 0);
        assert_eq!(json["name"]["max_chars"], 50);
    }

    #[tokio::test]
    async fn predict_returns_report() {
        let spy = spy();
        let app = app_router(ready_core(&spy));
        let response = app
            .oneshot(post_json("/api/predict", &complete_survey()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["predicted"], "Obesidade Tipo I");
        assert_eq!(json["probabilities"].as_array().unwrap().len(), 7);
        assert_eq!(json["probabilities"][0]["percent"], "40.00%");
        assert_eq!(spy.calls(), 1);
    }

    #[tokio::test]
    async fn predict_incomplete_is_422_without_inference() {
        let spy = spy();
        let app = app_router(ready_core(&spy));
        let mut survey = complete_survey();
        survey["calc"] = serde_json::Value::Null;
        survey.as_object_mut().unwrap().remove("tue");

        let response = app.oneshot(post_json("/api/predict", &survey)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["missing"], serde_json::json!(["tue", "calc"]));
        assert_eq!(spy.calls(), 0);
    }

    #[tokio::test]
    async fn predict_out_of_vocabulary_is_400() {
        let spy = spy();
        let app = app_router(ready_core(&spy));
        let mut survey = complete_survey();
        survey["mtrans"] = serde_json::json!("aviao");

        let response = app.oneshot(post_json("/api/predict", &survey)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INVALID_ANSWER");
        assert_eq!(spy.calls(), 0);
    }

    #[tokio::test]
    async fn predict_malformed_json_is_400() {
        let app = app_router(ready_core(&spy()));
        let request = Request::builder()
            .method("POST")
            .uri("/api/predict")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn predict_without_artifacts_is_503() {
        let app = app_router(unavailable_core());
        let response = app
            .oneshot(post_json("/api/predict", &complete_survey()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn predict_inference_failure_is_500_with_message() {
        let spy = SpyClassifier::new(vec![0.9, 0.9, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let app = app_router(ready_core(&spy));
        let response = app
            .oneshot(post_json("/api/predict", &complete_survey()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INFERENCE_FAILED");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Erro ao fazer a previsão:"));
    }

    // ── Browser form ────────────────────────────────────────

    #[tokio::test]
    async fn form_page_renders() {
        let app = app_router(ready_core(&spy()));
        let response = app.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Calculadora de obesidade"));
        assert!(html.contains(">Calcular</button>"));
    }

    #[tokio::test]
    async fn form_page_without_artifacts_shows_banner() {
        let app = app_router(unavailable_core());
        let html = body_text(app.oneshot(get("/")).await.unwrap()).await;
        assert!(html.contains("Artefatos (pipeline/encoder) não carregados."));
    }

    #[tokio::test]
    async fn form_submit_renders_result() {
        let spy = spy();
        let app = app_router(ready_core(&spy));
        let body = "nome=Jo%C3%A3o&idade=25&genero=masculino&historico_familiar=sim&faf=1\
                    &mtrans=moto&scc=nao&tue=1&favc=sim&fcvc=1&caec=as_vezes&ch20=2&ncp=1&calc=sempre";
        let html = body_text(app.oneshot(post_form(body)).await.unwrap()).await;
        assert!(html.contains("Resultado da Previsão"));
        assert!(html.contains("<h2>Obesidade Tipo I</h2>"));
        assert!(html.contains("<td>40.00%</td>"));
        assert!(html.contains(r#"value="João""#));
        assert_eq!(spy.calls(), 1);
    }

    #[tokio::test]
    async fn form_submit_incomplete_warns_and_preserves() {
        let spy = spy();
        let app = app_router(ready_core(&spy));
        let html = body_text(
            app.oneshot(post_form("nome=Ana&idade=40&mtrans=carro&calc="))
                .await
                .unwrap(),
        )
        .await;
        assert!(html.contains("Por favor, preencha todas as opções antes de calcular."));
        assert!(html.contains(r#"value="Ana""#));
        assert!(html.contains(r#"value="40""#));
        assert!(html.contains(r#"<option value="carro" selected>Automóvel</option>"#));
        assert!(!html.contains("Resultado da Previsão"));
        assert_eq!(spy.calls(), 0);
    }

    #[tokio::test]
    async fn form_submit_invalid_value_shows_error() {
        let spy = spy();
        let app = app_router(ready_core(&spy));
        let html = body_text(app.oneshot(post_form("idade=150")).await.unwrap()).await;
        assert!(html.contains("notice error"));
        assert!(html.contains("idade must be between 1 and 100, got 150"));
        assert_eq!(spy.calls(), 0);
    }
}
