//! Browser form: `GET /` renders, `POST /` submits and re-renders.

use axum::extract::State;
use axum::response::Html;
use axum::Form;

use crate::api::page::{render_page, NoticeKind, PageView};
use crate::api::types::ApiContext;

/// `GET /`: the empty survey.
pub async fn show(State(ctx): State<ApiContext>) -> Html<String> {
    Html(render_page(&PageView::empty(ctx.core.predictions_enabled())))
}

/// `POST /`: url-encoded submission.
pub async fn submit(
    State(ctx): State<ApiContext>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Html<String> {
    let (form, errors) =
        crate::models::SurveyForm::from_pairs(fields.iter().map(|(k, v)| (k.as_str(), v.as_str())));

    let view = PageView {
        values: fields.into_iter().collect(),
        predictions_enabled: ctx.core.predictions_enabled(),
        ..PageView::default()
    };

    let view = if errors.is_empty() {
        view.with_outcome(ctx.submit(form).await)
    } else {
        tracing::info!(errors = errors.len(), "Form submission rejected");
        let text = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        PageView {
            notice: Some((NoticeKind::Error, text)),
            ..view
        }
    };

    Html(render_page(&view))
}
