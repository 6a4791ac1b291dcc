//! Server-rendered survey page.
//!
//! Self-contained HTML, no external resources. Every render takes the raw
//! submitted values so a re-render shows exactly what the user entered.

use std::collections::HashMap;

use crate::config::APP_NAME;
use crate::form::{SubmitOutcome, UNAVAILABLE_MESSAGE};
use crate::models::{Control, Field, Section, NAME_FIELD, NAME_MAX_CHARS};
use crate::prediction::PredictionReport;

const SELECT_PLACEHOLDER: &str = "Selecione uma opção";
const NUMBER_PLACEHOLDER: &str = "Insira um valor";
const NAME_PLACEHOLDER: &str = "Insira seu nome";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Warning,
    Error,
}

impl NoticeKind {
    fn class(&self) -> &'static str {
        match self {
            NoticeKind::Warning => "notice warning",
            NoticeKind::Error => "notice error",
        }
    }
}

/// Everything one render needs.
#[derive(Debug, Default)]
pub struct PageView {
    /// Raw submitted values by form key.
    pub values: HashMap<String, String>,
    pub predictions_enabled: bool,
    pub notice: Option<(NoticeKind, String)>,
    pub report: Option<PredictionReport>,
}

impl PageView {
    pub fn empty(predictions_enabled: bool) -> Self {
        Self {
            predictions_enabled,
            ..Self::default()
        }
    }

    /// Fold a submission outcome into the view.
    pub fn with_outcome(mut self, outcome: SubmitOutcome) -> Self {
        self.notice = match &outcome {
            SubmitOutcome::Incomplete { .. } => outcome.message().map(|m| (NoticeKind::Warning, m)),
            SubmitOutcome::Unavailable | SubmitOutcome::Failed { .. } => {
                outcome.message().map(|m| (NoticeKind::Error, m))
            }
            SubmitOutcome::Success(_) => None,
        };
        if let SubmitOutcome::Success(report) = outcome {
            self.report = Some(report);
        }
        self
    }

    fn value(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }
}

/// Minimal HTML escaping for text and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_control(view: &PageView, field: Field) -> String {
    let key = field.column();
    let current = view.value(key);
    let label = escape_html(field.question());

    match field.control() {
        Control::Number { min, max } => format!(
            r#"<label for="{key}">{label}</label>
<input type="number" id="{key}" name="{key}" min="{min}" max="{max}" step="1" placeholder="{NUMBER_PLACEHOLDER}" value="{value}">"#,
            value = escape_html(current.trim()),
        ),
        Control::Select { options } => {
            let mut html = format!(
                r#"<label for="{key}">{label}</label>
<select id="{key}" name="{key}">
<option value=""{sel}>{SELECT_PLACEHOLDER}</option>"#,
                sel = if current.trim().is_empty() { " selected" } else { "" },
            );
            for option in options {
                let selected = if current.trim() == option.form_value {
                    " selected"
                } else {
                    ""
                };
                html.push_str(&format!(
                    "\n<option value=\"{}\"{selected}>{}</option>",
                    escape_html(&option.form_value),
                    escape_html(option.label),
                ));
            }
            html.push_str("\n</select>");
            html
        }
    }
}

fn render_section(view: &PageView, section: Section) -> String {
    let mut html = format!(
        "<section class=\"column\">\n<h3>{}</h3>\n",
        escape_html(section.title())
    );
    if section == Section::PersonalData {
        html.push_str(&format!(
            r#"<label for="{NAME_FIELD}">Nome</label>
<input type="text" id="{NAME_FIELD}" name="{NAME_FIELD}" maxlength="{NAME_MAX_CHARS}" placeholder="{NAME_PLACEHOLDER}" value="{}">
"#,
            escape_html(view.value(NAME_FIELD)),
        ));
    }
    for field in Field::ALL.into_iter().filter(|f| f.section() == section) {
        html.push_str(&render_control(view, field));
        html.push('\n');
    }
    html.push_str("</section>\n");
    html
}

fn render_report(report: &PredictionReport) -> String {
    let mut rows = String::new();
    for entry in &report.probabilities {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            escape_html(&entry.class),
            entry.percent,
        ));
    }
    format!(
        r#"<hr>
<h3>Resultado da Previsão:</h3>
<div class="result"><h2>{predicted}</h2></div>
<h3>Probabilidades por Classe:</h3>
<table>
<thead><tr><th>Classe</th><th>Probabilidade</th></tr></thead>
<tbody>
{rows}</tbody>
</table>"#,
        predicted = escape_html(&report.predicted),
    )
}

/// Render the full page.
pub fn render_page(view: &PageView) -> String {
    let banner = if view.predictions_enabled {
        String::new()
    } else {
        format!("<div class=\"notice error\">{}</div>\n", escape_html(UNAVAILABLE_MESSAGE))
    };
    let sections: String = Section::ALL
        .into_iter()
        .map(|s| render_section(view, s))
        .collect();
    let notice = view
        .notice
        .as_ref()
        .map(|(kind, text)| format!("<div class=\"{}\">{}</div>", kind.class(), escape_html(text)))
        .unwrap_or_default();
    let report = view.report.as_ref().map(render_report).unwrap_or_default();
    let disabled = if view.predictions_enabled { "" } else { " disabled" };

    format!(
        r##"<!DOCTYPE html>
<html lang="pt-BR">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <style>
    * {{ box-sizing: border-box; }}
    body {{
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', system-ui, sans-serif;
      background: #000000; color: #FFFFFF; margin: 0; padding: 24px;
    }}
    h1, h2, h3 {{ color: #E6007E; }}
    h1 {{ margin-top: 0; }}
    label {{ display: block; color: #FFFFFF; margin: 14px 0 6px; font-size: 14px; }}
    input, select {{
      width: 100%; padding: 10px; color: #FFFFFF;
      background: #333333; border: 1px solid #555555; border-radius: 5px;
    }}
    input::placeholder {{ color: #FFFFFF; opacity: 1; }}
    .columns {{ display: grid; grid-template-columns: repeat(3, 1fr); gap: 32px; }}
    @media (max-width: 800px) {{ .columns {{ grid-template-columns: 1fr; }} }}
    .actions {{ display: flex; justify-content: center; margin-top: 28px; }}
    button {{
      background: #E6007E; color: #FFFFFF; border: none; border-radius: 8px;
      padding: 10px 20px; width: 50%; font-size: 16px; cursor: pointer;
    }}
    button:hover {{ background: #C0006A; }}
    button:active {{ background: #A0005A; }}
    button:disabled {{ opacity: 0.5; cursor: not-allowed; }}
    .notice {{ padding: 12px 16px; border-radius: 8px; margin: 16px 0; }}
    .notice.warning {{ background: #3d3200; color: #ffe08a; }}
    .notice.error {{ background: #3d0011; color: #ff9bb3; }}
    .result {{ background: #333333; padding: 20px; border-radius: 10px; text-align: center; }}
    table {{ width: 100%; border-collapse: collapse; }}
    th, td {{ text-align: left; padding: 8px; border-bottom: 1px solid #555555; }}
  </style>
</head>
<body>
  <h1>{title}</h1>
  <hr>
{banner}  <form method="post" action="/">
    <div class="columns">
{sections}    </div>
    <div class="actions"><button type="submit"{disabled}>Calcular</button></div>
  </form>
  {notice}
  {report}
</body>
</html>
"##,
        title = escape_html(APP_NAME),
    )
}
