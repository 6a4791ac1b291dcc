//! Survey schema endpoint.

use axum::Json;
use serde::Serialize;

use crate::models::{Control, Field, Section, NAME_FIELD, NAME_MAX_CHARS};

#[derive(Serialize)]
pub struct FieldSchema {
    pub name: &'static str,
    pub label: &'static str,
    pub section: Section,
    pub section_title: &'static str,
    #[serde(flatten)]
    pub control: Control,
}

#[derive(Serialize)]
pub struct NameSchema {
    pub name: &'static str,
    pub max_chars: usize,
    pub required: bool,
}

#[derive(Serialize)]
pub struct OptionsResponse {
    pub name: NameSchema,
    /// Prediction fields in pipeline column order.
    pub fields: Vec<FieldSchema>,
}

/// `GET /api/options`: every field with its control and accepted codes.
pub async fn list() -> Json<OptionsResponse> {
    let fields = Field::ALL
        .into_iter()
        .map(|field| FieldSchema {
            name: field.column(),
            label: field.question(),
            section: field.section(),
            section_title: field.section().title(),
            control: field.control(),
        })
        .collect();

    Json(OptionsResponse {
        name: NameSchema {
            name: NAME_FIELD,
            max_chars: NAME_MAX_CHARS,
            required: false,
        },
        fields,
    })
}
