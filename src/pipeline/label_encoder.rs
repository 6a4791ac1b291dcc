//! Fitted label encoder: class index ↔ category name.

use serde::{Deserialize, Serialize};

use super::PipelineError;

/// Ordered class names as fitted. Index `i` decodes to `classes_[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    #[serde(rename = "classes_")]
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Result<Self, PipelineError> {
        let encoder = Self { classes };
        encoder.validate()?;
        Ok(encoder)
    }

    /// Non-empty, no blank names, no duplicates.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.classes.is_empty() {
            return Err(PipelineError::InvalidEncoder("no classes".into()));
        }
        for (idx, name) in self.classes.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(PipelineError::InvalidEncoder(format!("class {idx} is blank")));
            }
            if self.classes[..idx].contains(name) {
                return Err(PipelineError::InvalidEncoder(format!(
                    "duplicate class '{name}'"
                )));
            }
        }
        Ok(())
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Decode predicted indices to class names.
    pub fn inverse_transform(&self, indices: &[usize]) -> Result<Vec<String>, PipelineError> {
        indices
            .iter()
            .map(|&index| {
                self.classes
                    .get(index)
                    .cloned()
                    .ok_or(PipelineError::UnknownClassIndex {
                        index,
                        n_classes: self.classes.len(),
                    })
            })
            .collect()
    }

    /// Encode a class name back to its index.
    pub fn transform_one(&self, name: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == name)
    }
}
