pub mod enums;
pub mod survey;

pub use enums::*;
pub use survey::*;

use thiserror::Error;

/// A form answer that does not fit the record schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Invalid value '{value}' for {field}")]
    InvalidEnum { field: String, value: String },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        value: i64,
    },

    #[error("{field} must be a whole number, got '{value}'")]
    NotANumber { field: String, value: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("Unknown field: {0}")]
    UnknownField(String),
}

impl SchemaError {
    /// Re-target the error at a form field.
    pub fn with_field(self, name: &str) -> Self {
        match self {
            SchemaError::InvalidEnum { value, .. } => SchemaError::InvalidEnum {
                field: name.into(),
                value,
            },
            SchemaError::OutOfRange { min, max, value, .. } => SchemaError::OutOfRange {
                field: name.into(),
                min,
                max,
                value,
            },
            SchemaError::NotANumber { value, .. } => SchemaError::NotANumber {
                field: name.into(),
                value,
            },
            SchemaError::TooLong { max, .. } => SchemaError::TooLong {
                field: name.into(),
                max,
            },
            other @ SchemaError::UnknownField(_) => other,
        }
    }

    pub fn field(&self) -> &str {
        match self {
            SchemaError::InvalidEnum { field, .. }
            | SchemaError::OutOfRange { field, .. }
            | SchemaError::NotANumber { field, .. }
            | SchemaError::TooLong { field, .. } => field,
            SchemaError::UnknownField(field) => field,
        }
    }
}
