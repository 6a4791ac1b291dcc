pub mod artifacts;
pub mod classifier;
pub mod forest;
pub mod frame;
pub mod label_encoder;
pub mod remote;
pub mod trained;
pub mod transform;

pub use artifacts::*;
pub use classifier::*;
pub use frame::*;
pub use label_encoder::*;
pub use trained::*;
pub use transform::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Unexpected column: {0}")]
    UnexpectedColumn(String),

    #[error("Row {row} has {found} values, expected {expected}")]
    RowWidth {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("Column {column} has {found} values, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("No rows to score")]
    EmptyInput,

    #[error("{step}: cannot handle value {value}")]
    TypeMismatch { step: &'static str, value: String },

    #[error("{step}: value {value} is not a finite integer")]
    NonFinite { step: &'static str, value: f64 },

    #[error("Found unknown category {value} in column {column} during transform")]
    UnknownCategory { column: String, value: String },

    #[error("Probability row has {found} entries, expected {expected}")]
    ProbabilityWidth { found: usize, expected: usize },

    #[error("Invalid probabilities: {0}")]
    InvalidProbabilities(String),

    #[error("Class index {index} out of range for {n_classes} classes")]
    UnknownClassIndex { index: usize, n_classes: usize },

    #[error("Invalid label encoder: {0}")]
    InvalidEncoder(String),

    #[error("Malformed tree: {0}")]
    MalformedTree(String),

    #[error("Scoring service not reachable at {0}")]
    RemoteUnreachable(String),

    #[error("Scoring service returned {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    #[error("Scoring request failed: {0}")]
    RemoteRequest(String),

    #[error("Malformed scoring response: {0}")]
    RemoteResponse(String),
}
