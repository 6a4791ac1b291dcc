//! Loading the persisted pipeline and label encoder.
//!
//! Both artifacts are JSON documents produced at training time. Loading is
//! all-or-nothing: any problem with either file yields an `ArtifactError`
//! and the caller runs without predictions.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::classifier::Classifier;
use super::forest::RandomForest;
use super::label_encoder::LabelEncoder;
use super::remote::{RemoteClassifier, RemoteEndpoint};
use super::trained::{PipelineStep, TrainedPipeline};
use super::PipelineError;

/// Artifact format this build understands.
pub const FORMAT_VERSION: u32 = 1;

pub const DEFAULT_PIPELINE_FILE: &str = "pipeline_obesidade_completo_rf.json";
pub const DEFAULT_ENCODER_FILE: &str = "label_encoder_rf.json";

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Artifact not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported artifact format version {found} (expected {})", FORMAT_VERSION)]
    UnsupportedVersion { found: u32 },

    #[error("Pipeline schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Invalid artifact: {0}")]
    Invalid(#[from] PipelineError),
}

/// Model stage as written in the pipeline artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    RandomForest(RandomForest),
    Remote(RemoteEndpoint),
}

impl ClassifierArtifact {
    pub fn n_classes(&self) -> usize {
        match self {
            ClassifierArtifact::RandomForest(forest) => forest.n_classes,
            ClassifierArtifact::Remote(endpoint) => endpoint.n_classes,
        }
    }

    fn build(self) -> Result<Box<dyn Classifier>, PipelineError> {
        match self {
            ClassifierArtifact::RandomForest(forest) => {
                forest.validate()?;
                Ok(Box::new(forest))
            }
            ClassifierArtifact::Remote(endpoint) => {
                Ok(Box::new(RemoteClassifier::from_endpoint(&endpoint)?))
            }
        }
    }
}

/// On-disk pipeline document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineArtifact {
    pub format_version: u32,
    pub columns: Vec<String>,
    #[serde(default)]
    pub steps: Vec<PipelineStep>,
    pub classifier: ClassifierArtifact,
}

impl PipelineArtifact {
    /// Structural checks that do not need the classifier built.
    pub fn check(&self, expected_columns: &[&str]) -> Result<(), ArtifactError> {
        if self.format_version != FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                found: self.format_version,
            });
        }
        if self.columns.len() != expected_columns.len()
            || self.columns.iter().zip(expected_columns).any(|(a, b)| a != b)
        {
            return Err(ArtifactError::SchemaMismatch(format!(
                "pipeline expects [{}], form provides [{}]",
                self.columns.join(", "),
                expected_columns.join(", ")
            )));
        }
        for step in &self.steps {
            if !self.columns.contains(&step.column) {
                return Err(ArtifactError::SchemaMismatch(format!(
                    "step on unknown column '{}'",
                    step.column
                )));
            }
        }
        if let ClassifierArtifact::RandomForest(forest) = &self.classifier {
            if let Some(feature) = forest
                .features
                .iter()
                .find(|f| !self.columns.iter().any(|c| c == f.column()))
            {
                return Err(ArtifactError::SchemaMismatch(format!(
                    "feature on unknown column '{}'",
                    feature.column()
                )));
            }
        }
        Ok(())
    }

    pub fn into_pipeline(self) -> Result<TrainedPipeline, ArtifactError> {
        let classifier = self.classifier.build()?;
        Ok(TrainedPipeline::new(self.columns, self.steps, classifier))
    }
}

/// A ready-to-use pipeline plus the decoder for its output.
pub struct LoadedArtifacts {
    pub pipeline: TrainedPipeline,
    pub label_encoder: LabelEncoder,
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ArtifactError> {
    if !path.is_file() {
        return Err(ArtifactError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and cross-check both artifacts.
pub fn load_artifacts(
    pipeline_path: &Path,
    encoder_path: &Path,
    expected_columns: &[&str],
) -> Result<LoadedArtifacts, ArtifactError> {
    let artifact: PipelineArtifact = read_json(pipeline_path)?;
    artifact.check(expected_columns)?;

    let label_encoder: LabelEncoder = read_json(encoder_path)?;
    label_encoder.validate()?;

    if artifact.classifier.n_classes() != label_encoder.n_classes() {
        return Err(ArtifactError::SchemaMismatch(format!(
            "classifier scores {} classes, label encoder has {}",
            artifact.classifier.n_classes(),
            label_encoder.n_classes()
        )));
    }

    let pipeline = artifact.into_pipeline()?;
    tracing::info!(
        pipeline = %pipeline_path.display(),
        encoder = %encoder_path.display(),
        classifier = %pipeline.describe(),
        classes = label_encoder.n_classes(),
        "Artifacts loaded"
    );

    Ok(LoadedArtifacts {
        pipeline,
        label_encoder,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    const COLUMNS: [&str; 2] = ["mtrans", "idade"];

    fn pipeline_json(n_classes: usize) -> serde_json::Value {
        serde_json::json!({
            "format_version": 1,
            "columns": ["mtrans", "idade"],
            "steps": [
                {"column": "mtrans", "adapter": "mtrans_grouper"},
                {"column": "idade", "adapter": "rounding"}
            ],
            "classifier": {
                "kind": "random_forest",
                "n_classes": n_classes,
                "features": [
                    {"kind": "numeric", "column": "idade"}
                ],
                "trees": [{
                    "children_left": [1, -1, -1],
                    "children_right": [2, -1, -1],
                    "feature": [0, -2, -2],
                    "threshold": [30.5, -2.0, -2.0],
                    "value": [[4.0, 4.0], [3.0, 1.0], [1.0, 3.0]]
                }]
            }
        })
    }

    fn write(dir: &TempDir, name: &str, value: &serde_json::Value) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, value.to_string()).unwrap();
        path
    }

    fn encoder_json(classes: &[&str]) -> serde_json::Value {
        serde_json::json!({ "classes_": classes })
    }

    #[test]
    fn loads_consistent_artifacts() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, DEFAULT_PIPELINE_FILE, &pipeline_json(2));
        let e = write(&dir, DEFAULT_ENCODER_FILE, &encoder_json(&["Peso Normal", "Obesidade Tipo I"]));

        let loaded = load_artifacts(&p, &e, &COLUMNS).unwrap();
        assert_eq!(loaded.pipeline.columns(), COLUMNS);
        assert_eq!(loaded.pipeline.steps().len(), 2);
        assert_eq!(loaded.label_encoder.n_classes(), 2);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let e = write(&dir, DEFAULT_ENCODER_FILE, &encoder_json(&["a", "b"]));
        let err = load_artifacts(&dir.path().join("nope.json"), &e, &COLUMNS)
            .err()
            .unwrap();
        assert!(matches!(err, ArtifactError::NotFound { .. }));
    }

    #[test]
    fn garbage_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("pipeline.json");
        std::fs::write(&p, "not json").unwrap();
        let e = write(&dir, DEFAULT_ENCODER_FILE, &encoder_json(&["a", "b"]));
        let err = load_artifacts(&p, &e, &COLUMNS).err().unwrap();
        assert!(matches!(err, ArtifactError::Parse { .. }));
    }

    #[test]
    fn version_is_checked() {
        let dir = TempDir::new().unwrap();
        let mut doc = pipeline_json(2);
        doc["format_version"] = serde_json::json!(2);
        let p = write(&dir, "p.json", &doc);
        let e = write(&dir, "e.json", &encoder_json(&["a", "b"]));
        let err = load_artifacts(&p, &e, &COLUMNS).err().unwrap();
        assert!(matches!(err, ArtifactError::UnsupportedVersion { found: 2 }));
    }

    #[test]
    fn column_order_must_match_form() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "p.json", &pipeline_json(2));
        let e = write(&dir, "e.json", &encoder_json(&["a", "b"]));
        let err = load_artifacts(&p, &e, &["idade", "mtrans"]).err().unwrap();
        assert!(matches!(err, ArtifactError::SchemaMismatch(_)));
    }

    #[test]
    fn class_count_must_agree() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "p.json", &pipeline_json(2));
        let e = write(&dir, "e.json", &encoder_json(&["a", "b", "c"]));
        let err = load_artifacts(&p, &e, &COLUMNS).err().unwrap();
        assert!(err.to_string().contains("3"));
        assert!(matches!(err, ArtifactError::SchemaMismatch(_)));
    }

    #[test]
    fn step_on_unknown_column_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut doc = pipeline_json(2);
        doc["steps"] = serde_json::json!([{"column": "calc", "adapter": "calc_grouper"}]);
        let p = write(&dir, "p.json", &doc);
        let e = write(&dir, "e.json", &encoder_json(&["a", "b"]));
        let err = load_artifacts(&p, &e, &COLUMNS).err().unwrap();
        assert!(err.to_string().contains("calc"));
    }

    #[test]
    fn malformed_tree_is_invalid() {
        let dir = TempDir::new().unwrap();
        let mut doc = pipeline_json(2);
        doc["classifier"]["trees"][0]["children_left"] = serde_json::json!([0, -1, -1]);
        let p = write(&dir, "p.json", &doc);
        let e = write(&dir, "e.json", &encoder_json(&["a", "b"]));
        let err = load_artifacts(&p, &e, &COLUMNS).err().unwrap();
        assert!(matches!(err, ArtifactError::Invalid(PipelineError::MalformedTree(_))));
    }

    #[test]
    fn remote_classifier_artifact_loads() {
        let dir = TempDir::new().unwrap();
        let mut doc = pipeline_json(2);
        doc["classifier"] = serde_json::json!({
            "kind": "remote",
            "url": "http://127.0.0.1:9000/score",
            "n_classes": 2
        });
        let p = write(&dir, "p.json", &doc);
        let e = write(&dir, "e.json", &encoder_json(&["a", "b"]));
        let loaded = load_artifacts(&p, &e, &COLUMNS).unwrap();
        assert_eq!(loaded.pipeline.describe(), "remote(http://127.0.0.1:9000/score, 2 classes)");
    }

    #[test]
    fn bundled_demo_artifacts_load() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("artifacts");
        let loaded = load_artifacts(
            &root.join(DEFAULT_PIPELINE_FILE),
            &root.join(DEFAULT_ENCODER_FILE),
            &crate::models::survey::SCHEMA_COLUMNS,
        )
        .unwrap();
        assert_eq!(loaded.label_encoder.n_classes(), 7);
    }
}
