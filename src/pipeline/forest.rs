//! Rehosted random forest classifier.
//!
//! Trees use the flat parallel-array layout scikit-learn exports
//! (`children_left`, `children_right`, `feature`, `threshold`, `value`), so a
//! fitted forest can be dumped to JSON once and scored here without the
//! original runtime. The encoding plan turns a preprocessed frame into the
//! numeric feature vector the trees were fitted on.

use serde::{Deserialize, Serialize};

use super::classifier::Classifier;
use super::frame::{Frame, Value};
use super::PipelineError;

/// Marker for "no child" in the flat layout.
const LEAF: i64 = -1;

// ═══════════════════════════════════════════════════════════
// Encoding plan
// ═══════════════════════════════════════════════════════════

/// What to do with a category the encoder was not fitted on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    #[default]
    Error,
    /// Encode as all zeros.
    Ignore,
}

/// One entry of the encoding plan, in feature-vector order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureEncoding {
    /// The cell itself, as a number. Produces one feature.
    Numeric { column: String },
    /// One indicator feature per fitted category.
    OneHot {
        column: String,
        categories: Vec<Value>,
        #[serde(default)]
        handle_unknown: HandleUnknown,
    },
}

impl FeatureEncoding {
    pub fn column(&self) -> &str {
        match self {
            FeatureEncoding::Numeric { column } | FeatureEncoding::OneHot { column, .. } => column,
        }
    }

    pub fn width(&self) -> usize {
        match self {
            FeatureEncoding::Numeric { .. } => 1,
            FeatureEncoding::OneHot { categories, .. } => categories.len(),
        }
    }

    fn encode(&self, value: &Value, out: &mut Vec<f64>) -> Result<(), PipelineError> {
        match self {
            FeatureEncoding::Numeric { column } => {
                let x = value.as_f64().ok_or_else(|| PipelineError::TypeMismatch {
                    step: "numeric",
                    value: format!("{value} in column {column}"),
                })?;
                out.push(x);
            }
            FeatureEncoding::OneHot {
                column,
                categories,
                handle_unknown,
            } => {
                let hit = categories.iter().position(|c| c.same_category(value));
                if hit.is_none() && *handle_unknown == HandleUnknown::Error {
                    return Err(PipelineError::UnknownCategory {
                        column: column.clone(),
                        value: value.to_string(),
                    });
                }
                out.extend((0..categories.len()).map(|i| if Some(i) == hit { 1.0 } else { 0.0 }));
            }
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Decision tree
// ═══════════════════════════════════════════════════════════

/// One fitted tree in flat layout. Node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights (counts or fractions; normalized at the leaf).
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    pub fn n_nodes(&self) -> usize {
        self.children_left.len()
    }

    /// Structural validation, run once at load time.
    ///
    /// Children must point strictly forward, which rules out cycles and lets
    /// `leaf_distribution` walk without a visit guard.
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), PipelineError> {
        let n = self.n_nodes();
        if n == 0 {
            return Err(PipelineError::MalformedTree("tree has no nodes".into()));
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err(PipelineError::MalformedTree(
                "node arrays have different lengths".into(),
            ));
        }
        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if self.value[node].len() != n_classes {
                return Err(PipelineError::MalformedTree(format!(
                    "node {node} has {} class weights, expected {n_classes}",
                    self.value[node].len()
                )));
            }
            if left == LEAF || right == LEAF {
                if left != right {
                    return Err(PipelineError::MalformedTree(format!(
                        "node {node} has exactly one child"
                    )));
                }
                let total: f64 = self.value[node].iter().sum();
                if !(total > 0.0) || self.value[node].iter().any(|w| *w < 0.0) {
                    return Err(PipelineError::MalformedTree(format!(
                        "leaf {node} has no usable class weights"
                    )));
                }
                continue;
            }
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(PipelineError::MalformedTree(format!(
                        "node {node} points to invalid child {child}"
                    )));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(PipelineError::MalformedTree(format!(
                    "node {node} splits on feature {feature}, only {n_features} features"
                )));
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf and return its normalized class weights.
    pub fn leaf_distribution(&self, x: &[f64]) -> Vec<f64> {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let feature = self.feature[node] as usize;
            // Trees are fitted on float32 inputs; compare at that precision.
            node = if (x[feature] as f32) <= (self.threshold[node] as f32) {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        let weights = &self.value[node];
        let total: f64 = weights.iter().sum();
        weights.iter().map(|w| w / total).collect()
    }
}

// ═══════════════════════════════════════════════════════════
// Forest
// ═══════════════════════════════════════════════════════════

/// Random forest: mean of per-tree leaf distributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_classes: usize,
    pub features: Vec<FeatureEncoding>,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Width of the encoded feature vector.
    pub fn n_features(&self) -> usize {
        self.features.iter().map(FeatureEncoding::width).sum()
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.n_classes == 0 {
            return Err(PipelineError::MalformedTree("forest has no classes".into()));
        }
        if self.trees.is_empty() {
            return Err(PipelineError::MalformedTree("forest has no trees".into()));
        }
        let n_features = self.n_features();
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(n_features, self.n_classes).map_err(|e| match e {
                PipelineError::MalformedTree(msg) => {
                    PipelineError::MalformedTree(format!("tree {idx}: {msg}"))
                }
                other => other,
            })?;
        }
        Ok(())
    }

    /// Encode one frame row into the numeric feature vector.
    pub fn encode_row(&self, frame: &Frame, row: usize) -> Result<Vec<f64>, PipelineError> {
        let mut out = Vec::with_capacity(self.n_features());
        for encoding in &self.features {
            let value = frame
                .get(row, encoding.column())
                .ok_or_else(|| PipelineError::MissingColumn(encoding.column().to_string()))?;
            encoding.encode(value, &mut out)?;
        }
        Ok(out)
    }
}

impl Classifier for RandomForest {
    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_proba(&self, frame: &Frame) -> Result<Vec<Vec<f64>>, PipelineError> {
        (0..frame.n_rows())
            .map(|row| {
                let x = self.encode_row(frame, row)?;
                let mut proba = vec![0.0; self.n_classes];
                for tree in &self.trees {
                    for (acc, p) in proba.iter_mut().zip(tree.leaf_distribution(&x)) {
                        *acc += p;
                    }
                }
                let n_trees = self.trees.len() as f64;
                proba.iter_mut().for_each(|p| *p /= n_trees);
                Ok(proba)
            })
            .collect()
    }

    fn describe(&self) -> String {
        format!(
            "random_forest({} trees, {} features, {} classes)",
            self.trees.len(),
            self.n_features(),
            self.n_classes
        )
    }
}
