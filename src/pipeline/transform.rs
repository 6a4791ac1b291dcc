//! Preprocessing adapters bundled into the trained pipeline.
//!
//! All three adapters are stateless: `fit` learns nothing and hands back the
//! adapter unchanged. They run on one column at a time, before the
//! classifier's encoding stage.

use serde::{Deserialize, Serialize};

use super::frame::Value;
use super::PipelineError;

/// A column adapter with the fit/transform shape of the trained pipeline.
pub trait Transformer: Send + Sync {
    /// Adapter name as referenced by pipeline artifacts.
    fn name(&self) -> &'static str;

    /// No-op fit. None of the adapters carry learned parameters.
    fn fit(&mut self, _values: &[Value]) -> &mut Self
    where
        Self: Sized,
    {
        self
    }

    /// Map a column one-to-one. Output is aligned with input.
    fn transform(&self, values: &[Value]) -> Result<Vec<Value>, PipelineError>;
}

// ═══════════════════════════════════════════════════════════
// Category groupers
// ═══════════════════════════════════════════════════════════

/// Transport modes too rare to keep as their own level.
pub const RARE_TRANSPORT_MODES: &[&str] = &["moto", "bicicleta", "caminhando"];
pub const TRANSPORT_BUCKET: &str = "outros";

/// Collapses a fixed set of rare category codes into one bucket code.
///
/// Values outside the substitution table pass through untouched, including
/// codes the survey never offers and non-text cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGrouper {
    name: &'static str,
    rare: &'static [&'static str],
    bucket: &'static str,
}

impl CategoryGrouper {
    /// `mtrans`: moto / bicicleta / caminhando → outros.
    pub const fn transport() -> Self {
        Self {
            name: "mtrans_grouper",
            rare: RARE_TRANSPORT_MODES,
            bucket: TRANSPORT_BUCKET,
        }
    }

    /// `calc`: sempre → frequentemente.
    pub const fn alcohol() -> Self {
        Self {
            name: "calc_grouper",
            rare: &["sempre"],
            bucket: "frequentemente",
        }
    }

    fn group(&self, value: &Value) -> Value {
        match value {
            Value::Text(s) if self.rare.contains(&s.as_str()) => Value::Text(self.bucket.to_string()),
            other => other.clone(),
        }
    }
}

impl Transformer for CategoryGrouper {
    fn name(&self) -> &'static str {
        self.name
    }

    fn transform(&self, values: &[Value]) -> Result<Vec<Value>, PipelineError> {
        Ok(values.iter().map(|v| self.group(v)).collect())
    }
}

// ═══════════════════════════════════════════════════════════
// Rounding
// ═══════════════════════════════════════════════════════════

/// Coerces synthetic fractional answers (e.g. 2.45) to integer codes.
///
/// Ties round half to even (2.5 → 2, 3.5 → 4), the convention the pipeline
/// was fitted with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundingTransformer;

impl RoundingTransformer {
    fn round(&self, value: &Value) -> Result<Value, PipelineError> {
        match value {
            Value::Int(v) => Ok(Value::Int(*v)),
            Value::Float(v) if !v.is_finite() => Err(PipelineError::NonFinite {
                step: self.name(),
                value: *v,
            }),
            Value::Float(v) => {
                let rounded = v.round_ties_even();
                if rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
                    return Err(PipelineError::NonFinite {
                        step: self.name(),
                        value: *v,
                    });
                }
                Ok(Value::Int(rounded as i64))
            }
            Value::Text(_) => Err(PipelineError::TypeMismatch {
                step: self.name(),
                value: value.to_string(),
            }),
        }
    }
}

impl Transformer for RoundingTransformer {
    fn name(&self) -> &'static str {
        "rounding"
    }

    fn transform(&self, values: &[Value]) -> Result<Vec<Value>, PipelineError> {
        values.iter().map(|v| self.round(v)).collect()
    }
}

// ═══════════════════════════════════════════════════════════
// Artifact-facing adapter enum
// ═══════════════════════════════════════════════════════════

/// Adapter reference as written in a pipeline artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adapter {
    MtransGrouper,
    CalcGrouper,
    Rounding,
}

impl Transformer for Adapter {
    fn name(&self) -> &'static str {
        match self {
            Adapter::MtransGrouper => CategoryGrouper::transport().name(),
            Adapter::CalcGrouper => CategoryGrouper::alcohol().name(),
            Adapter::Rounding => RoundingTransformer.name(),
        }
    }

    fn transform(&self, values: &[Value]) -> Result<Vec<Value>, PipelineError> {
        match self {
            Adapter::MtransGrouper => CategoryGrouper::transport().transform(values),
            Adapter::CalcGrouper => CategoryGrouper::alcohol().transform(values),
            Adapter::Rounding => RoundingTransformer.transform(values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(values: &[&str]) -> Vec<Value> {
        values.iter().map(|v| Value::from(*v)).collect()
    }

    // -- Transport grouper ----------------------------------------------------

    #[test]
    fn rare_transport_modes_become_outros() {
        let out = CategoryGrouper::transport()
            .transform(&texts(&["moto", "bicicleta", "caminhando"]))
            .unwrap();
        assert_eq!(out, texts(&["outros", "outros", "outros"]));
    }

    #[test]
    fn common_and_unknown_transport_modes_pass_through() {
        let input = texts(&["carro", "transporte_publico", "aviao", "", "Moto"]);
        let out = CategoryGrouper::transport().transform(&input).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn grouper_preserves_order_and_length() {
        let input = texts(&["carro", "moto", "transporte_publico", "caminhando"]);
        let out = CategoryGrouper::transport().transform(&input).unwrap();
        assert_eq!(out, texts(&["carro", "outros", "transporte_publico", "outros"]));
    }

    #[test]
    fn grouper_passes_non_text_cells_through() {
        let input = vec![Value::Int(3), Value::Float(0.5)];
        let out = CategoryGrouper::transport().transform(&input).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn grouper_handles_empty_column() {
        assert!(CategoryGrouper::transport().transform(&[]).unwrap().is_empty());
    }

    // -- Alcohol grouper ------------------------------------------------------

    #[test]
    fn sempre_becomes_frequentemente() {
        let out = CategoryGrouper::alcohol().transform(&texts(&["sempre"])).unwrap();
        assert_eq!(out, texts(&["frequentemente"]));
    }

    #[test]
    fn other_alcohol_frequencies_unchanged() {
        let input = texts(&["nunca", "as_vezes", "frequentemente", "diariamente"]);
        let out = CategoryGrouper::alcohol().transform(&input).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn alcohol_grouper_is_idempotent() {
        let grouper = CategoryGrouper::alcohol();
        let input = texts(&["sempre", "nunca", "as_vezes", "frequentemente", "sempre"]);
        let once = grouper.transform(&input).unwrap();
        let twice = grouper.transform(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn fit_is_a_no_op() {
        let mut grouper = CategoryGrouper::transport();
        let before = grouper.clone();
        let fitted = grouper.fit(&texts(&["moto", "carro"])).clone();
        assert_eq!(fitted, before);

        let mut rounder = RoundingTransformer;
        assert_eq!(*rounder.fit(&[Value::Float(1.7)]), RoundingTransformer);
    }

    // -- Rounding -------------------------------------------------------------

    #[test]
    fn rounds_synthetic_values_to_nearest_integer() {
        let out = RoundingTransformer
            .transform(&[Value::Float(2.45), Value::Float(1.51), Value::Float(0.2)])
            .unwrap();
        assert_eq!(out, vec![Value::Int(2), Value::Int(2), Value::Int(0)]);
    }

    #[test]
    fn ties_round_half_to_even() {
        let out = RoundingTransformer
            .transform(&[
                Value::Float(2.5),
                Value::Float(3.5),
                Value::Float(0.5),
                Value::Float(-2.5),
            ])
            .unwrap();
        assert_eq!(
            out,
            vec![Value::Int(2), Value::Int(4), Value::Int(0), Value::Int(-2)]
        );
    }

    #[test]
    fn integers_are_unchanged() {
        let input = vec![Value::Int(0), Value::Int(3), Value::Int(-7)];
        assert_eq!(RoundingTransformer.transform(&input).unwrap(), input);
    }

    #[test]
    fn rounding_text_is_a_type_mismatch() {
        let err = RoundingTransformer
            .transform(&[Value::Float(1.0), Value::from("dois")])
            .unwrap_err();
        assert!(matches!(err, PipelineError::TypeMismatch { step: "rounding", .. }));
    }

    #[test]
    fn rounding_non_finite_fails() {
        let err = RoundingTransformer.transform(&[Value::Float(f64::NAN)]).unwrap_err();
        assert!(matches!(err, PipelineError::NonFinite { .. }));
    }

    // -- Adapter --------------------------------------------------------------

    #[test]
    fn adapter_names_match_artifact_spelling() {
        for (adapter, name) in [
            (Adapter::MtransGrouper, "mtrans_grouper"),
            (Adapter::CalcGrouper, "calc_grouper"),
            (Adapter::Rounding, "rounding"),
        ] {
            assert_eq!(adapter.name(), name);
            let json = serde_json::to_string(&adapter).unwrap();
            assert_eq!(json, format!("\"{name}\""));
        }
    }

    #[test]
    fn adapter_dispatches_to_concrete_transform() {
        let out = Adapter::MtransGrouper.transform(&texts(&["bicicleta"])).unwrap();
        assert_eq!(out, texts(&["outros"]));
        let out = Adapter::Rounding.transform(&[Value::Float(1.2)]).unwrap();
        assert_eq!(out, vec![Value::Int(1)]);
    }
}
