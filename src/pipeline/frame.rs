//! Tabular input for the trained pipeline.
//!
//! A `Frame` is a small column-named table of scalar cells. The form always
//! produces a single row, but the pipeline itself is row-agnostic so the same
//! code path serves the remote scoring wire format.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::PipelineError;

// ═══════════════════════════════════════════════════════════
// Cells
// ═══════════════════════════════════════════════════════════

/// One scalar cell: an integer code, a fractional number, or a category code.
///
/// Serialized untagged so the remote wire format carries plain JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Numeric view of the cell. Text cells have none.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Category equality: text compares exactly, numbers compare by value
    /// (so a category `1` matches both `Int(1)` and `Float(1.0)`).
    pub fn same_category(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Text(_), _) | (_, Value::Text(_)) => false,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "'{s}'"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

// ═══════════════════════════════════════════════════════════
// Frame
// ═══════════════════════════════════════════════════════════

/// Column-named table, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Frame {
    /// Build a frame, checking that every row matches the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, PipelineError> {
        for (row, values) in rows.iter().enumerate() {
            if values.len() != columns.len() {
                return Err(PipelineError::RowWidth {
                    row,
                    found: values.len(),
                    expected: columns.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Build a one-row frame from `(column, value)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let (columns, row): (Vec<String>, Vec<Value>) =
            pairs.into_iter().map(|(c, v)| (c.into(), v)).unzip();
        Self {
            columns,
            rows: vec![row],
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Result<usize, PipelineError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
    }

    /// Cell lookup by row and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// All values of one column, top to bottom.
    pub fn column_values(&self, name: &str) -> Result<Vec<Value>, PipelineError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| r[idx].clone()).collect())
    }

    /// Replace a column's values. The replacement must be aligned one-to-one.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<(), PipelineError> {
        let idx = self.column_index(name)?;
        if values.len() != self.rows.len() {
            return Err(PipelineError::ColumnLength {
                column: name.to_string(),
                expected: self.rows.len(),
                found: values.len(),
            });
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[idx] = value;
        }
        Ok(())
    }

    /// Reorder columns to `order`. Fails when the column sets differ.
    pub fn select(&self, order: &[String]) -> Result<Frame, PipelineError> {
        if let Some(extra) = self.columns.iter().find(|c| !order.contains(c)) {
            return Err(PipelineError::UnexpectedColumn(extra.clone()));
        }
        let indices = order
            .iter()
            .map(|name| self.column_index(name))
            .collect::<Result<Vec<_>, _>>()?;
        let rows = self
            .rows
            .iter()
            .map(|r| indices.iter().map(|&i| r[i].clone()).collect())
            .collect();
        Ok(Frame {
            columns: order.to_vec(),
            rows,
        })
    }
}
