//! Capability traits and error types for risk classifiers and attribution engines

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading or running a model
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Inference failed: {0}")]
    InferenceError(String),
}

/// Named columns with one row of feature values per scored record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self, ModelError> {
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(ModelError::InvalidInput(format!(
                "row {} has {} values but the table has {} columns",
                idx,
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Per-class probabilities for a binary classifier: `[negative, positive]`
pub type ClassProbabilities = [f64; 2];

pub const POSITIVE_CLASS: usize = 1;

/// A trained binary classifier.
///
/// Implementations receive a table whose columns follow the feature schema the
/// model was trained on and return one probability pair per row.
pub trait Classifier: Send + Sync {
    fn predict_proba(&self, table: &FeatureTable) -> Result<Vec<ClassProbabilities>, ModelError>;

    /// Backend identifier used in logs and reports
    fn backend_name(&self) -> &str;
}

/// Raw attribution output as produced by an attribution engine.
///
/// Some engines return one matrix for the positive class, others one matrix per
/// class. Consumers normalize with [`AttributionOutput::positive_class`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributionOutput {
    /// rows x features
    Flat(Vec<Vec<f64>>),
    /// classes x rows x features
    PerClass(Vec<Vec<Vec<f64>>>),
}

impl AttributionOutput {
    /// Select the positive-class matrix (rows x features)
    pub fn positive_class(self) -> Result<Vec<Vec<f64>>, ModelError> {
        match self {
            AttributionOutput::Flat(rows) => Ok(rows),
            AttributionOutput::PerClass(mut classes) => {
                if classes.len() <= POSITIVE_CLASS {
                    return Err(ModelError::InvalidInput(format!(
                        "per-class attribution has {} classes, expected at least 2",
                        classes.len()
                    )));
                }
                Ok(classes.swap_remove(POSITIVE_CLASS))
            }
        }
    }
}

/// Produces per-feature contributions toward the positive class
pub trait Attributor: Send + Sync {
    fn attribute(&self, table: &FeatureTable) -> Result<AttributionOutput, ModelError>;

    fn method_name(&self) -> &str;
}

pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_creation_valid() {
        let t = FeatureTable::new(
            vec!["a".into(), "b".into()],
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        )
        .unwrap();
        assert_eq!(t.width(), 2);
        assert_eq!(t.len(), 2);
        assert_eq!(t.rows()[1], vec![3.0, 4.0]);
    }

    #[test]
    fn table_creation_rejects_ragged_rows() {
        let result = FeatureTable::new(vec!["a".into(), "b".into()], vec![vec![1.0]]);
        assert!(matches!(result.unwrap_err(), ModelError::InvalidInput(_)));
    }

    #[test]
    fn positive_class_of_flat_output_is_identity() {
        let out = AttributionOutput::Flat(vec![vec![0.1, -0.2]]);
        assert_eq!(out.positive_class().unwrap(), vec![vec![0.1, -0.2]]);
    }

    #[test]
    fn positive_class_selects_second_slice() {
        let out = AttributionOutput::PerClass(vec![vec![vec![-0.1, 0.2]], vec![vec![0.1, -0.2]]]);
        assert_eq!(out.positive_class().unwrap(), vec![vec![0.1, -0.2]]);
    }

    #[test]
    fn positive_class_requires_two_classes() {
        let out = AttributionOutput::PerClass(vec![vec![vec![0.1]]]);
        assert!(out.positive_class().is_err());
    }

    #[test]
    fn untagged_json_distinguishes_shapes() {
        let flat: AttributionOutput = serde_json::from_str("[[0.5, -0.5]]").unwrap();
        assert!(matches!(flat, AttributionOutput::Flat(_)));
        let per_class: AttributionOutput = serde_json::from_str("[[[0.5]], [[-0.5]]]").unwrap();
        assert!(matches!(per_class, AttributionOutput::PerClass(_)));
    }

    #[test]
    fn sigmoid_is_centered() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(10.0) > 0.99);
    }
}
