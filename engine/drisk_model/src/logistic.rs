//! Logistic regression classifier: p = sigmoid(b + W·x)
//!
//! Attribution is exact in log-odds space: feature `i` contributes
//! `w_i * (x_i - background_i)`, so the contributions sum to the margin
//! relative to the background point.

use crate::backend::{
    sigmoid, AttributionOutput, Attributor, ClassProbabilities, Classifier, FeatureTable,
    ModelError,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    /// Reference point for attribution, typically the training means
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Vec<f64>>,
}

impl LogisticModel {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            intercept,
            coefficients,
            background: None,
        }
    }

    pub fn with_background(mut self, background: Vec<f64>) -> Self {
        self.background = Some(background);
        self
    }

    pub fn validate(&self, width: usize) -> Result<(), ModelError> {
        if self.coefficients.len() != width {
            return Err(ModelError::InvalidArtifact(format!(
                "logistic model has {} coefficients but the feature schema has {} columns",
                self.coefficients.len(),
                width
            )));
        }
        if let Some(bg) = &self.background {
            if bg.len() != width {
                return Err(ModelError::InvalidArtifact(format!(
                    "background has {} values but the feature schema has {} columns",
                    bg.len(),
                    width
                )));
            }
        }
        Ok(())
    }

    fn check_width(&self, table: &FeatureTable) -> Result<(), ModelError> {
        if table.width() != self.coefficients.len() {
            return Err(ModelError::InvalidInput(format!(
                "expected {} features, got {}",
                self.coefficients.len(),
                table.width()
            )));
        }
        Ok(())
    }

    fn margin(&self, row: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(row.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept
    }
}

impl Classifier for LogisticModel {
    fn predict_proba(&self, table: &FeatureTable) -> Result<Vec<ClassProbabilities>, ModelError> {
        self.check_width(table)?;
        Ok(table
            .rows()
            .iter()
            .map(|row| {
                let p = sigmoid(self.margin(row));
                [1.0 - p, p]
            })
            .collect())
    }

    fn backend_name(&self) -> &str {
        "logistic"
    }
}

impl Attributor for LogisticModel {
    fn attribute(&self, table: &FeatureTable) -> Result<AttributionOutput, ModelError> {
        self.check_width(table)?;
        self.validate(table.width())?;
        let rows = table
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(i, x)| {
                        let reference = self.background.as_ref().map_or(0.0, |bg| bg[i]);
                        self.coefficients[i] * (x - reference)
                    })
                    .collect()
            })
            .collect();
        Ok(AttributionOutput::Flat(rows))
    }

    fn method_name(&self) -> &str {
        "linear_log_odds"
    }
}
