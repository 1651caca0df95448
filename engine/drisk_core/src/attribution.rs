//! Ranking of per-feature attribution values into risk drivers

use crate::error::RiskError;
use drisk_model::{AttributionOutput, POSITIVE_CLASS};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverDirection {
    IncreasesRisk,
    ReducesRisk,
}

/// A feature paired with its attribution value (or change in attribution)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub feature: String,
    pub value: f64,
}

impl Driver {
    pub fn new(feature: impl Into<String>, value: f64) -> Self {
        Self {
            feature: feature.into(),
            value,
        }
    }

    pub fn direction(&self) -> DriverDirection {
        if self.value > 0.0 {
            DriverDirection::IncreasesRisk
        } else {
            DriverDirection::ReducesRisk
        }
    }
}

/// Positive-class contributions for one record, aligned with feature names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionVector {
    features: Vec<String>,
    values: Vec<f64>,
}

impl AttributionVector {
    pub fn new(features: Vec<String>, values: Vec<f64>) -> Result<Self, RiskError> {
        if features.len() != values.len() {
            return Err(RiskError::FeatureCountMismatch {
                expected: features.len(),
                found: values.len(),
            });
        }
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(RiskError::NonFiniteAttribution {
                feature: features[i].clone(),
            });
        }
        Ok(Self { features, values })
    }

    /// Normalize raw engine output: select the positive class, take the first
    /// row, and align it with `feature_names`
    pub fn from_output(
        output: &AttributionOutput,
        feature_names: &[String],
    ) -> Result<Self, RiskError> {
        if let AttributionOutput::PerClass(classes) = output {
            if classes.len() <= POSITIVE_CLASS {
                return Err(RiskError::MissingPositiveClass {
                    classes: classes.len(),
                });
            }
        }
        let rows = output.clone().positive_class()?;
        let first = rows.into_iter().next().ok_or(RiskError::EmptyAttribution)?;
        Self::new(feature_names.to_vec(), first)
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, feature: &str) -> Option<f64> {
        self.features
            .iter()
            .position(|f| f == feature)
            .map(|i| self.values[i])
    }

    /// The `top_k` features with the largest absolute contribution
    pub fn top_drivers(&self, top_k: usize) -> Vec<Driver> {
        rank_by_magnitude(&self.features, &self.values, top_k)
    }

    /// Elementwise `self - previous`; both must cover the same feature order
    pub fn delta(&self, previous: &AttributionVector) -> Result<AttributionVector, RiskError> {
        if self.features != previous.features {
            return Err(RiskError::AttributionSchemaMismatch);
        }
        let values = self
            .values
            .iter()
            .zip(previous.values.iter())
            .map(|(c, p)| c - p)
            .collect();
        Ok(AttributionVector {
            features: self.features.clone(),
            values,
        })
    }
}

/// Pair values with names, sort by descending absolute value and keep `top_k`.
/// The sort is stable, so equal magnitudes keep feature order.
fn rank_by_magnitude(features: &[String], values: &[f64], top_k: usize) -> Vec<Driver> {
    let mut drivers: Vec<Driver> = features
        .iter()
        .zip(values.iter())
        .map(|(f, v)| Driver::new(f.clone(), *v))
        .collect();
    drivers.sort_by(|a, b| b.value.abs().total_cmp(&a.value.abs()));
    drivers.truncate(top_k);
    drivers
}

/// Top contributing features for a single scored record
pub fn get_top_risk_drivers(
    attribution: &AttributionOutput,
    feature_names: &[String],
    top_k: usize,
) -> Result<Vec<Driver>, RiskError> {
    Ok(AttributionVector::from_output(attribution, feature_names)?.top_drivers(top_k))
}

/// Features whose contribution changed the most between two sprints
pub fn compare_driver_change(
    current: &AttributionOutput,
    previous: &AttributionOutput,
    feature_names: &[String],
    top_k: usize,
) -> Result<Vec<Driver>, RiskError> {
    let current = AttributionVector::from_output(current, feature_names)?;
    let previous = AttributionVector::from_output(previous, feature_names)?;
    Ok(current.delta(&previous)?.top_drivers(top_k))
}
