//! Occlusion attribution for arbitrary classifiers
//!
//! The contribution of feature `i` is the drop in positive-class probability
//! when `x_i` is replaced by its reference value:
//! `p(x) - p(x with x_i = reference_i)`.

use crate::backend::{
    AttributionOutput, Attributor, Classifier, FeatureTable, ModelError, POSITIVE_CLASS,
};
use std::sync::Arc;

pub struct OcclusionAttributor {
    classifier: Arc<dyn Classifier>,
    reference: Vec<f64>,
}

impl OcclusionAttributor {
    pub fn new(classifier: Arc<dyn Classifier>, reference: Vec<f64>) -> Self {
        Self {
            classifier,
            reference,
        }
    }

    fn positive(&self, table: &FeatureTable) -> Result<Vec<f64>, ModelError> {
        Ok(self
            .classifier
            .predict_proba(table)?
            .into_iter()
            .map(|p| p[POSITIVE_CLASS])
            .collect())
    }
}

impl Attributor for OcclusionAttributor {
    fn attribute(&self, table: &FeatureTable) -> Result<AttributionOutput, ModelError> {
        let n = table.width();
        if self.reference.len() != n {
            return Err(ModelError::InvalidInput(format!(
                "reference has {} values but the table has {} columns",
                self.reference.len(),
                n
            )));
        }

        let mut out = Vec::with_capacity(table.len());
        for row in table.rows() {
            // row 0 is the original, rows 1..=n each occlude one feature
            let mut batch = Vec::with_capacity(n + 1);
            batch.push(row.clone());
            for i in 0..n {
                let mut occluded = row.clone();
                occluded[i] = self.reference[i];
                batch.push(occluded);
            }
            let batch = FeatureTable::new(table.columns().to_vec(), batch)?;
            let probs = self.positive(&batch)?;
            if probs.len() != n + 1 {
                return Err(ModelError::InferenceError(format!(
                    "classifier returned {} rows for a batch of {}",
                    probs.len(),
                    n + 1
                )));
            }
            let base = probs[0];
            out.push(probs[1..].iter().map(|p| base - p).collect());
        }
        Ok(AttributionOutput::Flat(out))
    }

    fn method_name(&self) -> &str {
        "occlusion"
    }
}
