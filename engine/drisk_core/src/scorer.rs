//! Risk scorer: feature transform, schema projection, positive-class probability

use crate::error::RiskError;
use crate::features::feature_table;
use crate::record::SprintRecord;
use drisk_model::{Classifier, FeatureSchema, FeatureTable, POSITIVE_CLASS};
use std::sync::Arc;

#[derive(Clone)]
pub struct RiskScorer {
    classifier: Arc<dyn Classifier>,
    schema: FeatureSchema,
}

impl RiskScorer {
    pub fn new(classifier: Arc<dyn Classifier>, schema: FeatureSchema) -> Self {
        Self { classifier, schema }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Model-ready table for `records`
    pub fn features(&self, records: &[SprintRecord]) -> Result<FeatureTable, RiskError> {
        feature_table(records, &self.schema)
    }

    /// Probability in [0,1] that the sprint is high delivery risk
    pub fn predict_risk(&self, record: &SprintRecord) -> Result<f64, RiskError> {
        let scores = self.predict_batch(std::slice::from_ref(record))?;
        scores.first().copied().ok_or(RiskError::EmptyPrediction)
    }

    pub fn predict_batch(&self, records: &[SprintRecord]) -> Result<Vec<f64>, RiskError> {
        let table = self.features(records)?;
        let probs = self.classifier.predict_proba(&table)?;
        if probs.len() != records.len() {
            return Err(RiskError::EmptyPrediction);
        }
        log::trace!(
            "scored {} records with {} backend",
            records.len(),
            self.classifier.backend_name()
        );
        Ok(probs.into_iter().map(|p| p[POSITIVE_CLASS]).collect())
    }
}

impl std::fmt::Debug for RiskScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskScorer")
            .field("classifier", &self.classifier.backend_name())
            .field("schema", &self.schema)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drisk_model::{ClassProbabilities, LogisticModel, ModelError};

    struct Fixed(f64);

    impl Classifier for Fixed {
        fn predict_proba(
            &self,
            table: &FeatureTable,
        ) -> Result<Vec<ClassProbabilities>, ModelError> {
            Ok(vec![[1.0 - self.0, self.0]; table.len()])
        }

        fn backend_name(&self) -> &str {
            "fixed"
        }
    }

    struct Silent;

    impl Classifier for Silent {
        fn predict_proba(&self, _: &FeatureTable) -> Result<Vec<ClassProbabilities>, ModelError> {
            Ok(vec![])
        }

        fn backend_name(&self) -> &str {
            "silent"
        }
    }

    fn schema(cols: &[&str]) -> FeatureSchema {
        FeatureSchema::new(cols.iter().map(|c| c.to_string()).collect()).unwrap()
    }

    #[test]
    fn returns_positive_class_probability() {
        let scorer = RiskScorer::new(Arc::new(Fixed(0.73)), schema(&["delivery_gap"]));
        let p = scorer.predict_risk(&SprintRecord::zeroed("P1", "1")).unwrap();
        assert_eq!(p, 0.73);
    }

    #[test]
    fn schema_mismatch_propagates() {
        let scorer = RiskScorer::new(
            Arc::new(Fixed(0.5)),
            schema(&["delivery_gap", "velocity_trend"]),
        );
        let err = scorer
            .predict_risk(&SprintRecord::zeroed("P1", "1"))
            .unwrap_err();
        assert!(matches!(err, RiskError::SchemaMismatch { feature } if feature == "velocity_trend"));
    }

    #[test]
    fn empty_prediction_is_an_error() {
        let scorer = RiskScorer::new(Arc::new(Silent), schema(&["delivery_gap"]));
        assert!(matches!(
            scorer.predict_risk(&SprintRecord::zeroed("P1", "1")),
            Err(RiskError::EmptyPrediction)
        ));
    }

    #[test]
    fn scoring_is_deterministic() {
        let scorer = RiskScorer::new(
            Arc::new(LogisticModel::new(-2.0, vec![3.0, 0.2])),
            schema(&["delivery_gap", "time_pressure"]),
        );
        let record = SprintRecord::zeroed("P1", "1")
            .with("planned_story_points", 20.0)
            .with("completed_story_points", 11.0)
            .with("milestone_slippage_days", 4.0);
        let first = scorer.predict_risk(&record).unwrap();
        for _ in 0..10 {
            assert_eq!(scorer.predict_risk(&record).unwrap().to_bits(), first.to_bits());
        }
        assert!((0.0..=1.0).contains(&first));
    }

    #[test]
    fn batch_scores_each_record() {
        let scorer = RiskScorer::new(
            Arc::new(LogisticModel::new(0.0, vec![1.0])),
            schema(&["time_pressure"]),
        );
        let low = SprintRecord::zeroed("P1", "1");
        let high = SprintRecord::zeroed("P1", "2").with("milestone_slippage_days", 8.0);
        let scores = scorer.predict_batch(&[low, high]).unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0], 0.5);
        assert!(scores[1] > scores[0]);
    }
}
