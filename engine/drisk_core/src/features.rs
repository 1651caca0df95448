//! Feature transform: raw sprint metrics to model-ready risk indicators
//!
//! The transform is row-independent and pure. `completed_story_points` only
//! feeds `delivery_gap` and is dropped from the engineered record.

use crate::error::RiskError;
use crate::record::SprintRecord;
use drisk_model::{FeatureSchema, FeatureTable};
use serde::{Deserialize, Serialize};

/// The seven derived risk indicators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    pub delivery_gap: f64,
    pub workload_pressure: f64,
    pub quality_instability: f64,
    pub scope_pressure: f64,
    pub execution_risk_index: f64,
    pub team_health_index: f64,
    pub time_pressure: f64,
}

impl DerivedFeatures {
    pub const NAMES: [&'static str; 7] = [
        "delivery_gap",
        "workload_pressure",
        "quality_instability",
        "scope_pressure",
        "execution_risk_index",
        "team_health_index",
        "time_pressure",
    ];

    pub fn from_record(r: &SprintRecord) -> Self {
        Self {
            delivery_gap: (r.planned_story_points - r.completed_story_points)
                / (r.planned_story_points + 1.0),
            workload_pressure: r.avg_work_hours / 40.0 + r.meeting_hours / 20.0,
            quality_instability: (r.bug_count + r.reopened_issues + r.deployment_failures)
                / (r.test_coverage_pct + 1.0),
            scope_pressure: r.scope_change_requests + r.backlog_growth_rate * 10.0,
            execution_risk_index: r.dependency_blockers
                + r.velocity_change_pct.abs()
                + r.code_churn_pct,
            team_health_index: r.attrition_risk_score
                + r.communication_delay_hours / 10.0
                + r.unplanned_leave_days,
            time_pressure: r.milestone_slippage_days / (r.days_remaining + 1.0),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "delivery_gap" => Some(self.delivery_gap),
            "workload_pressure" => Some(self.workload_pressure),
            "quality_instability" => Some(self.quality_instability),
            "scope_pressure" => Some(self.scope_pressure),
            "execution_risk_index" => Some(self.execution_risk_index),
            "team_health_index" => Some(self.team_health_index),
            "time_pressure" => Some(self.time_pressure),
            _ => None,
        }
    }
}

/// A sprint record enriched with derived features, minus
/// `completed_story_points`
#[derive(Debug, Clone, PartialEq)]
pub struct EngineeredRecord {
    raw: SprintRecord,
    derived: DerivedFeatures,
}

impl EngineeredRecord {
    pub const DROPPED: &'static str = "completed_story_points";

    pub fn project_id(&self) -> &str {
        &self.raw.project_id
    }

    pub fn sprint_id(&self) -> &str {
        &self.raw.sprint_id
    }

    pub fn delivery_risk(&self) -> Option<u8> {
        self.raw.delivery_risk
    }

    pub fn derived(&self) -> &DerivedFeatures {
        &self.derived
    }

    /// Look up any numeric column by name; the dropped column is absent
    pub fn get(&self, name: &str) -> Option<f64> {
        if name == Self::DROPPED {
            return None;
        }
        self.derived.get(name).or_else(|| self.raw.get(name))
    }

    /// Every numeric column present, raw metrics first then derived features
    pub fn column_names() -> Vec<&'static str> {
        SprintRecord::NUMERIC_FIELDS
            .iter()
            .copied()
            .filter(|name| *name != Self::DROPPED)
            .chain(DerivedFeatures::NAMES)
            .collect()
    }

    /// Project onto the schema's column order
    pub fn project(&self, schema: &FeatureSchema) -> Result<Vec<f64>, RiskError> {
        schema
            .columns()
            .iter()
            .map(|name| {
                self.get(name).ok_or_else(|| RiskError::SchemaMismatch {
                    feature: name.clone(),
                })
            })
            .collect()
    }

    /// Flat JSON object of identifiers, label and every numeric column
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert("project_id".into(), self.raw.project_id.clone().into());
        map.insert("sprint_id".into(), self.raw.sprint_id.clone().into());
        for name in Self::column_names() {
            if let Some(value) = self.get(name) {
                map.insert(name.to_string(), value.into());
            }
        }
        if let Some(label) = self.raw.delivery_risk {
            map.insert("delivery_risk".into(), label.into());
        }
        serde_json::Value::Object(map)
    }
}

pub fn engineer_features(record: &SprintRecord) -> EngineeredRecord {
    EngineeredRecord {
        raw: record.clone(),
        derived: DerivedFeatures::from_record(record),
    }
}

pub fn engineer_batch(records: &[SprintRecord]) -> Vec<EngineeredRecord> {
    records.iter().map(engineer_features).collect()
}

/// Transform `records` and project them onto `schema`
pub fn feature_table(
    records: &[SprintRecord],
    schema: &FeatureSchema,
) -> Result<FeatureTable, RiskError> {
    let rows = records
        .iter()
        .map(|r| engineer_features(r).project(schema))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(FeatureTable::new(schema.columns().to_vec(), rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn crafted() -> SprintRecord {
        SprintRecord::zeroed("P1", "1")
            .with("planned_story_points", 10.0)
            .with("completed_story_points", 4.0)
            .with("avg_work_hours", 50.0)
            .with("meeting_hours", 10.0)
            .with("bug_count", 3.0)
            .with("reopened_issues", 2.0)
            .with("deployment_failures", 1.0)
            .with("test_coverage_pct", 59.0)
            .with("scope_change_requests", 4.0)
            .with("backlog_growth_rate", -0.15)
            .with("dependency_blockers", 2.0)
            .with("velocity_change_pct", -12.0)
            .with("code_churn_pct", 18.0)
            .with("attrition_risk_score", 0.4)
            .with("communication_delay_hours", 6.0)
            .with("unplanned_leave_days", 1.5)
            .with("milestone_slippage_days", 9.0)
            .with("days_remaining", 2.0)
    }

    #[test]
    fn derived_features_match_formulas() {
        let d = *engineer_features(&crafted()).derived();
        assert_abs_diff_eq!(d.delivery_gap, 6.0 / 11.0, epsilon = 1e-9);
        assert_abs_diff_eq!(d.workload_pressure, 1.25 + 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(d.quality_instability, 6.0 / 60.0, epsilon = 1e-9);
        assert_abs_diff_eq!(d.scope_pressure, 4.0 - 1.5, epsilon = 1e-9);
        assert_abs_diff_eq!(d.execution_risk_index, 2.0 + 12.0 + 18.0, epsilon = 1e-9);
        assert_abs_diff_eq!(d.team_health_index, 0.4 + 0.6 + 1.5, epsilon = 1e-9);
        assert_abs_diff_eq!(d.time_pressure, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_denominators_are_offset() {
        let d = DerivedFeatures::from_record(
            &SprintRecord::zeroed("P1", "1").with("milestone_slippage_days", 5.0),
        );
        assert_eq!(d.delivery_gap, 0.0);
        assert_eq!(d.quality_instability, 0.0);
        assert_eq!(d.time_pressure, 5.0);
    }

    #[test]
    fn completed_story_points_is_dropped() {
        let e = engineer_features(&crafted());
        assert_eq!(e.get("completed_story_points"), None);
        assert_eq!(e.get("planned_story_points"), Some(10.0));
        assert!(!EngineeredRecord::column_names().contains(&"completed_story_points"));
        assert_eq!(EngineeredRecord::column_names().len(), 17 + 7);
    }

    #[test]
    fn projection_follows_schema_order() {
        let schema =
            FeatureSchema::new(vec!["time_pressure".into(), "bug_count".into()]).unwrap();
        let row = engineer_features(&crafted()).project(&schema).unwrap();
        assert_eq!(row, vec![3.0, 3.0]);
    }

    #[test]
    fn projection_fails_on_missing_feature() {
        let schema = FeatureSchema::new(vec![
            "delivery_gap".into(),
            "completed_story_points".into(),
        ])
        .unwrap();
        match engineer_features(&crafted()).project(&schema) {
            Err(RiskError::SchemaMismatch { feature }) => {
                assert_eq!(feature, "completed_story_points")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn batch_is_row_independent() {
        let a = crafted();
        let b = SprintRecord::zeroed("P2", "7");
        let batch = engineer_batch(&[a.clone(), b]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], engineer_features(&a));
        assert_eq!(batch[1].project_id(), "P2");
    }

    #[test]
    fn json_view_contains_derived_columns() {
        let json = engineer_features(&crafted()).to_json();
        assert_eq!(json["project_id"], "P1");
        assert!(json.get("completed_story_points").is_none());
        assert_eq!(json["time_pressure"], 3.0);
    }
}
