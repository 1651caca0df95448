//! On-disk fixtures for end-to-end runs: a feature schema, model artifacts and
//! a small sprint history written into a caller-provided directory.

use drisk_core::SprintRecord;
use serde_json::json;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const SCHEMA: [&str; 4] = [
    "delivery_gap",
    "dependency_blockers",
    "time_pressure",
    "test_coverage_pct",
];

/// Paths of the files written by [`write_fixture`]
#[derive(Debug, Clone)]
pub struct Fixture {
    pub schema: PathBuf,
    pub gbm: PathBuf,
    pub logistic: PathBuf,
    pub history: PathBuf,
}

/// One sprint row; every other numeric column is written as 1
pub struct Row {
    pub project: &'static str,
    pub sprint: &'static str,
    pub planned: f64,
    pub completed: f64,
    pub blockers: f64,
    pub slippage: f64,
    pub days_remaining: f64,
    pub label: &'static str,
}

/// ALPHA degrades sharply in its third sprint; BETA stays healthy
pub fn rows() -> Vec<Row> {
    let row = |project, sprint, completed, blockers, slippage, days_remaining, label| Row {
        project,
        sprint,
        planned: 40.0,
        completed,
        blockers,
        slippage,
        days_remaining,
        label,
    };
    vec![
        row("ALPHA", "1", 38.0, 1.0, 0.0, 10.0, "0"),
        row("BETA", "1", 38.0, 1.0, 0.0, 10.0, "0"),
        row("ALPHA", "3", 20.0, 6.0, 8.0, 3.0, "1"),
        row("ALPHA", "2", 30.0, 2.0, 2.0, 9.0, "0"),
        row("BETA", "2", 38.0, 2.0, 0.0, 10.0, "0"),
    ]
}

pub fn history_csv(rows: &[Row]) -> String {
    let mut out = String::from("project_id,sprint_id,");
    out.push_str(&SprintRecord::NUMERIC_FIELDS.join(","));
    out.push_str(",delivery_risk\n");
    for r in rows {
        let cells: Vec<String> = SprintRecord::NUMERIC_FIELDS
            .iter()
            .map(|name| {
                let value = match *name {
                    "planned_story_points" => r.planned,
                    "completed_story_points" => r.completed,
                    "dependency_blockers" => r.blockers,
                    "milestone_slippage_days" => r.slippage,
                    "days_remaining" => r.days_remaining,
                    "test_coverage_pct" => 80.0,
                    _ => 1.0,
                };
                value.to_string()
            })
            .collect();
        out.push_str(&format!(
            "{},{},{},{}\n",
            r.project,
            r.sprint,
            cells.join(","),
            r.label
        ));
    }
    out
}

fn stump(feature: usize, threshold: f64, low: f64, high: f64) -> serde_json::Value {
    json!({"nodes": [
        {"type": "split", "feature": feature, "threshold": threshold, "left": 1, "right": 2},
        {"type": "leaf", "value": low},
        {"type": "leaf", "value": high}
    ]})
}

/// Three stumps over gap, blockers and time pressure with unit learning rate
pub fn gbm_artifact() -> serde_json::Value {
    json!({
        "metadata": {"name": "delivery_risk", "version": "2", "metrics": {"roc_auc": 0.84}},
        "model": {
            "kind": "gradient_boosting",
            "init_log_odds": -1.0,
            "learning_rate": 1.0,
            "background": [0.0, 0.0, 0.0, 80.0],
            "trees": [
                stump(0, 0.3, -0.5, 1.0),
                stump(1, 3.0, -0.5, 1.5),
                stump(2, 1.0, 0.0, 1.0)
            ]
        }
    })
}

pub fn logistic_artifact() -> serde_json::Value {
    json!({
        "metadata": {"name": "delivery_risk_linear", "version": "1"},
        "model": {
            "kind": "logistic",
            "intercept": -2.0,
            "coefficients": [2.0, 0.5, 1.0, -0.01],
            "background": [0.1, 2.0, 0.2, 80.0]
        }
    })
}

pub fn write_fixture(dir: &Path) -> io::Result<Fixture> {
    let fixture = Fixture {
        schema: dir.join("feature_columns.json"),
        gbm: dir.join("delivery_risk_model.json"),
        logistic: dir.join("delivery_risk_linear.json"),
        history: dir.join("project_delivery_risk.csv"),
    };
    fs::write(&fixture.schema, json!(SCHEMA).to_string())?;
    fs::write(&fixture.gbm, gbm_artifact().to_string())?;
    fs::write(&fixture.logistic, logistic_artifact().to_string())?;
    fs::write(&fixture.history, history_csv(&rows()))?;
    Ok(fixture)
}

#[cfg(test)]
mod end_to_end;
