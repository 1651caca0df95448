use crate::{write_fixture, Fixture};
use approx::assert_abs_diff_eq;
use drisk_core::{
    engineer_features, Actions, RecommendedAction, RiskBand, RiskEngine, RiskError, RiskTrend,
    SprintHistory, UnknownFieldPolicy, DEFAULT_TOP_K,
};
use drisk_model::{FeatureSchema, ModelArtifact, ModelError};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn fixture() -> (TempDir, Fixture) {
    let dir = tempfile::tempdir().unwrap();
    let fixture = write_fixture(dir.path()).unwrap();
    (dir, fixture)
}

fn load(fixture: &Fixture) -> (RiskEngine, SprintHistory) {
    let engine = RiskEngine::from_artifacts(&fixture.gbm, &fixture.schema).unwrap();
    let history = SprintHistory::load(&fixture.history).unwrap();
    (engine, history)
}

#[test]
fn portfolio_summary_ranks_degrading_project_first() {
    let (_dir, fixture) = fixture();
    let (engine, history) = load(&fixture);

    let summary = engine.portfolio_summary(&history, 10).unwrap();
    assert_eq!(summary.total_projects, 2);
    assert_eq!(summary.high_risk_sprints, 1);
    assert_eq!(summary.observed_risk, Some(20.0));

    let alpha = &summary.projects[0];
    assert_eq!(alpha.project_id, "ALPHA");
    assert_eq!(alpha.latest_sprint, "3");
    assert_eq!(alpha.current_risk, 92.4);
    assert_eq!(alpha.band, RiskBand::Critical);
    assert_eq!(alpha.milestone_slippage_days, 8.0);

    let beta = &summary.projects[1];
    assert_eq!(beta.project_id, "BETA");
    assert_eq!(beta.current_risk, 11.9);
    assert_eq!(beta.band, RiskBand::Low);
}

#[test]
fn trends_follow_sprint_order() {
    let (_dir, fixture) = fixture();
    let (engine, history) = load(&fixture);

    let alpha = engine.project_trend(&history, "ALPHA", 10.0).unwrap();
    let risks: Vec<f64> = alpha.points.iter().map(|p| p.predicted_risk).collect();
    assert_eq!(risks, vec![11.9, 11.9, 92.4]);
    assert_eq!(alpha.trend, RiskTrend::Increasing);
    assert_eq!(alpha.change, 80.5);

    let beta = engine.project_trend(&history, "BETA", 10.0).unwrap();
    assert_eq!(beta.trend, RiskTrend::Stable);
    assert_eq!(beta.change, 0.0);

    assert!(matches!(
        engine.project_trend(&history, "GAMMA", 10.0),
        Err(RiskError::ProjectNotFound(_))
    ));
}

#[test]
fn occlusion_explanation_of_worst_sprint() {
    let (_dir, fixture) = fixture();
    let (engine, history) = load(&fixture);

    let report = engine
        .explain_sprint(&history, "ALPHA", "3", DEFAULT_TOP_K)
        .unwrap();
    let order: Vec<&str> = report.drivers.iter().map(|d| d.feature.as_str()).collect();
    assert_eq!(
        order,
        vec![
            "dependency_blockers",
            "delivery_gap",
            "time_pressure",
            "test_coverage_pct"
        ]
    );
    // p(x) - p(x with blockers at the reference) = sigmoid(2.5) - sigmoid(0.5)
    assert_abs_diff_eq!(report.drivers[0].value, 0.3016825, epsilon = 1e-6);
    assert_eq!(report.drivers[3].value, 0.0);

    // sprint 2 sits on the reference side of every split
    assert_eq!(report.previous_sprint.as_deref(), Some("2"));
    assert_eq!(report.changes[0].feature, "dependency_blockers");
    assert_abs_diff_eq!(report.changes[0].value, 0.3016825, epsilon = 1e-6);

    assert_eq!(
        report.recommendations,
        vec![RecommendedAction::ResolveDependencies]
    );
}

#[test]
fn what_if_on_blockers() {
    let (_dir, fixture) = fixture();
    let (engine, history) = load(&fixture);
    let record = history.find("ALPHA", "3").unwrap();

    let actions: Actions = [("dependency_blockers".to_string(), -0.6)]
        .into_iter()
        .collect();
    let result = engine.simulate(record, &actions).unwrap();
    assert_eq!(result.baseline_risk, 92.4);
    assert_eq!(result.new_risk, 62.2);
    assert_eq!(result.risk_change, -30.2);
    assert_eq!(history.find("ALPHA", "3").unwrap().dependency_blockers, 6.0);
}

#[test]
fn reject_policy_surfaces_unknown_fields() {
    let (_dir, fixture) = fixture();
    let (engine, history) = load(&fixture);
    let engine = engine.with_unknown_field_policy(UnknownFieldPolicy::Reject);
    let record = history.first().unwrap();

    let actions: Actions = [("team_morale".to_string(), 0.5)].into_iter().collect();
    assert!(matches!(
        engine.simulate(record, &actions),
        Err(RiskError::UnknownActionField { field }) if field == "team_morale"
    ));
}

#[test]
fn logistic_artifact_gives_exact_linear_attribution() {
    let (_dir, fixture) = fixture();
    let engine = RiskEngine::from_artifacts(&fixture.logistic, &fixture.schema).unwrap();
    let history = SprintHistory::load(&fixture.history).unwrap();
    let record = history.find("ALPHA", "3").unwrap();

    let attribution = engine.explain(record).unwrap();
    let drivers = attribution.top_drivers(3);
    assert_eq!(drivers[0].feature, "dependency_blockers");
    assert_abs_diff_eq!(drivers[0].value, 2.0, epsilon = 1e-12);
    assert_eq!(drivers[1].feature, "time_pressure");
    assert_abs_diff_eq!(drivers[1].value, 1.8, epsilon = 1e-12);
    assert_abs_diff_eq!(drivers[2].value, 2.0 * (20.0 / 41.0 - 0.1), epsilon = 1e-12);
}

#[test]
fn artifact_metadata_survives_binding() {
    let (_dir, fixture) = fixture();
    let schema = FeatureSchema::load(&fixture.schema).unwrap();
    let model = ModelArtifact::load(&fixture.gbm)
        .unwrap()
        .bind(&schema)
        .unwrap();
    assert_eq!(model.metadata.to_string(), "delivery_risk v2");
    assert_eq!(model.classifier.backend_name(), "gradient_boosting");
    assert_eq!(model.attributor.method_name(), "occlusion");
}

#[test]
fn schema_with_unknown_column_fails_at_scoring() {
    let (dir, fixture) = fixture();
    let schema_path = dir.path().join("drifted.json");
    std::fs::write(
        &schema_path,
        r#"["delivery_gap", "dependency_blockers", "time_pressure", "sprint_mood"]"#,
    )
    .unwrap();
    let engine = RiskEngine::from_artifacts(&fixture.gbm, &schema_path).unwrap();
    let history = SprintHistory::load(&fixture.history).unwrap();
    assert!(matches!(
        engine.predict_risk(history.first().unwrap()),
        Err(RiskError::SchemaMismatch { feature }) if feature == "sprint_mood"
    ));
}

#[test]
fn background_width_must_match_schema() {
    let (dir, fixture) = fixture();
    let schema_path = dir.path().join("narrow.json");
    std::fs::write(&schema_path, r#"["delivery_gap", "dependency_blockers", "time_pressure"]"#)
        .unwrap();
    assert!(matches!(
        RiskEngine::from_artifacts(&fixture.gbm, &schema_path),
        Err(ModelError::InvalidArtifact(_))
    ));
}

#[test]
fn engineered_rows_drop_completed_points() {
    let (_dir, fixture) = fixture();
    let history = SprintHistory::load(&fixture.history).unwrap();
    let row = engineer_features(history.find("ALPHA", "3").unwrap()).to_json();
    assert_eq!(row["project_id"], "ALPHA");
    assert_eq!(row["time_pressure"], 2.0);
    assert_eq!(row["delivery_risk"], 1);
    assert!(row.get("completed_story_points").is_none());
}
