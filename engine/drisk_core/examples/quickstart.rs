use drisk_core::{recommend_actions, Actions, RiskEngine, SprintRecord};
use drisk_model::{FeatureSchema, LogisticModel};
use std::sync::Arc;

fn main() {
    let _ = env_logger::try_init();

    // Model over three engineered features
    let schema = match FeatureSchema::new(vec![
        "delivery_gap".into(),
        "time_pressure".into(),
        "dependency_blockers".into(),
    ]) {
        Ok(schema) => schema,
        Err(e) => {
            eprintln!("error: {e}");
            return;
        }
    };
    let model = Arc::new(LogisticModel::new(-2.5, vec![3.0, 0.8, 0.25]));
    let engine = RiskEngine::new(model.clone(), model, schema);

    let sprint = SprintRecord::zeroed("PRJ-7", "14")
        .with("planned_story_points", 55.0)
        .with("completed_story_points", 31.0)
        .with("milestone_slippage_days", 6.0)
        .with("days_remaining", 3.0)
        .with("dependency_blockers", 5.0);

    match engine.sprint_risk(&sprint) {
        Ok(risk) => println!("risk={:.1}% band={}", risk.risk, risk.band),
        Err(e) => eprintln!("error: {e}"),
    }

    if let Ok(explanation) = engine.explain(&sprint) {
        let drivers = explanation.top_drivers(3);
        for d in &drivers {
            println!("  {:<22} {:+.3}", d.feature, d.value);
        }
        for action in recommend_actions(&drivers) {
            println!("  -> {action}");
        }
    }

    let actions: Actions = [
        ("planned_story_points".to_string(), -0.2),
        ("dependency_blockers".to_string(), -0.3),
    ]
    .into_iter()
    .collect();
    match engine.simulate(&sprint, &actions) {
        Ok(r) => println!(
            "what-if: {:.1}% -> {:.1}% ({:+.1})",
            r.baseline_risk, r.new_risk, r.risk_change
        ),
        Err(e) => eprintln!("error: {e}"),
    }
}
