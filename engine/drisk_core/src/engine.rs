//! The loaded model, schema and attribution engine behind one read-only handle

use crate::attribution::AttributionVector;
use crate::dataset::SprintHistory;
use crate::error::RiskError;
use crate::recommend::recommend_actions;
use crate::record::SprintRecord;
use crate::report::{
    PortfolioSummary, ProjectRisk, ProjectTrend, SprintExplanation, SprintRisk, TrendPoint,
};
use crate::risk::{risk_direction, round1, to_percent, RiskBand};
use crate::scorer::RiskScorer;
use crate::simulate::{Actions, SimulationResult, UnknownFieldPolicy, WhatIfSimulator};
use drisk_model::{Attributor, Classifier, FeatureSchema, LoadedModel, ModelArtifact, ModelError};
use std::path::Path;
use std::sync::Arc;

pub const DEFAULT_SUMMARY_LIMIT: usize = 10;

/// Scoring, explanation and simulation over one immutable model.
///
/// Build it once with [`RiskEngine::from_artifacts`]; tests inject stub
/// capabilities through [`RiskEngine::new`].
#[derive(Clone)]
pub struct RiskEngine {
    scorer: RiskScorer,
    attributor: Arc<dyn Attributor>,
    policy: UnknownFieldPolicy,
}

impl RiskEngine {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        attributor: Arc<dyn Attributor>,
        schema: FeatureSchema,
    ) -> Self {
        Self {
            scorer: RiskScorer::new(classifier, schema),
            attributor,
            policy: UnknownFieldPolicy::default(),
        }
    }

    pub fn from_model(model: LoadedModel, schema: FeatureSchema) -> Self {
        Self::new(model.classifier, model.attributor, schema)
    }

    /// Load the feature schema and model artifact; both failures are fatal
    pub fn from_artifacts(
        model_path: impl AsRef<Path>,
        schema_path: impl AsRef<Path>,
    ) -> Result<Self, ModelError> {
        let schema = FeatureSchema::load(schema_path)?;
        let model = ModelArtifact::load(model_path)?.bind(&schema)?;
        Ok(Self::from_model(model, schema))
    }

    pub fn with_unknown_field_policy(mut self, policy: UnknownFieldPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn scorer(&self) -> &RiskScorer {
        &self.scorer
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.scorer.schema()
    }

    pub fn predict_risk(&self, record: &SprintRecord) -> Result<f64, RiskError> {
        self.scorer.predict_risk(record)
    }

    pub fn simulate(
        &self,
        record: &SprintRecord,
        actions: &Actions,
    ) -> Result<SimulationResult, RiskError> {
        WhatIfSimulator::new(&self.scorer)
            .with_policy(self.policy)
            .simulate(record, actions)
    }

    /// Positive-class attribution for one record
    pub fn explain(&self, record: &SprintRecord) -> Result<AttributionVector, RiskError> {
        let table = self.scorer.features(std::slice::from_ref(record))?;
        let output = self.attributor.attribute(&table)?;
        AttributionVector::from_output(&output, self.schema().columns())
    }

    pub fn sprint_risk(&self, record: &SprintRecord) -> Result<SprintRisk, RiskError> {
        // banded before rounding so 29.96 stays Low
        let percent = self.predict_risk(record)? * 100.0;
        Ok(SprintRisk {
            project_id: record.project_id.clone(),
            sprint_id: record.sprint_id.clone(),
            risk: round1(percent),
            band: RiskBand::from_percent(percent),
        })
    }

    pub fn explain_sprint(
        &self,
        history: &SprintHistory,
        project_id: &str,
        sprint_id: &str,
        top_k: usize,
    ) -> Result<SprintExplanation, RiskError> {
        let record = find_sprint(history, project_id, sprint_id)?;
        let risk = self.sprint_risk(record)?;
        let current = self.explain(record)?;
        let drivers = current.top_drivers(top_k);

        let previous = history.previous_sprint(project_id, sprint_id);
        let changes = match previous {
            Some(prev) => current.delta(&self.explain(prev)?)?.top_drivers(top_k),
            None => Vec::new(),
        };
        let recommendations = recommend_actions(&drivers);

        Ok(SprintExplanation {
            risk,
            drivers,
            previous_sprint: previous.map(|p| p.sprint_id.clone()),
            changes,
            recommendations,
        })
    }

    pub fn project_trend(
        &self,
        history: &SprintHistory,
        project_id: &str,
        threshold: f64,
    ) -> Result<ProjectTrend, RiskError> {
        let sprints = history.project_sprints(project_id);
        if sprints.is_empty() {
            return Err(RiskError::ProjectNotFound(project_id.to_string()));
        }
        let owned: Vec<SprintRecord> = sprints.iter().map(|r| (*r).clone()).collect();
        let scores = self.scorer.predict_batch(&owned)?;

        // the trend is computed on unrounded percentages
        let percents: Vec<f64> = scores.iter().map(|p| p * 100.0).collect();
        let (trend, change) = risk_direction(&percents, threshold);

        let points = sprints
            .iter()
            .zip(percents.iter())
            .map(|(r, pct)| TrendPoint {
                sprint_id: r.sprint_id.clone(),
                predicted_risk: round1(*pct),
                velocity_change_pct: r.velocity_change_pct,
                scope_change_requests: r.scope_change_requests,
                milestone_slippage_days: r.milestone_slippage_days,
            })
            .collect();

        Ok(ProjectTrend {
            project_id: project_id.to_string(),
            points,
            trend,
            change: round1(change),
        })
    }

    pub fn portfolio_summary(
        &self,
        history: &SprintHistory,
        limit: usize,
    ) -> Result<PortfolioSummary, RiskError> {
        let projects = history.projects();
        let mut rows = Vec::with_capacity(projects.len());
        for project_id in &projects {
            let Some(last) = history.latest_sprint(project_id) else {
                continue;
            };
            let risk = self.sprint_risk(last)?;
            rows.push(ProjectRisk {
                project_id: project_id.to_string(),
                latest_sprint: last.sprint_id.clone(),
                current_risk: risk.risk,
                band: risk.band,
                milestone_slippage_days: last.milestone_slippage_days,
            });
        }
        rows.sort_by(|a, b| b.current_risk.total_cmp(&a.current_risk));
        rows.truncate(limit);

        Ok(PortfolioSummary {
            total_projects: projects.len(),
            high_risk_sprints: history.high_risk_count(),
            observed_risk: history.observed_risk_rate().map(to_percent),
            projects: rows,
        })
    }
}

impl std::fmt::Debug for RiskEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskEngine")
            .field("scorer", &self.scorer)
            .field("attributor", &self.attributor.method_name())
            .field("policy", &self.policy)
            .finish()
    }
}

pub fn find_sprint<'h>(
    history: &'h SprintHistory,
    project_id: &str,
    sprint_id: &str,
) -> Result<&'h SprintRecord, RiskError> {
    history.find(project_id, sprint_id).ok_or_else(|| {
        if history.projects().contains(&project_id) {
            RiskError::SprintNotFound {
                project_id: project_id.to_string(),
                sprint_id: sprint_id.to_string(),
            }
        } else {
            RiskError::ProjectNotFound(project_id.to_string())
        }
    })
}
