//! Serializable report shapes produced by [`crate::RiskEngine`]

use crate::attribution::Driver;
use crate::recommend::RecommendedAction;
use crate::risk::{RiskBand, RiskTrend};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintRisk {
    pub project_id: String,
    pub sprint_id: String,
    /// Predicted risk, percent rounded to one decimal place
    pub risk: f64,
    pub band: RiskBand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRisk {
    pub project_id: String,
    pub latest_sprint: String,
    pub current_risk: f64,
    pub band: RiskBand,
    pub milestone_slippage_days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_projects: usize,
    /// Sprints labelled high risk in the historical data
    pub high_risk_sprints: usize,
    /// Observed high-risk share in percent, when labels are present
    pub observed_risk: Option<f64>,
    /// Projects by current risk, highest first
    pub projects: Vec<ProjectRisk>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub sprint_id: String,
    pub predicted_risk: f64,
    pub velocity_change_pct: f64,
    pub scope_change_requests: f64,
    pub milestone_slippage_days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectTrend {
    pub project_id: String,
    pub points: Vec<TrendPoint>,
    pub trend: RiskTrend,
    /// Change between the last two sprints, percentage points
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintExplanation {
    pub risk: SprintRisk,
    pub drivers: Vec<Driver>,
    /// Sprint compared against, when the project has an earlier sprint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_sprint: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<Driver>,
    pub recommendations: Vec<RecommendedAction>,
}
