use crate::attribution::Driver;
use serde::{Deserialize, Serialize};

pub const MAX_RECOMMENDATIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    StabilizeScope,
    AddressBurnout,
    ResolveDependencies,
    ImproveTesting,
    ReduceOvertime,
}

impl RecommendedAction {
    pub fn description(&self) -> &'static str {
        match self {
            RecommendedAction::StabilizeScope => "Reduce scope volatility and freeze backlog",
            RecommendedAction::AddressBurnout => "Address burnout or add backup resources",
            RecommendedAction::ResolveDependencies => "Resolve external dependencies early",
            RecommendedAction::ImproveTesting => "Improve testing & defect prevention",
            RecommendedAction::ReduceOvertime => "Reduce overtime to stabilize productivity",
        }
    }

    /// First matching keyword rule for a feature name
    pub fn for_feature(feature: &str) -> Option<Self> {
        let f = feature.to_lowercase();
        if f.contains("scope") {
            Some(RecommendedAction::StabilizeScope)
        } else if f.contains("attrition") {
            Some(RecommendedAction::AddressBurnout)
        } else if f.contains("blocker") || f.contains("dependency") {
            Some(RecommendedAction::ResolveDependencies)
        } else if f.contains("bug") || f.contains("quality") {
            Some(RecommendedAction::ImproveTesting)
        } else if f.contains("work") || f.contains("hours") {
            Some(RecommendedAction::ReduceOvertime)
        } else {
            None
        }
    }
}

impl std::fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Actions for the ranked drivers, deduplicated first-seen-wins and capped
/// at [`MAX_RECOMMENDATIONS`]. Empty means no intervention is needed.
pub fn recommend_actions(drivers: &[Driver]) -> Vec<RecommendedAction> {
    let mut out = Vec::new();
    for action in drivers
        .iter()
        .filter_map(|d| RecommendedAction::for_feature(&d.feature))
    {
        if !out.contains(&action) {
            out.push(action);
        }
        if out.len() == MAX_RECOMMENDATIONS {
            break;
        }
    }
    out
}
