//! Raw sprint metrics, one row per (project, sprint)

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

macro_rules! sprint_record {
    ($($field:ident),+ $(,)?) => {
        /// Raw metrics for one project sprint
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct SprintRecord {
            pub project_id: String,
            pub sprint_id: String,
            $(pub $field: f64,)+
            /// Historical label: 1 when the sprint missed its delivery target
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub delivery_risk: Option<u8>,
        }

        impl SprintRecord {
            /// Names of the numeric metric columns, in CSV order
            pub const NUMERIC_FIELDS: &'static [&'static str] = &[$(stringify!($field)),+];

            /// Look up a numeric metric by column name
            pub fn get(&self, name: &str) -> Option<f64> {
                match name {
                    $(stringify!($field) => Some(self.$field),)+
                    _ => None,
                }
            }

            pub fn get_mut(&mut self, name: &str) -> Option<&mut f64> {
                match name {
                    $(stringify!($field) => Some(&mut self.$field),)+
                    _ => None,
                }
            }
        }
    };
}

sprint_record!(
    planned_story_points,
    completed_story_points,
    avg_work_hours,
    meeting_hours,
    bug_count,
    reopened_issues,
    deployment_failures,
    test_coverage_pct,
    scope_change_requests,
    backlog_growth_rate,
    dependency_blockers,
    velocity_change_pct,
    code_churn_pct,
    attrition_risk_score,
    communication_delay_hours,
    unplanned_leave_days,
    milestone_slippage_days,
    days_remaining,
);

impl SprintRecord {
    /// A record with every metric set to zero and no label
    pub fn zeroed(project_id: impl Into<String>, sprint_id: impl Into<String>) -> Self {
        SprintRecord {
            project_id: project_id.into(),
            sprint_id: sprint_id.into(),
            planned_story_points: 0.0,
            completed_story_points: 0.0,
            avg_work_hours: 0.0,
            meeting_hours: 0.0,
            bug_count: 0.0,
            reopened_issues: 0.0,
            deployment_failures: 0.0,
            test_coverage_pct: 0.0,
            scope_change_requests: 0.0,
            backlog_growth_rate: 0.0,
            dependency_blockers: 0.0,
            velocity_change_pct: 0.0,
            code_churn_pct: 0.0,
            attrition_risk_score: 0.0,
            communication_delay_hours: 0.0,
            unplanned_leave_days: 0.0,
            milestone_slippage_days: 0.0,
            days_remaining: 0.0,
            delivery_risk: None,
        }
    }

    /// Builder-style setter used by fixtures; unknown names are ignored
    pub fn with(mut self, name: &str, value: f64) -> Self {
        if let Some(slot) = self.get_mut(name) {
            *slot = value;
        }
        self
    }

    pub fn is_labelled_high_risk(&self) -> bool {
        self.delivery_risk == Some(1)
    }
}

/// Order sprint identifiers numerically when both parse as integers,
/// lexicographically otherwise
pub fn compare_sprint_ids(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}
