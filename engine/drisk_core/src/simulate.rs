//! What-if simulation: proportional perturbation of raw metrics and re-scoring

use crate::error::RiskError;
use crate::record::SprintRecord;
use crate::risk::round1;
use crate::scorer::RiskScorer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw field name to proportional change; `-0.2` reduces the field by 20%
pub type Actions = BTreeMap<String, f64>;

/// What to do with an action naming a field the record does not have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFieldPolicy {
    #[default]
    Ignore,
    Warn,
    Reject,
}

/// Risk percentages before and after an intervention, one decimal place
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub baseline_risk: f64,
    pub new_risk: f64,
    pub risk_change: f64,
}

pub struct WhatIfSimulator<'a> {
    scorer: &'a RiskScorer,
    policy: UnknownFieldPolicy,
}

impl<'a> WhatIfSimulator<'a> {
    pub fn new(scorer: &'a RiskScorer) -> Self {
        Self {
            scorer,
            policy: UnknownFieldPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: UnknownFieldPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn simulate(
        &self,
        record: &SprintRecord,
        actions: &Actions,
    ) -> Result<SimulationResult, RiskError> {
        let baseline = self.scorer.predict_risk(record)?;
        let modified = perturb(record, actions, self.policy)?;
        let new = self.scorer.predict_risk(&modified)?;

        Ok(SimulationResult {
            baseline_risk: round1(baseline * 100.0),
            new_risk: round1(new * 100.0),
            risk_change: round1((new - baseline) * 100.0),
        })
    }
}

/// Apply `actions` to a copy of `record`: `value = max(0, value * (1 + delta))`.
///
/// A delta of exactly zero leaves the field untouched.
pub fn perturb(
    record: &SprintRecord,
    actions: &Actions,
    policy: UnknownFieldPolicy,
) -> Result<SprintRecord, RiskError> {
    let mut modified = record.clone();
    for (field, delta) in actions {
        let Some(value) = modified.get_mut(field) else {
            match policy {
                UnknownFieldPolicy::Ignore => {
                    log::debug!("ignoring action on unknown field '{field}'")
                }
                UnknownFieldPolicy::Warn => log::warn!("ignoring action on unknown field '{field}'"),
                UnknownFieldPolicy::Reject => {
                    return Err(RiskError::UnknownActionField {
                        field: field.clone(),
                    })
                }
            }
            continue;
        };
        if *delta == 0.0 {
            continue;
        }
        let scaled = *value * (1.0 + delta);
        // written as a comparison so -0.0 and NaN both land on +0.0
        *value = if scaled > 0.0 { scaled } else { 0.0 };
    }
    Ok(modified)
}
