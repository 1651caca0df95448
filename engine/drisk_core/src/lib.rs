//! Sprint delivery risk: feature engineering, scoring, attribution ranking and
//! what-if simulation over a trained classifier.
//!
//! ```text
//! SprintRecord -> engineer_features -> FeatureTable -> Classifier  -> risk
//!                                                    -> Attributor  -> drivers
//! ```

pub mod attribution;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod features;
pub mod recommend;
pub mod record;
pub mod report;
pub mod risk;
pub mod scorer;
pub mod simulate;

pub use attribution::{
    compare_driver_change, get_top_risk_drivers, AttributionVector, Driver, DriverDirection,
    DEFAULT_TOP_K,
};
pub use dataset::SprintHistory;
pub use engine::{RiskEngine, DEFAULT_SUMMARY_LIMIT};
pub use error::{DataError, RiskError};
pub use features::{engineer_batch, engineer_features, DerivedFeatures, EngineeredRecord};
pub use recommend::{recommend_actions, RecommendedAction};
pub use record::SprintRecord;
pub use risk::{risk_direction, RiskBand, RiskTrend, DEFAULT_TREND_THRESHOLD};
pub use scorer::RiskScorer;
pub use simulate::{perturb, Actions, SimulationResult, UnknownFieldPolicy, WhatIfSimulator};
