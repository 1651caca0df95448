//! Classifier and attribution capabilities for sprint delivery risk scoring
//!
//! The scoring pipeline only depends on two object-safe capabilities:
//! [`Classifier`] ("feature table in, class probabilities out") and
//! [`Attributor`] ("feature table in, per-feature contributions out").
//! Trained models are loaded from JSON artifacts and bound to the ordered
//! [`FeatureSchema`] they were trained on.

pub mod artifact;
pub mod backend;
pub mod gbm;
pub mod logistic;
pub mod metadata;
pub mod occlusion;
pub mod schema;

pub use artifact::{LoadedModel, ModelArtifact, ModelKind};
pub use backend::{
    AttributionOutput, Attributor, ClassProbabilities, Classifier, FeatureTable, ModelError,
    POSITIVE_CLASS,
};
pub use gbm::{GradientBoostedTrees, RegressionTree, TreeNode};
pub use logistic::LogisticModel;
pub use metadata::ModelMetadata;
pub use occlusion::OcclusionAttributor;
pub use schema::FeatureSchema;
