//! Trained model artifacts and their loading

use crate::backend::{Attributor, Classifier, ModelError};
use crate::gbm::GradientBoostedTrees;
use crate::logistic::LogisticModel;
use crate::metadata::ModelMetadata;
use crate::occlusion::OcclusionAttributor;
use crate::schema::FeatureSchema;
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::Path;
use std::sync::Arc;

/// Model parameters, tagged by `kind` in JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelKind {
    Logistic(LogisticModel),
    GradientBoosting(GradientBoostedTrees),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default)]
    pub metadata: ModelMetadata,
    pub model: ModelKind,
}

impl ModelArtifact {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let text = read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Validate the parameters against `schema` and build the classifier and
    /// matching attribution engine
    pub fn bind(self, schema: &FeatureSchema) -> Result<LoadedModel, ModelError> {
        let width = schema.len();
        let (classifier, attributor): (Arc<dyn Classifier>, Arc<dyn Attributor>) = match self.model
        {
            ModelKind::Logistic(model) => {
                model.validate(width)?;
                let model = Arc::new(model);
                let classifier: Arc<dyn Classifier> = model.clone();
                let attributor: Arc<dyn Attributor> = model;
                (classifier, attributor)
            }
            ModelKind::GradientBoosting(mut model) => {
                model.bind(width)?;
                let reference = model
                    .background
                    .clone()
                    .unwrap_or_else(|| vec![0.0; width]);
                let classifier: Arc<dyn Classifier> = Arc::new(model);
                let attributor: Arc<dyn Attributor> =
                    Arc::new(OcclusionAttributor::new(classifier.clone(), reference));
                (classifier, attributor)
            }
        };
        log::info!(
            "loaded model '{}' ({} backend, {} attribution) over {} features",
            self.metadata,
            classifier.backend_name(),
            attributor.method_name(),
            width
        );
        Ok(LoadedModel {
            metadata: self.metadata,
            classifier,
            attributor,
        })
    }
}

/// A classifier bound to a feature schema together with its attribution engine
#[derive(Clone)]
pub struct LoadedModel {
    pub metadata: ModelMetadata,
    pub classifier: Arc<dyn Classifier>,
    pub attributor: Arc<dyn Attributor>,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("metadata", &self.metadata)
            .field("classifier", &self.classifier.backend_name())
            .field("attributor", &self.attributor.method_name())
            .finish()
    }
}
