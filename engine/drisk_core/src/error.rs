use drisk_model::ModelError;
use thiserror::Error;

/// Errors raised by the scoring, attribution and simulation pipeline
#[derive(Debug, Error)]
pub enum RiskError {
    /// A schema column is absent from the engineered record
    #[error("Schema mismatch: feature '{feature}' is not produced by the feature transform")]
    SchemaMismatch { feature: String },
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
    #[error("Classifier returned no prediction")]
    EmptyPrediction,
    #[error("Per-class attribution has {classes} classes; the positive class is missing")]
    MissingPositiveClass { classes: usize },
    #[error("Attribution output contains no rows")]
    EmptyAttribution,
    #[error("Expected {expected} attribution values, got {found}")]
    FeatureCountMismatch { expected: usize, found: usize },
    #[error("Attribution for feature '{feature}' is not a finite number")]
    NonFiniteAttribution { feature: String },
    #[error("Attribution vectors are over different feature orderings")]
    AttributionSchemaMismatch,
    #[error("Unknown action field: {field}")]
    UnknownActionField { field: String },
    #[error("Project not found: {0}")]
    ProjectNotFound(String),
    #[error("Sprint {sprint_id} not found for project {project_id}")]
    SprintNotFound {
        project_id: String,
        sprint_id: String,
    },
}

/// Errors raised while loading historical sprint data
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Sprint history has no header row")]
    Empty,
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Line {line}: expected {expected} cells, found {found}")]
    RowWidth {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Line {line}: invalid number '{value}' in column {column}")]
    InvalidNumber {
        line: usize,
        column: String,
        value: String,
    },
    #[error("Line {line}: delivery_risk must be 0 or 1, found '{value}'")]
    InvalidLabel { line: usize, value: String },
}
