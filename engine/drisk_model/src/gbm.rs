//! Evaluator for gradient-boosted regression tree ensembles exported from a
//! binary classifier trained with log-loss.
//!
//! margin = init_log_odds + learning_rate * sum(tree(x)), p = sigmoid(margin)

use crate::backend::{sigmoid, ClassProbabilities, Classifier, FeatureTable, ModelError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    /// Samples with `x[feature] <= threshold` go to `left`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A single regression tree; node 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    pub fn validate(&self, width: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::InvalidArtifact("tree has no nodes".into()));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                if *feature >= width {
                    return Err(ModelError::InvalidArtifact(format!(
                        "node {idx} splits on feature {feature} but the schema has {width} columns"
                    )));
                }
                // children must point forward, which also rules out cycles
                for child in [*left, *right] {
                    if child <= idx || child >= self.nodes.len() {
                        return Err(ModelError::InvalidArtifact(format!(
                            "node {idx} has invalid child index {child}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn evaluate(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedTrees {
    pub init_log_odds: f64,
    pub learning_rate: f64,
    pub trees: Vec<RegressionTree>,
    /// Reference point for occlusion attribution, typically the training means
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Vec<f64>>,
    #[serde(skip)]
    width: usize,
}

impl GradientBoostedTrees {
    pub fn new(init_log_odds: f64, learning_rate: f64, trees: Vec<RegressionTree>) -> Self {
        Self {
            init_log_odds,
            learning_rate,
            trees,
            background: None,
            width: 0,
        }
    }

    /// Validate against the schema width and remember it for inference checks
    pub fn bind(&mut self, width: usize) -> Result<(), ModelError> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ModelError::InvalidArtifact(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(width)
                .map_err(|e| ModelError::InvalidArtifact(format!("tree {i}: {e}")))?;
        }
        if let Some(bg) = &self.background {
            if bg.len() != width {
                return Err(ModelError::InvalidArtifact(format!(
                    "background has {} values but the feature schema has {} columns",
                    bg.len(),
                    width
                )));
            }
        }
        self.width = width;
        Ok(())
    }

    fn margin(&self, row: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.evaluate(row)).sum();
        self.init_log_odds + self.learning_rate * sum
    }
}

impl Classifier for GradientBoostedTrees {
    fn predict_proba(&self, table: &FeatureTable) -> Result<Vec<ClassProbabilities>, ModelError> {
        if self.width == 0 {
            return Err(ModelError::InferenceError(
                "tree ensemble used before being bound to a feature schema".into(),
            ));
        }
        if table.width() != self.width {
            return Err(ModelError::InvalidInput(format!(
                "expected {} features, got {}",
                self.width,
                table.width()
            )));
        }
        Ok(table
            .rows()
            .iter()
            .map(|row| {
                let p = sigmoid(self.margin(row));
                [1.0 - p, p]
            })
            .collect())
    }

    fn backend_name(&self) -> &str {
        "gradient_boosting"
    }
}
