//! Fitted Regression Models

use crate::InferenceError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A fitted regression function over a fixed-width feature vector
pub trait Regressor: Send + Sync {
    /// Width of the input vector the model was trained on
    fn num_features(&self) -> usize;

    /// Predict a scalar from an encoded, scaled feature vector
    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError>;

    /// Short model family name for logs and health output
    fn kind(&self) -> &'static str;
}

#[derive(Serialize, Deserialize)]
struct LinearParams {
    coefficients: Vec<f64>,
    intercept: f64,
}

/// Ordinary linear regression: `intercept + Σ coefficient[i] * x[i]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LinearParams", into = "LinearParams")]
pub struct LinearRegressor {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegressor {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self, InferenceError> {
        if coefficients.is_empty() {
            return Err(InferenceError::ModelUnavailable(
                "linear model has no coefficients".to_string(),
            ));
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(InferenceError::ModelUnavailable(
                "linear model has non-finite parameters".to_string(),
            ));
        }
        Ok(Self {
            coefficients,
            intercept,
        })
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl TryFrom<LinearParams> for LinearRegressor {
    type Error = InferenceError;

    fn try_from(params: LinearParams) -> Result<Self, Self::Error> {
        Self::new(params.coefficients, params.intercept)
    }
}

impl From<LinearRegressor> for LinearParams {
    fn from(model: LinearRegressor) -> Self {
        Self {
            coefficients: model.coefficients,
            intercept: model.intercept,
        }
    }
}

impl Regressor for LinearRegressor {
    fn num_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        check_width(self.coefficients.len(), features)?;
        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>())
    }

    fn kind(&self) -> &'static str {
        "linear"
    }
}

/// A node in a regression tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Go to `left` when `x[feature] <= threshold`, otherwise `right`.
    /// Same tie rule as scikit-learn trees, so exported thresholds carry over
    /// unchanged.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Terminal value
    Leaf(f64),
}

/// A single regression tree stored as a flat node array rooted at 0.
///
/// Children always sit at higher indices than their parent, so a walk from
/// the root visits at most `nodes.len()` nodes. Only checked trees are
/// evaluated: a tree becomes usable once a [`ForestRegressor`] accepts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    pub fn new(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    fn check(&self, num_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        let len = self.nodes.len();
        for (idx, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= num_features {
                        return Err(format!(
                            "node {} splits on feature {} of {}",
                            idx, feature, num_features
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {} has a non-finite threshold", idx));
                    }
                    if left <= idx || right <= idx || left >= len || right >= len {
                        return Err(format!(
                            "node {} has children ({}, {}) outside ({}, {})",
                            idx, left, right, idx, len
                        ));
                    }
                }
                TreeNode::Leaf(value) => {
                    if !value.is_finite() {
                        return Err(format!("leaf {} is not finite", idx));
                    }
                }
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf. The tree must have passed `check` and
    /// `features` must be as wide as the owning forest.
    pub(crate) fn predict(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                TreeNode::Leaf(value) => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ForestParams {
    num_features: usize,
    trees: Vec<RegressionTree>,
}

/// Random forest regressor: mean of independent tree predictions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ForestParams", into = "ForestParams")]
pub struct ForestRegressor {
    num_features: usize,
    trees: Vec<RegressionTree>,
}

impl ForestRegressor {
    pub fn new(num_features: usize, trees: Vec<RegressionTree>) -> Result<Self, InferenceError> {
        if num_features == 0 {
            return Err(InferenceError::ModelUnavailable(
                "forest declares zero features".to_string(),
            ));
        }
        if trees.is_empty() {
            return Err(InferenceError::ModelUnavailable("forest has no trees".to_string()));
        }
        for (idx, tree) in trees.iter().enumerate() {
            tree.check(num_features)
                .map_err(|e| InferenceError::ModelUnavailable(format!("tree {}: {}", idx, e)))?;
        }

        Ok(Self {
            num_features,
            trees,
        })
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

impl TryFrom<ForestParams> for ForestRegressor {
    type Error = InferenceError;

    fn try_from(params: ForestParams) -> Result<Self, Self::Error> {
        Self::new(params.num_features, params.trees)
    }
}

impl From<ForestRegressor> for ForestParams {
    fn from(model: ForestRegressor) -> Self {
        Self {
            num_features: model.num_features,
            trees: model.trees,
        }
    }
}

impl Regressor for ForestRegressor {
    fn num_features(&self) -> usize {
        self.num_features
    }

    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        check_width(self.num_features, features)?;
        let total: f64 = self.trees.iter().map(|t| t.predict(features)).sum();
        Ok(total / self.trees.len() as f64)
    }

    fn kind(&self) -> &'static str {
        "random_forest"
    }
}

fn check_width(expected: usize, features: &[f64]) -> Result<(), InferenceError> {
    if features.len() != expected {
        return Err(InferenceError::InvalidInputShape {
            expected: expected.to_string(),
            actual: features.len().to_string(),
        });
    }
    Ok(())
}

/// Serialized model as stored in an artifact bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear(LinearRegressor),
    Forest(ForestRegressor),
    /// External ONNX graph taking a `[1, num_features]` f32 input
    Onnx { path: PathBuf, num_features: usize },
}

impl ModelArtifact {
    /// Feature count the artifact declares
    pub fn num_features(&self) -> usize {
        match self {
            ModelArtifact::Linear(m) => m.num_features(),
            ModelArtifact::Forest(m) => m.num_features(),
            ModelArtifact::Onnx { num_features, .. } => *num_features,
        }
    }
}
