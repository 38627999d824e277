//! On-disk pipeline artifact schema.
//!
//! An artifact bundles an optional preprocessing step with a trained
//! classifier. It is plain JSON so it can be produced by any training
//! environment and inspected by hand.

use serde::{Deserialize, Serialize};

use crate::domain::ClassLabel;

/// Format tag every artifact must carry.
pub const ARTIFACT_FORMAT: &str = "house-pipeline/1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineArtifact {
    pub format: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Ordered input columns the pipeline was fit on, when the trainer recorded them.
    #[serde(default)]
    pub feature_names_in: Option<Vec<String>>,
    pub classes: Vec<ClassLabel>,
    #[serde(default)]
    pub preprocess: Option<PreprocessStep>,
    pub classifier: ClassifierSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalColumn {
    pub name: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PreprocessStep {
    /// Replace each listed column in place by its 1-based category index (-1 if unknown).
    Ordinal { columns: Vec<CategoricalColumn> },
    /// One-hot block per listed column, then the remaining columns passed through.
    OneHot { columns: Vec<CategoricalColumn> },
}

impl PreprocessStep {
    pub fn columns(&self) -> &[CategoricalColumn] {
        match self {
            PreprocessStep::Ordinal { columns } | PreprocessStep::OneHot { columns } => columns,
        }
    }

    pub fn step_name(&self) -> &'static str {
        match self {
            PreprocessStep::Ordinal { .. } => "ordinal_encoder",
            PreprocessStep::OneHot { .. } => "one_hot_encoder",
        }
    }

    pub fn encodes(&self, column: &str) -> bool {
        self.columns().iter().any(|c| c.name == column)
    }

    /// Width of the numeric vector produced from `n_inputs` input columns.
    pub fn output_width(&self, n_inputs: usize) -> usize {
        match self {
            PreprocessStep::Ordinal { .. } => n_inputs,
            PreprocessStep::OneHot { columns } => {
                let dummies: usize = columns.iter().map(|c| c.categories.len()).sum();
                dummies + n_inputs.saturating_sub(columns.len())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    RandomForest { n_features: usize, trees: Vec<TreeSpec> },
    /// Multinomial logistic regression, one coefficient row per class.
    Logistic { coef: Vec<Vec<f64>>, intercept: Vec<f64> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSpec {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Go left when `x[feature] <= threshold`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Per-class weights (counts or fractions).
    Leaf { value: Vec<f64> },
}
