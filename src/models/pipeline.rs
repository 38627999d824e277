//! Loaded, validated pipelines.

use tracing::debug;

use crate::domain::{AlignedRow, ClassLabel, FeatureValue};
use crate::error::AppError;
use crate::models::artifact::{ClassifierSpec, PipelineArtifact, PreprocessStep};
use crate::models::classifier::argmax_first;
use crate::models::contract::{ModelContract, build_contract};

/// What the aligner needs from a loaded model.
///
/// Implementations are immutable after load and may be shared across threads.
pub trait ClassifierPipeline: Send + Sync {
    fn contract(&self) -> &ModelContract;

    /// Raw prediction for a single aligned row.
    fn predict(&self, row: &AlignedRow) -> Result<ClassLabel, String>;

    /// Class probabilities for a single aligned row, in `contract().classes` order.
    fn predict_proba(&self, row: &AlignedRow) -> Result<Vec<f64>, String>;
}

/// Pipeline backed by a JSON artifact.
#[derive(Debug, Clone)]
pub struct ArtifactPipeline {
    contract: ModelContract,
    preprocess: Option<PreprocessStep>,
    classifier: ClassifierSpec,
}

impl ArtifactPipeline {
    pub fn from_artifact(artifact: PipelineArtifact) -> Result<Self, AppError> {
        let contract = build_contract(&artifact).map_err(AppError::model_load)?;
        debug!(
            name = %contract.name,
            kind = contract.model_kind,
            classes = contract.classes.len(),
            "pipeline validated"
        );
        Ok(Self {
            contract,
            preprocess: artifact.preprocess,
            classifier: artifact.classifier,
        })
    }

    /// Turn an aligned row into the classifier's numeric input.
    pub fn transform(&self, row: &AlignedRow) -> Result<Vec<f64>, String> {
        match &self.preprocess {
            None => row
                .cells
                .iter()
                .map(|(name, value)| numeric(name, value))
                .collect(),
            Some(PreprocessStep::Ordinal { columns }) => row
                .cells
                .iter()
                .map(|(name, value)| match columns.iter().find(|c| &c.name == name) {
                    Some(column) => {
                        let category = value.to_string();
                        Ok(column
                            .categories
                            .iter()
                            .position(|c| *c == category)
                            .map_or(-1.0, |i| (i + 1) as f64))
                    }
                    None => numeric(name, value),
                })
                .collect(),
            Some(PreprocessStep::OneHot { columns }) => {
                let mut out = Vec::new();
                for column in columns {
                    let value = row
                        .get(&column.name)
                        .ok_or_else(|| format!("column '{}' is missing from the input", column.name))?;
                    let category = value.to_string();
                    out.extend(
                        column
                            .categories
                            .iter()
                            .map(|c| if *c == category { 1.0 } else { 0.0 }),
                    );
                }
                for (name, value) in &row.cells {
                    if !columns.iter().any(|c| &c.name == name) {
                        out.push(numeric(name, value)?);
                    }
                }
                Ok(out)
            }
        }
    }
}

fn numeric(column: &str, value: &FeatureValue) -> Result<f64, String> {
    match value {
        FeatureValue::Number(v) => Ok(*v),
        FeatureValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("could not convert string to float: '{s}' (column '{column}')")),
    }
}

impl ClassifierPipeline for ArtifactPipeline {
    fn contract(&self) -> &ModelContract {
        &self.contract
    }

    fn predict(&self, row: &AlignedRow) -> Result<ClassLabel, String> {
        let proba = self.predict_proba(row)?;
        argmax_first(&proba)
            .and_then(|i| self.contract.classes.get(i))
            .cloned()
            .ok_or_else(|| "classifier produced no probabilities".to_string())
    }

    fn predict_proba(&self, row: &AlignedRow) -> Result<Vec<f64>, String> {
        let x = self.transform(row)?;
        self.classifier.predict_proba(&x)
    }
}
