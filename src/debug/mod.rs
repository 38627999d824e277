//! Developer introspection of model artifacts and training features.
//!
//! These tools bypass the serving boundary: a load failure ends the command
//! with the error's exit code instead of being turned into a message.

use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::io::model_file::{load_pipeline, resolve_model_path};
use crate::models::contract::ModelContract;
use crate::models::pipeline::ClassifierPipeline;

pub mod features;

pub use features::derive_feature_list;

/// What `inspect` found in an artifact.
#[derive(Debug, Clone)]
pub struct InspectReport {
    pub path: PathBuf,
    pub contract: ModelContract,
}

impl InspectReport {
    /// Names to export: recorded input columns, if any.
    pub fn feature_names(&self) -> Option<Vec<String>> {
        self.contract
            .columns
            .as_ref()
            .map(|cols| cols.iter().map(|c| c.name.clone()).collect())
    }
}

/// Load an artifact (primary, then fallback path) and describe its contract.
pub fn inspect_model(primary: &Path, fallback: &Path) -> Result<InspectReport, AppError> {
    let path = resolve_model_path(primary, fallback)?;
    let pipeline = load_pipeline(&path)?;
    Ok(InspectReport {
        path,
        contract: pipeline.contract().clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::contract::InputEncoding;

    #[test]
    fn demo_artifact_exposes_its_contract() {
        let report = inspect_model(
            Path::new("models/randomForest_with_area_pipeline.json"),
            Path::new("missing.json"),
        )
        .unwrap();
        assert_eq!(report.contract.encoding, InputEncoding::Internal);
        assert_eq!(report.contract.n_features, 12);
        assert_eq!(report.contract.classes.len(), 8);
        assert_eq!(report.feature_names().unwrap().len(), 12);
        assert_eq!(report.contract.step_columns[0].1.len(), 7);
    }
}
