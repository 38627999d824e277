//! Locate and read pipeline artifacts.
//!
//! Artifacts are looked up at a primary path first and a fallback path second,
//! mirroring the two places a training run may have written them.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::AppError;
use crate::models::artifact::PipelineArtifact;
use crate::models::pipeline::ArtifactPipeline;

pub const DEFAULT_MODEL_PATH: &str = "models/randomForest_with_area_pipeline.json";
pub const DEFAULT_FALLBACK_PATH: &str = "web_app/models/randomForest_with_area_pipeline.json";

/// Pick the first candidate path that exists.
pub fn resolve_model_path(primary: &Path, fallback: &Path) -> Result<PathBuf, AppError> {
    for candidate in [primary, fallback] {
        if candidate.is_file() {
            debug!(path = %candidate.display(), "model artifact found");
            return Ok(candidate.to_path_buf());
        }
        debug!(path = %candidate.display(), "model artifact not found");
    }
    Err(AppError::model_load(format!(
        "Model artifact not found at '{}' or '{}'. Train and export the pipeline first.",
        primary.display(),
        fallback.display()
    )))
}

/// Read an artifact without validating it.
pub fn read_artifact(path: &Path) -> Result<PipelineArtifact, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::model_load(format!("Failed to open model '{}': {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::model_load(format!("Invalid model artifact '{}': {e}", path.display())))
}

/// Read and validate an artifact.
pub fn load_pipeline(path: &Path) -> Result<ArtifactPipeline, AppError> {
    let artifact = read_artifact(path)?;
    let pipeline = ArtifactPipeline::from_artifact(artifact)
        .map_err(|e| AppError::model_load(format!("'{}': {}", path.display(), e.message())))?;
    info!(path = %path.display(), "model loaded");
    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn falls_back_to_secondary_path() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join("fallback.json");
        std::fs::write(&fallback, "{}").unwrap();

        let resolved = resolve_model_path(&dir.path().join("missing.json"), &fallback).unwrap();
        assert_eq!(resolved, fallback);
    }

    #[test]
    fn missing_at_both_paths_names_both() {
        let err = resolve_model_path(Path::new("nope/a.json"), Path::new("nope/b.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelLoad);
        assert!(err.message().contains("nope/a.json"));
        assert!(err.message().contains("nope/b.json"));
    }

    #[test]
    fn garbage_is_a_model_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, b"\x80\x04\x95 not json").unwrap();
        let err = load_pipeline(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelLoad);
    }

    #[test]
    fn demo_artifact_loads() {
        let p = load_pipeline(Path::new(DEFAULT_MODEL_PATH));
        assert!(p.is_ok(), "{p:?}");
    }
}
