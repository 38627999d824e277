//! Process-lifetime cache of loaded pipelines, keyed by artifact path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, RwLock};

use tracing::debug;

use crate::error::AppError;
use crate::io::model_file::load_pipeline;
use crate::models::pipeline::ArtifactPipeline;

#[derive(Debug, Default)]
pub struct ModelCache {
    entries: RwLock<HashMap<PathBuf, Arc<ArtifactPipeline>>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> &'static ModelCache {
        static CACHE: OnceLock<ModelCache> = OnceLock::new();
        CACHE.get_or_init(ModelCache::new)
    }

    /// Return the cached pipeline for `path`, loading it on first use.
    ///
    /// Entries are keyed by the canonical path, so different spellings of the
    /// same file share one load.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<ArtifactPipeline>, AppError> {
        let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            if let Some(hit) = entries.get(&key) {
                debug!(path = %key.display(), "model cache hit");
                return Ok(Arc::clone(hit));
            }
        }

        let loaded = Arc::new(load_pipeline(path)?);
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        Ok(Arc::clone(entries.entry(key).or_insert(loaded)))
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMO: &str = include_str!("../../models/randomForest_with_area_pipeline.json");

    #[test]
    fn loads_once_per_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, DEMO).unwrap();

        let cache = ModelCache::new();
        let a = cache.get_or_load(&path).unwrap();
        // A reload would fail on this content, so a hit proves no second parse.
        std::fs::write(&path, "not json").unwrap();
        let b = cache.get_or_load(&path).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn different_spellings_of_one_path_share_an_entry() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("models")).unwrap();
        let path = dir.path().join("models").join("model.json");
        std::fs::write(&path, DEMO).unwrap();
        let dotted = dir.path().join(".").join("models").join("..").join("models").join("model.json");

        let cache = ModelCache::new();
        let a = cache.get_or_load(&path).unwrap();
        let b = cache.get_or_load(&dotted).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn missing_file_is_a_model_load_error() {
        let cache = ModelCache::new();
        let err = cache.get_or_load(Path::new("does/not/exist.json")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ModelLoad);
        assert!(cache.is_empty());
    }
}
