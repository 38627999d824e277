//! Shared serving logic used by both front-ends.
//!
//! Keeping this in one place avoids duplicating the workflow:
//! validate input -> locate artifact -> cached load -> align -> predict
//!
//! The one-shot and interactive front-ends only decide how to present the
//! `Outcome`.

use std::path::PathBuf;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::align::FeatureAligner;
use crate::domain::{PRICE_BUCKETS, PredictionResult, RawInput, ServeConfig};
use crate::error::AppError;
use crate::io::dataset::Dataset;
use crate::io::export::read_feature_list;
use crate::io::model_file::resolve_model_path;
use crate::models::ModelCache;
use crate::models::contract::{InputEncoding, ModelContract};
use crate::models::pipeline::ClassifierPipeline;

/// A successful prediction plus what the user needs to interpret it.
#[derive(Debug, Clone)]
pub struct Served {
    pub model_path: PathBuf,
    pub model_name: String,
    pub result: PredictionResult,
}

/// Result of one request. Errors are data here, never a crash.
#[derive(Debug, Clone)]
pub enum Outcome {
    Predicted(Box<Served>),
    Failed(AppError),
}

/// Serve one prediction request.
///
/// Failures are left to the caller to present.
pub fn serve(config: &ServeConfig, raw: &RawInput) -> Outcome {
    match try_serve(config, raw) {
        Ok(served) => Outcome::Predicted(Box::new(served)),
        Err(err) => {
            debug!(kind = ?err.kind(), "request failed");
            Outcome::Failed(err)
        }
    }
}

fn try_serve(config: &ServeConfig, raw: &RawInput) -> Result<Served, AppError> {
    raw.validate()?;
    let path = resolve_model_path(&config.model_path, &config.fallback_path)?;
    let pipeline = ModelCache::global().get_or_load(&path)?;
    let result = aligner_for(config, pipeline.contract())?.predict(pipeline.as_ref(), raw)?;
    info!(label = %result.label, district = %raw.district, "served prediction");

    Ok(Served {
        model_path: path,
        model_name: pipeline.contract().name.clone(),
        result,
    })
}

/// Aligner for `contract`, reading the configured feature list only when the
/// pipeline is pre-encoded and records no columns.
fn aligner_for(config: &ServeConfig, contract: &ModelContract) -> Result<FeatureAligner, AppError> {
    let aligner = FeatureAligner::new();
    match (&config.feature_list, contract.encoding, &contract.columns) {
        (Some(path), InputEncoding::PreEncoded, None) => {
            let names = read_feature_list(path)?;
            debug!(path = %path.display(), features = names.len(), "using feature list");
            Ok(aligner.with_feature_list(&names))
        }
        _ => Ok(aligner),
    }
}

/// Batch-scoring summary against the dataset's `Price_range`.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub model_path: PathBuf,
    pub scored: usize,
    pub correct: usize,
    /// (listing index, reason) for listings that could not be scored.
    pub failures: Vec<(usize, String)>,
    /// Row/column labels of `confusion`.
    pub labels: Vec<String>,
    /// `confusion[actual][predicted]`.
    pub confusion: Vec<Vec<usize>>,
}

impl Evaluation {
    pub fn accuracy(&self) -> Option<f64> {
        (self.scored > 0).then(|| self.correct as f64 / self.scored as f64)
    }
}

/// Score every listing with the configured model.
///
/// The pipeline is shared read-only across rayon workers.
pub fn evaluate(config: &ServeConfig, dataset: &Dataset) -> Result<Evaluation, AppError> {
    let path = resolve_model_path(&config.model_path, &config.fallback_path)?;
    let pipeline = ModelCache::global().get_or_load(&path)?;
    let aligner = aligner_for(config, pipeline.contract())?;

    let outcomes: Vec<Result<(String, String), String>> = dataset
        .listings
        .par_iter()
        .map(|listing| {
            let actual = listing
                .price_range
                .clone()
                .ok_or_else(|| "no Price_range".to_string())?;
            let raw = listing.to_raw_input()?;
            let result = aligner
                .predict(pipeline.as_ref(), &raw)
                .map_err(|e| e.to_string())?;
            Ok((actual, result.label))
        })
        .collect();

    let mut labels: Vec<String> = PRICE_BUCKETS.iter().map(|s| s.to_string()).collect();
    let mut pairs = Vec::new();
    let mut failures = Vec::new();
    for (idx, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok((actual, predicted)) => {
                for label in [&actual, &predicted] {
                    if !labels.contains(label) {
                        labels.push(label.clone());
                    }
                }
                pairs.push((actual, predicted));
            }
            Err(reason) => failures.push((idx, reason)),
        }
    }

    let index_of = |label: &str| labels.iter().position(|l| l == label).unwrap_or(0);
    let mut confusion = vec![vec![0usize; labels.len()]; labels.len()];
    let mut correct = 0usize;
    for (actual, predicted) in &pairs {
        confusion[index_of(actual)][index_of(predicted)] += 1;
        if actual == predicted {
            correct += 1;
        }
    }

    info!(scored = pairs.len(), correct, failed = failures.len(), "evaluation complete");

    Ok(Evaluation {
        model_path: path,
        scored: pairs.len(),
        correct,
        failures,
        labels,
        confusion,
    })
}
