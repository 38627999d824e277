//! Feature alignment: raw input → model-ready row → prediction.
//!
//! The pipeline's own contract decides the columns, their order and whether
//! categoricals go in as strings or as one-hot dummies. Nothing here assumes
//! a fixed layout unless the pipeline does not record one.

use tracing::{debug, warn};

use crate::align::layout::{DUMMY_SOURCES, default_layout};
use crate::domain::{
    AlignedRow, ClassProbability, DistrictTable, FeatureValue, PredictionResult, RawInput, Region,
};
use crate::error::{AppError, ErrorKind};
use crate::models::contract::{ColumnKind, ColumnSpec, InputEncoding, ModelContract};
use crate::models::pipeline::ClassifierPipeline;

/// Probabilities must sum to one within this tolerance.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct FeatureAligner {
    districts: &'static DistrictTable,
    /// Columns for pre-encoded pipelines that do not record their own.
    feature_list: Option<Vec<ColumnSpec>>,
}

impl Default for FeatureAligner {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureAligner {
    pub fn new() -> Self {
        Self {
            districts: DistrictTable::global(),
            feature_list: None,
        }
    }

    /// Use `names` (as written by `hpp features`) as the layout of a
    /// pre-encoded pipeline that records no columns.
    pub fn with_feature_list(mut self, names: &[String]) -> Self {
        self.feature_list = Some(
            names
                .iter()
                .map(|name| ColumnSpec {
                    name: name.clone(),
                    kind: ColumnKind::Numeric,
                })
                .collect(),
        );
        self
    }

    pub fn region(&self, raw: &RawInput) -> Region {
        self.districts.region_of(&raw.district)
    }

    /// Every field the aligner can offer, under its training-data column name.
    pub fn source_fields(raw: &RawInput, region: Region) -> Vec<(&'static str, FeatureValue)> {
        vec![
            ("District", FeatureValue::Text(raw.district.clone())),
            ("Ward", FeatureValue::Text(raw.ward.clone())),
            ("House_type", FeatureValue::Text(raw.house_type.as_str().to_string())),
            ("Legal_documents", FeatureValue::Text(raw.legal_documents.as_str().to_string())),
            ("No_floor", FeatureValue::Text(raw.no_floor.category())),
            ("No_bedroom", FeatureValue::Text(raw.no_bedroom.category())),
            ("Length", FeatureValue::Number(raw.length)),
            ("Width", FeatureValue::Number(raw.width)),
            ("Day_Of_Week", FeatureValue::Text(raw.day_of_week.model_category())),
            ("Month", FeatureValue::Number(f64::from(raw.month))),
            ("Area", FeatureValue::Number(raw.area)),
            ("Region", FeatureValue::Number(f64::from(region.flag()))),
        ]
    }

    /// Build the single-row record the contract expects.
    pub fn align(&self, raw: &RawInput, contract: &ModelContract) -> Result<AlignedRow, AppError> {
        let region = self.region(raw);
        align_fields(&Self::source_fields(raw, region), contract, self.feature_list.as_deref())
    }

    /// Align, then run `predict` and `predict_proba` on the pipeline.
    pub fn predict(&self, pipeline: &dyn ClassifierPipeline, raw: &RawInput) -> Result<PredictionResult, AppError> {
        let contract = pipeline.contract();
        let region = self.region(raw);
        let row = align_fields(&Self::source_fields(raw, region), contract, self.feature_list.as_deref())?;

        let predicted = pipeline
            .predict(&row)
            .map_err(|e| AppError::prediction(format!("predict failed: {e}")))?;
        let proba = pipeline
            .predict_proba(&row)
            .map_err(|e| AppError::prediction(format!("predict_proba failed: {e}")))?;
        check_probabilities(&proba, contract.classes.len())?;

        debug!(prediction = %predicted, region = region.flag(), "prediction complete");

        Ok(PredictionResult {
            label: predicted.display_label(),
            raw: predicted,
            region,
            row,
            probabilities: contract
                .classes
                .iter()
                .cloned()
                .zip(proba)
                .map(|(class, probability)| ClassProbability { class, probability })
                .collect(),
        })
    }
}

fn align_fields(
    sources: &[(&'static str, FeatureValue)],
    contract: &ModelContract,
    feature_list: Option<&[ColumnSpec]>,
) -> Result<AlignedRow, AppError> {
    match contract.encoding {
        InputEncoding::Internal => {
            let layout = match &contract.columns {
                Some(columns) => columns.clone(),
                None => {
                    warn!(model = %contract.name, "pipeline does not record its input columns; using the built-in layout");
                    default_layout()
                }
            };
            let cells = layout
                .iter()
                .map(|spec| {
                    let value = lookup(sources, &spec.name).ok_or_else(|| {
                        AppError::schema_mismatch(&spec.name, "the pipeline expects it but the input has no such field")
                    })?;
                    Ok((spec.name.clone(), coerce(spec, value)?))
                })
                .collect::<Result<Vec<_>, AppError>>()?;
            Ok(AlignedRow { cells })
        }
        InputEncoding::PreEncoded => {
            let columns = match (contract.columns.as_deref(), feature_list) {
                (Some(columns), _) => columns,
                (None, Some(list)) if list.len() == contract.n_features => list,
                (None, Some(list)) => {
                    return Err(AppError::new(
                        ErrorKind::SchemaMismatch,
                        format!(
                            "the feature list has {} names but the pipeline expects {} features",
                            list.len(),
                            contract.n_features
                        ),
                    ));
                }
                (None, None) => {
                    return Err(AppError::new(
                        ErrorKind::SchemaMismatch,
                        "the pipeline expects pre-encoded input but does not record its columns; pass a feature list (--features) to rebuild the dummy layout",
                    ));
                }
            };
            let cells = columns
                .iter()
                .map(|spec| {
                    if let Some(value) = lookup(sources, &spec.name) {
                        return Ok((spec.name.clone(), coerce(spec, value)?));
                    }
                    match dummy_source(sources, &spec.name) {
                        Some((value, category)) => {
                            let hit = value.to_string() == category;
                            Ok((spec.name.clone(), FeatureValue::Number(if hit { 1.0 } else { 0.0 })))
                        }
                        None => Err(AppError::schema_mismatch(
                            &spec.name,
                            "the pipeline expects it but no input field or dummy category matches",
                        )),
                    }
                })
                .collect::<Result<Vec<_>, AppError>>()?;
            Ok(AlignedRow { cells })
        }
    }
}

fn lookup<'a>(sources: &'a [(&'static str, FeatureValue)], column: &str) -> Option<&'a FeatureValue> {
    sources.iter().find(|(name, _)| *name == column).map(|(_, v)| v)
}

/// Longest categorical source name `S` such that `column` is `S_<category>`.
fn dummy_source<'a, 'c>(
    sources: &'a [(&'static str, FeatureValue)],
    column: &'c str,
) -> Option<(&'a FeatureValue, &'c str)> {
    sources
        .iter()
        .filter(|(name, _)| DUMMY_SOURCES.contains(name))
        .filter_map(|(name, value)| {
            column
                .strip_prefix(*name)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|category| (name.len(), value, category))
        })
        .max_by_key(|(len, _, _)| *len)
        .map(|(_, value, category)| (value, category))
}

fn coerce(spec: &ColumnSpec, value: &FeatureValue) -> Result<FeatureValue, AppError> {
    match (spec.kind, value) {
        (ColumnKind::Categorical, FeatureValue::Text(s)) => Ok(FeatureValue::Text(s.clone())),
        (ColumnKind::Categorical, number) => Ok(FeatureValue::Text(number.to_string())),
        (ColumnKind::Numeric, FeatureValue::Number(v)) => Ok(FeatureValue::Number(*v)),
        (ColumnKind::Numeric, FeatureValue::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(FeatureValue::Number)
            .map_err(|_| AppError::schema_mismatch(&spec.name, format!("expects a number, got '{s}'"))),
    }
}

fn check_probabilities(proba: &[f64], n_classes: usize) -> Result<(), AppError> {
    if proba.len() != n_classes {
        return Err(AppError::prediction(format!(
            "predict_proba returned {} values for {n_classes} classes",
            proba.len()
        )));
    }
    if proba.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(AppError::prediction("predict_proba returned a negative or non-finite value"));
    }
    let total: f64 = proba.iter().sum();
    if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(AppError::prediction(format!("predict_proba sums to {total}, not 1")));
    }
    Ok(())
}
