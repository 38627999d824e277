//! Typed model contract, built once when an artifact is loaded.
//!
//! All introspection of the artifact happens here. Request handling only ever
//! sees the resulting `ModelContract`.

use std::collections::HashSet;

use crate::domain::ClassLabel;
use crate::models::artifact::{ARTIFACT_FORMAT, ClassifierSpec, PipelineArtifact, PreprocessStep, TreeNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Categorical,
    Numeric,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

/// How categorical fields must be presented to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEncoding {
    /// The pipeline has its own encoder: send the raw string categories.
    Internal,
    /// No encoder in the pipeline: send one-hot dummy columns (`<Field>_<Category>`).
    PreEncoded,
}

impl InputEncoding {
    pub fn describe(self) -> &'static str {
        match self {
            InputEncoding::Internal => "internal (raw categories)",
            InputEncoding::PreEncoded => "pre-encoded (one-hot dummies)",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelContract {
    pub name: String,
    pub model_kind: &'static str,
    pub steps: Vec<String>,
    /// Ordered input columns, when the artifact records them.
    pub columns: Option<Vec<ColumnSpec>>,
    pub classes: Vec<ClassLabel>,
    pub encoding: InputEncoding,
    /// Width of the numeric vector the classifier consumes.
    pub n_features: usize,
    /// Columns taken by each preprocessing step.
    pub step_columns: Vec<(String, Vec<String>)>,
}

impl ModelContract {
    pub fn column_names(&self) -> Option<Vec<&str>> {
        self.columns
            .as_ref()
            .map(|cols| cols.iter().map(|c| c.name.as_str()).collect())
    }
}

/// Validate an artifact and derive its contract.
pub fn build_contract(artifact: &PipelineArtifact) -> Result<ModelContract, String> {
    if artifact.format != ARTIFACT_FORMAT {
        return Err(format!(
            "unsupported artifact format '{}' (expected '{ARTIFACT_FORMAT}')",
            artifact.format
        ));
    }

    validate_classes(&artifact.classes)?;
    validate_classifier(&artifact.classifier, artifact.classes.len())?;

    if let Some(step) = &artifact.preprocess {
        validate_step(step)?;
    }

    let columns = match &artifact.feature_names_in {
        Some(names) => Some(columns_from_names(names, artifact.preprocess.as_ref())?),
        None => None,
    };

    if let Some(names) = &artifact.feature_names_in {
        let expected = match &artifact.preprocess {
            Some(step) => step.output_width(names.len()),
            None => names.len(),
        };
        let n_features = artifact.classifier.n_features();
        if expected != n_features {
            return Err(format!(
                "feature_names_in yields {expected} features after preprocessing, but the classifier expects {n_features}"
            ));
        }
    }

    let encoding = match artifact.preprocess {
        Some(_) => InputEncoding::Internal,
        None => InputEncoding::PreEncoded,
    };

    let mut steps = Vec::new();
    let mut step_columns = Vec::new();
    if let Some(step) = &artifact.preprocess {
        steps.push(step.step_name().to_string());
        step_columns.push((
            step.step_name().to_string(),
            step.columns().iter().map(|c| c.name.clone()).collect(),
        ));
    }
    steps.push(artifact.classifier.kind_name().to_string());

    Ok(ModelContract {
        name: artifact.name.clone().unwrap_or_else(|| "unnamed".to_string()),
        model_kind: artifact.classifier.kind_name(),
        steps,
        columns,
        classes: artifact.classes.clone(),
        encoding,
        n_features: artifact.classifier.n_features(),
        step_columns,
    })
}

fn validate_classes(classes: &[ClassLabel]) -> Result<(), String> {
    if classes.is_empty() {
        return Err("artifact lists no classes".to_string());
    }
    let mut seen = HashSet::new();
    for class in classes {
        if !seen.insert(class) {
            return Err(format!("duplicate class label '{class}'"));
        }
    }
    Ok(())
}

fn validate_classifier(spec: &ClassifierSpec, n_classes: usize) -> Result<(), String> {
    match spec {
        ClassifierSpec::RandomForest { n_features, trees } => {
            if *n_features == 0 {
                return Err("random_forest: n_features must be positive".to_string());
            }
            if trees.is_empty() {
                return Err("random_forest: no trees".to_string());
            }
            for (t, tree) in trees.iter().enumerate() {
                if tree.nodes.is_empty() {
                    return Err(format!("random_forest: tree {t} has no nodes"));
                }
                for (i, node) in tree.nodes.iter().enumerate() {
                    match node {
                        TreeNode::Split {
                            feature,
                            threshold,
                            left,
                            right,
                        } => {
                            if feature >= n_features {
                                return Err(format!(
                                    "random_forest: tree {t} node {i} splits on feature {feature} (n_features={n_features})"
                                ));
                            }
                            if !threshold.is_finite() {
                                return Err(format!("random_forest: tree {t} node {i} has a non-finite threshold"));
                            }
                            for child in [left, right] {
                                if *child <= i || *child >= tree.nodes.len() {
                                    return Err(format!(
                                        "random_forest: tree {t} node {i} has invalid child {child}"
                                    ));
                                }
                            }
                        }
                        TreeNode::Leaf { value } => {
                            if value.len() != n_classes {
                                return Err(format!(
                                    "random_forest: tree {t} leaf {i} has {} weights for {n_classes} classes",
                                    value.len()
                                ));
                            }
                            if value.iter().any(|v| !v.is_finite() || *v < 0.0) || value.iter().sum::<f64>() <= 0.0 {
                                return Err(format!("random_forest: tree {t} leaf {i} has invalid weights"));
                            }
                        }
                    }
                }
            }
        }
        ClassifierSpec::Logistic { coef, intercept } => {
            if coef.len() != n_classes || intercept.len() != n_classes {
                return Err(format!(
                    "logistic: expected {n_classes} coefficient rows and intercepts, got {} and {}",
                    coef.len(),
                    intercept.len()
                ));
            }
            let width = coef.first().map_or(0, Vec::len);
            if width == 0 || coef.iter().any(|row| row.len() != width) {
                return Err("logistic: coefficient rows must share a positive width".to_string());
            }
            if coef.iter().flatten().chain(intercept).any(|v| !v.is_finite()) {
                return Err("logistic: non-finite coefficient".to_string());
            }
        }
    }
    Ok(())
}

fn validate_step(step: &PreprocessStep) -> Result<(), String> {
    let mut seen = HashSet::new();
    for column in step.columns() {
        if !seen.insert(column.name.as_str()) {
            return Err(format!("{}: column '{}' listed twice", step.step_name(), column.name));
        }
        if column.categories.is_empty() {
            return Err(format!("{}: column '{}' has no categories", step.step_name(), column.name));
        }
    }
    Ok(())
}

fn columns_from_names(names: &[String], step: Option<&PreprocessStep>) -> Result<Vec<ColumnSpec>, String> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(format!("feature_names_in lists '{name}' twice"));
        }
    }
    if let Some(step) = step {
        if let Some(missing) = step.columns().iter().find(|c| !seen.contains(c.name.as_str())) {
            return Err(format!(
                "{} takes column '{}', which is not in feature_names_in",
                step.step_name(),
                missing.name
            ));
        }
    }

    Ok(names
        .iter()
        .map(|name| ColumnSpec {
            name: name.clone(),
            kind: match step {
                Some(step) if step.encodes(name) => ColumnKind::Categorical,
                _ => ColumnKind::Numeric,
            },
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::artifact::{CategoricalColumn, TreeSpec};

    fn artifact(preprocess: Option<PreprocessStep>, names: Option<Vec<&str>>, n_features: usize) -> PipelineArtifact {
        PipelineArtifact {
            format: ARTIFACT_FORMAT.to_string(),
            name: Some("t".to_string()),
            feature_names_in: names.map(|v| v.into_iter().map(String::from).collect()),
            classes: vec![ClassLabel::Index(0), ClassLabel::Index(1)],
            preprocess,
            classifier: ClassifierSpec::RandomForest {
                n_features,
                trees: vec![TreeSpec {
                    nodes: vec![TreeNode::Leaf { value: vec![1.0, 1.0] }],
                }],
            },
        }
    }

    fn one_hot_district() -> PreprocessStep {
        PreprocessStep::OneHot {
            columns: vec![CategoricalColumn {
                name: "District".to_string(),
                categories: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            }],
        }
    }

    #[test]
    fn encoder_step_means_internal_encoding() {
        let a = artifact(Some(one_hot_district()), Some(vec!["District", "Area"]), 4);
        let contract = build_contract(&a).unwrap();
        assert_eq!(contract.encoding, InputEncoding::Internal);
        let cols = contract.columns.unwrap();
        assert_eq!(cols[0].kind, ColumnKind::Categorical);
        assert_eq!(cols[1].kind, ColumnKind::Numeric);
        assert_eq!(contract.steps, vec!["one_hot_encoder", "random_forest"]);
    }

    #[test]
    fn no_step_means_pre_encoded() {
        let a = artifact(None, Some(vec!["Region", "District_A"]), 2);
        assert_eq!(build_contract(&a).unwrap().encoding, InputEncoding::PreEncoded);
    }

    #[test]
    fn width_mismatch_fails_at_load() {
        let a = artifact(Some(one_hot_district()), Some(vec!["District", "Area"]), 2);
        let err = build_contract(&a).unwrap_err();
        assert!(err.contains("classifier expects 2"), "{err}");
    }

    #[test]
    fn step_column_must_be_an_input() {
        let a = artifact(Some(one_hot_district()), Some(vec!["Area"]), 3);
        assert!(build_contract(&a).unwrap_err().contains("not in feature_names_in"));
    }

    #[test]
    fn leaf_width_must_match_classes() {
        let mut a = artifact(None, None, 1);
        a.classes.push(ClassLabel::Index(2));
        assert!(build_contract(&a).unwrap_err().contains("2 weights for 3 classes"));
    }

    #[test]
    fn unknown_format_is_rejected() {
        let mut a = artifact(None, None, 1);
        a.format = "pickle".to_string();
        assert!(build_contract(&a).is_err());
    }
}
