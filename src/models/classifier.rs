//! Classifier evaluation.
//!
//! The pipeline relies on one primitive per classifier kind: turn a numeric
//! feature vector into a probability vector in class order. `predict` is the
//! first arg-max of that vector.

use crate::models::artifact::{ClassifierSpec, TreeNode, TreeSpec};

impl ClassifierSpec {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ClassifierSpec::RandomForest { .. } => "random_forest",
            ClassifierSpec::Logistic { .. } => "logistic",
        }
    }

    /// Width of the numeric input vector.
    pub fn n_features(&self) -> usize {
        match self {
            ClassifierSpec::RandomForest { n_features, .. } => *n_features,
            ClassifierSpec::Logistic { coef, .. } => coef.first().map_or(0, Vec::len),
        }
    }

    pub fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, String> {
        if x.len() != self.n_features() {
            return Err(format!(
                "X has {} features, but the classifier expects {}",
                x.len(),
                self.n_features()
            ));
        }
        if let Some(pos) = x.iter().position(|v| !v.is_finite()) {
            return Err(format!("non-finite input at feature {pos}"));
        }

        match self {
            ClassifierSpec::RandomForest { trees, .. } => forest_proba(trees, x),
            ClassifierSpec::Logistic { coef, intercept } => {
                let scores: Vec<f64> = coef
                    .iter()
                    .zip(intercept)
                    .map(|(row, b)| row.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + b)
                    .collect();
                Ok(softmax(&scores))
            }
        }
    }
}

fn forest_proba(trees: &[TreeSpec], x: &[f64]) -> Result<Vec<f64>, String> {
    if trees.is_empty() {
        return Err("forest has no trees".to_string());
    }
    let mut acc: Vec<f64> = Vec::new();
    for (idx, tree) in trees.iter().enumerate() {
        let leaf = tree_leaf(tree, x).map_err(|e| format!("tree {idx}: {e}"))?;
        let total: f64 = leaf.iter().sum();
        if total <= 0.0 {
            return Err(format!("tree {idx}: leaf has zero total weight"));
        }
        if acc.is_empty() {
            acc = vec![0.0; leaf.len()];
        }
        for (a, v) in acc.iter_mut().zip(leaf) {
            *a += v / total;
        }
    }
    let n = trees.len() as f64;
    Ok(acc.into_iter().map(|v| v / n).collect())
}

fn tree_leaf<'a>(tree: &'a TreeSpec, x: &[f64]) -> Result<&'a [f64], String> {
    let mut idx = 0usize;
    // Children always point forward, so a walk visits at most `nodes.len()` nodes.
    for _ in 0..=tree.nodes.len() {
        match tree.nodes.get(idx) {
            Some(TreeNode::Leaf { value }) => return Ok(value),
            Some(TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            }) => {
                let v = x
                    .get(*feature)
                    .ok_or_else(|| format!("split on missing feature {feature}"))?;
                idx = if *v <= *threshold { *left } else { *right };
            }
            None => return Err(format!("node {idx} out of range")),
        }
    }
    Err("walk did not reach a leaf".to_string())
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

/// Index of the first maximum (ties resolve to the lowest index).
pub fn argmax_first(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump() -> ClassifierSpec {
        ClassifierSpec::RandomForest {
            n_features: 2,
            trees: vec![
                TreeSpec {
                    nodes: vec![
                        TreeNode::Split { feature: 0, threshold: 0.5, left: 1, right: 2 },
                        TreeNode::Leaf { value: vec![3.0, 1.0] },
                        TreeNode::Leaf { value: vec![0.0, 4.0] },
                    ],
                },
                TreeSpec {
                    nodes: vec![TreeNode::Leaf { value: vec![1.0, 1.0] }],
                },
            ],
        }
    }

    #[test]
    fn forest_averages_normalised_leaves() {
        let p = stump().predict_proba(&[0.0, 9.0]).unwrap();
        assert!((p[0] - 0.625).abs() < 1e-12);
        assert!((p[1] - 0.375).abs() < 1e-12);

        let p = stump().predict_proba(&[1.0, 9.0]).unwrap();
        assert!((p[0] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn wrong_width_is_reported() {
        let err = stump().predict_proba(&[1.0]).unwrap_err();
        assert!(err.contains("X has 1 features"));
    }

    #[test]
    fn logistic_probabilities_sum_to_one() {
        let clf = ClassifierSpec::Logistic {
            coef: vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, -1.0]],
            intercept: vec![0.0, 0.5, 0.0],
        };
        let p = clf.predict_proba(&[2.0, 1.0]).unwrap();
        assert_eq!(p.len(), 3);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(argmax_first(&p), Some(0));
    }

    #[test]
    fn argmax_prefers_first_on_ties() {
        assert_eq!(argmax_first(&[0.25, 0.5, 0.5]), Some(1));
        assert_eq!(argmax_first(&[]), None);
    }
}
