//! Trained trees and the booster that sums them.

use ndarray::{Array1, ArrayView2, ArrayViewMut1};
use serde::{Deserialize, Serialize};

use crate::data::FeatureFrame;
use crate::engine::{PredictData, Predictor};
use crate::error::{FittingError, MqError};

// =============================================================================
// Tree
// =============================================================================

/// A tree node. Children always have larger indices than their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Leaf {
        value: f32,
    },
    /// Rows with `value < threshold` go left; larger values and NaN go right.
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
}

/// A regression tree stored as a flat node list, root at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub(crate) fn new(nodes: Vec<Node>) -> Self {
        debug_assert!(!nodes.is_empty());
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Depth of the deepest leaf; a single leaf has depth 0.
    pub fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.nodes.len()];
        let mut max_depth = 0;
        for (idx, node) in self.nodes.iter().enumerate() {
            if let Node::Split { left, right, .. } = node {
                depths[*left] = depths[idx] + 1;
                depths[*right] = depths[idx] + 1;
                max_depth = max_depth.max(depths[idx] + 1);
            }
        }
        max_depth
    }

    /// Leaf value reached by `row` of a feature-major matrix.
    #[inline]
    pub fn predict_row(&self, features: ArrayView2<f32>, row: usize) -> f32 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[[*feature, row]] < *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Add this tree's output to `out`, one entry per column of `features`.
    pub fn add_predictions(&self, features: ArrayView2<f32>, mut out: ArrayViewMut1<f32>) {
        debug_assert_eq!(features.ncols(), out.len());
        for (row, pred) in out.iter_mut().enumerate() {
            *pred += self.predict_row(features, row);
        }
    }

    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".into());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                if *feature >= n_features {
                    return Err(format!("node {idx} splits on unknown feature {feature}"));
                }
                for child in [*left, *right] {
                    if child <= idx || child >= self.nodes.len() {
                        return Err(format!("node {idx} has invalid child {child}"));
                    }
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Booster
// =============================================================================

/// Additive tree ensemble produced by [`GbdtEngine`](super::GbdtEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booster {
    n_features: usize,
    base_score: f32,
    trees: Vec<Tree>,
}

impl Booster {
    pub(crate) fn new(n_features: usize, base_score: f32) -> Self {
        Self {
            n_features,
            base_score,
            trees: Vec::new(),
        }
    }

    pub(crate) fn push_tree(&mut self, tree: Tree) {
        self.trees.push(tree);
    }

    /// Keep only the first `n_trees` trees.
    pub(crate) fn truncate(&mut self, n_trees: usize) {
        self.trees.truncate(n_trees);
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn base_score(&self) -> f32 {
        self.base_score
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Raw predictions for every row of `frame`.
    pub fn predict_frame(&self, frame: &FeatureFrame) -> Result<Array1<f32>, FittingError> {
        if frame.n_columns() != self.n_features {
            return Err(FittingError::FeatureMismatch {
                expected: self.n_features,
                got: frame.n_columns(),
            });
        }
        let features = frame.features();
        let mut out = Array1::from_elem(frame.n_rows(), self.base_score);
        for tree in &self.trees {
            tree.add_predictions(features, out.view_mut());
        }
        Ok(out)
    }

    pub fn to_json(&self) -> Result<String, MqError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Load a booster saved with [`Booster::to_json`].
    ///
    /// # Errors
    ///
    /// Malformed JSON, or a tree that references unknown features or nodes.
    pub fn from_json(json: &str) -> Result<Self, MqError> {
        let booster: Booster = serde_json::from_str(json)?;
        for (idx, tree) in booster.trees.iter().enumerate() {
            tree.validate(booster.n_features)
                .map_err(|e| FittingError::InvalidModel(format!("tree {idx}: {e}")))?;
        }
        Ok(booster)
    }
}

impl Predictor for Booster {
    fn predict(&self, data: &PredictData) -> Result<Array1<f32>, FittingError> {
        self.predict_frame(data.features())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// x0 < 0.5 -> -1, else (x1 < 2 -> 1, else 3)
    fn tree() -> Tree {
        Tree::new(vec![
            Node::Split {
                feature: 0,
                threshold: 0.5,
                left: 1,
                right: 2,
            },
            Node::Leaf { value: -1.0 },
            Node::Split {
                feature: 1,
                threshold: 2.0,
                left: 3,
                right: 4,
            },
            Node::Leaf { value: 1.0 },
            Node::Leaf { value: 3.0 },
        ])
    }

    #[test]
    fn routes_rows() {
        // feature-major: x0 row, x1 row
        let features = array![[0.0, 1.0, 1.0, f32::NAN], [0.0, 1.0, 5.0, 1.0]];
        let t = tree();
        assert_eq!(t.predict_row(features.view(), 0), -1.0);
        assert_eq!(t.predict_row(features.view(), 1), 1.0);
        assert_eq!(t.predict_row(features.view(), 2), 3.0);
        // NaN goes right
        assert_eq!(t.predict_row(features.view(), 3), 1.0);
        assert_eq!(t.n_leaves(), 3);
        assert_eq!(t.depth(), 2);
    }

    #[test]
    fn booster_sums_trees() {
        let mut booster = Booster::new(2, 0.5);
        booster.push_tree(tree());
        booster.push_tree(tree());

        let frame = FeatureFrame::from_samples(array![[0.0, 0.0], [1.0, 5.0]].view());
        let preds = booster.predict_frame(&frame).unwrap();
        assert_eq!(preds.to_vec(), vec![-1.5, 6.5]);

        booster.truncate(1);
        assert_eq!(booster.n_trees(), 1);
    }

    #[test]
    fn feature_count_is_checked() {
        let booster = Booster::new(2, 0.0);
        let frame = FeatureFrame::from_vector(array![1.0].view());
        assert_eq!(
            booster.predict_frame(&frame).unwrap_err(),
            FittingError::FeatureMismatch {
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn json_round_trip_and_validation() {
        let mut booster = Booster::new(2, 0.25);
        booster.push_tree(tree());
        let json = booster.to_json().unwrap();
        assert_eq!(Booster::from_json(&json).unwrap(), booster);

        let mut narrow = Booster::new(1, 0.0);
        narrow.push_tree(tree());
        let err = Booster::from_json(&narrow.to_json().unwrap()).unwrap_err();
        assert!(matches!(err, MqError::Fitting(FittingError::InvalidModel(_))));
    }
}
