//! Depth-wise tree growth with exact greedy split search.

use ndarray::ArrayView2;

use super::constraints::{MonotonicBounds, MonotonicChecker};
use super::params::GainParams;
use super::tree::{Node, Tree};
use crate::objective::GradsTuple;
use crate::utils::Parallelism;

/// Best split found for one node.
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f32,
    gain: f64,
    weight_left: f32,
    weight_right: f32,
}

/// Grows one tree per call from per-row gradients.
pub(crate) struct TreeGrower {
    gain: GainParams,
    learning_rate: f32,
    max_depth: usize,
    checker: MonotonicChecker,
    parallelism: Parallelism,
}

impl TreeGrower {
    pub fn new(
        gain: GainParams,
        learning_rate: f32,
        max_depth: usize,
        checker: MonotonicChecker,
        parallelism: Parallelism,
    ) -> Self {
        Self {
            gain,
            learning_rate,
            max_depth,
            checker,
            parallelism,
        }
    }

    /// Grow a tree over all columns of the feature-major `features`.
    ///
    /// Leaf values already include the learning rate.
    pub fn grow(&self, features: ArrayView2<f32>, grad_hess: &[GradsTuple]) -> Tree {
        debug_assert_eq!(features.ncols(), grad_hess.len());
        let rows: Vec<usize> = (0..grad_hess.len()).collect();
        let mut nodes = Vec::new();
        self.build_node(
            features,
            grad_hess,
            rows,
            0,
            MonotonicBounds::unbounded(),
            &mut nodes,
        );
        Tree::new(nodes)
    }

    fn build_node(
        &self,
        features: ArrayView2<f32>,
        grad_hess: &[GradsTuple],
        rows: Vec<usize>,
        depth: usize,
        bounds: MonotonicBounds,
        nodes: &mut Vec<Node>,
    ) -> usize {
        let id = nodes.len();
        nodes.push(Node::Leaf { value: 0.0 });

        let (grad_sum, hess_sum) = sum_rows(grad_hess, &rows);

        if depth < self.max_depth && rows.len() >= 2 {
            if let Some(split) =
                self.find_split(features, grad_hess, &rows, grad_sum, hess_sum, &bounds)
            {
                let column = features.row(split.feature);
                let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
                    .into_iter()
                    .partition(|&r| column[r] < split.threshold);

                let constraint = self.checker.get(split.feature);
                let mid = 0.5 * (split.weight_left + split.weight_right);
                let (left_bounds, right_bounds) = bounds.child_bounds(constraint, mid);

                let child = depth + 1;
                let left =
                    self.build_node(features, grad_hess, left_rows, child, left_bounds, nodes);
                let right =
                    self.build_node(features, grad_hess, right_rows, child, right_bounds, nodes);

                nodes[id] = Node::Split {
                    feature: split.feature,
                    threshold: split.threshold,
                    left,
                    right,
                };
                return id;
            }
        }

        let weight = bounds.clamp(self.gain.compute_leaf_weight(grad_sum, hess_sum));
        nodes[id] = Node::Leaf {
            value: weight * self.learning_rate,
        };
        id
    }

    /// Best split over all features; ties keep the lowest feature index.
    fn find_split(
        &self,
        features: ArrayView2<f32>,
        grad_hess: &[GradsTuple],
        rows: &[usize],
        grad_sum: f64,
        hess_sum: f64,
        bounds: &MonotonicBounds,
    ) -> Option<SplitCandidate> {
        let per_feature = self.parallelism.maybe_par_map(0..features.nrows(), |feature| {
            self.best_split_for_feature(
                features, grad_hess, rows, feature, grad_sum, hess_sum, bounds,
            )
        });

        per_feature
            .into_iter()
            .flatten()
            .fold(None, |best: Option<SplitCandidate>, cand| match best {
                Some(b) if b.gain >= cand.gain => Some(b),
                _ => Some(cand),
            })
    }

    #[allow(clippy::too_many_arguments)]
    fn best_split_for_feature(
        &self,
        features: ArrayView2<f32>,
        grad_hess: &[GradsTuple],
        rows: &[usize],
        feature: usize,
        grad_sum: f64,
        hess_sum: f64,
        bounds: &MonotonicBounds,
    ) -> Option<SplitCandidate> {
        let column = features.row(feature);

        // Missing values always go right, so they never enter the left prefix.
        let mut sorted: Vec<(f32, f64, f64)> = rows
            .iter()
            .filter(|&&r| !column[r].is_nan())
            .map(|&r| (column[r], grad_hess[r].grad as f64, grad_hess[r].hess as f64))
            .collect();
        if sorted.len() < 2 {
            return None;
        }
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut best: Option<SplitCandidate> = None;
        let mut grad_left = 0.0f64;
        let mut hess_left = 0.0f64;

        for i in 0..sorted.len() - 1 {
            let (value, g, h) = sorted[i];
            grad_left += g;
            hess_left += h;

            let next = sorted[i + 1].0;
            if next <= value {
                continue;
            }

            let grad_right = grad_sum - grad_left;
            let hess_right = hess_sum - hess_left;
            if !self.gain.is_valid_split(hess_left, hess_right) {
                continue;
            }

            let gain = self.gain.compute_gain(
                grad_left, hess_left, grad_right, hess_right, grad_sum, hess_sum,
            );
            if gain <= 0.0 || best.is_some_and(|b| b.gain >= gain) {
                continue;
            }

            let (weight_left, weight_right, is_valid) = self.checker.check(
                feature,
                self.gain.compute_leaf_weight(grad_left, hess_left),
                self.gain.compute_leaf_weight(grad_right, hess_right),
                bounds,
            );
            if !is_valid {
                continue;
            }

            best = Some(SplitCandidate {
                feature,
                threshold: midpoint(value, next),
                gain,
                weight_left,
                weight_right,
            });
        }

        best
    }
}

fn sum_rows(grad_hess: &[GradsTuple], rows: &[usize]) -> (f64, f64) {
    rows.iter().fold((0.0, 0.0), |(g, h), &r| {
        (g + grad_hess[r].grad as f64, h + grad_hess[r].hess as f64)
    })
}

/// Threshold `t` with `low < t <= high`, so `low` goes left and `high` right.
fn midpoint(low: f32, high: f32) -> f32 {
    let mid = 0.5 * low + 0.5 * high;
    if mid > low && mid <= high { mid } else { high }
}
