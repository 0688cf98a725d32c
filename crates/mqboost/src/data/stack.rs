//! Quantile stacking and unstacking.
//!
//! A model predicting K quantiles is trained on K copies of the data. Block
//! `k` holds every original row, in input order, with an extra `_tau` column
//! set to `alphas[k]`:
//!
//! ```text
//! rows [0, N)       -> copy of x, _tau = alphas[0]
//! rows [N, 2N)      -> copy of x, _tau = alphas[1]
//! ...
//! rows [(K-1)N, KN) -> copy of x, _tau = alphas[K-1]
//! ```
//!
//! Targets are replicated with the same block order, so row `i` of block `k`
//! of the features always lines up with row `i` of copy `k` of the targets.
//! The objective relies on that alignment to pick each row's quantile level.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, s};

use super::frame::FeatureFrame;
use super::schema::FeatureMeta;
use crate::alpha::Alphas;
use crate::error::ValidationError;

/// Name of the appended quantile-level column. Reserved in user frames.
pub const TAU_COLUMN: &str = "_tau";

// =============================================================================
// StackedFeatures
// =============================================================================

/// A feature frame replicated once per quantile level, with a `_tau` column.
///
/// Shape: `(N * K)` rows, `(C + 1)` columns, `_tau` last.
#[derive(Debug, Clone)]
pub struct StackedFeatures {
    frame: FeatureFrame,
    alphas: Alphas,
    n_rows: usize,
    tau_index: usize,
}

impl StackedFeatures {
    /// The stacked frame, `_tau` included.
    pub fn frame(&self) -> &FeatureFrame {
        &self.frame
    }

    pub fn into_frame(self) -> FeatureFrame {
        self.frame
    }

    pub fn alphas(&self) -> &Alphas {
        &self.alphas
    }

    /// Number of blocks (K).
    pub fn n_blocks(&self) -> usize {
        self.alphas.len()
    }

    /// Rows per block (N).
    pub fn n_original_rows(&self) -> usize {
        self.n_rows
    }

    /// Column index of `_tau`.
    pub fn tau_index(&self) -> usize {
        self.tau_index
    }

    /// The `_tau` column over all stacked rows.
    pub fn taus(&self) -> ArrayView1<'_, f32> {
        self.frame.column_at(self.tau_index)
    }

    /// Rows of block `k` without `_tau`: equal to the original input frame.
    ///
    /// # Panics
    ///
    /// If `k >= n_blocks()`.
    pub fn block(&self, k: usize) -> FeatureFrame {
        assert!(k < self.n_blocks(), "block {k} out of range");
        let start = k * self.n_rows;
        self.frame
            .slice_rows(start..start + self.n_rows)
            .drop_column(self.tau_index)
    }
}

// =============================================================================
// TrainingPair
// =============================================================================

/// Stacked features and stacked targets with matching block order.
#[derive(Debug, Clone)]
pub struct TrainingPair {
    pub features: StackedFeatures,
    pub targets: Array1<f32>,
}

impl TrainingPair {
    /// Targets of block `k`: equal to the original target vector.
    ///
    /// # Panics
    ///
    /// If `k >= features.n_blocks()`.
    pub fn target_block(&self, k: usize) -> ArrayView1<'_, f32> {
        assert!(k < self.features.n_blocks(), "block {k} out of range");
        let n = self.features.n_original_rows();
        self.targets.slice(s![k * n..(k + 1) * n])
    }
}

// =============================================================================
// Stacking
// =============================================================================

/// Build the stacked feature matrix used for training and prediction.
///
/// # Errors
///
/// [`ValidationError::ReservedColumn`] if `x` already has a `_tau` column.
/// Alphas are assumed validated (see [`validate_alphas`](crate::validate_alphas)).
pub fn prepare_features(
    x: &FeatureFrame,
    alphas: &Alphas,
) -> Result<StackedFeatures, ValidationError> {
    if x.schema().contains(TAU_COLUMN) {
        return Err(ValidationError::ReservedColumn);
    }

    let n_rows = x.n_rows();
    let n_columns = x.n_columns();
    let n_blocks = alphas.len();

    let mut stacked = Array2::<f32>::zeros((n_columns + 1, n_rows * n_blocks));
    let source = x.features();
    for (k, &alpha) in alphas.iter().enumerate() {
        let rows = k * n_rows..(k + 1) * n_rows;
        stacked
            .slice_mut(s![..n_columns, rows.clone()])
            .assign(&source);
        stacked.slice_mut(s![n_columns, rows]).fill(alpha);
    }

    let schema = x
        .schema()
        .with_appended(FeatureMeta::numeric_named(TAU_COLUMN))
        .map_err(ValidationError::DuplicateColumn)?;

    tracing::debug!(n_rows, n_columns, n_blocks, "stacked features");

    Ok(StackedFeatures {
        frame: FeatureFrame::from_parts(stacked, schema),
        alphas: alphas.clone(),
        n_rows,
        tau_index: n_columns,
    })
}

/// Replicate `y` once per quantile level, in alpha order.
pub fn prepare_targets(y: ArrayView1<f32>, alphas: &Alphas) -> Array1<f32> {
    let n = y.len();
    let mut stacked = Array1::<f32>::zeros(n * alphas.len());
    for k in 0..alphas.len() {
        stacked.slice_mut(s![k * n..(k + 1) * n]).assign(&y);
    }
    stacked
}

/// Build stacked features and targets for training.
///
/// # Errors
///
/// - [`ValidationError::ShapeMismatch`] if `y` and `x` disagree on row count
/// - [`ValidationError::ReservedColumn`] if `x` has a `_tau` column
pub fn prepare_training_pair(
    x: &FeatureFrame,
    y: ArrayView1<f32>,
    alphas: &Alphas,
) -> Result<TrainingPair, ValidationError> {
    if y.len() != x.n_rows() {
        return Err(ValidationError::ShapeMismatch {
            field: "targets",
            expected: x.n_rows(),
            got: y.len(),
        });
    }
    let features = prepare_features(x, alphas)?;
    let targets = prepare_targets(y, alphas);
    Ok(TrainingPair { features, targets })
}

// =============================================================================
// Unstacking
// =============================================================================

/// Reshape flat stacked predictions into `(n_quantiles, n_rows)`.
///
/// Row `k` of the result holds the predictions for `alphas[k]`.
pub fn unstack_predictions(
    raw: ArrayView1<f32>,
    n_quantiles: usize,
) -> Result<Array2<f32>, ValidationError> {
    let len = raw.len();
    if n_quantiles == 0 || len % n_quantiles != 0 {
        return Err(ValidationError::RaggedPredictions { len, n_quantiles });
    }
    let n_rows = len / n_quantiles;
    Array2::from_shape_vec((n_quantiles, n_rows), raw.to_vec())
        .map_err(|_| ValidationError::RaggedPredictions { len, n_quantiles })
}

/// Count quantile crossings in a `(n_quantiles, n_rows)` prediction matrix.
///
/// A crossing is a row where the prediction for level `k + 1` is strictly
/// below the prediction for level `k`.
pub fn count_crossings(predictions: ArrayView2<f32>) -> usize {
    predictions
        .rows()
        .into_iter()
        .zip(predictions.rows().into_iter().skip(1))
        .map(|(lower, upper)| {
            lower
                .iter()
                .zip(upper.iter())
                .filter(|(lo, hi)| hi < lo)
                .count()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alpha::validate_alphas;
    use ndarray::array;

    fn frame() -> FeatureFrame {
        FeatureFrame::builder()
            .add_numeric("x1", array![1.0, 2.0, 3.0].view())
            .add_categorical("x2", array![0.0, 1.0, 0.0].view())
            .build()
            .unwrap()
    }

    #[test]
    fn stacked_shape_and_tau_blocks() {
        let alphas = validate_alphas(vec![0.1_f32, 0.5, 0.9]).unwrap();
        let stacked = prepare_features(&frame(), &alphas).unwrap();

        assert_eq!(stacked.frame().n_rows(), 9);
        assert_eq!(stacked.frame().n_columns(), 3);
        assert_eq!(stacked.tau_index(), 2);

        let taus = stacked.frame().column(TAU_COLUMN).unwrap();
        for (k, &alpha) in alphas.iter().enumerate() {
            assert!(taus.slice(s![k * 3..(k + 1) * 3]).iter().all(|&t| t == alpha));
        }
    }

    #[test]
    fn schema_carries_types_and_tau() {
        let alphas = validate_alphas(vec![0.5_f32]).unwrap();
        let stacked = prepare_features(&frame(), &alphas).unwrap();
        let schema = stacked.frame().schema();
        assert!(schema.feature_type(1).is_categorical());
        assert!(!schema.feature_type(2).is_categorical());
        assert_eq!(schema.index_of(TAU_COLUMN), Some(2));
    }

    #[test]
    fn reserved_column_is_rejected() {
        let x = FeatureFrame::builder()
            .add_numeric("_tau", array![1.0].view())
            .build()
            .unwrap();
        let alphas = validate_alphas(0.5_f32).unwrap();
        assert_eq!(
            prepare_features(&x, &alphas).unwrap_err(),
            ValidationError::ReservedColumn
        );
    }

    #[test]
    fn targets_repeat_in_block_order() {
        let alphas = validate_alphas(vec![0.2_f32, 0.8]).unwrap();
        let y = array![5.0, 6.0, 7.0];
        assert_eq!(
            prepare_targets(y.view(), &alphas).to_vec(),
            vec![5.0, 6.0, 7.0, 5.0, 6.0, 7.0]
        );
    }

    #[test]
    fn training_pair_rejects_length_mismatch() {
        let alphas = validate_alphas(vec![0.5_f32]).unwrap();
        let err = prepare_training_pair(&frame(), array![1.0, 2.0].view(), &alphas).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ShapeMismatch {
                field: "targets",
                expected: 3,
                got: 2
            }
        );
    }

    #[test]
    fn blocks_recover_inputs() {
        let x = frame();
        let y = array![5.0, 6.0, 7.0];
        let alphas = validate_alphas(vec![0.25_f32, 0.75]).unwrap();
        let pair = prepare_training_pair(&x, y.view(), &alphas).unwrap();

        for k in 0..alphas.len() {
            assert_eq!(pair.features.block(k), x);
            assert_eq!(pair.target_block(k), y.view());
        }
    }

    #[test]
    #[should_panic(expected = "block 2 out of range")]
    fn target_block_past_the_end_panics() {
        let alphas = validate_alphas(vec![0.25_f32, 0.75]).unwrap();
        let pair = prepare_training_pair(&frame(), array![5.0, 6.0, 7.0].view(), &alphas).unwrap();
        let _ = pair.target_block(2);
    }

    #[test]
    fn unstack_reshapes_by_quantile() {
        let raw = array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let preds = unstack_predictions(raw.view(), 2).unwrap();
        assert_eq!(preds, array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);

        assert_eq!(
            unstack_predictions(raw.view(), 4).unwrap_err(),
            ValidationError::RaggedPredictions {
                len: 6,
                n_quantiles: 4
            }
        );
    }

    #[test]
    fn crossings_are_counted() {
        let ordered = array![[1.0, 2.0], [1.5, 2.0], [3.0, 2.5]];
        assert_eq!(count_crossings(ordered.view()), 0);

        let crossed = array![[1.0, 2.0], [0.5, 2.0], [3.0, 1.0]];
        assert_eq!(count_crossings(crossed.view()), 2);
    }
}
