//! Stacked training dataset with its bookkeeping.

use ndarray::ArrayView1;

use super::frame::FeatureFrame;
use super::stack::prepare_training_pair;
use crate::alpha::Alphas;
use crate::engine::{MonotoneConstraints, TrainData};
use crate::error::ValidationError;
use crate::names::ModelName;

/// A training set stacked for one engine family.
///
/// Holds the family-shaped container, the monotone-constraint vector that goes
/// with it, and enough bookkeeping to interpret predictions later.
///
/// # Example
///
/// ```
/// use mqboost::data::{FeatureFrame, MqDataset};
/// use mqboost::{ModelName, validate_alphas};
/// use ndarray::array;
///
/// let x = FeatureFrame::from_vector(array![1.0, 2.0, 3.0].view());
/// let y = array![1.0, 2.0, 3.0];
/// let alphas = validate_alphas(vec![0.1_f32, 0.9]).unwrap();
///
/// let dataset = MqDataset::new(&x, y.view(), &alphas, ModelName::Lightgbm).unwrap();
/// assert_eq!(dataset.n_stacked_rows(), 6);
/// assert_eq!(dataset.constraints().as_slice(), &[0, 1]);
/// ```
#[derive(Debug, Clone)]
pub struct MqDataset {
    dtrain: TrainData,
    constraints: MonotoneConstraints,
    alphas: Alphas,
    n_rows: usize,
    columns: Vec<Option<String>>,
}

impl MqDataset {
    /// Stack `x`/`y` at every level and wrap them for `model`.
    ///
    /// # Errors
    ///
    /// Shape mismatch between `x` and `y`, or a reserved `_tau` column in `x`.
    pub fn new(
        x: &FeatureFrame,
        y: ArrayView1<f32>,
        alphas: &Alphas,
        model: ModelName,
    ) -> Result<Self, ValidationError> {
        let pair = prepare_training_pair(x, y, alphas)?;
        let constraints = model.build_constraints(&pair.features);
        let columns = pair
            .features
            .frame()
            .schema()
            .iter()
            .map(|m| m.name.clone())
            .collect();
        let dtrain = model.build_train_data(pair)?;

        Ok(Self {
            dtrain,
            constraints,
            alphas: alphas.clone(),
            n_rows: x.n_rows(),
            columns,
        })
    }

    pub fn dtrain(&self) -> &TrainData {
        &self.dtrain
    }

    pub fn constraints(&self) -> &MonotoneConstraints {
        &self.constraints
    }

    pub fn alphas(&self) -> &Alphas {
        &self.alphas
    }

    pub fn model(&self) -> ModelName {
        self.dtrain.model_name()
    }

    /// Rows of the unstacked input (N).
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Rows of the stacked container (N * K).
    pub fn n_stacked_rows(&self) -> usize {
        self.dtrain.n_rows()
    }

    /// Stacked column names, `_tau` last. Unnamed columns are `None`.
    pub fn columns(&self) -> &[Option<String>] {
        &self.columns
    }
}
