//! Engine-facing containers.
//!
//! Each engine family consumes stacked data in its own shape:
//!
//! | family   | training                     | prediction              |
//! |----------|------------------------------|-------------------------|
//! | lightgbm | [`AuxDataset`] (τ side channel) | stacked [`FeatureFrame`] |
//! | xgboost  | [`TauMatrix`] (τ from `_tau`)   | [`TauMatrix`], no labels |

use ndarray::{Array1, ArrayView1};

use crate::data::FeatureFrame;
use crate::error::ValidationError;
use crate::names::ModelName;

fn check_len(field: &'static str, expected: usize, got: usize) -> Result<(), ValidationError> {
    if expected != got {
        return Err(ValidationError::ShapeMismatch {
            field,
            expected,
            got,
        });
    }
    Ok(())
}

// =============================================================================
// AuxDataset
// =============================================================================

/// Stacked training set with a positional side channel of quantile levels.
///
/// Row `i` of the side channel is the level of stacked row `i`. The objective
/// reads levels from here and never looks at the `_tau` feature.
#[derive(Debug, Clone)]
pub struct AuxDataset {
    features: FeatureFrame,
    labels: Array1<f32>,
    taus: Array1<f32>,
}

impl AuxDataset {
    /// # Errors
    ///
    /// [`ValidationError::ShapeMismatch`] if labels or levels do not have one
    /// entry per row.
    pub fn new(
        features: FeatureFrame,
        labels: Array1<f32>,
        taus: Array1<f32>,
    ) -> Result<Self, ValidationError> {
        check_len("labels", features.n_rows(), labels.len())?;
        check_len("taus", features.n_rows(), taus.len())?;
        Ok(Self {
            features,
            labels,
            taus,
        })
    }

    pub fn features(&self) -> &FeatureFrame {
        &self.features
    }

    pub fn labels(&self) -> ArrayView1<'_, f32> {
        self.labels.view()
    }

    /// The side channel.
    pub fn taus(&self) -> ArrayView1<'_, f32> {
        self.taus.view()
    }

    /// Replace the side channel.
    pub fn set_taus(&mut self, taus: Array1<f32>) -> Result<(), ValidationError> {
        check_len("taus", self.features.n_rows(), taus.len())?;
        self.taus = taus;
        Ok(())
    }
}

// =============================================================================
// TauMatrix
// =============================================================================

/// Stacked matrix whose quantile levels live in its own `_tau` column.
#[derive(Debug, Clone)]
pub struct TauMatrix {
    features: FeatureFrame,
    labels: Option<Array1<f32>>,
    tau_index: usize,
}

impl TauMatrix {
    /// # Errors
    ///
    /// [`ValidationError::ShapeMismatch`] if `tau_index` is not a column of
    /// `features` or labels do not have one entry per row.
    pub fn new(
        features: FeatureFrame,
        labels: Option<Array1<f32>>,
        tau_index: usize,
    ) -> Result<Self, ValidationError> {
        if tau_index >= features.n_columns() {
            return Err(ValidationError::ShapeMismatch {
                field: "tau_index",
                expected: features.n_columns(),
                got: tau_index,
            });
        }
        if let Some(labels) = &labels {
            check_len("labels", features.n_rows(), labels.len())?;
        }
        Ok(Self {
            features,
            labels,
            tau_index,
        })
    }

    pub fn features(&self) -> &FeatureFrame {
        &self.features
    }

    pub fn labels(&self) -> Option<ArrayView1<'_, f32>> {
        self.labels.as_ref().map(|l| l.view())
    }

    pub fn tau_index(&self) -> usize {
        self.tau_index
    }

    /// Levels read back from the `_tau` column.
    pub fn taus(&self) -> ArrayView1<'_, f32> {
        self.features.column_at(self.tau_index)
    }
}

// =============================================================================
// TrainData / PredictData
// =============================================================================

/// Training container handed to an engine and to the objective.
#[derive(Debug, Clone)]
pub enum TrainData {
    Lightgbm(AuxDataset),
    Xgboost(TauMatrix),
}

impl TrainData {
    pub fn model_name(&self) -> ModelName {
        match self {
            Self::Lightgbm(_) => ModelName::Lightgbm,
            Self::Xgboost(_) => ModelName::Xgboost,
        }
    }

    pub fn features(&self) -> &FeatureFrame {
        match self {
            Self::Lightgbm(d) => d.features(),
            Self::Xgboost(m) => m.features(),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.features().n_rows()
    }

    /// Labels; empty for an unlabelled matrix.
    pub fn labels(&self) -> ArrayView1<'_, f32> {
        match self {
            Self::Lightgbm(d) => d.labels(),
            Self::Xgboost(m) => m.labels().unwrap_or_else(|| ArrayView1::from(&[] as &[f32])),
        }
    }

    /// Per-row quantile levels from the family's channel.
    pub fn taus(&self) -> ArrayView1<'_, f32> {
        match self {
            Self::Lightgbm(d) => d.taus(),
            Self::Xgboost(m) => m.taus(),
        }
    }
}

/// Prediction container handed to a trained model.
#[derive(Debug, Clone)]
pub enum PredictData {
    Lightgbm(FeatureFrame),
    Xgboost(TauMatrix),
}

impl PredictData {
    pub fn features(&self) -> &FeatureFrame {
        match self {
            Self::Lightgbm(frame) => frame,
            Self::Xgboost(m) => m.features(),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.features().n_rows()
    }
}

// =============================================================================
// MonotoneConstraints
// =============================================================================

/// Per-column monotone direction: `1` increasing, `0` free, `-1` decreasing.
///
/// Family A takes a growable list, family B a fixed-size tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonotoneConstraints {
    Mutable(Vec<i8>),
    Fixed(Box<[i8]>),
}

impl MonotoneConstraints {
    pub fn as_slice(&self) -> &[i8] {
        match self {
            Self::Mutable(v) => v,
            Self::Fixed(b) => b,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn frame() -> FeatureFrame {
        FeatureFrame::builder()
            .add_numeric("x", array![1.0, 2.0].view())
            .add_numeric("_tau", array![0.3, 0.3].view())
            .build()
            .unwrap()
    }

    #[test]
    fn aux_dataset_checks_lengths() {
        let err = AuxDataset::new(frame(), array![1.0], array![0.3, 0.3]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ShapeMismatch {
                field: "labels",
                expected: 2,
                got: 1
            }
        );

        let mut data = AuxDataset::new(frame(), array![1.0, 2.0], array![0.3, 0.3]).unwrap();
        assert!(data.set_taus(array![0.1]).is_err());
        data.set_taus(array![0.1, 0.2]).unwrap();
        assert_eq!(data.taus().to_vec(), vec![0.1, 0.2]);
    }

    #[test]
    fn tau_matrix_reads_tau_column() {
        let m = TauMatrix::new(frame(), None, 1).unwrap();
        assert_eq!(m.taus().to_vec(), vec![0.3, 0.3]);
        assert!(m.labels().is_none());
        assert!(TauMatrix::new(frame(), None, 2).is_err());
        assert_eq!(TrainData::Xgboost(m).labels().len(), 0);
    }

    #[test]
    fn constraint_forms() {
        let mutable = MonotoneConstraints::Mutable(vec![0, 1]);
        let fixed = MonotoneConstraints::Fixed(vec![0, 1].into_boxed_slice());
        assert_eq!(mutable.as_slice(), fixed.as_slice());
        assert_ne!(mutable, fixed);
        assert_eq!(fixed.len(), 2);
    }
}
