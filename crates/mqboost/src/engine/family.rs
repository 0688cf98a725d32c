//! Per-family capabilities, selected once from a [`ModelName`].

use std::iter;

use ndarray::Array1;

use super::container::{AuxDataset, MonotoneConstraints, PredictData, TauMatrix, TrainData};
use crate::data::{StackedFeatures, TrainingPair};
use crate::error::ValidationError;
use crate::names::ModelName;

impl ModelName {
    /// Wrap a stacked training pair in this family's training container.
    ///
    /// For [`ModelName::Lightgbm`] the level side channel is rebuilt from the
    /// alphas in block order, one entry per stacked row.
    pub fn build_train_data(self, pair: TrainingPair) -> Result<TrainData, ValidationError> {
        let TrainingPair { features, targets } = pair;
        match self {
            Self::Lightgbm => {
                let taus = repeat_levels(&features);
                let data = AuxDataset::new(features.into_frame(), targets, taus)?;
                Ok(TrainData::Lightgbm(data))
            }
            Self::Xgboost => {
                let tau_index = features.tau_index();
                let matrix = TauMatrix::new(features.into_frame(), Some(targets), tau_index)?;
                Ok(TrainData::Xgboost(matrix))
            }
        }
    }

    /// Wrap stacked prediction features in this family's prediction container.
    pub fn build_predict_data(
        self,
        features: StackedFeatures,
    ) -> Result<PredictData, ValidationError> {
        match self {
            Self::Lightgbm => Ok(PredictData::Lightgbm(features.into_frame())),
            Self::Xgboost => {
                let tau_index = features.tau_index();
                let matrix = TauMatrix::new(features.into_frame(), None, tau_index)?;
                Ok(PredictData::Xgboost(matrix))
            }
        }
    }

    /// Monotone constraints over the stacked columns: increasing in `_tau`,
    /// free everywhere else.
    pub fn build_constraints(self, features: &StackedFeatures) -> MonotoneConstraints {
        let mut directions = vec![0_i8; features.frame().n_columns()];
        directions[features.tau_index()] = 1;
        match self {
            Self::Lightgbm => MonotoneConstraints::Mutable(directions),
            Self::Xgboost => MonotoneConstraints::Fixed(directions.into_boxed_slice()),
        }
    }
}

fn repeat_levels(features: &StackedFeatures) -> Array1<f32> {
    let n = features.n_original_rows();
    features
        .alphas()
        .iter()
        .flat_map(|&alpha| iter::repeat_n(alpha, n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alpha::validate_alphas;
    use crate::data::{FeatureFrame, prepare_features, prepare_training_pair};
    use ndarray::array;

    fn pair() -> TrainingPair {
        let x = FeatureFrame::builder()
            .add_numeric("a", array![1.0, 2.0, 3.0].view())
            .add_numeric("b", array![4.0, 5.0, 6.0].view())
            .build()
            .unwrap();
        let alphas = validate_alphas(vec![0.1_f32, 0.9]).unwrap();
        prepare_training_pair(&x, array![1.0, 2.0, 3.0].view(), &alphas).unwrap()
    }

    #[test]
    fn both_families_expose_the_same_levels() {
        let lgb = ModelName::Lightgbm.build_train_data(pair()).unwrap();
        let xgb = ModelName::Xgboost.build_train_data(pair()).unwrap();
        assert!(matches!(lgb, TrainData::Lightgbm(_)));
        assert!(matches!(xgb, TrainData::Xgboost(_)));
        assert_eq!(lgb.taus(), xgb.taus());
        assert_eq!(lgb.taus().to_vec(), vec![0.1, 0.1, 0.1, 0.9, 0.9, 0.9]);
        assert_eq!(lgb.labels(), xgb.labels());
    }

    #[test]
    fn constraints_mark_only_tau() {
        let stacked = pair().features;
        let lgb = ModelName::Lightgbm.build_constraints(&stacked);
        let xgb = ModelName::Xgboost.build_constraints(&stacked);

        assert!(matches!(lgb, MonotoneConstraints::Mutable(_)));
        assert!(matches!(xgb, MonotoneConstraints::Fixed(_)));
        assert_eq!(lgb.as_slice(), &[0, 0, 1]);
        assert_eq!(xgb.as_slice(), &[0, 0, 1]);
    }

    #[test]
    fn predict_containers_keep_tau_column() {
        let x = FeatureFrame::from_vector(array![1.0, 2.0].view());
        let alphas = validate_alphas(vec![0.3_f32, 0.6]).unwrap();

        let stacked = prepare_features(&x, &alphas).unwrap();
        let lgb = ModelName::Lightgbm.build_predict_data(stacked.clone()).unwrap();
        let xgb = ModelName::Xgboost.build_predict_data(stacked).unwrap();

        assert_eq!(lgb.n_rows(), 4);
        assert_eq!(lgb.features(), xgb.features());
        match xgb {
            PredictData::Xgboost(m) => {
                assert!(m.labels().is_none());
                assert_eq!(m.taus().to_vec(), vec![0.3, 0.3, 0.6, 0.6]);
            }
            PredictData::Lightgbm(_) => panic!("expected a tau matrix"),
        }
    }
}
