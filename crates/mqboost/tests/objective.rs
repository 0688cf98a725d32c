//! Objective alignment across engine families.
//!
//! Both families must hand the loss the level of the block each stacked row
//! came from: the side-channel family through its positional level vector,
//! the matrix family through the `_tau` column.

use approx::assert_abs_diff_eq;
use mqboost::data::{FeatureFrame, prepare_training_pair};
use mqboost::engine::TrainData;
use mqboost::{ModelName, MqObjective, ObjectiveFn, ObjectiveName, QuantileLoss, validate_alphas};
use ndarray::{Array1, array};

fn train_data(model: ModelName) -> TrainData {
    let x = FeatureFrame::builder()
        .add_numeric("a", array![0.5, -1.0, 2.0, 3.5].view())
        .add_categorical("b", array![0.0, 1.0, 1.0, 2.0].view())
        .build()
        .unwrap();
    let y = array![1.0, -2.0, 0.5, 4.0];
    let alphas = validate_alphas(vec![0.1_f32, 0.5, 0.95]).unwrap();
    let pair = prepare_training_pair(&x, y.view(), &alphas).unwrap();
    model.build_train_data(pair).unwrap()
}

fn objective(name: ObjectiveName) -> MqObjective {
    let alphas = validate_alphas(vec![0.1_f32, 0.5, 0.95]).unwrap();
    let delta = (name == ObjectiveName::Huber).then_some(0.05);
    MqObjective::new(name, alphas, delta).unwrap()
}

/// Predictions spread around the targets so both residual signs and the
/// Huber band are all hit.
fn predictions(n: usize) -> Array1<f32> {
    Array1::from_shape_fn(n, |i| (i as f32 * 0.37).sin() * 3.0)
}

#[test]
fn each_row_uses_its_block_level() {
    let levels = [0.1_f32, 0.5, 0.95];
    for model in ModelName::ALL {
        for name in ObjectiveName::ALL {
            let dtrain = train_data(model);
            let obj = objective(name);
            let preds = predictions(dtrain.n_rows());
            let (grad, hess) = obj.gradients(preds.view(), &dtrain);

            let labels = dtrain.labels();
            for i in 0..dtrain.n_rows() {
                let tau = levels[i / 4];
                let expected = obj.loss().grad_hess(preds[i], labels[i], tau);
                assert_abs_diff_eq!(grad[i], expected.grad, epsilon = 1e-6);
                assert_abs_diff_eq!(hess[i], expected.hess, epsilon = 1e-6);
            }
        }
    }
}

#[test]
fn families_agree() {
    for name in ObjectiveName::ALL {
        let obj = objective(name);
        let side = train_data(ModelName::Lightgbm);
        let matrix = train_data(ModelName::Xgboost);
        let preds = predictions(side.n_rows());

        let (grad_side, hess_side) = obj.gradients(preds.view(), &side);
        let (grad_matrix, hess_matrix) = obj.gradients(preds.view(), &matrix);
        assert_eq!(grad_side, grad_matrix);
        assert_eq!(hess_side, hess_matrix);
        assert_abs_diff_eq!(
            obj.eval_loss(preds.view(), &side),
            obj.eval_loss(preds.view(), &matrix),
            epsilon = 1e-9
        );
    }
}

#[test]
fn side_channel_is_the_source_of_truth() {
    let obj = objective(ObjectiveName::Check);
    let mut dtrain = train_data(ModelName::Lightgbm);
    let preds = Array1::<f32>::zeros(dtrain.n_rows());
    let (before, _) = obj.gradients(preds.view(), &dtrain);

    // Reverse the levels without touching the `_tau` feature column.
    let reversed: Array1<f32> = dtrain.taus().iter().rev().copied().collect();
    match &mut dtrain {
        TrainData::Lightgbm(aux) => aux.set_taus(reversed).unwrap(),
        TrainData::Xgboost(_) => unreachable!(),
    }
    let (after, _) = obj.gradients(preds.view(), &dtrain);
    assert_ne!(before, after);

    // Row 0 now carries the last block's level.
    let labels = dtrain.labels();
    let expected = obj.loss().grad_hess(0.0, labels[0], 0.95);
    assert_eq!(after[0], expected.grad);
}

#[test]
fn check_gradient_is_negated_slope() {
    let loss = QuantileLoss::Check;
    // under-prediction: target above prediction
    let under = loss.grad_hess(0.0, 1.0, 0.9);
    assert_abs_diff_eq!(under.grad, -0.9, epsilon = 1e-6);
    // over-prediction
    let over = loss.grad_hess(1.0, 0.0, 0.9);
    assert_abs_diff_eq!(over.grad, 0.1, epsilon = 1e-6);
    assert_eq!(under.hess, 1.0);
}
