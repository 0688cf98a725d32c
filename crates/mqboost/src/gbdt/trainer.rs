//! GBDT training loop.
//!
//! Orchestrates objective calls, tree growth, prediction updates, evaluation
//! and early stopping.

use ndarray::Array1;

use super::callback::{EarlyStopAction, EarlyStopping};
use super::constraints::MonotonicChecker;
use super::grower::TreeGrower;
use super::params::BoosterParams;
use super::tree::Booster;
use crate::engine::{EvalSet, MonotoneConstraints, TrainData};
use crate::error::FittingError;
use crate::logger::TrainingLogger;
use crate::objective::{GradsTuple, MetricValue, ObjectiveFn};
use crate::utils::Parallelism;

fn check_feature_count(expected: usize, got: usize) -> Result<(), FittingError> {
    if expected != got {
        return Err(FittingError::FeatureMismatch { expected, got });
    }
    Ok(())
}

/// Train a booster. The caller sets up the thread pool.
pub(crate) fn train(
    params: &BoosterParams,
    dtrain: &TrainData,
    constraints: &MonotoneConstraints,
    objective: &dyn ObjectiveFn,
    eval_sets: &[EvalSet<'_>],
    parallelism: Parallelism,
) -> Result<Booster, FittingError> {
    let n_rows = dtrain.n_rows();
    if n_rows == 0 {
        return Err(FittingError::EmptyTrainingData);
    }
    let labels = dtrain.labels();
    if labels.len() != n_rows {
        return Err(FittingError::LabelLength {
            expected: n_rows,
            got: labels.len(),
        });
    }

    let features = dtrain.features().features();
    let n_features = features.nrows();
    check_feature_count(n_features, constraints.len())?;
    for es in eval_sets {
        check_feature_count(n_features, es.data.features().n_columns())?;
    }

    let grower = TreeGrower::new(
        params.gain_params(),
        params.learning_rate,
        params.max_depth as usize,
        MonotonicChecker::from_directions(constraints.as_slice(), n_features),
        parallelism,
    );

    let base_score = params.base_score;
    let mut predictions = Array1::from_elem(n_rows, base_score);
    let mut grad_hess = vec![GradsTuple::default(); n_rows];
    let mut booster = Booster::new(n_features, base_score);

    let mut eval_predictions: Vec<Array1<f32>> = eval_sets
        .iter()
        .map(|es| Array1::from_elem(es.data.n_rows(), base_score))
        .collect();

    let mut early_stopping = EarlyStopping::new(if eval_sets.is_empty() {
        0
    } else {
        params.early_stopping_rounds as usize
    });
    let mut best_n_trees: usize = 0;

    let mut logger = TrainingLogger::new(params.verbosity);
    logger.start_training(params.n_rounds as usize);

    for round in 0..params.n_rounds as usize {
        objective.compute_gradients_into(predictions.view(), dtrain, &mut grad_hess);
        if let Some(row) = grad_hess
            .iter()
            .position(|gh| !gh.grad.is_finite() || !gh.hess.is_finite())
        {
            return Err(FittingError::NonFiniteGradient { round, row });
        }

        let tree = grower.grow(features, &grad_hess);
        if tree.n_leaves() == 1 {
            logger.log_stump(round);
        } else {
            logger.log_tree(round, tree.n_leaves(), tree.depth());
        }

        tree.add_predictions(features, predictions.view_mut());
        for (es, preds) in eval_sets.iter().zip(eval_predictions.iter_mut()) {
            tree.add_predictions(es.data.features().features(), preds.view_mut());
        }
        booster.push_tree(tree);

        let round_metrics: Vec<MetricValue> = eval_sets
            .iter()
            .zip(&eval_predictions)
            .map(|(es, preds)| {
                MetricValue::new(
                    format!("{}-{}", es.name, objective.name()),
                    objective.eval_loss(preds.view(), es.data),
                )
            })
            .collect();
        logger.log_metrics(round, &round_metrics);

        if early_stopping.is_enabled() {
            let value = round_metrics.first().map_or(f64::NAN, |m| m.value);
            match early_stopping.update(value) {
                EarlyStopAction::Improved => best_n_trees = booster.n_trees(),
                EarlyStopAction::Stop => {
                    logger.log_early_stopping(round, early_stopping.best_round(), objective.name());
                    break;
                }
                EarlyStopAction::Continue => {}
            }
        }
    }

    logger.finish_training();

    if early_stopping.is_enabled() && best_n_trees > 0 && best_n_trees < booster.n_trees() {
        booster.truncate(best_n_trees);
    }
    Ok(booster)
}
