//! Objective (loss) functions for stacked multi-quantile training.
//!
//! # Layout
//!
//! Predictions, targets and levels are flat vectors over stacked rows, block
//! `k` being every original row at level `alphas[k]`. The objective never
//! needs to know the block structure: each row's level is read from the
//! channel exposed by the training container ([`TrainData::taus`]).
//!
//! # Sign Convention
//!
//! [`QuantileLoss::slope`] is the derivative with respect to the residual
//! `target - prediction`. Engines minimise with respect to the prediction, so
//! the gradient handed to them is the negated slope.

mod loss;
mod metric;

pub use loss::{Delta, MAX_DELTA, QuantileLoss};
pub use metric::{MetricValue, QuantileMetric};

use ndarray::{Array1, ArrayView1};

use crate::alpha::Alphas;
use crate::engine::TrainData;
use crate::error::ValidationError;
use crate::names::ObjectiveName;

/// A (gradient, Hessian) pair for one row.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GradsTuple {
    pub grad: f32,
    pub hess: f32,
}

// =============================================================================
// Objective Trait
// =============================================================================

/// Custom objective called by an engine once per boosting round.
///
/// Implementations must be pure: the same inputs always produce the same
/// outputs, and nothing is mutated except `grad_hess`.
pub trait ObjectiveFn: Send + Sync {
    /// Compute per-row gradients and Hessians.
    ///
    /// # Arguments
    ///
    /// * `predictions` - Current raw predictions, one per stacked row
    /// * `dtrain` - Training container (labels and levels)
    /// * `grad_hess` - Output, same length and order as `predictions`
    ///
    /// When the labels, levels or output buffer differ in length from
    /// `predictions`, [`MqObjective`] sets every output entry to NaN. The
    /// native trainer reports that as `FittingError::NonFiniteGradient`.
    fn compute_gradients_into(
        &self,
        predictions: ArrayView1<f32>,
        dtrain: &TrainData,
        grad_hess: &mut [GradsTuple],
    );

    /// Mean loss of `predictions` on a labelled container.
    fn eval_loss(&self, predictions: ArrayView1<f32>, data: &TrainData) -> f64;

    /// Name of the objective (for logging).
    fn name(&self) -> &'static str;
}

// =============================================================================
// MqObjective
// =============================================================================

/// The multi-quantile objective: check or Huber-smoothed check loss, with
/// each row evaluated at its own level.
///
/// # Example
///
/// ```
/// use mqboost::{MqObjective, ObjectiveName, validate_alphas};
///
/// let alphas = validate_alphas(vec![0.1_f32, 0.9]).unwrap();
/// assert!(MqObjective::new(ObjectiveName::Check, alphas.clone(), None).is_ok());
/// assert!(MqObjective::new(ObjectiveName::Huber, alphas.clone(), None).is_err());
/// assert!(MqObjective::new(ObjectiveName::Huber, alphas, Some(0.05)).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct MqObjective {
    loss: QuantileLoss,
    alphas: Alphas,
}

impl MqObjective {
    /// Build the objective.
    ///
    /// `delta` is validated only for [`ObjectiveName::Huber`] and ignored for
    /// [`ObjectiveName::Check`].
    ///
    /// # Errors
    ///
    /// - [`ValidationError::MissingDelta`] if Huber is requested without delta
    /// - the errors of [`Delta::new`] for an invalid delta
    pub fn new(
        objective: ObjectiveName,
        alphas: Alphas,
        delta: Option<f32>,
    ) -> Result<Self, ValidationError> {
        let loss = match objective {
            ObjectiveName::Check => QuantileLoss::Check,
            ObjectiveName::Huber => {
                let delta = delta.ok_or(ValidationError::MissingDelta)?;
                QuantileLoss::Huber(Delta::new(delta)?)
            }
        };
        Ok(Self { loss, alphas })
    }

    pub fn loss(&self) -> QuantileLoss {
        self.loss
    }

    pub fn alphas(&self) -> &Alphas {
        &self.alphas
    }

    pub fn metric(&self) -> QuantileMetric {
        QuantileMetric::new(self.loss)
    }

    /// Gradients and Hessians as two vectors.
    pub fn gradients(
        &self,
        predictions: ArrayView1<f32>,
        dtrain: &TrainData,
    ) -> (Array1<f32>, Array1<f32>) {
        let mut grad_hess = vec![GradsTuple::default(); predictions.len()];
        self.compute_gradients_into(predictions, dtrain, &mut grad_hess);
        let grad = grad_hess.iter().map(|gh| gh.grad).collect();
        let hess = grad_hess.iter().map(|gh| gh.hess).collect();
        (grad, hess)
    }
}

impl ObjectiveFn for MqObjective {
    fn compute_gradients_into(
        &self,
        predictions: ArrayView1<f32>,
        dtrain: &TrainData,
        grad_hess: &mut [GradsTuple],
    ) {
        let targets = dtrain.labels();
        let taus = dtrain.taus();
        let n = predictions.len();
        if targets.len() != n || taus.len() != n || grad_hess.len() != n {
            // Non-finite output makes the trainer reject the round.
            tracing::error!(
                predictions = n,
                labels = targets.len(),
                levels = taus.len(),
                outputs = grad_hess.len(),
                "objective inputs are misaligned"
            );
            grad_hess.fill(GradsTuple {
                grad: f32::NAN,
                hess: f32::NAN,
            });
            return;
        }

        for (gh, ((&pred, &target), &tau)) in grad_hess
            .iter_mut()
            .zip(predictions.iter().zip(targets.iter()).zip(taus.iter()))
        {
            *gh = self.loss.grad_hess(pred, target, tau);
        }
    }

    fn eval_loss(&self, predictions: ArrayView1<f32>, data: &TrainData) -> f64 {
        self.metric().compute(predictions, data.labels(), data.taus())
    }

    fn name(&self) -> &'static str {
        self.loss.name()
    }
}
