//! Native gradient boosted decision trees.
//!
//! A second-order booster with exact greedy, depth-wise split search and
//! monotone-constraint enforcement. Categorical codes are split as ordinal
//! values. Missing values (NaN) always go to the right child.

mod callback;
mod constraints;
mod grower;
mod params;
mod trainer;
mod tree;

pub use callback::{EarlyStopAction, EarlyStopping};
pub use constraints::{MonotonicBounds, MonotonicChecker, MonotonicConstraint};
pub use params::BoosterParams;
pub use tree::{Booster, Node, Tree};

use crate::engine::{Engine, EvalSet, MonotoneConstraints, TrainData};
use crate::error::{FittingError, ValidationError};
use crate::objective::ObjectiveFn;
use crate::utils::run_with_threads;

/// The built-in [`Engine`].
///
/// # Example
///
/// ```
/// use mqboost::gbdt::{BoosterParams, GbdtEngine};
///
/// let engine = GbdtEngine::new(BoosterParams { n_rounds: 10, ..Default::default() }).unwrap();
/// assert_eq!(engine.params().n_rounds, 10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GbdtEngine {
    params: BoosterParams,
}

impl GbdtEngine {
    /// # Errors
    ///
    /// [`ValidationError::InvalidParam`] for out-of-domain parameters.
    pub fn new(params: BoosterParams) -> Result<Self, ValidationError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &BoosterParams {
        &self.params
    }
}

impl Engine for GbdtEngine {
    type Model = Booster;

    fn train(
        &self,
        dtrain: &TrainData,
        constraints: &MonotoneConstraints,
        objective: &dyn ObjectiveFn,
        eval_sets: &[EvalSet<'_>],
    ) -> Result<Booster, FittingError> {
        run_with_threads(self.params.n_threads, |parallelism| {
            trainer::train(
                &self.params,
                dtrain,
                constraints,
                objective,
                eval_sets,
                parallelism,
            )
        })?
    }
}
