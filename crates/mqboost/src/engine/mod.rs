//! Boosting engine seam.
//!
//! An engine trains a model from a family-shaped training container, a
//! monotone-constraint vector and a custom objective. The trained model
//! predicts one raw value per stacked row.
//!
//! The crate ships [`GbdtEngine`](crate::gbdt::GbdtEngine); other bindings
//! plug in by implementing [`Engine`] and [`Predictor`].

mod container;
mod family;

pub use container::{AuxDataset, MonotoneConstraints, PredictData, TauMatrix, TrainData};

use ndarray::Array1;

use crate::error::FittingError;
use crate::objective::ObjectiveFn;

/// A named labelled set scored after every boosting round.
#[derive(Debug, Clone, Copy)]
pub struct EvalSet<'a> {
    pub name: &'a str,
    pub data: &'a TrainData,
}

impl<'a> EvalSet<'a> {
    pub fn new(name: &'a str, data: &'a TrainData) -> Self {
        Self { name, data }
    }
}

/// A trained model.
pub trait Predictor {
    /// Raw predictions, one per row of `data`, in row order.
    fn predict(&self, data: &PredictData) -> Result<Array1<f32>, FittingError>;
}

/// A boosting engine.
pub trait Engine {
    type Model: Predictor;

    /// Train a model.
    ///
    /// The engine calls `objective` once per round with its current
    /// predictions on `dtrain`, and honours `constraints` (one entry per
    /// column of `dtrain`).
    fn train(
        &self,
        dtrain: &TrainData,
        constraints: &MonotoneConstraints,
        objective: &dyn ObjectiveFn,
        eval_sets: &[EvalSet<'_>],
    ) -> Result<Self::Model, FittingError>;
}
