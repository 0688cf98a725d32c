//! mqboost: multi-quantile regression with gradient boosted trees.
//!
//! A single model is trained for several quantile levels at once by *data
//! stacking*: the feature matrix is replicated once per level, each copy is
//! tagged with a `_tau` column holding its level, and the targets are tiled to
//! match. One objective then evaluates a quantile loss whose level varies per
//! row. Constraining the model to be non-decreasing in `_tau` keeps the
//! predicted quantiles from crossing.
//!
//! # Modules
//!
//! - [`alpha`]: quantile-level validation
//! - [`data`]: feature frames, stacking/unstacking, the training bundle
//! - [`objective`]: check and Huber quantile losses, the stacked objective
//! - [`engine`]: engine families, their containers, the [`Engine`] seam
//! - [`gbdt`]: the built-in gradient boosted tree engine
//! - [`regressor`]: the end-to-end [`MqRegressor`]
//!
//! # Example
//!
//! ```
//! use mqboost::data::FeatureFrame;
//! use mqboost::gbdt::BoosterParams;
//! use mqboost::{ModelName, MqRegressor, RegressorConfig, data::count_crossings};
//! use ndarray::Array1;
//!
//! let x = FeatureFrame::from_vector(Array1::linspace(0.0, 10.0, 100).view());
//! let y = Array1::<f32>::linspace(0.0, 10.0, 100).mapv(|v| v.sin());
//!
//! let config = RegressorConfig::builder()
//!     .alphas(vec![0.1_f32, 0.5, 0.9])
//!     .model(ModelName::Xgboost)
//!     .params(BoosterParams { n_rounds: 30, ..Default::default() })
//!     .build()
//!     .unwrap();
//! let mut model = MqRegressor::new(config).unwrap();
//! model.fit(&x, y.view()).unwrap();
//!
//! let preds = model.predict(&x).unwrap();
//! assert_eq!(preds.dim(), (3, 100));
//! assert_eq!(count_crossings(preds.view()), 0);
//! ```

pub mod alpha;
pub mod data;
pub mod engine;
pub mod error;
pub mod gbdt;
pub mod logger;
pub mod names;
pub mod objective;
pub mod regressor;
pub mod utils;

pub use alpha::{AlphaLike, Alphas, validate_alphas};
pub use data::{FeatureFrame, MqDataset, TAU_COLUMN};
pub use engine::{Engine, EvalSet, MonotoneConstraints, PredictData, Predictor, TrainData};
pub use error::{FittingError, MqError, ValidationError};
pub use gbdt::{Booster, BoosterParams, GbdtEngine};
pub use logger::Verbosity;
pub use names::{ModelName, ObjectiveName};
pub use objective::{GradsTuple, MqObjective, ObjectiveFn, QuantileLoss};
pub use regressor::{MqRegressor, RegressorConfig};
pub use utils::{Parallelism, run_with_threads};
