//! High-level multi-quantile regressor.
//!
//! [`RegressorConfig`] describes what to train (engine family, loss, levels,
//! booster parameters); [`MqRegressor`] runs the full pipeline:
//!
//! ```text
//! validate alphas -> stack x / y -> family container + constraints
//!     -> engine.train(objective) -> stacked predict -> unstack to (K, N)
//! ```

use std::fmt;

use bon::Builder;
use ndarray::{Array2, ArrayView1};
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use serde_with::{DisplayFromStr, OneOrMany, serde_as};

use crate::alpha::{Alphas, validate_alphas};
use crate::data::{FeatureFrame, MqDataset, prepare_features, unstack_predictions};
use crate::engine::{Engine, EvalSet, Predictor};
use crate::error::{FittingError, MqError, ValidationError};
use crate::gbdt::{BoosterParams, GbdtEngine};
use crate::names::{ModelName, ObjectiveName};
use crate::objective::{MqObjective, ObjectiveFn};

// =============================================================================
// RegressorConfig
// =============================================================================

/// Configuration of an [`MqRegressor`].
///
/// Built with the validating builder or parsed from JSON; both paths run the
/// same checks.
///
/// # Example
///
/// ```
/// use mqboost::{ModelName, ObjectiveName, RegressorConfig};
///
/// let config = RegressorConfig::builder()
///     .alphas(vec![0.1_f32, 0.5, 0.9])
///     .model(ModelName::Xgboost)
///     .objective(ObjectiveName::Huber)
///     .delta(0.05)
///     .build()
///     .unwrap();
/// assert_eq!(config.alphas.len(), 3);
///
/// let from_json = RegressorConfig::from_json(r#"{"alphas": 0.5, "objective": "check"}"#).unwrap();
/// assert_eq!(from_json.alphas, vec![0.5]);
/// assert_eq!(from_json.model, ModelName::Lightgbm);
/// ```
#[serde_as]
#[derive(Debug, Clone, Builder, Deserialize)]
#[builder(derive(Clone, Debug), finish_fn(vis = "", name = __build_internal))]
#[serde(deny_unknown_fields)]
pub struct RegressorConfig {
    /// Engine family. Default: `lightgbm`.
    #[builder(default)]
    #[serde(default)]
    #[serde_as(as = "DisplayFromStr")]
    pub model: ModelName,

    /// Loss family. Default: `check`.
    #[builder(default)]
    #[serde(default)]
    #[serde_as(as = "DisplayFromStr")]
    pub objective: ObjectiveName,

    /// Quantile levels; JSON accepts a single number or a list.
    #[builder(into)]
    #[serde_as(as = "OneOrMany<_>")]
    pub alphas: Vec<f32>,

    /// Huber smoothing width; required for `huber`, ignored for `check`.
    #[serde(default, deserialize_with = "deserialize_delta")]
    pub delta: Option<f32>,

    /// Booster parameters.
    #[builder(default)]
    #[serde(default)]
    pub params: BoosterParams,
}

impl<S: regressor_config_builder::IsComplete> RegressorConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// The first failed check on alphas, delta or booster parameters.
    pub fn build(self) -> Result<RegressorConfig, ValidationError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl RegressorConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// - [`MqError::Config`] for malformed JSON, unknown fields or names, or an
    ///   integer `delta`
    /// - [`MqError::Validation`] for values that parse but are invalid
    pub fn from_json(json: &str) -> Result<Self, MqError> {
        let config: RegressorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Run every check and return the validated levels.
    pub fn validate(&self) -> Result<Alphas, ValidationError> {
        let alphas = validate_alphas(self.alphas.clone())?;
        MqObjective::new(self.objective, alphas.clone(), self.delta)?;
        self.params.validate()?;
        Ok(alphas)
    }
}

/// Accepts a JSON float or null; an integer literal is not a valid delta.
fn deserialize_delta<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f32>, D::Error> {
    struct DeltaVisitor;

    impl<'de> Visitor<'de> for DeltaVisitor {
        type Value = Option<f32>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a float delta")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            // Saturate so out-of-range literals still reach the range checks.
            Ok(Some(v.clamp(f32::MIN as f64, f32::MAX as f64) as f32))
        }

        fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
            Err(E::custom(ValidationError::DeltaNotFloat))
        }

        fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
            Err(E::custom(ValidationError::DeltaNotFloat))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
            d.deserialize_any(DeltaVisitor)
        }
    }

    deserializer.deserialize_option(DeltaVisitor)
}

// =============================================================================
// MqRegressor
// =============================================================================

/// Multi-quantile regressor over any [`Engine`].
///
/// # Example
///
/// ```
/// use mqboost::data::FeatureFrame;
/// use mqboost::gbdt::BoosterParams;
/// use mqboost::{MqRegressor, RegressorConfig};
/// use ndarray::Array1;
///
/// let x = FeatureFrame::from_vector(Array1::linspace(0.0, 1.0, 50).view());
/// let y = Array1::<f32>::linspace(0.0, 1.0, 50);
///
/// let config = RegressorConfig::builder()
///     .alphas(vec![0.2_f32, 0.8])
///     .params(BoosterParams { n_rounds: 20, ..Default::default() })
///     .build()
///     .unwrap();
/// let mut model = MqRegressor::new(config).unwrap();
/// model.fit(&x, y.view()).unwrap();
///
/// let preds = model.predict(&x).unwrap();
/// assert_eq!(preds.dim(), (2, 50));
/// ```
pub struct MqRegressor<E: Engine = GbdtEngine> {
    config: RegressorConfig,
    alphas: Alphas,
    objective: MqObjective,
    engine: E,
    model: Option<E::Model>,
}

impl MqRegressor<GbdtEngine> {
    /// Regressor on the native engine, configured by `config.params`.
    pub fn new(config: RegressorConfig) -> Result<Self, MqError> {
        let engine = GbdtEngine::new(config.params.clone())?;
        Self::with_engine(config, engine)
    }
}

impl<E: Engine> MqRegressor<E> {
    /// Regressor on a caller-supplied engine.
    ///
    /// Alphas and delta are validated here, before any data is seen.
    pub fn with_engine(config: RegressorConfig, engine: E) -> Result<Self, MqError> {
        let alphas = validate_alphas(config.alphas.clone())?;
        let objective = MqObjective::new(config.objective, alphas.clone(), config.delta)?;
        Ok(Self {
            config,
            alphas,
            objective,
            engine,
            model: None,
        })
    }

    pub fn config(&self) -> &RegressorConfig {
        &self.config
    }

    pub fn alphas(&self) -> &Alphas {
        &self.alphas
    }

    pub fn objective(&self) -> &MqObjective {
        &self.objective
    }

    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    /// The trained model, if any.
    pub fn model(&self) -> Option<&E::Model> {
        self.model.as_ref()
    }

    /// Train on `x` / `y`.
    pub fn fit(&mut self, x: &FeatureFrame, y: ArrayView1<f32>) -> Result<(), MqError> {
        self.fit_with_eval(x, y, None)
    }

    /// Train on `x` / `y`, scoring an optional validation set every round.
    ///
    /// The validation set drives early stopping when the engine supports it.
    pub fn fit_with_eval(
        &mut self,
        x: &FeatureFrame,
        y: ArrayView1<f32>,
        eval: Option<(&FeatureFrame, ArrayView1<f32>)>,
    ) -> Result<(), MqError> {
        let model_name = self.config.model;
        let dataset = MqDataset::new(x, y, &self.alphas, model_name)?;
        let valid = eval
            .map(|(x_val, y_val)| MqDataset::new(x_val, y_val, &self.alphas, model_name))
            .transpose()?;
        let eval_sets: Vec<EvalSet<'_>> = valid
            .iter()
            .map(|v| EvalSet::new("valid", v.dtrain()))
            .collect();

        tracing::debug!(
            model = %model_name,
            objective = self.objective.name(),
            n_rows = dataset.n_rows(),
            n_quantiles = self.alphas.len(),
            "fitting multi-quantile model"
        );

        let model = self.engine.train(
            dataset.dtrain(),
            dataset.constraints(),
            &self.objective,
            &eval_sets,
        )?;
        self.model = Some(model);
        Ok(())
    }

    /// Predict every quantile for every row of `x`.
    ///
    /// Returns a `(n_quantiles, n_rows)` matrix; row `k` is the prediction
    /// for `alphas[k]`.
    ///
    /// # Errors
    ///
    /// [`FittingError::NotFitted`] before [`fit`](Self::fit), plus stacking
    /// and engine errors.
    pub fn predict(&self, x: &FeatureFrame) -> Result<Array2<f32>, MqError> {
        let model = self.model.as_ref().ok_or(FittingError::NotFitted)?;
        let stacked = prepare_features(x, &self.alphas)?;
        let data = self.config.model.build_predict_data(stacked)?;
        let raw = model.predict(&data)?;
        if raw.len() != data.n_rows() {
            return Err(FittingError::PredictionLength {
                expected: data.n_rows(),
                got: raw.len(),
            }
            .into());
        }
        Ok(unstack_predictions(raw.view(), self.alphas.len())?)
    }
}

impl<E: Engine> fmt::Debug for MqRegressor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MqRegressor")
            .field("config", &self.config)
            .field("fitted", &self.is_fitted())
            .finish()
    }
}
