//! Error types.
//!
//! Two families of failures are kept apart:
//!
//! - [`ValidationError`]: bad inputs caught before any training work starts
//!   (alphas, reserved column names, shapes, delta, configuration values).
//! - [`FittingError`]: failures surfaced by the training or prediction engine.
//!
//! [`MqError`] is the umbrella returned by the high-level regressor API.

/// Input validation error.
///
/// Raised eagerly, before stacking or training, so no partial work is ever done.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// No quantile levels were supplied.
    #[error("Input alpha is not valid")]
    EmptyAlphas,

    /// A quantile level lies outside the open interval (0, 1).
    #[error("Alpha must be in (0, 1), got {0}")]
    AlphaOutOfRange(f32),

    /// Quantile levels are not in ascending order.
    #[error("Alpha is not ascending order")]
    AlphaNotAscending,

    /// The same quantile level appears more than once.
    #[error("Duplicated alpha exists")]
    DuplicatedAlpha,

    /// The input frame already carries the reserved `_tau` column.
    #[error("Column name '_tau' is not allowed.")]
    ReservedColumn,

    /// Two feature columns share a name.
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    /// A frame was built without any column.
    #[error("feature frame must have at least one column")]
    EmptyFrame,

    /// Lengths of related arrays disagree.
    #[error("{field}: expected {expected} rows, got {got}")]
    ShapeMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    /// Flat predictions cannot be split into equally sized quantile blocks.
    #[error("prediction length {len} is not a multiple of {n_quantiles} quantiles")]
    RaggedPredictions { len: usize, n_quantiles: usize },

    /// The Huber objective was requested without a delta.
    #[error("Delta is required for the huber objective")]
    MissingDelta,

    /// Delta is not a genuine (finite, non-integer-literal) float.
    #[error("delta is not float type")]
    DeltaNotFloat,

    /// Delta must be strictly positive.
    #[error("Delta must be positive, got {0}")]
    DeltaNotPositive(f32),

    /// Delta above the smoothing bound.
    #[error("Delta must be smaller than 0.1")]
    DeltaTooLarge,

    /// An enum-like name did not match any known member.
    #[error("Invalid value: '{value}'. Expected one of: {expected}.")]
    UnknownName { value: String, expected: String },

    /// A booster parameter is outside its domain.
    #[error("{name} {constraint}, got {value}")]
    InvalidParam {
        name: &'static str,
        constraint: &'static str,
        value: f64,
    },
}

/// Training or prediction failure reported by an engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FittingError {
    /// `predict` was called before `fit`.
    #[error("Fit must be executed before predict")]
    NotFitted,

    /// The training container holds no rows.
    #[error("training data has no rows")]
    EmptyTrainingData,

    /// Label count does not match the row count of the training container.
    #[error("training data has {got} labels for {expected} rows")]
    LabelLength { expected: usize, got: usize },

    /// The objective returned NaN or infinity.
    #[error("objective produced a non-finite gradient at row {row} in round {round}")]
    NonFiniteGradient { round: usize, row: usize },

    /// Prediction data does not have the feature layout the model was trained on.
    #[error("model expects {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    /// The engine produced a prediction vector of the wrong length.
    #[error("engine returned {got} predictions for {expected} rows")]
    PredictionLength { expected: usize, got: usize },

    /// A persisted model is structurally inconsistent.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// Building the worker thread pool failed.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),
}

/// Top-level error of the regressor API.
#[derive(Debug, thiserror::Error)]
pub enum MqError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fitting(#[from] FittingError),

    /// Configuration text could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
