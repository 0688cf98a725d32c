//! Feature frames, quantile stacking and the training dataset wrapper.

mod dataset;
mod frame;
mod schema;
mod stack;

pub use dataset::MqDataset;
pub use frame::{FeatureFrame, FrameBuilder};
pub use schema::{DatasetSchema, FeatureMeta, FeatureType};
pub use stack::{
    StackedFeatures, TAU_COLUMN, TrainingPair, count_crossings, prepare_features,
    prepare_targets, prepare_training_pair, unstack_predictions,
};
