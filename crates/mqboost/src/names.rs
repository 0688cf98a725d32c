//! Closed name enumerations parsed from configuration text.
//!
//! Parsing an unknown value fails with a message listing every valid member.

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

fn unknown(value: &str, members: &[&str]) -> ValidationError {
    ValidationError::UnknownName {
        value: value.to_string(),
        expected: members.join(", "),
    }
}

// =============================================================================
// ModelName
// =============================================================================

/// Boosting engine family.
///
/// The family decides how training/prediction containers are shaped, how the
/// objective recovers each row's quantile level, and the form of the
/// monotone-constraint vector. See [`crate::engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModelName {
    /// LightGBM-style: levels travel in a per-row side channel of the dataset.
    #[default]
    Lightgbm,
    /// XGBoost-style: levels are read back from the `_tau` feature column.
    Xgboost,
}

impl ModelName {
    pub const ALL: [ModelName; 2] = [ModelName::Lightgbm, ModelName::Xgboost];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lightgbm => "lightgbm",
            Self::Xgboost => "xgboost",
        }
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| unknown(s, &Self::ALL.map(Self::as_str)))
    }
}

// =============================================================================
// ObjectiveName
// =============================================================================

/// Loss family used for training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ObjectiveName {
    /// Pinball ("check") loss.
    #[default]
    Check,
    /// Huber-smoothed pinball loss; needs a delta.
    Huber,
}

impl ObjectiveName {
    pub const ALL: [ObjectiveName; 2] = [ObjectiveName::Check, ObjectiveName::Huber];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::Huber => "huber",
        }
    }
}

impl fmt::Display for ObjectiveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectiveName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| unknown(s, &Self::ALL.map(Self::as_str)))
    }
}
