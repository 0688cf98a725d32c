//! Booster hyperparameters and split-gain arithmetic.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::logger::Verbosity;

// =============================================================================
// BoosterParams
// =============================================================================

/// Parameters of the native GBDT engine.
///
/// Every field has a default, so a JSON object only needs the fields it
/// overrides:
///
/// ```
/// use mqboost::gbdt::BoosterParams;
///
/// let json = r#"{"n_rounds": 20, "max_depth": 3}"#;
/// let params: BoosterParams = serde_json::from_str(json).unwrap();
/// assert_eq!(params.n_rounds, 20);
/// assert_eq!(params.learning_rate, 0.1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoosterParams {
    // --- Boosting parameters ---
    /// Number of boosting rounds (one tree per round). Default: 100.
    pub n_rounds: u32,
    /// Learning rate (shrinkage). Default: 0.1.
    pub learning_rate: f32,
    /// Initial raw prediction of every row. Default: 0.0.
    pub base_score: f32,

    // --- Tree structure ---
    /// Maximum tree depth; the root is depth 0. Default: 6.
    pub max_depth: u32,

    // --- Regularization ---
    /// L2 regularization on leaf weights. Default: 1.0.
    pub lambda: f32,
    /// Minimum Hessian sum per child. Default: 1.0.
    pub min_child_weight: f32,
    /// Minimum gain for a split (gamma). Default: 0.0.
    pub min_split_gain: f32,

    // --- Early stopping ---
    /// Stop after this many rounds without improvement on the first
    /// evaluation set. `0` disables early stopping.
    pub early_stopping_rounds: u32,

    // --- Resources ---
    /// Worker threads: `0` = auto, `1` = sequential.
    pub n_threads: usize,

    // --- Logging ---
    pub verbosity: Verbosity,
}

impl Default for BoosterParams {
    fn default() -> Self {
        Self {
            n_rounds: 100,
            learning_rate: 0.1,
            base_score: 0.0,
            max_depth: 6,
            lambda: 1.0,
            min_child_weight: 1.0,
            min_split_gain: 0.0,
            early_stopping_rounds: 0,
            n_threads: 0,
            verbosity: Verbosity::default(),
        }
    }
}

impl BoosterParams {
    /// Check that every parameter is inside its domain.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidParam`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        fn invalid(name: &'static str, constraint: &'static str, value: f64) -> ValidationError {
            ValidationError::InvalidParam {
                name,
                constraint,
                value,
            }
        }

        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(invalid("learning_rate", "must be positive", self.learning_rate as f64));
        }
        if self.n_rounds == 0 {
            return Err(invalid("n_rounds", "must be at least 1", 0.0));
        }
        if self.max_depth == 0 {
            return Err(invalid("max_depth", "must be at least 1", 0.0));
        }
        if !self.base_score.is_finite() {
            return Err(invalid("base_score", "must be finite", self.base_score as f64));
        }
        for (name, value) in [
            ("lambda", self.lambda),
            ("min_child_weight", self.min_child_weight),
            ("min_split_gain", self.min_split_gain),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(invalid(name, "must be non-negative", value as f64));
            }
        }
        Ok(())
    }

    pub(crate) fn gain_params(&self) -> GainParams {
        GainParams {
            reg_lambda: self.lambda,
            min_gain: self.min_split_gain,
            min_child_weight: self.min_child_weight,
        }
    }
}

// =============================================================================
// GainParams
// =============================================================================

/// Regularization used by split search and leaf weights.
#[derive(Clone, Debug)]
pub(crate) struct GainParams {
    pub reg_lambda: f32,
    pub min_gain: f32,
    pub min_child_weight: f32,
}

impl GainParams {
    /// ```text
    /// gain = 0.5 * [G_L²/(H_L + λ) + G_R²/(H_R + λ) - G_P²/(H_P + λ)] - γ
    /// ```
    #[inline]
    pub fn compute_gain(
        &self,
        grad_left: f64,
        hess_left: f64,
        grad_right: f64,
        hess_right: f64,
        grad_parent: f64,
        hess_parent: f64,
    ) -> f64 {
        let lambda = self.reg_lambda as f64;

        let score_left = grad_left * grad_left / (hess_left + lambda);
        let score_right = grad_right * grad_right / (hess_right + lambda);
        let score_parent = grad_parent * grad_parent / (hess_parent + lambda);

        0.5 * (score_left + score_right - score_parent) - self.min_gain as f64
    }

    #[inline]
    pub fn is_valid_split(&self, hess_left: f64, hess_right: f64) -> bool {
        let min_weight = self.min_child_weight as f64;
        hess_left >= min_weight && hess_right >= min_weight
    }

    /// Newton step `-G / (H + λ)`.
    #[inline]
    pub fn compute_leaf_weight(&self, grad_sum: f64, hess_sum: f64) -> f32 {
        let denom = hess_sum + self.reg_lambda as f64;
        if denom <= 0.0 {
            return 0.0;
        }
        (-grad_sum / denom) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn defaults_are_valid() {
        let params = BoosterParams::default();
        assert_eq!(params.n_rounds, 100);
        assert_eq!(params.max_depth, 6);
        assert_eq!(params.early_stopping_rounds, 0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn invalid_learning_rate() {
        let params = BoosterParams {
            learning_rate: 0.0,
            ..Default::default()
        };
        assert_eq!(
            params.validate().unwrap_err().to_string(),
            "learning_rate must be positive, got 0"
        );
    }

    #[test]
    fn negative_regularization_is_rejected() {
        let params = BoosterParams {
            min_child_weight: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ValidationError::InvalidParam {
                name: "min_child_weight",
                ..
            })
        ));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<BoosterParams>(r#"{"n_trees": 5}"#).is_err());
    }

    #[test]
    fn gain_of_perfect_separation() {
        let gain = BoosterParams {
            lambda: 0.0,
            ..Default::default()
        }
        .gain_params();
        // left: G=-2, H=2; right: G=2, H=2; parent: G=0, H=4
        let g = gain.compute_gain(-2.0, 2.0, 2.0, 2.0, 0.0, 4.0);
        assert_abs_diff_eq!(g, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(gain.compute_leaf_weight(-2.0, 2.0), 1.0);
    }
}
