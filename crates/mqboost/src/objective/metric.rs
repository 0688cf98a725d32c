//! Evaluation metric for stacked quantile predictions.

use ndarray::ArrayView1;

use super::loss::QuantileLoss;

/// A named metric value for one round. Lower is better.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricValue {
    /// Name of the metric (e.g., "valid-check", "valid-huber").
    pub name: String,
    pub value: f64,
}

impl MetricValue {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:.6}", self.name, self.value)
    }
}

/// Mean quantile loss over stacked rows.
///
/// Each row carries its own level, so one call scores every quantile of a
/// stacked set at once:
///
/// `L = (1 / n) * sum_i loss(y_i - q_i, tau_i)`
#[derive(Debug, Clone, Copy)]
pub struct QuantileMetric {
    loss: QuantileLoss,
}

impl QuantileMetric {
    pub fn new(loss: QuantileLoss) -> Self {
        Self { loss }
    }

    pub fn name(&self) -> &'static str {
        self.loss.name()
    }

    /// Accumulated in `f64`. Returns `0.0` for empty input.
    pub fn compute(
        &self,
        predictions: ArrayView1<f32>,
        targets: ArrayView1<f32>,
        taus: ArrayView1<f32>,
    ) -> f64 {
        let n = predictions.len();
        if n == 0 {
            return 0.0;
        }
        debug_assert_eq!(targets.len(), n);
        debug_assert_eq!(taus.len(), n);

        let total: f64 = predictions
            .iter()
            .zip(targets.iter())
            .zip(taus.iter())
            .map(|((&pred, &y), &tau)| self.loss.value(y - pred, tau) as f64)
            .sum();
        total / n as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::loss::Delta;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn perfect_predictions_score_zero() {
        let preds = array![1.0, 2.0, 3.0];
        let taus = array![0.1, 0.5, 0.9];
        let metric = QuantileMetric::new(QuantileLoss::Check);
        let loss = metric.compute(preds.view(), preds.view(), taus.view());
        assert_eq!(loss, 0.0);
    }

    #[test]
    fn median_error() {
        // |1-2| = 1, |3-2| = 1 -> pinball each = 0.5 -> mean = 0.5
        let preds = array![2.0, 2.0];
        let labels = array![1.0, 3.0];
        let taus = array![0.5, 0.5];
        let metric = QuantileMetric::new(QuantileLoss::Check);
        let loss = metric.compute(preds.view(), labels.view(), taus.view());
        assert_abs_diff_eq!(loss, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn rows_use_their_own_level() {
        // Same residual +1 at two levels: 0.1 and 0.9 -> mean 0.5
        let preds = array![0.0, 0.0];
        let labels = array![1.0, 1.0];
        let taus = array![0.1, 0.9];
        let metric = QuantileMetric::new(QuantileLoss::Check);
        let loss = metric.compute(preds.view(), labels.view(), taus.view());
        assert_abs_diff_eq!(loss, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn huber_metric_is_named_and_positive_at_zero_residual() {
        let metric = QuantileMetric::new(QuantileLoss::Huber(Delta::new(0.04).unwrap()));
        assert_eq!(metric.name(), "huber");
        let zero = array![0.0];
        let loss = metric.compute(zero.view(), zero.view(), array![0.5].view());
        assert_abs_diff_eq!(loss, 0.01, epsilon = 1e-6);
    }

    #[test]
    fn metric_value_display() {
        let value = MetricValue::new("valid-check", 0.2);
        assert_eq!(value.to_string(), "valid-check: 0.200000");
    }
}
