//! Training progress logging.
//!
//! [`Verbosity`] gates what the trainer reports; [`TrainingLogger`] emits the
//! events through `tracing`, so the host application decides where they go.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::objective::MetricValue;

/// How much the trainer reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Nothing.
    #[default]
    Silent,
    /// Only anomalies (e.g. a round that produced no split).
    Warning,
    /// Start/finish, per-round metrics and early stopping.
    Info,
    /// Everything above plus per-tree details.
    Debug,
}

/// Emits training events gated by a [`Verbosity`].
#[derive(Debug)]
pub struct TrainingLogger {
    verbosity: Verbosity,
    started: Option<Instant>,
}

impl TrainingLogger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            started: None,
        }
    }

    #[inline]
    pub fn enabled(&self, level: Verbosity) -> bool {
        self.verbosity != Verbosity::Silent && self.verbosity >= level
    }

    pub fn start_training(&mut self, n_rounds: usize) {
        self.started = Some(Instant::now());
        if self.enabled(Verbosity::Info) {
            tracing::info!(n_rounds, "training started");
        }
    }

    pub fn log_metrics(&self, round: usize, metrics: &[MetricValue]) {
        if !self.enabled(Verbosity::Info) || metrics.is_empty() {
            return;
        }
        let line = metrics
            .iter()
            .map(MetricValue::to_string)
            .collect::<Vec<_>>()
            .join("  ");
        tracing::info!(round, "{line}");
    }

    pub fn log_tree(&self, round: usize, n_leaves: usize, depth: usize) {
        if self.enabled(Verbosity::Debug) {
            tracing::debug!(round, n_leaves, depth, "tree grown");
        }
    }

    pub fn log_stump(&self, round: usize) {
        if self.enabled(Verbosity::Warning) {
            tracing::warn!(round, "no split improved the objective; tree is a single leaf");
        }
    }

    pub fn log_early_stopping(&self, round: usize, best_round: usize, metric: &str) {
        if self.enabled(Verbosity::Info) {
            tracing::info!(round, best_round, metric, "early stopping");
        }
    }

    pub fn finish_training(&self) {
        if self.enabled(Verbosity::Info) {
            let elapsed_ms = self
                .started
                .map(|t| t.elapsed().as_millis() as u64)
                .unwrap_or_default();
            tracing::info!(elapsed_ms, "training finished");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_is_ordered() {
        assert!(Verbosity::Silent < Verbosity::Warning);
        assert!(Verbosity::Info < Verbosity::Debug);
        assert_eq!(Verbosity::default(), Verbosity::Silent);
    }

    #[test]
    fn gating() {
        let silent = TrainingLogger::new(Verbosity::Silent);
        assert!(!silent.enabled(Verbosity::Warning));

        let info = TrainingLogger::new(Verbosity::Info);
        assert!(info.enabled(Verbosity::Warning));
        assert!(info.enabled(Verbosity::Info));
        assert!(!info.enabled(Verbosity::Debug));
    }

    #[test]
    fn parses_lowercase_names() {
        let v: Verbosity = serde_json::from_str("\"info\"").unwrap();
        assert_eq!(v, Verbosity::Info);
    }
}
