//! Early stopping callback for training.
//!
//! Monitors an evaluation metric and stops training when no improvement is
//! seen for a given number of rounds.

/// Outcome of feeding one round's metric to [`EarlyStopping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EarlyStopAction {
    /// New best value; the model up to this round should be kept.
    Improved,
    /// No improvement, patience not yet exhausted.
    Continue,
    /// Patience exhausted.
    Stop,
}

/// Early stopping configuration and state. Lower metric values are better.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    /// Rounds without improvement before stopping; `0` disables.
    patience: usize,
    best_value: Option<f64>,
    best_round: usize,
    current_round: usize,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self {
            patience,
            best_value: None,
            best_round: 0,
            current_round: 0,
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.patience > 0
    }

    /// Record the metric of the current round.
    pub fn update(&mut self, value: f64) -> EarlyStopAction {
        let is_improvement = self.best_value.is_none_or(|best| value < best);

        let round = self.current_round;
        self.current_round += 1;

        if is_improvement {
            self.best_value = Some(value);
            self.best_round = round;
            EarlyStopAction::Improved
        } else if self.current_round - self.best_round > self.patience {
            EarlyStopAction::Stop
        } else {
            EarlyStopAction::Continue
        }
    }

    pub fn best_value(&self) -> Option<f64> {
        self.best_value
    }

    /// Round at which the best value was observed.
    pub fn best_round(&self) -> usize {
        self.best_round
    }
}
