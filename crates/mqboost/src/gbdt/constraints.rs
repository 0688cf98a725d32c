//! Monotonic constraint enforcement during tree growth.
//!
//! For each feature: `None`, `Increasing`, or `Decreasing`.
//!
//! Enforcement happens while a tree is built:
//! 1. Every node carries bounds (lower, upper) inherited from its parent
//! 2. Candidate child weights are clamped to the node bounds
//! 3. A split on a constrained feature is rejected when the clamped child
//!    weights are in the wrong order
//! 4. Accepted splits hand tighter bounds to their children, divided at the
//!    midpoint of the two child weights
//!
//! Leaves are clamped to their bounds, so every tree (and therefore the sum
//! of trees) is monotone in each constrained feature.

// ============================================================================
// MonotonicConstraint
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonotonicConstraint {
    #[default]
    None,
    /// Predictions must not decrease as the feature grows.
    Increasing,
    /// Predictions must not increase as the feature grows.
    Decreasing,
}

impl MonotonicConstraint {
    /// `1` increasing, `-1` decreasing, anything else unconstrained.
    pub fn from_direction(value: i8) -> Self {
        match value {
            1 => Self::Increasing,
            -1 => Self::Decreasing,
            _ => Self::None,
        }
    }
}

// ============================================================================
// MonotonicBounds
// ============================================================================

/// Allowed range of leaf weights below a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonotonicBounds {
    pub lower: f32,
    pub upper: f32,
}

impl Default for MonotonicBounds {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl MonotonicBounds {
    pub fn unbounded() -> Self {
        Self {
            lower: f32::NEG_INFINITY,
            upper: f32::INFINITY,
        }
    }

    #[inline]
    pub fn clamp(&self, weight: f32) -> f32 {
        weight.max(self.lower).min(self.upper)
    }

    /// Child bounds after a split at `split_weight` on a feature with
    /// `constraint`. Unconstrained splits pass the bounds through unchanged.
    pub fn child_bounds(
        &self,
        constraint: MonotonicConstraint,
        split_weight: f32,
    ) -> (MonotonicBounds, MonotonicBounds) {
        let low = MonotonicBounds {
            lower: self.lower,
            upper: split_weight.min(self.upper),
        };
        let high = MonotonicBounds {
            lower: split_weight.max(self.lower),
            upper: self.upper,
        };
        match constraint {
            MonotonicConstraint::None => (*self, *self),
            MonotonicConstraint::Increasing => (low, high),
            MonotonicConstraint::Decreasing => (high, low),
        }
    }
}

// ============================================================================
// MonotonicChecker
// ============================================================================

/// Per-feature constraints looked up during split search.
#[derive(Debug, Clone)]
pub struct MonotonicChecker {
    constraints: Vec<MonotonicConstraint>,
}

impl MonotonicChecker {
    /// Build from directions (`-1`, `0`, `1`), padded with `None` up to
    /// `n_features`.
    pub fn from_directions(directions: &[i8], n_features: usize) -> Self {
        let mut constraints: Vec<_> = directions
            .iter()
            .map(|&d| MonotonicConstraint::from_direction(d))
            .collect();
        constraints.resize(n_features.max(constraints.len()), MonotonicConstraint::None);
        Self { constraints }
    }

    #[inline]
    pub fn get(&self, feature: usize) -> MonotonicConstraint {
        self.constraints.get(feature).copied().unwrap_or_default()
    }

    /// Clamp candidate child weights to `bounds` and check their order.
    ///
    /// Returns `(left, right, is_valid)`.
    pub fn check(
        &self,
        feature: usize,
        weight_left: f32,
        weight_right: f32,
        bounds: &MonotonicBounds,
    ) -> (f32, f32, bool) {
        let left = bounds.clamp(weight_left);
        let right = bounds.clamp(weight_right);
        let is_valid = match self.get(feature) {
            MonotonicConstraint::None => true,
            MonotonicConstraint::Increasing => left <= right,
            MonotonicConstraint::Decreasing => left >= right,
        };
        (left, right, is_valid)
    }
}
