//! Pointwise quantile losses.
//!
//! Both losses are written in terms of the residual `e = target - prediction`
//! and the row's quantile level `tau`.
//!
//! - Check (pinball): `rho(e) = e * (tau - 1[e < 0])`
//! - Huber-smoothed check with half-width `delta`: inside `|e| <= delta` the
//!   residual slope moves linearly from `tau - 1` to `tau`, which gives
//!   `(tau - 0.5) * e + e^2 / (4 * delta) + delta / 4`. Outside the band it is
//!   the check loss. Both pieces meet at `e = +-delta`.

use crate::error::ValidationError;

use super::GradsTuple;

/// Largest accepted Huber half-width.
pub const MAX_DELTA: f32 = 0.1;

// =============================================================================
// Delta
// =============================================================================

/// Validated Huber smoothing half-width, in `(0, 0.1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delta(f32);

impl Delta {
    /// Validate a smoothing width.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::DeltaNotFloat`] for NaN or infinity
    /// - [`ValidationError::DeltaNotPositive`] for `delta <= 0`
    /// - [`ValidationError::DeltaTooLarge`] for `delta > 0.1`
    pub fn new(delta: f32) -> Result<Self, ValidationError> {
        if !delta.is_finite() {
            return Err(ValidationError::DeltaNotFloat);
        }
        if delta <= 0.0 {
            return Err(ValidationError::DeltaNotPositive(delta));
        }
        if delta > MAX_DELTA {
            return Err(ValidationError::DeltaTooLarge);
        }
        Ok(Self(delta))
    }

    #[inline]
    pub fn get(self) -> f32 {
        self.0
    }
}

// =============================================================================
// QuantileLoss
// =============================================================================

/// Loss family evaluated per stacked row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuantileLoss {
    Check,
    Huber(Delta),
}

impl QuantileLoss {
    /// Derivative of the loss with respect to the residual.
    ///
    /// For the check loss this is `tau` when `e >= 0` and `tau - 1` otherwise.
    #[inline]
    pub fn slope(self, e: f32, tau: f32) -> f32 {
        match self {
            Self::Huber(delta) if e.abs() <= delta.get() => (tau - 0.5) + e / (2.0 * delta.get()),
            _ => pinball_slope(e, tau),
        }
    }

    /// Second derivative with respect to the residual (or prediction).
    #[inline]
    pub fn hessian(self, e: f32) -> f32 {
        match self {
            Self::Huber(delta) if e.abs() <= delta.get() => 1.0 / (2.0 * delta.get()),
            _ => 1.0,
        }
    }

    /// Loss value at residual `e`.
    #[inline]
    pub fn value(self, e: f32, tau: f32) -> f32 {
        match self {
            Self::Huber(delta) if e.abs() <= delta.get() => {
                let d = delta.get();
                (tau - 0.5) * e + e * e / (4.0 * d) + d / 4.0
            }
            _ => e * pinball_slope(e, tau),
        }
    }

    /// Gradient and Hessian with respect to the prediction.
    ///
    /// The prediction enters the residual with a minus sign, so the gradient
    /// is the negated residual slope.
    #[inline]
    pub fn grad_hess(self, prediction: f32, target: f32, tau: f32) -> GradsTuple {
        let e = target - prediction;
        GradsTuple {
            grad: -self.slope(e, tau),
            hess: self.hessian(e),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::Huber(_) => "huber",
        }
    }
}

#[inline]
fn pinball_slope(e: f32, tau: f32) -> f32 {
    if e >= 0.0 { tau } else { tau - 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    fn huber(delta: f32) -> QuantileLoss {
        QuantileLoss::Huber(Delta::new(delta).unwrap())
    }

    #[test]
    fn check_slope_at_median() {
        assert_eq!(QuantileLoss::Check.slope(1.0, 0.5), 0.5);
        assert_eq!(QuantileLoss::Check.slope(-1.0, 0.5), -0.5);
    }

    #[rstest]
    #[case(0.1)]
    #[case(0.5)]
    #[case(0.9)]
    fn check_gradient_and_hessian(#[case] tau: f32) {
        // target above prediction
        let under = QuantileLoss::Check.grad_hess(0.0, 2.0, tau);
        assert_abs_diff_eq!(under.grad, -tau);
        assert_eq!(under.hess, 1.0);

        // target below prediction
        let over = QuantileLoss::Check.grad_hess(2.0, 0.0, tau);
        assert_abs_diff_eq!(over.grad, 1.0 - tau);
        assert_eq!(over.hess, 1.0);
    }

    #[test]
    fn check_value_is_pinball() {
        assert_abs_diff_eq!(QuantileLoss::Check.value(2.0, 0.9), 1.8);
        assert_abs_diff_eq!(QuantileLoss::Check.value(-2.0, 0.9), 0.2, epsilon = 1e-6);
        assert_eq!(QuantileLoss::Check.value(0.0, 0.3), 0.0);
    }

    #[test]
    fn huber_band_interpolates_slope() {
        let loss = huber(0.05);
        let tau = 0.8;
        assert_abs_diff_eq!(loss.slope(-0.05, tau), tau - 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(loss.slope(0.05, tau), tau, epsilon = 1e-6);
        assert_abs_diff_eq!(loss.slope(0.0, tau), tau - 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(loss.hessian(0.01), 10.0, epsilon = 1e-4);
    }

    #[test]
    fn huber_outside_band_matches_check() {
        let loss = huber(0.01);
        for &e in &[-3.0_f32, -0.5, 0.02, 4.0] {
            assert_eq!(loss.slope(e, 0.3), QuantileLoss::Check.slope(e, 0.3));
            assert_eq!(loss.hessian(e), 1.0);
            assert_abs_diff_eq!(loss.value(e, 0.3), QuantileLoss::Check.value(e, 0.3));
        }
    }

    #[test]
    fn huber_value_is_continuous_at_band_edges() {
        let d = 0.08;
        let loss = huber(d);
        for &tau in &[0.1_f32, 0.5, 0.9] {
            assert_abs_diff_eq!(
                loss.value(d, tau),
                QuantileLoss::Check.value(d, tau),
                epsilon = 1e-6
            );
            assert_abs_diff_eq!(
                loss.value(-d, tau),
                QuantileLoss::Check.value(-d, tau),
                epsilon = 1e-6
            );
        }
    }

    #[test]
    fn tiny_delta_recovers_check_gradient() {
        let loss = huber(1e-6);
        for &e in &[-1.0_f32, -0.01, 0.01, 1.0] {
            assert_eq!(
                loss.grad_hess(0.0, e, 0.7),
                QuantileLoss::Check.grad_hess(0.0, e, 0.7)
            );
        }
    }

    #[rstest]
    #[case(f32::NAN, ValidationError::DeltaNotFloat)]
    #[case(f32::INFINITY, ValidationError::DeltaNotFloat)]
    #[case(0.0, ValidationError::DeltaNotPositive(0.0))]
    #[case(-0.01, ValidationError::DeltaNotPositive(-0.01))]
    #[case(0.2, ValidationError::DeltaTooLarge)]
    fn invalid_delta(#[case] delta: f32, #[case] expected: ValidationError) {
        assert_eq!(Delta::new(delta).unwrap_err(), expected);
    }

    #[test]
    fn upper_bound_is_inclusive() {
        assert_eq!(Delta::new(0.1).unwrap().get(), 0.1);
    }
}
