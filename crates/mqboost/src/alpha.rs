//! Quantile level validation.
//!
//! Every pipeline entry point runs [`validate_alphas`] before stacking. The
//! monotone constraint placed on `_tau` is always "increasing", which is only
//! meaningful when the levels arrive in strictly ascending order.

use std::ops::Deref;

use crate::error::ValidationError;

/// Quantile levels as supplied by the caller: one level or several.
#[derive(Debug, Clone, PartialEq)]
pub enum AlphaLike {
    One(f32),
    Many(Vec<f32>),
}

impl From<f32> for AlphaLike {
    fn from(alpha: f32) -> Self {
        Self::One(alpha)
    }
}

impl From<Vec<f32>> for AlphaLike {
    fn from(alphas: Vec<f32>) -> Self {
        Self::Many(alphas)
    }
}

impl From<&[f32]> for AlphaLike {
    fn from(alphas: &[f32]) -> Self {
        Self::Many(alphas.to_vec())
    }
}

impl<const N: usize> From<[f32; N]> for AlphaLike {
    fn from(alphas: [f32; N]) -> Self {
        Self::Many(alphas.to_vec())
    }
}

impl AlphaLike {
    fn into_vec(self) -> Vec<f32> {
        match self {
            Self::One(alpha) => vec![alpha],
            Self::Many(alphas) => alphas,
        }
    }
}

/// A validated, non-empty, strictly ascending list of quantile levels.
///
/// Only [`validate_alphas`] constructs this type, so holding an `Alphas`
/// is proof that the checks ran.
#[derive(Debug, Clone, PartialEq)]
pub struct Alphas(Vec<f32>);

impl Alphas {
    /// Number of quantile levels (K).
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; kept for API symmetry with slices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.0
    }
}

impl Deref for Alphas {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.0
    }
}

impl AsRef<[f32]> for Alphas {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Alphas {
    type Item = &'a f32;
    type IntoIter = std::slice::Iter<'a, f32>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Validate and normalize requested quantile levels.
///
/// A single level is promoted to a one-element list. The list must be
/// non-empty, every level must lie in (0, 1), adjacent levels must not
/// decrease, and no level may repeat. Values are returned unchanged.
///
/// # Errors
///
/// The first failed check, as a [`ValidationError`].
///
/// # Example
///
/// ```
/// use mqboost::validate_alphas;
///
/// let alphas = validate_alphas(vec![0.1_f32, 0.5, 0.9]).unwrap();
/// assert_eq!(alphas.as_slice(), &[0.1, 0.5, 0.9]);
///
/// assert!(validate_alphas(vec![0.5_f32, 0.3]).is_err());
/// assert_eq!(validate_alphas(0.5_f32).unwrap().len(), 1);
/// ```
pub fn validate_alphas(alphas: impl Into<AlphaLike>) -> Result<Alphas, ValidationError> {
    let alphas = alphas.into().into_vec();

    if alphas.is_empty() {
        return Err(ValidationError::EmptyAlphas);
    }

    if let Some(&bad) = alphas.iter().find(|a| !(**a > 0.0 && **a < 1.0)) {
        return Err(ValidationError::AlphaOutOfRange(bad));
    }

    if alphas.windows(2).any(|pair| pair[0] > pair[1]) {
        return Err(ValidationError::AlphaNotAscending);
    }

    // Checked on the whole list, not only adjacent pairs.
    let mut sorted = alphas.clone();
    sorted.sort_by(f32::total_cmp);
    if sorted.windows(2).any(|pair| pair[0] == pair[1]) {
        return Err(ValidationError::DuplicatedAlpha);
    }

    Ok(Alphas(alphas))
}
