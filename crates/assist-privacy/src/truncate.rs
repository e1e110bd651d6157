//! Robust truncation of score vectors
//!
//! Both mechanisms first clip the scores to `[a, b]`, where `a` and `b` are the
//! empirical 2.5th and 97.5th percentiles of the whole (flattened) vector. The
//! width `b - a` bounds the Laplace noise scale and `[a, b]` is the domain of
//! the disclosed intervals.
//!
//! Very small vectors (fewer than ~40 elements) give unstable percentile
//! estimates. They are accepted as-is.

use crate::sampling::quantile_sorted;
use crate::{ensure_finite, PrivacyError, Result, Scores};
use serde::{Deserialize, Serialize};

/// Quantile used for the lower truncation bound
pub const LOWER_QUANTILE: f64 = 0.025;

/// Quantile used for the upper truncation bound
pub const UPPER_QUANTILE: f64 = 0.975;

/// Truncation bounds `(a, b)` derived from one batch of scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TruncationBounds {
    /// Lower bound `a` (2.5th percentile)
    pub lower: f64,
    /// Upper bound `b` (97.5th percentile)
    pub upper: f64,
}

impl TruncationBounds {
    /// Compute the bounds of a batch
    pub fn from_values(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(PrivacyError::EmptyInput);
        }
        ensure_finite(values)?;

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let bounds = TruncationBounds {
            lower: quantile_sorted(&sorted, LOWER_QUANTILE)?,
            upper: quantile_sorted(&sorted, UPPER_QUANTILE)?,
        };

        if bounds.is_degenerate() {
            tracing::warn!(
                bound = bounds.lower,
                n = values.len(),
                "truncation bounds collapsed; release carries no noise and zero-width intervals"
            );
        }
        Ok(bounds)
    }

    /// Width `b - a`
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Width `b - a`, failing when it exceeds the `f64` range
    ///
    /// Finite scores of opposite sign near `f64::MAX` have finite bounds
    /// whose width is infinite.
    pub fn checked_width(&self) -> Result<f64> {
        let width = self.width();
        if !width.is_finite() {
            return Err(PrivacyError::InvalidParameter {
                name: "truncation width",
                value: width,
                reason: "b - a overflows f64; rescale the scores",
            });
        }
        Ok(width)
    }

    /// True when the central 95% of the batch is constant (`a == b`)
    pub fn is_degenerate(&self) -> bool {
        self.width() == 0.0
    }

    /// Clip a single value to `[a, b]`
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.lower).min(self.upper)
    }

    /// Closed containment test
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Truncated copy of a score tensor together with its bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Truncated {
    /// Scores clipped to `[lower, upper]`, same shape as the input
    pub scores: Scores,
    /// Bounds the scores were clipped to
    pub bounds: TruncationBounds,
}

/// Clip `scores` to their 2.5th/97.5th percentile range
///
/// The input is left untouched; a truncated copy is returned.
pub fn truncate(scores: &Scores) -> Result<Truncated> {
    let bounds = TruncationBounds::from_values(scores.as_slice())?;
    let clipped = truncate_with(scores.as_slice(), &bounds);
    Ok(Truncated {
        scores: scores.with_data(clipped),
        bounds,
    })
}

/// Clip a flat buffer to previously computed bounds
pub(crate) fn truncate_with(values: &[f64], bounds: &TruncationBounds) -> Vec<f64> {
    values.iter().map(|&v| bounds.clamp(v)).collect()
}
