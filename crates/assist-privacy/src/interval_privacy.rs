//! Interval Privacy
//!
//! Each score `y` is compared against its own threshold `t ~ Uniform[a, b)`,
//! where `[a, b]` is the truncation range of the batch. The release consists
//! of a point value and a disclosed interval:
//!
//! ```text
//! y <  t:  interval = [a, min(t, b)],  output = (2t - b) / thresh
//! y >= t:  interval = [max(t, a), b],  output = (2t - a) / thresh
//! ```
//!
//! The disclosed interval always contains the truncated score, which is the
//! guarantee an observer is given. `thresh` is the caller's average interval
//! width budget; it only rescales the point output.
//!
//! The batch is audited with [`crate::leakage`], the fraction of
//! (score, interval) pairs across the whole batch for which the interval
//! localizes the score.

use crate::leakage::leakage;
use crate::sampling::uniform;
use crate::scores::element_count;
use crate::truncate::TruncationBounds;
use crate::{ensure_finite, ensure_positive, PrivacyError, Result, Scores};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default average interval width budget
pub const DEFAULT_THRESH: f64 = 1.0;

/// Interval disclosed for one score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

impl Interval {
    /// Create an interval; `lower <= upper` is expected
    pub fn new(lower: f64, upper: f64) -> Self {
        Interval { lower, upper }
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Closed containment, the guarantee the mechanism gives
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    /// Half-open containment `[lower, upper)`, the test used by the leakage audit
    pub fn contains_half_open(&self, value: f64) -> bool {
        self.lower <= value && value < self.upper
    }
}

/// Per-element intervals; shape is the score shape with a trailing 2
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Intervals {
    shape: Vec<usize>,
    bounds: Vec<Interval>,
}

impl Intervals {
    /// Build an interval set for scores of shape `score_shape`
    pub fn from_shape(score_shape: Vec<usize>, bounds: Vec<Interval>) -> Result<Self> {
        let expected = element_count(&score_shape);
        if expected != bounds.len() {
            return Err(PrivacyError::ShapeMismatch {
                expected,
                got: bounds.len(),
            });
        }
        let mut shape = score_shape;
        shape.push(2);
        Ok(Intervals { shape, bounds })
    }

    /// Shape of the interval tensor (score shape + `[2]`)
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Flat view of the intervals, in score order
    pub fn as_slice(&self) -> &[Interval] {
        &self.bounds
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Average disclosed width
    pub fn mean_width(&self) -> f64 {
        if self.bounds.is_empty() {
            return 0.0;
        }
        self.bounds.iter().map(Interval::width).sum::<f64>() / self.bounds.len() as f64
    }

    /// Flatten to `[lower_0, upper_0, lower_1, upper_1, ...]`
    pub fn to_flat(&self) -> Vec<f64> {
        self.bounds.iter().flat_map(|i| [i.lower, i.upper]).collect()
    }
}

/// Result of one interval-privacy release
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalRelease {
    /// Perturbed point outputs, same shape as the input
    pub scores: Scores,
    /// Disclosed intervals
    pub intervals: Intervals,
    /// Batch leakage score in `[0, 1]`
    pub leakage: f64,
}

/// Interval-privacy release with a leakage audit
///
/// The audit is quadratic in the number of scores; use
/// [`release_intervals`] when the leakage is not needed.
pub fn interval_privacy<R: Rng + ?Sized>(
    scores: &Scores,
    thresh: f64,
    rng: &mut R,
) -> Result<IntervalRelease> {
    let (perturbed, intervals) = release_intervals(scores, thresh, rng)?;
    let leakage = leakage(scores.as_slice(), intervals.as_slice())?;
    tracing::debug!(n = scores.len(), leakage, "interval privacy audit complete");

    Ok(IntervalRelease {
        scores: perturbed,
        intervals,
        leakage,
    })
}

/// Interval-privacy release without the leakage audit
///
/// Fails with `InvalidParameter` when the truncation range overflows `f64`
/// and with `NonFiniteScore` when a point output does (`(2t - a) / thresh`
/// for scores near `f64::MAX` or a tiny `thresh`).
pub fn release_intervals<R: Rng + ?Sized>(
    scores: &Scores,
    thresh: f64,
    rng: &mut R,
) -> Result<(Scores, Intervals)> {
    ensure_positive("thresh", thresh)?;

    let bounds = TruncationBounds::from_values(scores.as_slice())?;
    bounds.checked_width()?;
    let (a, b) = (bounds.lower, bounds.upper);
    tracing::debug!(n = scores.len(), lower = a, upper = b, thresh, "applying interval mechanism");

    let mut outputs = Vec::with_capacity(scores.len());
    let mut disclosed = Vec::with_capacity(scores.len());
    for &y in scores.as_slice() {
        let t = uniform(rng, a, b);
        let mut interval = Interval::new(a, b);
        if y < t {
            interval.upper = t.min(interval.upper);
            outputs.push((2.0 * t - b) / thresh);
        } else {
            interval.lower = t.max(interval.lower);
            outputs.push((2.0 * t - a) / thresh);
        }
        disclosed.push(interval);
    }
    ensure_finite(&outputs)?;

    let intervals = Intervals::from_shape(scores.shape().to_vec(), disclosed)?;
    Ok((scores.with_data(outputs), intervals))
}
