//! Laplace Mechanism over Truncated Scores
//!
//! The scores are clipped to their robust range `[a, b]` (see
//! [`crate::truncate`]), which bounds the sensitivity of each element by
//! `b - a`. Independent Laplace noise is then added to every element:
//!
//! ```text
//! M(y) = clip(y, a, b) + Lap(0, (b - a) / alpha)
//! ```
//!
//! Smaller `alpha` means more noise and stronger privacy.
//!
//! The output is not clipped again after noise is added. The Laplace
//! distribution's unbounded support is what the privacy guarantee rests on, so
//! released values regularly fall outside `[a, b]`.

use crate::sampling::laplace;
use crate::truncate::{truncate_with, TruncationBounds};
use crate::{ensure_finite, ensure_positive, PrivacyError, Result, Scores};
use rand::Rng;

/// Default privacy parameter
pub const DEFAULT_ALPHA: f64 = 1.0;

/// Perturb `scores` with Laplace noise calibrated to their truncation range
///
/// Fails with `InvalidParameter` unless `alpha` is a positive finite number;
/// the check runs before any randomness is drawn. Scores whose range or noise
/// scale overflows `f64` are rejected instead of releasing `inf`/NaN.
pub fn differential_privacy<R: Rng + ?Sized>(
    scores: &Scores,
    alpha: f64,
    rng: &mut R,
) -> Result<Scores> {
    ensure_positive("alpha", alpha)?;

    let bounds = TruncationBounds::from_values(scores.as_slice())?;
    bounds.checked_width()?;
    let scale = noise_scale(&bounds, alpha);
    if !scale.is_finite() {
        return Err(PrivacyError::InvalidParameter {
            name: "alpha",
            value: alpha,
            reason: "noise scale (b - a) / alpha overflows f64",
        });
    }
    tracing::debug!(
        n = scores.len(),
        lower = bounds.lower,
        upper = bounds.upper,
        scale,
        "applying laplace mechanism"
    );

    let mut noisy = truncate_with(scores.as_slice(), &bounds);
    for value in noisy.iter_mut() {
        *value += laplace(rng, scale);
    }
    ensure_finite(&noisy)?;

    Ok(scores.with_data(noisy))
}

/// Laplace scale `(b - a) / alpha`
pub fn noise_scale(bounds: &TruncationBounds, alpha: f64) -> f64 {
    bounds.width() / alpha
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use crate::sampling::seeded_rng;
    use proptest::prelude::*;

    proptest! {
        /// Output has the same shape as the input and is finite
        #[test]
        fn dp_shape_and_finiteness(
            values in proptest::collection::vec(-1e3..1e3f64, 1..200),
            alpha in 0.01..10.0f64,
            seed in any::<u64>()
        ) {
            let scores = Scores::from_vec(values);
            let noisy = differential_privacy(&scores, alpha, &mut seeded_rng(Some(seed))).unwrap();
            prop_assert_eq!(noisy.shape(), scores.shape());
            prop_assert!(noisy.as_slice().iter().all(|x| x.is_finite()));
        }
    }
}
