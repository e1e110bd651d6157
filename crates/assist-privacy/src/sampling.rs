//! Numeric utilities shared by the mechanisms
//!
//! # Quantiles
//!
//! [`quantile`] uses linear interpolation between closest ranks:
//!
//! ```text
//! pos = q * (n - 1)
//! Q(q) = x[floor(pos)] + (pos - floor(pos)) * (x[ceil(pos)] - x[floor(pos)])
//! ```
//!
//! For the scores `1, 2, ..., 100` this gives `Q(0.025) = 3.475` and
//! `Q(0.975) = 97.525`.
//!
//! # Laplace sampling
//!
//! Laplace(0, b) is sampled with the inverse CDF:
//!
//! ```text
//! F^(-1)(u) = -b * sign(u) * ln(1 - 2|u|),   u ~ Uniform(-0.5, 0.5)
//! ```

use crate::{PrivacyError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Empirical quantile of `values` with linear interpolation
///
/// `values` does not need to be sorted. `q` must lie in `[0, 1]`.
pub fn quantile(values: &[f64], q: f64) -> Result<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    quantile_sorted(&sorted, q)
}

/// Same as [`quantile`] for an already sorted slice
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> Result<f64> {
    if sorted.is_empty() {
        return Err(PrivacyError::EmptyInput);
    }
    if !(0.0..=1.0).contains(&q) {
        return Err(PrivacyError::InvalidParameter {
            name: "quantile",
            value: q,
            reason: "must lie in [0, 1]",
        });
    }

    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;

    Ok(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// Uniform sample in `[low, high)`; returns `low` when the range is empty
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    low + (high - low) * rng.gen::<f64>()
}

/// Sample from Laplace(0, scale)
///
/// A zero scale yields exactly `0.0`; that is the noise of a release whose
/// truncation bounds collapsed to a point. Callers validate the privacy
/// parameter before the scale is formed, so `scale` is never negative here.
pub fn laplace<R: Rng + ?Sized>(rng: &mut R, scale: f64) -> f64 {
    if scale == 0.0 {
        return 0.0;
    }
    let u = centered_uniform(rng);
    -scale * u.signum() * (1.0 - 2.0 * u.abs()).ln()
}

/// Uniform sample in (-0.5, 0.5), excluding exactly 0
fn centered_uniform<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    loop {
        let centered = rng.gen::<f64>() - 0.5;
        // -0.5 would give ln(0)
        if centered != 0.0 && centered > -0.5 {
            return centered;
        }
    }
}

/// Random source for a release
///
/// A fixed seed makes the release reproducible; `None` draws the seed from
/// OS entropy.
pub fn seeded_rng(seed: Option<u64>) -> ChaCha20Rng {
    match seed {
        Some(s) => ChaCha20Rng::seed_from_u64(s),
        None => ChaCha20Rng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_to_hundred() -> Vec<f64> {
        (1..=100).map(f64::from).collect()
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        let v = one_to_hundred();
        assert!((quantile(&v, 0.025).unwrap() - 3.475).abs() < 1e-9);
        assert!((quantile(&v, 0.975).unwrap() - 97.525).abs() < 1e-9);
        assert_eq!(quantile(&v, 0.0).unwrap(), 1.0);
        assert_eq!(quantile(&v, 1.0).unwrap(), 100.0);
        assert!((quantile(&v, 0.5).unwrap() - 50.5).abs() < 1e-9);
    }

    #[test]
    fn test_quantile_unsorted_input() {
        let v = vec![5.0, 1.0, 4.0, 2.0, 3.0];
        assert_eq!(quantile(&v, 0.5).unwrap(), 3.0);
        assert_eq!(quantile(&v, 0.25).unwrap(), 2.0);
    }

    #[test]
    fn test_quantile_single_element() {
        assert_eq!(quantile(&[7.0], 0.025).unwrap(), 7.0);
        assert_eq!(quantile(&[7.0], 0.975).unwrap(), 7.0);
    }

    #[test]
    fn test_quantile_errors() {
        assert!(matches!(quantile(&[], 0.5), Err(PrivacyError::EmptyInput)));
        assert!(quantile(&[1.0], -0.1).is_err());
        assert!(quantile(&[1.0], 1.5).is_err());
        assert!(quantile(&[1.0], f64::NAN).is_err());
    }

    #[test]
    fn test_uniform_range() {
        let mut rng = seeded_rng(Some(1));
        for _ in 0..1000 {
            let x = uniform(&mut rng, -2.0, 3.0);
            assert!((-2.0..3.0).contains(&x));
        }
        assert_eq!(uniform(&mut rng, 4.0, 4.0), 4.0);
    }

    #[test]
    fn test_laplace_zero_scale() {
        let mut rng = seeded_rng(Some(2));
        assert_eq!(laplace(&mut rng, 0.0), 0.0);
    }

    #[test]
    fn test_laplace_mean_approximately_zero() {
        let mut rng = seeded_rng(Some(3));
        let scale = 1.0;
        let n = 10000;
        let sum: f64 = (0..n).map(|_| laplace(&mut rng, scale)).sum();
        let mean = sum / n as f64;

        // SE = sqrt(2 * scale^2 / n)
        let se = (2.0_f64).sqrt() / (n as f64).sqrt();
        assert!(mean.abs() < 4.0 * se, "Mean {} too far from 0", mean);
    }

    #[test]
    fn test_laplace_variance_approximately_correct() {
        let mut rng = seeded_rng(Some(4));
        let scale = 2.0;
        let n = 10000;
        let samples: Vec<f64> = (0..n).map(|_| laplace(&mut rng, scale)).collect();

        let mean: f64 = samples.iter().sum::<f64>() / n as f64;
        let variance: f64 =
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;

        // Var(Lap(0, b)) = 2b^2
        let expected = 2.0 * scale * scale;
        assert!(
            (variance - expected).abs() / expected < 0.2,
            "Variance {} too far from expected {}",
            variance,
            expected
        );
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let mut a = seeded_rng(Some(42));
        let mut b = seeded_rng(Some(42));
        for _ in 0..10 {
            assert_eq!(laplace(&mut a, 1.0), laplace(&mut b, 1.0));
        }
    }
}
