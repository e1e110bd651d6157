//! Assist Privacy - score perturbation for assisted learning
//!
//! Organizations taking part in an assisted-learning round exchange model
//! outputs instead of raw data. Before a score vector leaves an organization it
//! is passed through one of two perturbation mechanisms:
//!
//! - **Differential privacy (DP)**: the scores are truncated to a robust range
//!   and Laplace noise calibrated to that range is added.
//! - **Interval privacy (IP)**: every score is replaced by a point derived from
//!   a random per-element threshold, and the side of the threshold the score
//!   fell on is disclosed as an interval. The quality of the release is audited
//!   with an empirical leakage score.
//!
//! Both mechanisms take an explicit random source, so a release is reproducible
//! under a fixed seed and calls can run concurrently without shared state.
//!
//! # Example
//!
//! ```rust
//! use assist_privacy::{differential_privacy, interval_privacy, seeded_rng, Scores};
//!
//! let scores = Scores::from_vec((1..=100).map(f64::from).collect());
//! let mut rng = seeded_rng(Some(7));
//!
//! let noisy = differential_privacy(&scores, 1.0, &mut rng).unwrap();
//! assert_eq!(noisy.shape(), scores.shape());
//!
//! let release = interval_privacy(&scores, 1.0, &mut rng).unwrap();
//! println!("IP leakage: {:.3}", release.leakage);
//! ```

pub mod config;
pub mod differential_privacy;
pub mod dispatch;
pub mod interval_privacy;
pub mod leakage;
pub mod sampling;
pub mod scores;
pub mod stats;
pub mod truncate;

// Re-export commonly used types for convenience
pub use config::PrivacyConfig;
pub use differential_privacy::{differential_privacy, DEFAULT_ALPHA};
pub use dispatch::{perturb, perturb_with_mode, PrivacyMode};
pub use interval_privacy::{
    interval_privacy, release_intervals, Interval, IntervalRelease, Intervals, DEFAULT_THRESH,
};
pub use leakage::leakage;
pub use sampling::{laplace, quantile, seeded_rng, uniform};
pub use scores::Scores;
pub use stats::RunningStats;
pub use truncate::{truncate, Truncated, TruncationBounds, LOWER_QUANTILE, UPPER_QUANTILE};

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, PrivacyError>;

/// Errors that can occur while perturbing or auditing scores
#[derive(Debug, thiserror::Error)]
pub enum PrivacyError {
    /// A mechanism or utility parameter is out of range
    #[error("invalid {name} {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    /// Dispatcher was given a mode other than "dp" or "ip"
    #[error("unsupported privacy mode '{0}' (expected \"dp\" or \"ip\")")]
    UnsupportedMode(String),
    /// Empty score vector or interval set
    #[error("empty input")]
    EmptyInput,
    /// NaN or infinite score
    #[error("non-finite score {value} at index {index}")]
    NonFiniteScore { index: usize, value: f64 },
    /// Shape does not agree with the data it describes
    #[error("shape mismatch: expected {expected} elements, got {got}")]
    ShapeMismatch { expected: usize, got: usize },
    /// Reading a configuration or score document failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Parsing a configuration or score document failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PrivacyError {
    /// True for errors caused by the caller's privacy parameter
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, PrivacyError::InvalidParameter { .. })
    }
}

/// Reject NaN and infinite scores before any percentile is taken
pub(crate) fn ensure_finite(values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(PrivacyError::NonFiniteScore {
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

/// Reject parameters that are not strictly positive finite numbers
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(PrivacyError::InvalidParameter {
            name,
            value,
            reason: "must be a finite number",
        });
    }
    if value <= 0.0 {
        return Err(PrivacyError::InvalidParameter {
            name,
            value,
            reason: "must be positive",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_finite_reports_first_bad_index() {
        let err = ensure_finite(&[1.0, 2.0, f64::NAN, f64::INFINITY]).unwrap_err();
        match err {
            PrivacyError::NonFiniteScore { index, .. } => assert_eq!(index, 2),
            other => panic!("unexpected error: {other}"),
        }
        assert!(ensure_finite(&[0.0, -1.5, 3.0]).is_ok());
    }

    #[test]
    fn test_ensure_positive() {
        assert!(ensure_positive("alpha", 0.5).is_ok());
        assert!(ensure_positive("alpha", 0.0).unwrap_err().is_invalid_parameter());
        assert!(ensure_positive("alpha", -1.0).unwrap_err().is_invalid_parameter());
        assert!(ensure_positive("alpha", f64::NAN).unwrap_err().is_invalid_parameter());
        assert!(ensure_positive("alpha", f64::INFINITY).unwrap_err().is_invalid_parameter());
    }

    #[test]
    fn test_error_display() {
        let err = PrivacyError::UnsupportedMode("xyz".to_string());
        assert!(err.to_string().contains("xyz"));

        let err = PrivacyError::InvalidParameter {
            name: "thresh",
            value: 0.0,
            reason: "must be positive",
        };
        assert_eq!(err.to_string(), "invalid thresh 0: must be positive");
    }
}
