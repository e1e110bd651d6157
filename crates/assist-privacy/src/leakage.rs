//! Empirical leakage audit for disclosed intervals
//!
//! An observer is assumed to see every interval of a batch and to try each of
//! them against each unknown score. The leakage score is the fraction of all
//! `n * m` (score, interval) pairs, diagonal included, for which
//!
//! ```text
//! lower_j <= y_i < upper_j
//! ```
//!
//! The containment test is half-open even though the mechanism's guarantee is
//! stated for closed intervals; the metric is defined this way and is kept as
//! such.
//!
//! The pairs are never materialized: the audit is a streaming double loop with
//! constant extra memory. With the `parallel` feature the outer loop runs on
//! rayon.

use crate::interval_privacy::Interval;
use crate::{PrivacyError, Result};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Fraction of (score, interval) pairs with half-open containment
///
/// Returns a value in `[0, 1]`. Fails with `EmptyInput` when either side is
/// empty.
pub fn leakage(values: &[f64], intervals: &[Interval]) -> Result<f64> {
    if values.is_empty() || intervals.is_empty() {
        return Err(PrivacyError::EmptyInput);
    }

    let hits = count_contained(values, intervals);
    let pairs = values.len() as f64 * intervals.len() as f64;
    tracing::debug!(pairs, hits, "leakage audit");

    Ok(hits as f64 / pairs)
}

/// Number of intervals that contain `value` (half-open)
fn row_hits(value: f64, intervals: &[Interval]) -> u64 {
    intervals
        .iter()
        .filter(|interval| interval.contains_half_open(value))
        .count() as u64
}

#[cfg(not(feature = "parallel"))]
fn count_contained(values: &[f64], intervals: &[Interval]) -> u64 {
    values.iter().map(|&v| row_hits(v, intervals)).sum()
}

#[cfg(feature = "parallel")]
fn count_contained(values: &[f64], intervals: &[Interval]) -> u64 {
    values.par_iter().map(|&v| row_hits(v, intervals)).sum()
}
