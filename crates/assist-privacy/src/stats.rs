//! Running per-feature mean and standard deviation
//!
//! Batches arrive one at a time; the running moments are merged with each
//! batch's moments using the pooled formulas (population std):
//!
//! ```text
//! mean' = m/(m+n) * mean + n/(m+n) * mean_b
//! var'  = m/(m+n) * std^2 + n/(m+n) * std_b^2 + m*n/(m+n)^2 * (mean - mean_b)^2
//! ```
//!
//! The resulting statistics are plain numbers and serialize to JSON so they
//! can be stored next to a model checkpoint.

use crate::{ensure_finite, PrivacyError, Result, Scores};
use serde::{Deserialize, Serialize};

/// Running statistics over rows of `n_features` values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningStats {
    n_features: usize,
    count: u64,
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl RunningStats {
    pub fn new(n_features: usize) -> Self {
        RunningStats {
            n_features,
            count: 0,
            mean: vec![0.0; n_features],
            std: vec![0.0; n_features],
        }
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Rows seen so far
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn std(&self) -> &[f64] {
        &self.std
    }

    /// Merge a batch of shape `[rows, n_features]`
    ///
    /// A one-dimensional batch is read as `rows` values of a single feature.
    pub fn update(&mut self, batch: &Scores) -> Result<()> {
        let rows = self.rows_of(batch)?;
        if rows == 0 {
            return Err(PrivacyError::EmptyInput);
        }
        ensure_finite(batch.as_slice())?;

        let (batch_mean, batch_std) = column_moments(batch.as_slice(), rows, self.n_features);

        let m = self.count as f64;
        let n = rows as f64;
        let total = m + n;
        for k in 0..self.n_features {
            let delta = self.mean[k] - batch_mean[k];
            let var = m / total * self.std[k].powi(2)
                + n / total * batch_std[k].powi(2)
                + m * n / (total * total) * delta * delta;
            self.mean[k] = m / total * self.mean[k] + n / total * batch_mean[k];
            self.std[k] = var.sqrt();
        }
        self.count += rows as u64;
        Ok(())
    }

    /// Standardize a batch with the running statistics
    ///
    /// Features whose std is zero are only centered.
    pub fn normalize(&self, batch: &Scores) -> Result<Scores> {
        self.rows_of(batch)?;
        let normalized = batch
            .as_slice()
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                let k = i % self.n_features;
                let centered = x - self.mean[k];
                if self.std[k] > 0.0 {
                    centered / self.std[k]
                } else {
                    centered
                }
            })
            .collect();
        Ok(batch.with_data(normalized))
    }

    fn rows_of(&self, batch: &Scores) -> Result<usize> {
        if self.n_features == 0 {
            return Err(PrivacyError::InvalidParameter {
                name: "n_features",
                value: 0.0,
                reason: "must be at least 1",
            });
        }
        // Deserialized state may disagree with itself
        for moments in [&self.mean, &self.std] {
            if moments.len() != self.n_features {
                return Err(PrivacyError::ShapeMismatch {
                    expected: self.n_features,
                    got: moments.len(),
                });
            }
        }
        match batch.shape() {
            [rows] if self.n_features == 1 => Ok(*rows),
            [rows, features] if *features == self.n_features => Ok(*rows),
            shape => Err(PrivacyError::ShapeMismatch {
                expected: self.n_features,
                got: shape.last().copied().unwrap_or(0),
            }),
        }
    }
}

/// Per-column mean and population std of a row-major `[rows, cols]` buffer
fn column_moments(data: &[f64], rows: usize, cols: usize) -> (Vec<f64>, Vec<f64>) {
    let mut mean = vec![0.0; cols];
    for row in data.chunks_exact(cols) {
        for (acc, x) in mean.iter_mut().zip(row) {
            *acc += x;
        }
    }
    for acc in mean.iter_mut() {
        *acc /= rows as f64;
    }

    let mut var = vec![0.0; cols];
    for row in data.chunks_exact(cols) {
        for ((acc, x), mu) in var.iter_mut().zip(row).zip(&mean) {
            *acc += (x - mu).powi(2);
        }
    }
    let std = var.into_iter().map(|v| (v / rows as f64).sqrt()).collect();
    (mean, std)
}
