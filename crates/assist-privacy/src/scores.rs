//! Score tensors
//!
//! A [`Scores`] value is a flat row-major buffer together with the shape the
//! caller handed in. Every mechanism works on the flat buffer and rebuilds its
//! output with the original shape, so there is no broadcasting anywhere in the
//! crate.

use crate::{PrivacyError, Result};
use serde::{Deserialize, Serialize};

/// Real-valued scores of arbitrary shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScoresDocument")]
pub struct Scores {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl Scores {
    /// Create a one-dimensional score vector
    pub fn from_vec(data: Vec<f64>) -> Self {
        Scores {
            shape: vec![data.len()],
            data,
        }
    }

    /// Create scores with an explicit shape
    ///
    /// The product of `shape` must equal `data.len()`.
    pub fn from_shape(shape: Vec<usize>, data: Vec<f64>) -> Result<Self> {
        let expected = element_count(&shape);
        if expected != data.len() {
            return Err(PrivacyError::ShapeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Scores { shape, data })
    }

    /// Flat row-major view of the scores
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consume and return the flat buffer
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Same data under a different shape
    pub fn reshape(self, shape: Vec<usize>) -> Result<Self> {
        Scores::from_shape(shape, self.data)
    }

    /// Build a new tensor of the same shape from a flat buffer
    ///
    /// Only used internally where `data` is produced element-for-element
    /// from `self`, so the lengths always agree.
    pub(crate) fn with_data(&self, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), self.data.len());
        Scores {
            shape: self.shape.clone(),
            data,
        }
    }

    /// Parse a JSON score document
    ///
    /// Accepts either `{"shape": [...], "data": [...]}` or a bare array of
    /// numbers, which is read as a one-dimensional vector.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Wire form of [`Scores`]; the shape is checked on conversion
#[derive(Deserialize)]
#[serde(untagged)]
enum ScoresDocument {
    Tensor { shape: Vec<usize>, data: Vec<f64> },
    Flat(Vec<f64>),
}

impl TryFrom<ScoresDocument> for Scores {
    type Error = PrivacyError;

    fn try_from(doc: ScoresDocument) -> Result<Self> {
        match doc {
            ScoresDocument::Tensor { shape, data } => Scores::from_shape(shape, data),
            ScoresDocument::Flat(data) => Ok(Scores::from_vec(data)),
        }
    }
}

impl From<Vec<f64>> for Scores {
    fn from(data: Vec<f64>) -> Self {
        Scores::from_vec(data)
    }
}

/// Number of elements described by a shape (1 for a zero-dimensional shape)
pub(crate) fn element_count(shape: &[usize]) -> usize {
    shape.iter().product()
}
