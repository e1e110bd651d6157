//! Privacy configuration supplied by the orchestration layer
//!
//! ```json
//! { "mode": "ip", "param": 0.5, "seed": 17 }
//! ```
//!
//! `param` defaults to 1.0 and `seed` is optional.

use crate::dispatch::{perturb_with_mode, PrivacyMode};
use crate::{ensure_positive, PrivacyError, Result, Scores};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_param() -> f64 {
    1.0
}

/// Mechanism choice and parameter for one release
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConfigDocument")]
pub struct PrivacyConfig {
    pub mode: PrivacyMode,
    /// `alpha` for DP, `thresh` for IP
    pub param: f64,
    /// Fixed seed for reproducible releases
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Wire form of [`PrivacyConfig`]; the mode tag is parsed on conversion
#[derive(Deserialize)]
struct ConfigDocument {
    mode: String,
    #[serde(default = "default_param")]
    param: f64,
    #[serde(default)]
    seed: Option<u64>,
}

impl TryFrom<ConfigDocument> for PrivacyConfig {
    type Error = PrivacyError;

    fn try_from(doc: ConfigDocument) -> Result<Self> {
        Ok(PrivacyConfig {
            mode: doc.mode.parse()?,
            param: doc.param,
            seed: doc.seed,
        })
    }
}

impl PrivacyConfig {
    pub fn new(mode: PrivacyMode, param: f64) -> Self {
        PrivacyConfig {
            mode,
            param,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the parameter without drawing any randomness
    pub fn validate(&self) -> Result<()> {
        ensure_positive(self.mode.param_name(), self.param)
    }

    /// Parse and validate a JSON configuration
    ///
    /// A mode other than `"dp"` or `"ip"` is reported as `UnsupportedMode`.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let doc: ConfigDocument = serde_json::from_str(text)?;
        let config = PrivacyConfig::try_from(doc)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Perturb `scores` according to this configuration
    pub fn apply<R: Rng + ?Sized>(&self, scores: &Scores, rng: &mut R) -> Result<Scores> {
        perturb_with_mode(scores, self.mode, self.param, rng)
    }
}
