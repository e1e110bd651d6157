//! Mechanism selection by mode tag
//!
//! `perturb(scores, "dp", alpha, rng)` and `perturb(scores, "ip", thresh, rng)`
//! return only the perturbed scores. Interval sets and leakage are available
//! from [`crate::interval_privacy`] directly; the dispatcher skips the
//! quadratic audit since it would discard the result.

use crate::differential_privacy::differential_privacy;
use crate::interval_privacy::release_intervals;
use crate::{PrivacyError, Result, Scores};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which perturbation mechanism to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum PrivacyMode {
    /// Laplace mechanism, parameter is `alpha`
    Dp,
    /// Interval privacy, parameter is `thresh`
    Ip,
}

impl PrivacyMode {
    /// Tag used on the wire and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            PrivacyMode::Dp => "dp",
            PrivacyMode::Ip => "ip",
        }
    }

    /// Name of the parameter this mode consumes
    pub fn param_name(&self) -> &'static str {
        match self {
            PrivacyMode::Dp => "alpha",
            PrivacyMode::Ip => "thresh",
        }
    }
}

impl FromStr for PrivacyMode {
    type Err = PrivacyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dp" => Ok(PrivacyMode::Dp),
            "ip" => Ok(PrivacyMode::Ip),
            other => Err(PrivacyError::UnsupportedMode(other.to_string())),
        }
    }
}

impl TryFrom<String> for PrivacyMode {
    type Error = PrivacyError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for PrivacyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Perturb `scores` with the mechanism named by `mode`
pub fn perturb<R: Rng + ?Sized>(
    scores: &Scores,
    mode: &str,
    param: f64,
    rng: &mut R,
) -> Result<Scores> {
    let mode: PrivacyMode = mode.parse()?;
    perturb_with_mode(scores, mode, param, rng)
}

/// Typed variant of [`perturb`]
pub fn perturb_with_mode<R: Rng + ?Sized>(
    scores: &Scores,
    mode: PrivacyMode,
    param: f64,
    rng: &mut R,
) -> Result<Scores> {
    match mode {
        PrivacyMode::Dp => differential_privacy(scores, param, rng),
        PrivacyMode::Ip => release_intervals(scores, param, rng).map(|(perturbed, _)| perturbed),
    }
}
