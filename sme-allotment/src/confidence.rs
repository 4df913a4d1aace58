//! Qualitative confidence bands for allotment probabilities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lower bound (inclusive) of the High band.
pub const HIGH_THRESHOLD: f64 = 0.5;

/// Lower bound (inclusive) of the Medium band.
pub const MEDIUM_THRESHOLD: f64 = 0.2;

/// Coarse confidence in an allotment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceBand {
    /// p >= 0.5
    High,
    /// 0.2 <= p < 0.5
    Medium,
    /// 0 < p < 0.2
    Low,
    /// p == 0
    None,
}

impl ConfidenceBand {
    /// Classify a probability. Boundaries belong to the higher band.
    ///
    /// Total over all floats: NaN and non-positive values map to `None`,
    /// values above 1 map to `High`.
    pub fn classify(probability: f64) -> Self {
        if probability.is_nan() || probability <= 0.0 {
            Self::None
        } else if probability >= HIGH_THRESHOLD {
            Self::High
        } else if probability >= MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::None => "None",
        }
    }
}

impl fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
