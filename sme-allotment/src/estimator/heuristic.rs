//! Live-driven heuristic estimator.
//!
//! ```text
//! expected_applicants = subscription * base_factor * lots
//! probability         = min(1, 1 / expected_applicants)
//! ```
//!
//! Larger lot requests compete against proportionally more capital, so the
//! probability never increases with `lots` for a fixed multiple.

use sme_common::config::ModelConfig;

use super::{check_lots, EstimateError, ProbabilityEstimator};

/// Inverse-applicants heuristic.
#[derive(Debug, Clone)]
pub struct HeuristicEstimator {
    /// Applicants implied per unit of multiple per lot
    base_factor: f64,
}

impl Default for HeuristicEstimator {
    fn default() -> Self {
        Self::from_config(&ModelConfig::default())
    }
}

impl HeuristicEstimator {
    pub fn new(base_factor: f64) -> Self {
        Self { base_factor }
    }

    pub fn from_config(model: &ModelConfig) -> Self {
        Self::new(model.base_factor)
    }

    /// Competing applicants implied by the multiple at this lot count.
    pub fn expected_applicants(&self, lots: u32, subscription: f64) -> f64 {
        subscription * self.base_factor * f64::from(lots)
    }
}

impl ProbabilityEstimator for HeuristicEstimator {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn estimate(&self, _ipo_name: &str, lots: u32, subscription: f64) -> Result<f64, EstimateError> {
        check_lots(lots)?;
        if !subscription.is_finite() || subscription < 0.0 {
            return Err(EstimateError::InvalidInput(format!(
                "subscription multiple must be a finite value >= 0, got {}",
                subscription
            )));
        }

        let applicants = self.expected_applicants(lots, subscription);
        if applicants <= 0.0 {
            // No competing demand: a full allotment is certain.
            return Ok(1.0);
        }

        Ok((1.0 / applicants).min(1.0))
    }
}
