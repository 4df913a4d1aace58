//! Empirical estimator backed by the historical ledger.

use std::sync::Arc;

use sme_common::config::ModelConfig;
use tracing::debug;

use super::{check_lots, EstimateError, ProbabilityEstimator};
use crate::ledger::HistoricalLedger;

/// Observed ratio for the exact (IPO, lots) pair, else `1 / (lots * fallback_divisor)`.
#[derive(Debug, Clone)]
pub struct EmpiricalEstimator {
    ledger: Arc<HistoricalLedger>,
    fallback_divisor: f64,
}

impl EmpiricalEstimator {
    pub fn new(ledger: Arc<HistoricalLedger>, fallback_divisor: f64) -> Self {
        Self {
            ledger,
            fallback_divisor,
        }
    }

    pub fn from_config(model: &ModelConfig, ledger: Arc<HistoricalLedger>) -> Self {
        Self::new(ledger, model.fallback_divisor)
    }

    /// Probability used when the ledger has no matching observation.
    pub fn fallback(&self, lots: u32) -> f64 {
        (1.0 / (f64::from(lots) * self.fallback_divisor)).min(1.0)
    }
}

impl ProbabilityEstimator for EmpiricalEstimator {
    fn name(&self) -> &'static str {
        "empirical"
    }

    fn estimate(&self, ipo_name: &str, lots: u32, _subscription: f64) -> Result<f64, EstimateError> {
        check_lots(lots)?;

        match self.ledger.probability_for(ipo_name, lots) {
            Some(p) => Ok(p.min(1.0)),
            None => {
                debug!(ipo = %ipo_name, lots, "No historical match, using fallback ratio");
                Ok(self.fallback(lots))
            }
        }
    }
}
