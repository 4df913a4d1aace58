//! Allotment probability estimation.
//!
//! Two interchangeable strategies behind one trait:
//! - **Heuristic**: inverse of the applicants implied by the live HNI multiple
//! - **Empirical**: observed historical ratios, with a lot-scaled fallback
//!
//! The strategy is chosen at configuration time via [`EstimationMode`]; the
//! lot planner is generic over the trait.

mod empirical;
mod heuristic;

pub use empirical::EmpiricalEstimator;
pub use heuristic::HeuristicEstimator;

use std::sync::Arc;

use sme_common::config::{EstimationMode, ModelConfig};
use thiserror::Error;

use crate::ledger::HistoricalLedger;

/// Estimator input that cannot yield a probability.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    /// Non-positive lot count or negative / non-finite subscription multiple
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Converts an (IPO, lots, HNI multiple) triple into an allotment probability.
pub trait ProbabilityEstimator: Send + Sync {
    /// Strategy name (e.g., "heuristic", "empirical")
    fn name(&self) -> &'static str;

    /// Probability in [0, 1] that an application of `lots` lots is allotted.
    ///
    /// # Arguments
    /// * `ipo_name` - IPO being applied for (empty when none is selected)
    /// * `lots` - Lots applied for, must be > 0
    /// * `subscription` - HNI subscription multiple, must be >= 0
    fn estimate(&self, ipo_name: &str, lots: u32, subscription: f64) -> Result<f64, EstimateError>;
}

/// Reject lot counts of zero.
pub(crate) fn check_lots(lots: u32) -> Result<(), EstimateError> {
    if lots == 0 {
        return Err(EstimateError::InvalidInput("lots must be > 0".into()));
    }
    Ok(())
}

/// Build the estimator selected by `mode`.
pub fn build_estimator(
    mode: EstimationMode,
    model: &ModelConfig,
    ledger: Arc<HistoricalLedger>,
) -> Box<dyn ProbabilityEstimator> {
    match mode {
        EstimationMode::Heuristic => Box::new(HeuristicEstimator::from_config(model)),
        EstimationMode::Empirical => Box::new(EmpiricalEstimator::from_config(model, ledger)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_estimator_by_mode() {
        let model = ModelConfig::default();
        let ledger = Arc::new(HistoricalLedger::seeded());

        let heuristic = build_estimator(EstimationMode::Heuristic, &model, Arc::clone(&ledger));
        assert_eq!(heuristic.name(), "heuristic");

        let empirical = build_estimator(EstimationMode::Empirical, &model, ledger);
        assert_eq!(empirical.name(), "empirical");
        assert_eq!(
            empirical.estimate("Delta Autocorp", 2, 100.0),
            Ok(1.0 / 43.0)
        );
    }

    #[test]
    fn test_zero_lots_rejected_by_both() {
        let model = ModelConfig::default();
        let ledger = Arc::new(HistoricalLedger::seeded());
        for mode in [EstimationMode::Heuristic, EstimationMode::Empirical] {
            let estimator = build_estimator(mode, &model, Arc::clone(&ledger));
            assert!(matches!(
                estimator.estimate("Delta Autocorp", 0, 100.0),
                Err(EstimateError::InvalidInput(_))
            ));
        }
    }
}
