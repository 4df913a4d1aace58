//! Capital-constrained lot planner.
//!
//! Walks the permitted lot counts, drops those the budget cannot fund, and
//! prices each remaining application in expected shares.

use serde::{Deserialize, Serialize};
use sme_common::config::PlannerConfig;
use tracing::debug;

use crate::confidence::ConfidenceBand;
use crate::estimator::ProbabilityEstimator;

/// One line of the decision table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    /// Lots applied for
    pub lots: u32,
    /// Probability of allotment, in [0, 1]
    pub allotment_probability: f64,
    /// Qualitative band of `allotment_probability`
    pub confidence_band: ConfidenceBand,
    /// `lots * lot_price`, never above the budget
    pub capital_required: u64,
    /// `allotment_probability * share_multiplier`
    pub expected_shares: f64,
    /// `capital_required / expected_shares`; absent when no shares are expected
    pub cost_per_expected_share: Option<f64>,
}

impl PredictionRow {
    /// Allotment probability as a percentage rounded to two decimals.
    pub fn allotment_percent(&self) -> f64 {
        (self.allotment_probability * 10_000.0).round() / 100.0
    }
}

/// Builds the decision table for a capital budget.
#[derive(Debug, Clone, Default)]
pub struct LotPlanner {
    config: PlannerConfig,
}

impl LotPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Capital needed for `lots` lots; `None` on overflow.
    pub fn capital_for(&self, lots: u32) -> Option<u64> {
        u64::from(lots).checked_mul(self.config.lot_price)
    }

    /// Capital needed for the smallest permitted application.
    pub fn minimum_capital(&self) -> Option<u64> {
        self.capital_for(self.config.min_lots)
    }

    /// Decision table for `capital_budget`, ascending by lot count.
    ///
    /// Lot counts whose capital exceeds the budget are omitted, as are lot
    /// counts the estimator rejects. An empty result means no permitted lot
    /// count is affordable.
    pub fn plan<E>(
        &self,
        capital_budget: u64,
        estimator: &E,
        ipo_name: &str,
        subscription: f64,
    ) -> Vec<PredictionRow>
    where
        E: ProbabilityEstimator + ?Sized,
    {
        let share_multiplier = f64::from(self.config.share_multiplier);
        let mut rows = Vec::new();

        for lots in self.config.min_lots..=self.config.max_lots {
            let capital_required = match self.capital_for(lots) {
                Some(capital) if capital <= capital_budget => capital,
                // Capital only grows with lots; nothing further fits.
                _ => break,
            };

            let probability = match estimator.estimate(ipo_name, lots, subscription) {
                Ok(p) => p,
                Err(e) => {
                    debug!(
                        estimator = estimator.name(),
                        lots,
                        error = %e,
                        "Skipping lot count without a valid estimate"
                    );
                    continue;
                }
            };

            let expected_shares = probability * share_multiplier;
            let cost_per_expected_share = if expected_shares > 0.0 {
                Some(capital_required as f64 / expected_shares).filter(|c| c.is_finite())
            } else {
                None
            };

            rows.push(PredictionRow {
                lots,
                allotment_probability: probability,
                confidence_band: ConfidenceBand::classify(probability),
                capital_required,
                expected_shares,
                cost_per_expected_share,
            });
        }

        debug!(
            estimator = estimator.name(),
            capital_budget,
            rows = rows.len(),
            "Lot plan built"
        );

        rows
    }
}
