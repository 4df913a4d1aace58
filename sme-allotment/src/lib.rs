//! SME Allotment Library
//!
//! Estimates how likely an SME IPO application of a given lot count is to be
//! allotted, and which lot count buys the most expected shares per rupee under
//! a capital budget.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐   ┌──────────────────────┐
//! │  SubscriptionSource  │   │   HistoricalLedger   │
//! │  (live HNI multiple) │   │ (observed ratios)    │
//! └──────────┬───────────┘   └──────────┬───────────┘
//!            └────────────┬─────────────┘
//!                ┌────────▼────────┐
//!                │ Probability     │  heuristic | empirical
//!                │ Estimator       │
//!                └────────┬────────┘
//!                ┌────────▼────────┐   ┌─────────────────────┐
//!                │   LotPlanner    │──▶│ ConfidenceClassifier│
//!                └────────┬────────┘   └─────────────────────┘
//!                         ▼
//!                  AllotmentReport
//! ```
//!
//! # Key Concepts
//!
//! ## HNI multiple
//! Oversubscription of the non-institutional category. Higher multiples mean
//! more applicants per share on offer and worse odds.
//!
//! ## Failing open
//! The live source never errors: when the report page is unreachable the
//! engine falls back to a default multiple and attaches an advisory.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod confidence;
pub mod estimator;
pub mod ledger;
pub mod planner;
pub mod report;
pub mod source;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sme_common::config::{Config, EstimationMode};
use sme_common::validation::Validate;

pub use confidence::ConfidenceBand;
pub use estimator::{
    build_estimator, EmpiricalEstimator, EstimateError, HeuristicEstimator, ProbabilityEstimator,
};
pub use ledger::{HistoricalLedger, HistoricalObservation};
pub use planner::{LotPlanner, PredictionRow};
pub use source::{ChittorgarhSource, SourceError, SubscriptionRecord, SubscriptionSource};

// ============================================================================
// Request / Report
// ============================================================================

/// Inputs from the presentation layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllotmentRequest {
    /// Capital available for the application, in rupees
    pub capital_budget: u64,
    /// Manual HNI multiple; takes precedence over live data
    #[serde(default)]
    pub subscription_override: Option<f64>,
    /// Selected IPO; empty means none selected
    #[serde(default)]
    pub selected_ipo: String,
    /// Strategy override; `None` uses the configured mode
    #[serde(default)]
    pub mode: Option<EstimationMode>,
}

/// Where the effective HNI multiple came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionOrigin {
    /// Supplied by the caller
    Override,
    /// Read from the live report
    Live,
    /// Configured default
    Default,
}

/// Non-fatal conditions the presentation layer should surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// Live report could not be loaded; the default multiple was used
    LiveDataUnavailable { default_subscription: f64 },
    /// The selected IPO is not in the live report
    SelectedIpoNotLive { ipo: String },
    /// Empirical mode without ledger data for the IPO; fallback ratios used
    NoHistoricalData { ipo: String },
    /// The subscription multiple cannot be used for estimation
    InvalidSubscription { value: f64 },
    /// No permitted lot count fits the budget
    NoEligibleLots {
        capital_budget: u64,
        minimum_capital: Option<u64>,
    },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LiveDataUnavailable {
                default_subscription,
            } => write!(
                f,
                "Live HNI data could not be loaded; using {}x as the HNI multiple",
                default_subscription
            ),
            Self::SelectedIpoNotLive { ipo } => {
                write!(f, "{} is not in the live subscription report", ipo)
            }
            Self::NoHistoricalData { ipo } => write!(
                f,
                "No historical allotment data for {}; estimates use the lot-scaled fallback",
                if ipo.is_empty() { "the selected IPO" } else { ipo }
            ),
            Self::InvalidSubscription { value } => write!(
                f,
                "HNI multiple {} is invalid; it must be a finite value >= 0",
                value
            ),
            Self::NoEligibleLots {
                capital_budget,
                minimum_capital,
            } => match minimum_capital {
                Some(min) => write!(
                    f,
                    "No data for this budget: {} is below the {} needed for the smallest application",
                    report::format_rupees(*capital_budget),
                    report::format_rupees(*min)
                ),
                None => write!(f, "No data for this budget"),
            },
        }
    }
}

/// Engine output for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllotmentReport {
    pub generated_at: DateTime<Utc>,
    pub mode: EstimationMode,
    /// IPO the table was computed for (may be empty)
    pub ipo_name: String,
    /// Effective HNI multiple
    pub subscription: f64,
    pub subscription_origin: SubscriptionOrigin,
    /// Grey market premium per share, when quoted
    pub grey_market_premium: Option<u32>,
    pub capital_budget: u64,
    /// Decision table, ascending by lots
    pub rows: Vec<PredictionRow>,
    /// Raw live records, for populating a selection list
    pub live_subscriptions: Vec<SubscriptionRecord>,
    /// IPOs with historical data
    pub ledger_ipos: Vec<String>,
    pub advisories: Vec<Advisory>,
}

// ============================================================================
// Service
// ============================================================================

/// Allotment estimation service.
pub struct AllotmentService {
    config: Config,
    source: Box<dyn SubscriptionSource>,
    ledger: Arc<HistoricalLedger>,
    planner: LotPlanner,
}

impl AllotmentService {
    /// Create a service reading live data from the configured report page.
    pub fn new(config: Config) -> sme_common::Result<Self> {
        config.validate()?;
        let source = ChittorgarhSource::from_config(&config.source)?;
        Self::with_source(config, Box::new(source))
    }

    /// Create a service with a custom live source.
    pub fn with_source(
        config: Config,
        source: Box<dyn SubscriptionSource>,
    ) -> sme_common::Result<Self> {
        config.validate()?;
        let planner = LotPlanner::new(config.planner.clone());

        Ok(Self {
            config,
            source,
            ledger: Arc::new(HistoricalLedger::seeded()),
            planner,
        })
    }

    /// Replace the historical ledger.
    pub fn with_ledger(mut self, ledger: HistoricalLedger) -> Self {
        self.ledger = Arc::new(ledger);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ledger(&self) -> &HistoricalLedger {
        &self.ledger
    }

    /// One live fetch; empty when the report is unavailable.
    pub fn live_subscriptions(&self) -> Vec<SubscriptionRecord> {
        self.source.fetch_live_subscriptions()
    }

    /// IPOs with historical data.
    pub fn ledger_ipos(&self) -> Vec<String> {
        self.ledger.ipo_names()
    }

    /// Estimator for `mode` using this service's model constants and ledger.
    pub fn estimator(&self, mode: EstimationMode) -> Box<dyn ProbabilityEstimator> {
        build_estimator(mode, &self.config.model, Arc::clone(&self.ledger))
    }

    /// Build the decision table for a request.
    ///
    /// Performs exactly one live fetch. Every failure degrades to a default
    /// value plus an advisory; this never errors.
    pub fn predict(&self, request: &AllotmentRequest) -> AllotmentReport {
        let mode = request.mode.unwrap_or(self.config.model.mode);
        let live = self.live_subscriptions();
        let mut advisories = Vec::new();

        let (ipo_name, subscription, origin) =
            self.resolve_subscription(request, &live, &mut advisories);

        // Empirical odds come from the ledger; only the heuristic needs a usable multiple.
        let usable = mode == EstimationMode::Empirical
            || (subscription.is_finite() && subscription >= 0.0);
        let rows = if usable {
            let estimator = self.estimator(mode);
            self.planner
                .plan(request.capital_budget, estimator.as_ref(), &ipo_name, subscription)
        } else {
            advisories.push(Advisory::InvalidSubscription {
                value: subscription,
            });
            Vec::new()
        };

        if mode == EstimationMode::Empirical && !self.ledger.has_data_for(&ipo_name) {
            advisories.push(Advisory::NoHistoricalData {
                ipo: ipo_name.clone(),
            });
        }

        let affordable = self
            .planner
            .minimum_capital()
            .is_some_and(|min| min <= request.capital_budget);
        if !affordable {
            advisories.push(Advisory::NoEligibleLots {
                capital_budget: request.capital_budget,
                minimum_capital: self.planner.minimum_capital(),
            });
        }

        tracing::info!(
            mode = %mode,
            ipo = %ipo_name,
            subscription,
            origin = ?origin,
            capital_budget = request.capital_budget,
            rows = rows.len(),
            advisories = advisories.len(),
            "Allotment prediction complete"
        );

        AllotmentReport {
            generated_at: Utc::now(),
            mode,
            grey_market_premium: self.ledger.grey_market_premium(&ipo_name),
            ipo_name,
            subscription,
            subscription_origin: origin,
            capital_budget: request.capital_budget,
            rows,
            live_subscriptions: live,
            ledger_ipos: self.ledger_ipos(),
            advisories,
        }
    }

    /// Pick the IPO and HNI multiple the table is computed for.
    ///
    /// Order: caller override, live record of the selected IPO, first live
    /// record when nothing is selected, configured default.
    fn resolve_subscription(
        &self,
        request: &AllotmentRequest,
        live: &[SubscriptionRecord],
        advisories: &mut Vec<Advisory>,
    ) -> (String, f64, SubscriptionOrigin) {
        let selected = request.selected_ipo.trim();
        let default_subscription = self.config.model.default_subscription;

        let live_match = if selected.is_empty() {
            live.first()
        } else {
            live.iter().find(|r| r.matches(selected))
        };

        if !selected.is_empty() && live_match.is_none() && !live.is_empty() {
            advisories.push(Advisory::SelectedIpoNotLive {
                ipo: selected.to_string(),
            });
        }

        let ipo_name = live_match
            .map(|record| record.ipo_name.clone())
            .unwrap_or_else(|| selected.to_string());

        if let Some(value) = request.subscription_override {
            return (ipo_name, value, SubscriptionOrigin::Override);
        }

        match live_match {
            Some(record) => (ipo_name, record.hni_multiple, SubscriptionOrigin::Live),
            None => {
                if live.is_empty() {
                    advisories.push(Advisory::LiveDataUnavailable {
                        default_subscription,
                    });
                }
                tracing::info!(
                    ipo = %ipo_name,
                    default_subscription,
                    "No live multiple, using default"
                );
                (ipo_name, default_subscription, SubscriptionOrigin::Default)
            }
        }
    }
}
