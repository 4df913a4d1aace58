//! Live subscription data.
//!
//! A [`SubscriptionSource`] fetches the current HNI subscription multiples for
//! SME IPOs that are open for bidding. Sources fail open: any network or parse
//! failure surfaces as an empty record list, never as an error to the caller.
//!
//! # Data Sources
//! - **Chittorgarh** (default): the public "latest SME IPO subscription" report page

mod chittorgarh;

pub use chittorgarh::{parse_subscription_table, ChittorgarhSource, ColumnLayout};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Core Data Types
// ============================================================================

/// Current HNI subscription multiple for one open IPO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// IPO name as shown in the report
    pub ipo_name: String,
    /// HNI (non-institutional) subscription multiple, always > 0
    pub hni_multiple: f64,
}

impl SubscriptionRecord {
    /// Build a record, rejecting empty names and non-positive multiples.
    pub fn new(ipo_name: impl Into<String>, hni_multiple: f64) -> Option<Self> {
        let ipo_name = ipo_name.into();
        if ipo_name.trim().is_empty() || !hni_multiple.is_finite() || hni_multiple <= 0.0 {
            return None;
        }
        Some(Self {
            ipo_name,
            hni_multiple,
        })
    }

    /// Case-insensitive name match, ignoring surrounding whitespace.
    pub fn matches(&self, name: &str) -> bool {
        self.ipo_name.trim().eq_ignore_ascii_case(name.trim())
    }
}

// ============================================================================
// Source Error
// ============================================================================

/// Reasons a live fetch produced no data.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Connection failure, timeout, or unreadable body
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("HTTP status {0}")]
    Status(u16),

    /// Page has no `<table>`
    #[error("No table found in report page")]
    MissingTable,

    /// Table structure could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),
}

// ============================================================================
// Subscription Source Trait
// ============================================================================

/// Provider of live HNI subscription multiples.
pub trait SubscriptionSource: Send + Sync {
    /// Source name used in logs (e.g., "chittorgarh")
    fn name(&self) -> &'static str;

    /// Perform exactly one fetch attempt.
    fn try_fetch(&self) -> Result<Vec<SubscriptionRecord>, SourceError>;

    /// Fetch live subscriptions, degrading every failure to an empty list.
    fn fetch_live_subscriptions(&self) -> Vec<SubscriptionRecord> {
        match self.try_fetch() {
            Ok(records) => {
                tracing::debug!(
                    source = self.name(),
                    records = records.len(),
                    "Fetched live subscriptions"
                );
                records
            }
            Err(e) => {
                tracing::warn!(
                    source = self.name(),
                    error = %e,
                    "Live subscription data unavailable"
                );
                Vec::new()
            }
        }
    }
}
