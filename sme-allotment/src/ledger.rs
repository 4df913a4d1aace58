//! Historical allotment ledger.
//!
//! Observed allotment outcomes from past SME issues: for a given IPO and lot
//! count, one in `applicant_count` applicants received shares. The ledger is
//! immutable after construction and safe to share across threads.

use serde::{Deserialize, Serialize};

/// One observed allotment outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalObservation {
    /// IPO name
    pub ipo_name: String,
    /// Lots applied for
    pub lot_size: u32,
    /// Applicants competing per successful allotment at this lot size
    pub applicant_count: u32,
}

impl HistoricalObservation {
    /// Build an observation; zero lot sizes or applicant counts are rejected.
    pub fn new(ipo_name: impl Into<String>, lot_size: u32, applicant_count: u32) -> Option<Self> {
        if lot_size == 0 || applicant_count == 0 {
            return None;
        }
        Some(Self {
            ipo_name: ipo_name.into(),
            lot_size,
            applicant_count,
        })
    }

    /// Observed allotment ratio, `1 / applicant_count`, in (0, 1].
    pub fn ratio(&self) -> f64 {
        1.0 / f64::from(self.applicant_count)
    }
}

/// Seed observations: (IPO, lots, applicants).
const SEED_OBSERVATIONS: &[(&str, u32, u32)] = &[
    ("Delta Autocorp", 2, 43),
    ("Delta Autocorp", 10, 6),
    ("Rikhav Securities", 2, 122),
    ("Rikhav Securities", 10, 6),
    ("CapitalNumbers", 2, 110),
    ("CapitalNumbers", 10, 6),
];

/// Grey market premium (rupees per share) quoted for the seeded issues.
const SEED_PREMIUMS: &[(&str, u32)] = &[
    ("Delta Autocorp", 45),
    ("Rikhav Securities", 25),
    ("CapitalNumbers", 60),
];

/// Read-only store of historical observations.
#[derive(Debug, Clone)]
pub struct HistoricalLedger {
    observations: Vec<HistoricalObservation>,
    premiums: Vec<(String, u32)>,
}

impl Default for HistoricalLedger {
    fn default() -> Self {
        Self::seeded()
    }
}

impl HistoricalLedger {
    /// Ledger built from the given observations, without premium quotes.
    pub fn new(observations: Vec<HistoricalObservation>) -> Self {
        Self {
            observations,
            premiums: Vec::new(),
        }
    }

    /// Ledger with the built-in observations and premium quotes.
    pub fn seeded() -> Self {
        let observations = SEED_OBSERVATIONS
            .iter()
            .filter_map(|(name, lots, applicants)| {
                HistoricalObservation::new(*name, *lots, *applicants)
            })
            .collect();

        let premiums = SEED_PREMIUMS
            .iter()
            .map(|(name, premium)| (name.to_string(), *premium))
            .collect();

        Self {
            observations,
            premiums,
        }
    }

    /// Attach grey market premium quotes.
    pub fn with_premiums(mut self, premiums: Vec<(String, u32)>) -> Self {
        self.premiums = premiums;
        self
    }

    /// Mean observed ratio for an exact (IPO, lots) pair. IPO names compare
    /// trimmed and case-insensitively.
    ///
    /// No interpolation between lot sizes: a lot count without its own
    /// observation returns `None`.
    pub fn probability_for(&self, ipo_name: &str, lots: u32) -> Option<f64> {
        let (sum, count) = self
            .observations
            .iter()
            .filter(|o| same_ipo(&o.ipo_name, ipo_name) && o.lot_size == lots)
            .fold((0.0, 0u32), |(sum, count), o| (sum + o.ratio(), count + 1));

        (count > 0).then(|| sum / f64::from(count))
    }

    /// Whether any observation exists for the IPO.
    pub fn has_data_for(&self, ipo_name: &str) -> bool {
        self.observations.iter().any(|o| same_ipo(&o.ipo_name, ipo_name))
    }

    /// Distinct IPO names with data, in insertion order.
    pub fn ipo_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for obs in &self.observations {
            if !names.contains(&obs.ipo_name) {
                names.push(obs.ipo_name.clone());
            }
        }
        names
    }

    /// Grey market premium quoted for an IPO, if known.
    pub fn grey_market_premium(&self, ipo_name: &str) -> Option<u32> {
        self.premiums
            .iter()
            .find(|(name, _)| same_ipo(name, ipo_name))
            .map(|(_, premium)| *premium)
    }

    /// All observations.
    pub fn observations(&self) -> &[HistoricalObservation] {
        &self.observations
    }
}

fn same_ipo(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
