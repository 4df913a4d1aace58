//! Configuration management for the SME allotment estimator.
//!
//! Configuration lives in `~/.sme-allotment/config.json`. Every field is
//! optional; missing fields fall back to the instrument defaults below.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (SME_* prefix)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `SME_SOURCE_URL` → source.url
//! - `SME_SOURCE_TIMEOUT_SECS` → source.timeout_secs
//! - `SME_ESTIMATION_MODE` → model.mode
//! - `SME_LOT_PRICE` → planner.lot_price
//! - `SME_LOG_LEVEL` → observability.log_level
//! - `SME_LOG_FORMAT` → observability.log_format

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Hard ceiling on the live-source request timeout.
pub const MAX_SOURCE_TIMEOUT_SECS: u64 = 10;

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".sme-allotment"),
        |dirs| dirs.home_dir().join(".sme-allotment"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Live Source Configuration
// ============================================================================

/// Live subscription report settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Report page holding the live SME subscription table
    #[serde(default = "default_source_url")]
    pub url: String,

    /// Request timeout in seconds (clamped to 10)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Minimum `<td>` count for a row to be considered
    #[serde(default = "default_min_columns")]
    pub min_columns: usize,

    /// User agent sent with the request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_source_url(),
            timeout_secs: default_timeout_secs(),
            min_columns: default_min_columns(),
            user_agent: default_user_agent(),
        }
    }
}

impl SourceConfig {
    /// Effective timeout, never above [`MAX_SOURCE_TIMEOUT_SECS`].
    pub fn effective_timeout_secs(&self) -> u64 {
        self.timeout_secs.clamp(1, MAX_SOURCE_TIMEOUT_SECS)
    }
}

fn default_source_url() -> String {
    "https://www.chittorgarh.com/report/latest-sme-ipo-subscription-live/85/".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_min_columns() -> usize {
    6
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) sme-allotment/0.1".to_string()
}

// ============================================================================
// Model Configuration
// ============================================================================

/// Which probability strategy the planner runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimationMode {
    /// Inverse of expected competing applicants, driven by the HNI multiple
    #[default]
    Heuristic,
    /// Observed historical ratios with a lot-scaled fallback
    Empirical,
}

impl fmt::Display for EstimationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heuristic => write!(f, "heuristic"),
            Self::Empirical => write!(f, "empirical"),
        }
    }
}

impl FromStr for EstimationMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heuristic" | "live" => Ok(Self::Heuristic),
            "empirical" | "historical" => Ok(Self::Empirical),
            other => Err(format!("unknown estimation mode '{}'", other)),
        }
    }
}

/// Probability model constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Active estimation strategy
    #[serde(default)]
    pub mode: EstimationMode,

    /// Applicants implied per unit of HNI multiple per lot
    #[serde(default = "default_base_factor")]
    pub base_factor: f64,

    /// Empirical fallback: probability = 1 / (lots * fallback_divisor)
    #[serde(default = "default_fallback_divisor")]
    pub fallback_divisor: f64,

    /// HNI multiple used when no live figure or override is available
    #[serde(default = "default_subscription")]
    pub default_subscription: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            mode: EstimationMode::default(),
            base_factor: default_base_factor(),
            fallback_divisor: default_fallback_divisor(),
            default_subscription: default_subscription(),
        }
    }
}

fn default_base_factor() -> f64 {
    2.5
}

fn default_fallback_divisor() -> f64 {
    10.0
}

fn default_subscription() -> f64 {
    100.0
}

// ============================================================================
// Planner Configuration
// ============================================================================

/// Instrument constants for the lot planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Smallest lot count considered
    #[serde(default = "default_min_lots")]
    pub min_lots: u32,

    /// Largest lot count considered (inclusive)
    #[serde(default = "default_max_lots")]
    pub max_lots: u32,

    /// Cost of one lot in rupees
    #[serde(default = "default_lot_price")]
    pub lot_price: u64,

    /// Shares granted on a full allotment
    #[serde(default = "default_share_multiplier")]
    pub share_multiplier: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_lots: default_min_lots(),
            max_lots: default_max_lots(),
            lot_price: default_lot_price(),
            share_multiplier: default_share_multiplier(),
        }
    }
}

fn default_min_lots() -> u32 {
    2
}

fn default_max_lots() -> u32 {
    25
}

fn default_lot_price() -> u64 {
    80_000
}

fn default_share_multiplier() -> u32 {
    200
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Live subscription source
    #[serde(default)]
    pub source: SourceConfig,

    /// Probability model
    #[serde(default)]
    pub model: ModelConfig,

    /// Lot planner
    #[serde(default)]
    pub planner: PlannerConfig,

    /// Logging
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration with environment variable overrides.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `SME_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Values that fail to parse are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SME_SOURCE_URL") {
            self.source.url = url;
        }
        if let Some(raw) = lookup("SME_SOURCE_TIMEOUT_SECS") {
            match raw.parse() {
                Ok(secs) => self.source.timeout_secs = secs,
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid SME_SOURCE_TIMEOUT_SECS"),
            }
        }
        if let Some(raw) = lookup("SME_ESTIMATION_MODE") {
            match raw.parse() {
                Ok(mode) => self.model.mode = mode,
                Err(e) => tracing::warn!(error = %e, "Ignoring invalid SME_ESTIMATION_MODE"),
            }
        }
        if let Some(raw) = lookup("SME_LOT_PRICE") {
            match raw.parse() {
                Ok(price) => self.planner.lot_price = price,
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid SME_LOT_PRICE"),
            }
        }
        if let Some(level) = lookup("SME_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = lookup("SME_LOG_FORMAT") {
            self.observability.log_format = format;
        }
    }
}
