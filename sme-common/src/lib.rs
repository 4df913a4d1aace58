//! SME Common - Shared configuration, validation, errors and logging for the
//! SME IPO allotment estimator.
//!
//! This crate provides:
//! - Configuration types and loading (`~/.sme-allotment/config.json` + `SME_*` env)
//! - Configuration validation
//! - Error types and handling utilities
//! - Logging setup with noise filtering

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;
pub mod validation;

pub use config::{
    Config, EstimationMode, ModelConfig, ObservabilityConfig, PlannerConfig, SourceConfig,
};
pub use error::{Error, Result};
pub use validation::{Validate, ValidationError, ValidationResult};

